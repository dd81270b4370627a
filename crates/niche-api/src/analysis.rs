//! Handlers for `/analysis` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/analysis` | Multipart with the three CSV exports; returns 201 |
//! | `POST` | `/analysis/rows` | Body: [`SourceRows`]; returns 201 |
//! | `GET`  | `/analysis` | Stored sessions, newest first |
//! | `GET`  | `/analysis/{id}` | 404 if not found |
//! | `PUT`  | `/analysis/{id}/{target}` | `target` is `keywords`, `root-keywords`, `competitors` or `products` |

use axum::{
  Json,
  extract::{Multipart, Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use niche_core::{
  row::SourceRows,
  session::{Edit, EditTarget, Session},
  store::{SessionStore, SessionSummary},
  view::{AnalysisView, EditOutcome},
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Multipart field carrying the keyword-ranking export.
pub const KEYWORD_FIELD: &str = "keywordAnalysisFile";
/// Multipart field carrying the business export.
pub const BUSINESS_FIELD: &str = "businessDataFile";
/// Multipart field carrying the product export.
pub const PRODUCT_FIELD: &str = "productDataFile";

fn store_error<E>(e: E) -> ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  ApiError::Store(Box::new(e))
}

async fn load_session<S>(store: &S, id: Uuid) -> Result<Session, ApiError>
where
  S: SessionStore,
{
  match store.load(id).await.map_err(store_error)? {
    Some(session) => Ok(session),
    None => {
      warn!(analysis_id = %id, "analysis not found");
      Err(niche_core::Error::SessionNotFound(id).into())
    }
  }
}

async fn create_session<S>(
  store: &S,
  rows: SourceRows,
) -> Result<impl IntoResponse + use<S>, ApiError>
where
  S: SessionStore,
{
  let session = Session::initialize(rows);
  store.save(&session).await.map_err(store_error)?;

  let summary = session.upload_summary();
  info!(
    analysis_id = %summary.analysis_id,
    keywords = summary.total_keywords,
    competitors = summary.total_competitors,
    total_market_sv = summary.total_market_sv,
    "created analysis"
  );
  Ok((StatusCode::CREATED, Json(summary)))
}

// ─── Upload ───────────────────────────────────────────────────────────────────

/// `POST /analysis` with multipart fields [`KEYWORD_FIELD`],
/// [`BUSINESS_FIELD`] and [`PRODUCT_FIELD`].
pub async fn upload<S>(
  State(state): State<AppState<S>>,
  mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore,
{
  let bad_multipart = |e: axum::extract::multipart::MultipartError| {
    ApiError::BadRequest(format!("invalid multipart body: {e}"))
  };

  let (mut keywords, mut business, mut products) = (None, None, None);
  while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
    let slot = match field.name() {
      Some(KEYWORD_FIELD) => &mut keywords,
      Some(BUSINESS_FIELD) => &mut business,
      Some(PRODUCT_FIELD) => &mut products,
      _ => continue,
    };
    *slot = Some(field.text().await.map_err(bad_multipart)?);
  }

  let require = |file: Option<String>, name: &str| {
    file.ok_or_else(|| ApiError::BadRequest(format!("missing file field {name:?}")))
  };
  let keywords = require(keywords, KEYWORD_FIELD)?;
  let business = require(business, BUSINESS_FIELD)?;
  let products = require(products, PRODUCT_FIELD)?;

  let rows = niche_csv::parse_exports(&keywords, &business, &products)?;
  create_session(state.store.as_ref(), rows).await
}

/// `POST /analysis/rows`: body is an already-normalized [`SourceRows`].
pub async fn create_from_rows<S>(
  State(state): State<AppState<S>>,
  Json(rows): Json<SourceRows>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore,
{
  create_session(state.store.as_ref(), rows).await
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /analysis`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<SessionSummary>>, ApiError>
where
  S: SessionStore,
{
  let summaries = state.store.list().await.map_err(store_error)?;
  Ok(Json(summaries))
}

/// `GET /analysis/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<AnalysisView>, ApiError>
where
  S: SessionStore,
{
  let session = load_session(state.store.as_ref(), id).await?;
  Ok(Json(session.view()))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

/// Both lists are required; an absent or non-array field is a 400.
#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub deleted:  Vec<String>,
  pub restored: Vec<String>,
}

/// `PUT /analysis/{id}/{target}`: body `{"deleted":[...],"restored":[...]}`.
///
/// Holds the session's write lock from load to save.
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  Path((id, target)): Path<(Uuid, String)>,
  body: Result<Json<EditBody>, JsonRejection>,
) -> Result<Json<EditOutcome>, ApiError>
where
  S: SessionStore,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let target: EditTarget = target.parse()?;
  let edit = Edit {
    target,
    deleted: body.deleted,
    restored: body.restored,
  };

  let _guard = state.locks.lock(id).await;
  let mut session = load_session(state.store.as_ref(), id).await?;
  session.apply(&edit);
  state.store.save(&session).await.map_err(store_error)?;

  Ok(Json(session.edit_outcome(&edit)))
}
