//! Async HTTP client wrapping the niche JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use niche_core::{
  session::Edit,
  store::SessionSummary,
  view::{AnalysisView, EditOutcome, UploadSummary},
};
use reqwest::{
  Client, Response,
  multipart::{Form, Part},
};
use serde::Deserialize;
use uuid::Uuid;

/// The three exports an analysis is built from, already read into memory.
#[derive(Debug, Clone)]
pub struct Exports {
  pub keywords: String,
  pub business: String,
  pub products: String,
}

/// Async HTTP client for the niche REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      base_url: base_url.into(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api/v1{}", self.base_url.trim_end_matches('/'), path)
  }

  /// Turn a non-2xx response into an error carrying the server's message.
  async fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp
      .json::<ErrorBody>()
      .await
      .map(|body| body.error)
      .unwrap_or_default();
    Err(anyhow!("{what} → {status} {message}"))
  }

  /// `POST /api/v1/analysis`
  pub async fn upload(&self, exports: Exports) -> Result<UploadSummary> {
    let file = |content: String, name: &'static str| {
      Part::text(content)
        .file_name(name)
        .mime_str("text/csv")
        .context("building multipart part")
    };
    let form = Form::new()
      .part("keywordAnalysisFile", file(exports.keywords, "keywords.csv")?)
      .part("businessDataFile", file(exports.business, "business.csv")?)
      .part("productDataFile", file(exports.products, "products.csv")?);

    let resp = self
      .client
      .post(self.url("/analysis"))
      .multipart(form)
      .send()
      .await
      .context("POST /analysis failed")?;
    let resp = Self::check(resp, "POST /analysis").await?;
    resp.json().await.context("deserialising upload summary")
  }

  /// `GET /api/v1/analysis`
  pub async fn list(&self) -> Result<Vec<SessionSummary>> {
    let resp = self
      .client
      .get(self.url("/analysis"))
      .send()
      .await
      .context("GET /analysis failed")?;
    let resp = Self::check(resp, "GET /analysis").await?;
    resp.json().await.context("deserialising analysis list")
  }

  /// `GET /api/v1/analysis/{id}`
  pub async fn show(&self, id: Uuid) -> Result<AnalysisView> {
    let path = format!("/analysis/{id}");
    let resp = self
      .client
      .get(self.url(&path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    let resp = Self::check(resp, &format!("GET {path}")).await?;
    resp.json().await.context("deserialising analysis")
  }

  /// `PUT /api/v1/analysis/{id}/{target}`
  pub async fn edit(&self, id: Uuid, edit: &Edit) -> Result<EditOutcome> {
    let path = format!("/analysis/{id}/{}", edit.target);
    let resp = self
      .client
      .put(self.url(&path))
      .json(&serde_json::json!({
        "deleted": edit.deleted,
        "restored": edit.restored,
      }))
      .send()
      .await
      .with_context(|| format!("PUT {path} failed"))?;
    let resp = Self::check(resp, &format!("PUT {path}")).await?;
    resp.json().await.context("deserialising edit outcome")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn urls_are_rooted_at_api_v1() {
    let client = ApiClient::new("http://localhost:8080/").unwrap();
    assert_eq!(
      client.url("/analysis"),
      "http://localhost:8080/api/v1/analysis"
    );
  }
}
