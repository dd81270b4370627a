//! `niche`: command-line front end for niche market analyses.
//!
//! # Usage
//!
//! ```text
//! niche analyze --keywords kw.csv --business biz.csv --products prod.csv
//! niche --url http://localhost:8080 upload --keywords kw.csv --business biz.csv --products prod.csv
//! niche show 6f1c…
//! niche edit 6f1c… root-keywords --delete leash --restore collar
//! ```

mod client;
mod report;

use std::{
  io::{self, Write},
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client::{ApiClient, Exports};
use niche_core::{
  session::{Edit, EditTarget, Session},
  view::AnalysisView,
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "niche", about = "Amazon niche analysis from marketplace exports")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the niche server (default: http://localhost:8080).
  #[arg(long, env = "NICHE_URL", global = true)]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

/// Paths to the three exports.
#[derive(ClapArgs, Debug)]
struct ExportPaths {
  /// Keyword-ranking export.
  #[arg(long, value_name = "CSV")]
  keywords: PathBuf,

  /// Seller/business export.
  #[arg(long, value_name = "CSV")]
  business: PathBuf,

  /// Catalog/product export.
  #[arg(long, value_name = "CSV")]
  products: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Analyse three exports locally and print a report.
  Analyze {
    #[command(flatten)]
    exports: ExportPaths,

    /// Keyword phrase to delete before reporting (repeatable).
    #[arg(long = "delete-keyword", value_name = "PHRASE")]
    delete_keywords: Vec<String>,

    /// Root word to delete, with every phrase containing it (repeatable).
    #[arg(long = "delete-root", value_name = "ROOT")]
    delete_roots: Vec<String>,

    /// Competitor ASIN to delete (repeatable).
    #[arg(long = "delete-competitor", value_name = "ASIN")]
    delete_competitors: Vec<String>,

    /// Product ASIN to delete, with its competitor (repeatable).
    #[arg(long = "delete-product", value_name = "ASIN")]
    delete_products: Vec<String>,

    /// Print the full view as JSON instead of the report.
    #[arg(long)]
    json: bool,
  },

  /// Upload three exports to the server and create an analysis.
  Upload {
    #[command(flatten)]
    exports: ExportPaths,
  },

  /// List analyses stored on the server.
  List,

  /// Fetch an analysis from the server.
  Show {
    id: Uuid,

    /// Print the full view as JSON instead of the report.
    #[arg(long)]
    json: bool,
  },

  /// Delete or restore entities of a stored analysis.
  Edit {
    id: Uuid,

    /// `keywords`, `root-keywords`, `competitors` or `products`.
    target: EditTarget,

    /// Key to delete (repeatable).
    #[arg(long, value_name = "KEY")]
    delete: Vec<String>,

    /// Key to restore (repeatable).
    #[arg(long, value_name = "KEY")]
    restore: Vec<String>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flag overrides config file, which overrides the default.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());

  match args.command {
    Command::Analyze {
      exports,
      delete_keywords,
      delete_roots,
      delete_competitors,
      delete_products,
      json,
    } => {
      let exports = read_exports(&exports)?;
      let rows =
        niche_csv::parse_exports(&exports.keywords, &exports.business, &exports.products)
          .context("parsing exports")?;
      let mut session = Session::initialize(rows);

      let edits = [
        (EditTarget::RootKeywords, delete_roots),
        (EditTarget::Keywords, delete_keywords),
        (EditTarget::Products, delete_products),
        (EditTarget::Competitors, delete_competitors),
      ];
      for (target, deleted) in edits {
        if !deleted.is_empty() {
          session.apply(&Edit {
            target,
            deleted,
            restored: Vec::new(),
          });
        }
      }

      print_view(&session.view(), json)
    }

    Command::Upload { exports } => {
      let client = ApiClient::new(base_url)?;
      let summary = client.upload(read_exports(&exports)?).await?;
      println!("{}", summary.analysis_id);
      println!(
        "{} keywords, {} competitors, total search volume {}",
        summary.total_keywords, summary.total_competitors, summary.total_market_sv
      );
      Ok(())
    }

    Command::List => {
      let client = ApiClient::new(base_url)?;
      for s in client.list().await? {
        println!(
          "{}  {}  {:>5} kw  {:>4} comp  sv {}",
          s.id,
          s.created_at.format("%Y-%m-%d %H:%M"),
          s.keyword_count,
          s.competitor_count,
          s.total_market_sv
        );
      }
      Ok(())
    }

    Command::Show { id, json } => {
      let client = ApiClient::new(base_url)?;
      let view = client.show(id).await?;
      print_view(&view, json)
    }

    Command::Edit {
      id,
      target,
      delete,
      restore,
    } => {
      let client = ApiClient::new(base_url)?;
      let edit = Edit {
        target,
        deleted: delete,
        restored: restore,
      };
      let outcome = client.edit(id, &edit).await?;
      println!("total search volume {}", outcome.total_market_sv);
      if !outcome.affected_competitors.is_empty() {
        println!("affected: {}", outcome.affected_competitors.join(", "));
      }
      Ok(())
    }
  }
}

fn read_file(path: &Path) -> Result<String> {
  std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_exports(paths: &ExportPaths) -> Result<Exports> {
  Ok(Exports {
    keywords: read_file(&paths.keywords)?,
    business: read_file(&paths.business)?,
    products: read_file(&paths.products)?,
  })
}

fn print_view(view: &AnalysisView, json: bool) -> Result<()> {
  let mut stdout = io::stdout().lock();
  if json {
    serde_json::to_writer_pretty(&mut stdout, view).context("writing JSON")?;
    writeln!(stdout)?;
  } else {
    report::render(view, &mut stdout).context("writing report")?;
  }
  Ok(())
}
