//! `dissmon`: watch a dissertation-defense registry for degree-revocation
//! activity.
//!
//! # Usage
//!
//! ```text
//! dissmon run                              # fetch the configured listing
//! dissmon run --listing-file saved.html    # reuse a saved index page
//! dissmon run --dry-run                    # report only, store untouched
//! dissmon list --status current
//! dissmon changelog --case ivanov_ii
//! ```

mod archive;
mod fetch;
mod report;
mod settings;

use std::{path::PathBuf, str::FromStr as _};

use anyhow::{Context as _, Result};
use archive::FsArchive;
use clap::{Parser, Subcommand};
use dissmon_core::{
  case::{CaseId, Status},
  pipeline::{Pipeline, StoreSnapshot, commit},
  source::{DocumentArchive as _, DocumentKind, DocumentSource as _},
  store::{CaseStore as _, ChangelogStore},
};
use dissmon_markup::{HtmlExtractor, parse_listing};
use dissmon_store_sqlite::SqliteStore;
use fetch::HttpSource;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Archive key for index pages.
const LISTING_KEY: &str = "index";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "dissmon", version, about = "Dissertation registry monitor")]
struct Args {
  /// Path to the TOML configuration file.
  #[arg(short, long, global = true, default_value = "dissmon.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run one monitoring pass over the registry listing.
  Run {
    /// Listing page to fetch instead of the configured one.
    #[arg(long, value_name = "URL", conflicts_with = "listing_file")]
    listing_url: Option<String>,

    /// Read the listing from a previously saved page instead of fetching it.
    #[arg(long, value_name = "FILE")]
    listing_file: Option<PathBuf>,

    /// Report what would change without writing to the store.
    #[arg(long)]
    dry_run: bool,
  },

  /// Print stored cases with the given statuses.
  List {
    #[arg(
      long = "status",
      value_name = "STATUS",
      value_parser = parse_status,
      required = true,
      num_args = 1..,
    )]
    statuses: Vec<Status>,
  },

  /// Print the change history, optionally for a single case.
  Changelog {
    #[arg(long = "case", value_name = "ID")]
    case_id: Option<String>,
  },
}

fn parse_status(s: &str) -> Result<Status, String> {
  Status::from_str(s).map_err(|_| format!("expected new, current or expired, got {s:?}"))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let settings = Settings::load(&args.config)?;

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {}", settings.store_path.display())
    })?;

  match args.command {
    Command::Run {
      listing_url,
      listing_file,
      dry_run,
    } => run(&settings, &store, listing_url, listing_file, dry_run).await,
    Command::List { statuses } => {
      let records = store
        .get_by_status(&statuses)
        .await
        .context("failed to read cases")?;
      print!("{}", report::render_cases(&records));
      Ok(())
    }
    Command::Changelog { case_id } => {
      let case_id = case_id
        .map(CaseId::new)
        .transpose()
        .context("invalid case id")?;
      let entries = ChangelogStore::list(&store, case_id.as_ref())
        .await
        .context("failed to read changelog")?;
      print!("{}", report::render_changelog(&entries));
      Ok(())
    }
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn run(
  settings: &Settings,
  store: &SqliteStore,
  listing_url: Option<String>,
  listing_file: Option<PathBuf>,
  dry_run: bool,
) -> Result<()> {
  let today = chrono::Local::now().date_naive();
  let source = HttpSource::new(&settings.base_url, &settings.user_agent)?;
  let archive = FsArchive::new(&settings.archive_dir);
  let extractor = HtmlExtractor::new(settings.lexicon.clone());

  let index = match listing_file {
    Some(path) => tokio::fs::read_to_string(&path)
      .await
      .with_context(|| format!("failed to read listing {}", path.display()))?,
    None => {
      let url = listing_url.unwrap_or_else(|| settings.listing_url.clone());
      let page = source
        .fetch(&url)
        .await
        .with_context(|| format!("failed to fetch listing {url}"))?;
      archive
        .preserve(DocumentKind::Listing, LISTING_KEY, today, &page)
        .context("failed to archive listing page")?;
      page
    }
  };

  let listing =
    parse_listing(&index, extractor.lexicon()).context("unreadable listing page")?;
  tracing::info!(cases = listing.len(), "listing loaded");

  let snapshot = StoreSnapshot::load(store)
    .await
    .context("failed to read store")?;

  let pipeline =
    Pipeline::new(&source, &extractor, &archive, settings.pass_config(), today);
  let mut outcome = pipeline.run(&listing, &snapshot).await;

  for activity in outcome.activity.drain() {
    println!("{activity}");
  }

  if dry_run {
    tracing::info!("dry run, store left untouched");
    return Ok(());
  }

  commit(store, outcome.batch)
    .await
    .context("failed to commit pass")?;
  Ok(())
}
