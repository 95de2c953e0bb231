//! Runtime settings: an optional TOML file layered under `DISSMON_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use dissmon_core::config::{DEFAULT_FINAL_RULING_PHRASE, PassConfig, RefreshPolicy};
use dissmon_markup::Lexicon;
use serde::Deserialize;

/// Older deployments configure refresh thresholds through these; they act as
/// defaults beneath the file and `DISSMON_*` variables.
const LEGACY_REFRESH_VARS: [(&str, &str); 2] = [
  ("REFRESH_NEW_FREQUENCY", "refresh_new_days"),
  ("REFRESH_CURRENT_FREQUENCY", "refresh_current_days"),
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Registry origin that relative locators are joined to.
  pub base_url:             String,
  /// Index page listing the cases to monitor.
  pub listing_url:          String,
  pub store_path:           PathBuf,
  /// Root of the raw-document archive.
  pub archive_dir:          PathBuf,
  pub refresh_new_days:     i64,
  pub refresh_current_days: i64,
  /// Delay between consecutive registry requests.
  pub pacing_ms:            u64,
  pub user_agent:           String,
  pub final_ruling_phrase:  String,
  pub lexicon:              Lexicon,
}

impl Default for Settings {
  fn default() -> Self {
    let refresh = RefreshPolicy::default();
    Self {
      base_url:             "https://www.dissernet.org".to_string(),
      listing_url:          "/expertise/".to_string(),
      store_path:           PathBuf::from("dissmon.sqlite"),
      archive_dir:          PathBuf::from("archive"),
      refresh_new_days:     refresh.refresh_new_days,
      refresh_current_days: refresh.refresh_current_days,
      pacing_ms:            1000,
      user_agent:           concat!("dissmon/", env!("CARGO_PKG_VERSION"))
        .to_string(),
      final_ruling_phrase:  DEFAULT_FINAL_RULING_PHRASE.to_string(),
      lexicon:              Lexicon::default(),
    }
  }
}

impl Settings {
  /// Load settings from `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let mut builder = config::Config::builder();

    for (var, key) in LEGACY_REFRESH_VARS {
      if let Ok(value) = std::env::var(var) {
        let days: i64 = value
          .trim()
          .parse()
          .with_context(|| format!("{var} must be a whole number of days"))?;
        builder = builder.set_default(key, days)?;
      }
    }

    let settings = builder
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("DISSMON"))
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn pass_config(&self) -> PassConfig {
    PassConfig {
      refresh:             RefreshPolicy {
        refresh_new_days:     self.refresh_new_days,
        refresh_current_days: self.refresh_current_days,
      },
      final_ruling_phrase: self.final_ruling_phrase.clone(),
      pacing:              Duration::from_millis(self.pacing_ms),
    }
  }
}
