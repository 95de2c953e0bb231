//! [`HttpSource`]: registry documents over HTTP(S).

use std::time::Duration;

use anyhow::Context as _;
use dissmon_core::source::DocumentSource;
use reqwest::{Client, StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
  #[error("request to {url} failed: {source}")]
  Transport {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{url} answered {status}")]
  Status { url: String, status: StatusCode },
}

/// Fetches registry pages, joining relative locators to the registry origin.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpSource {
  client:   Client,
  base_url: String,
}

impl HttpSource {
  pub fn new(base_url: &str, user_agent: &str) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .user_agent(user_agent)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_owned(),
    })
  }

  /// Absolute URL for `locator`.
  pub fn url(&self, locator: &str) -> String {
    if locator.starts_with("http://") || locator.starts_with("https://") {
      locator.to_owned()
    } else {
      format!("{}/{}", self.base_url, locator.trim_start_matches('/'))
    }
  }
}

impl DocumentSource for HttpSource {
  type Error = FetchError;

  async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
    let url = self.url(locator);
    let transport = |source| FetchError::Transport {
      url: url.clone(),
      source,
    };

    let resp = self.client.get(&url).send().await.map_err(transport)?;
    let status = resp.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url: url.clone(),
        status,
      });
    }
    resp.text().await.map_err(transport)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn relative_locators_join_the_origin() {
    let source = HttpSource::new("https://registry.example/", "test").unwrap();
    assert_eq!(
      source.url("/expertise/x42.html"),
      "https://registry.example/expertise/x42.html"
    );
    assert_eq!(
      source.url("expertise/x42.html"),
      "https://registry.example/expertise/x42.html"
    );
  }

  #[test]
  fn absolute_locators_are_kept() {
    let source = HttpSource::new("https://registry.example", "test").unwrap();
    assert_eq!(
      source.url("https://mirror.example/a.html"),
      "https://mirror.example/a.html"
    );
  }
}
