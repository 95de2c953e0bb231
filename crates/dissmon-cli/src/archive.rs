//! [`FsArchive`]: raw registry documents on disk, one file per
//! (kind, key, day), never overwritten.

use std::{
  fs,
  io::{self, Write as _},
  path::{Path, PathBuf},
};

use chrono::NaiveDate;
use dissmon_core::{
  date::format_display,
  source::{DocumentArchive, DocumentKind},
};
use tempfile::NamedTempFile;

#[derive(Debug, Clone)]
pub struct FsArchive {
  root: PathBuf,
}

impl FsArchive {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// `<root>/<kind dir>/<key>_<dd.mm.yyyy>.html`
  pub fn path_for(&self, kind: DocumentKind, key: &str, date: NaiveDate) -> PathBuf {
    let dir = match kind {
      DocumentKind::Listing => "listings",
      DocumentKind::Case => "cases",
      DocumentKind::Revocation => "revocations",
    };
    self
      .root
      .join(dir)
      .join(format!("{key}_{}.html", format_display(date)))
  }
}

fn write_new(path: &Path, document: &str) -> io::Result<bool> {
  write_new_with(path, |file| file.write_all(document.as_bytes()))
}

/// Fill a temporary file next to `path`, then link it into place unless a
/// copy already exists. A failed fill leaves nothing behind.
fn write_new_with(
  path: &Path,
  fill: impl FnOnce(&mut NamedTempFile) -> io::Result<()>,
) -> io::Result<bool> {
  let dir = path.parent().unwrap_or_else(|| Path::new("."));
  fs::create_dir_all(dir)?;

  let mut staged = NamedTempFile::new_in(dir)?;
  fill(&mut staged)?;
  match staged.persist_noclobber(path) {
    Ok(_) => Ok(true),
    Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
    Err(e) => Err(e.error),
  }
}

impl DocumentArchive for FsArchive {
  type Error = io::Error;

  fn preserve(
    &self,
    kind: DocumentKind,
    key: &str,
    date: NaiveDate,
    document: &str,
  ) -> io::Result<()> {
    let path = self.path_for(kind, key, date);
    if write_new(&path, document)? {
      tracing::debug!(path = %path.display(), "archived {kind} page");
    } else {
      tracing::debug!(path = %path.display(), "archive copy already present");
    }
    Ok(())
  }
}
