//! The `CaseStore` and `ChangelogStore` traits.
//!
//! The traits are implemented by storage backends (e.g.
//! `dissmon-store-sqlite`). The orchestrator and the CLI depend on this
//! abstraction, not on any concrete backend.

use std::{
  collections::{BTreeMap, BTreeSet},
  future::Future,
};

use crate::{
  case::{CaseId, CaseRecord, Status},
  changelog::ChangelogEntry,
};

/// How [`CaseStore::write_batch`] treats records already in the active store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
  /// Insert or replace the given records; leave every other record alone.
  Upsert,
  /// Replace the whole active store with the given records.
  Replace,
}

/// Abstraction over the record store: an active table keyed by [`CaseId`]
/// and a terminal table of expired cases.
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every active (non-expired) record, keyed by case id.
  fn get_all(
    &self,
  ) -> impl Future<Output = Result<BTreeMap<CaseId, CaseRecord>, Self::Error>>
  + Send
  + '_;

  /// Ids of every case in the expired store.
  fn expired_ids(
    &self,
  ) -> impl Future<Output = Result<BTreeSet<CaseId>, Self::Error>> + Send + '_;

  /// Records from both stores whose status is one of `statuses`.
  fn get_by_status<'a>(
    &'a self,
    statuses: &'a [Status],
  ) -> impl Future<Output = Result<Vec<CaseRecord>, Self::Error>> + Send + 'a;

  /// Write a batch of active records.
  fn write_batch(
    &self,
    records: Vec<CaseRecord>,
    mode: WriteMode,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Move records into the expired store, dropping any active entry with the
  /// same id. This is the only way a record ever leaves the active store.
  fn retire(
    &self,
    records: Vec<CaseRecord>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Apply a whole pass as one unit: upsert `active`, retire `expired` and
  /// append `changelog`. On error nothing from the pass is persisted.
  fn commit_pass(
    &self,
    active: Vec<CaseRecord>,
    expired: Vec<CaseRecord>,
    changelog: Vec<ChangelogEntry>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Append-only sink for [`ChangelogEntry`] values.
pub trait ChangelogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn append(
    &self,
    entries: Vec<ChangelogEntry>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Entries in insertion order, optionally restricted to one case.
  fn list<'a>(
    &'a self,
    case_id: Option<&'a CaseId>,
  ) -> impl Future<Output = Result<Vec<ChangelogEntry>, Self::Error>> + Send + 'a;
}
