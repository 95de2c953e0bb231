//! Pipeline orchestrator: one monitoring pass over the registry listing.
//!
//! Cases are examined strictly one at a time in listing order. Per case the
//! decision tree is:
//!
//! ```text
//! known case ─┬─ final ruling stored ─────────────→ reuse stored (no fetch)
//!             ├─ checked within threshold ────────→ reuse stored (no fetch)
//!             └─ stale ──┐
//! unseen case ───────────┴─ fetch → archive → extract → reconcile
//! ```
//!
//! The store is read once before the pass ([`StoreSnapshot`]) and written once
//! after it ([`commit`]); nothing in between touches persistent state except
//! the write-once document archive.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::Instrument as _;

use crate::{
  activity::{Activity, ActivityLog, FailureStage, join_fields},
  case::{CaseId, CaseRecord},
  changelog::ChangelogEntry,
  config::{PassConfig, RefreshPolicy},
  extract::{CaseExtractor, DispositionHint},
  reconcile::{Disposition, reconcile},
  source::{DocumentArchive, DocumentKind, DocumentSource, ListingEntry},
  store::CaseStore,
};

// ─── Snapshot & outcome ──────────────────────────────────────────────────────

/// Store state read once at the start of a pass.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
  pub active:  BTreeMap<CaseId, CaseRecord>,
  pub expired: BTreeSet<CaseId>,
}

impl StoreSnapshot {
  pub async fn load<S: CaseStore>(store: &S) -> Result<Self, S::Error> {
    Ok(Self {
      active:  store.get_all().await?,
      expired: store.expired_ids().await?,
    })
  }
}

/// Everything a pass wants persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassBatch {
  /// Active records to upsert, in processing order.
  pub active:    Vec<CaseRecord>,
  /// Records that moved out of the review window.
  pub expired:   Vec<CaseRecord>,
  pub changelog: Vec<ChangelogEntry>,
}

impl PassBatch {
  pub fn is_empty(&self) -> bool {
    self.active.is_empty() && self.expired.is_empty() && self.changelog.is_empty()
  }
}

#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
  pub batch:    PassBatch,
  pub activity: ActivityLog,
}

// ─── Per-case failure ────────────────────────────────────────────────────────

struct CaseFailure {
  stage:   FailureStage,
  message: String,
}

impl CaseFailure {
  fn new(stage: FailureStage, error: impl std::fmt::Display) -> Self {
    Self {
      stage,
      message: error.to_string(),
    }
  }
}

/// Mutable state owned by a single pass.
#[derive(Default)]
struct Pass {
  outcome:     PassOutcome,
  fetched_any: bool,
  updates:     Vec<String>,
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Runs passes against a document source, extractor and archive.
pub struct Pipeline<'a, S, X, A> {
  source:    &'a S,
  extractor: &'a X,
  archive:   &'a A,
  config:    PassConfig,
  today:     NaiveDate,
}

impl<'a, S, X, A> Pipeline<'a, S, X, A>
where
  S: DocumentSource,
  X: CaseExtractor,
  A: DocumentArchive,
{
  pub fn new(
    source: &'a S,
    extractor: &'a X,
    archive: &'a A,
    config: PassConfig,
    today: NaiveDate,
  ) -> Self {
    Self {
      source,
      extractor,
      archive,
      config,
      today,
    }
  }

  /// Run one pass over `listing`.
  ///
  /// Never fails as a whole: per-case errors are recorded in the activity
  /// log and the case contributes nothing to the batch.
  pub async fn run(
    &self,
    listing: &[ListingEntry],
    snapshot: &StoreSnapshot,
  ) -> PassOutcome {
    let span = tracing::info_span!(
      "pass",
      today = %self.today,
      listed = listing.len(),
      known = snapshot.active.len(),
    );
    self.run_inner(listing, snapshot).instrument(span).await
  }

  async fn run_inner(
    &self,
    listing: &[ListingEntry],
    snapshot: &StoreSnapshot,
  ) -> PassOutcome {
    let mut pass = Pass::default();
    let mut seen = BTreeSet::new();

    // Each case is handled once per pass, at its first listing position.
    let pending = listing
      .iter()
      .filter(|entry| !snapshot.expired.contains(&entry.case_id))
      .filter(|entry| {
        let first = seen.insert(&entry.case_id);
        if !first {
          tracing::debug!(case_id = %entry.case_id, "duplicate listing entry skipped");
        }
        first
      });

    for (index, entry) in pending.enumerate() {
      let position = index + 1;
      let stored = snapshot.active.get(&entry.case_id);

      match stored {
        Some(stored) => {
          pass.outcome.activity.record(Activity::Checking {
            position,
            case_id: entry.case_id.clone(),
            dissertant: stored.dissertant_name.clone(),
          });

          if stored.has_final_ruling(&self.config.final_ruling_phrase) {
            pass.outcome.activity.record(Activity::FinalRuling {
              case_id: entry.case_id.clone(),
            });
            pass.outcome.batch.active.push(stored.clone());
            continue;
          }

          if !self.config.refresh.is_due(stored, self.today) {
            pass.outcome.activity.record(Activity::Fresh {
              case_id:          entry.case_id.clone(),
              days_since_check: RefreshPolicy::days_since_check(
                stored, self.today,
              ),
            });
            pass.outcome.batch.active.push(stored.clone());
            continue;
          }

          pass.outcome.activity.record(Activity::Refreshing {
            case_id: entry.case_id.clone(),
          });
        }
        None => {
          pass.outcome.activity.record(Activity::Discovered {
            position,
            case_id: entry.case_id.clone(),
          });
        }
      }

      if let Err(failure) = self.fetch_and_reconcile(&mut pass, entry, stored).await
      {
        pass.outcome.activity.record(Activity::Failed {
          case_id: entry.case_id.clone(),
          stage:   failure.stage,
          message: failure.message,
        });
      }
    }

    let updates = std::mem::take(&mut pass.updates);
    pass.outcome.activity.record(Activity::Summary { updates });
    pass.outcome
  }

  async fn fetch_and_reconcile(
    &self,
    pass: &mut Pass,
    entry: &ListingEntry,
    stored: Option<&CaseRecord>,
  ) -> Result<(), CaseFailure> {
    let case_id = &entry.case_id;

    let document = self.fetch(pass, &entry.locator).await?;
    self.preserve(DocumentKind::Case, case_id, &document)?;

    let mut draft = self
      .extractor
      .parse_case(case_id, &document)
      .map_err(|e| CaseFailure::new(FailureStage::Extract, e))?;

    let revocation = match draft.revocation_link.take() {
      Some(link) if draft.petition_filed => {
        let detail = self.fetch(pass, &link).await?;
        self.preserve(DocumentKind::Revocation, case_id, &detail)?;
        Some(self.extractor.parse_revocation(&detail))
      }
      _ => None,
    };

    let extraction = draft
      .finish(revocation, self.today)
      .map_err(|e| CaseFailure::new(FailureStage::Classify, e))?;
    let record = extraction.record;

    let disposition = match extraction.hint {
      DispositionHint::ExpiredNew => Disposition::RouteToExpired,
      DispositionHint::Active => reconcile(&record, stored),
    };

    let batch = &mut pass.outcome.batch;
    let activity = &mut pass.outcome.activity;
    match (disposition, stored) {
      (Disposition::RouteToExpired, _) => {
        activity.record(Activity::ExpiredNew {
          case_id:    case_id.clone(),
          dissertant: record.dissertant_name.clone(),
        });
        batch.expired.push(record);
      }
      (Disposition::NewCase, _) => {
        batch
          .changelog
          .push(ChangelogEntry::new_case(case_id.clone(), self.today));
        activity.record(Activity::NewCase {
          case_id:    case_id.clone(),
          dissertant: record.dissertant_name.clone(),
        });
        batch.active.push(record);
      }
      (Disposition::Updated { changed_fields }, _) => {
        batch.changelog.push(ChangelogEntry::updated(
          case_id.clone(),
          &changed_fields,
          self.today,
        ));
        pass.updates.push(format!(
          "{}: {}",
          record.dissertant_name,
          join_fields(&changed_fields)
        ));
        activity.record(Activity::Updated {
          case_id: case_id.clone(),
          dissertant: record.dissertant_name.clone(),
          changed_fields,
        });
        batch.active.push(record);
      }
      (Disposition::Unchanged, Some(stored)) => {
        activity.record(Activity::Unchanged {
          case_id: case_id.clone(),
        });
        batch.active.push(stored.clone());
      }
      // `reconcile` only reports Unchanged against a stored record.
      (Disposition::Unchanged, None) => batch.active.push(record),
    }

    Ok(())
  }

  async fn fetch(
    &self,
    pass: &mut Pass,
    locator: &str,
  ) -> Result<String, CaseFailure> {
    if pass.fetched_any && !self.config.pacing.is_zero() {
      tokio::time::sleep(self.config.pacing).await;
    }
    pass.fetched_any = true;
    tracing::debug!(locator, "fetching document");
    self
      .source
      .fetch(locator)
      .await
      .map_err(|e| CaseFailure::new(FailureStage::Fetch, e))
  }

  fn preserve(
    &self,
    kind: DocumentKind,
    case_id: &CaseId,
    document: &str,
  ) -> Result<(), CaseFailure> {
    self
      .archive
      .preserve(kind, case_id.as_str(), self.today, document)
      .map_err(|e| CaseFailure::new(FailureStage::Archive, e))
  }
}

// ─── Commit ──────────────────────────────────────────────────────────────────

/// The single end-of-pass write: upsert active records, retire expired ones,
/// append the changelog, all in one store transaction. Active records absent
/// from the batch are untouched.
pub async fn commit<S: CaseStore>(
  store: &S,
  batch: PassBatch,
) -> Result<(), S::Error> {
  let PassBatch {
    active,
    expired,
    changelog,
  } = batch;

  tracing::info!(
    active = active.len(),
    expired = expired.len(),
    changelog = changelog.len(),
    "committing pass"
  );

  store.commit_pass(active, expired, changelog).await
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::Mutex,
  };

  use chrono::Duration;

  use super::*;
  use crate::{
    case::{Revocation, Status},
    changelog::NEW_CASE_MARKER,
    extract::CaseDraft,
    reconcile::MaterialField,
  };

  #[derive(Debug, thiserror::Error)]
  #[error("{0}")]
  struct FakeError(String);

  /// Serves canned documents and records every locator requested.
  #[derive(Default)]
  struct FakeSource {
    documents: HashMap<String, String>,
    requests:  Mutex<Vec<String>>,
  }

  impl FakeSource {
    fn with(mut self, locator: &str, document: &str) -> Self {
      self.documents.insert(locator.into(), document.into());
      self
    }

    fn requests(&self) -> Vec<String> { self.requests.lock().unwrap().clone() }
  }

  impl DocumentSource for FakeSource {
    type Error = FakeError;

    async fn fetch(&self, locator: &str) -> Result<String, FakeError> {
      self.requests.lock().unwrap().push(locator.to_owned());
      self
        .documents
        .get(locator)
        .cloned()
        .ok_or_else(|| FakeError(format!("404 for {locator}")))
    }
  }

  #[derive(Default)]
  struct FakeArchive {
    preserved: Mutex<Vec<(DocumentKind, String)>>,
  }

  impl DocumentArchive for FakeArchive {
    type Error = FakeError;

    fn preserve(
      &self,
      kind: DocumentKind,
      key: &str,
      _date: NaiveDate,
      _document: &str,
    ) -> Result<(), FakeError> {
      self.preserved.lock().unwrap().push((kind, key.to_owned()));
      Ok(())
    }
  }

  /// Reads `key: value` lines; `date` is the only required key.
  struct LineExtractor;

  fn fields(document: &str) -> HashMap<&str, &str> {
    document
      .lines()
      .filter_map(|l| l.split_once(':'))
      .map(|(k, v)| (k.trim(), v.trim()))
      .collect()
  }

  impl CaseExtractor for LineExtractor {
    type Error = FakeError;

    fn parse_case(
      &self,
      case_id: &CaseId,
      document: &str,
    ) -> Result<CaseDraft, FakeError> {
      let f = fields(document);
      let date = f
        .get("date")
        .ok_or_else(|| FakeError("missing date label".into()))?;
      Ok(CaseDraft {
        case_id:            case_id.clone(),
        dissertant_name:    f.get("name").copied().unwrap_or("?").into(),
        dissertation_title: "Title".into(),
        adviser:            "Adviser".into(),
        opponents:          "One, Two".into(),
        council_name:       "D 1".into(),
        submission_date:    (*date).into(),
        petition_filed:     f.get("petition") == Some(&"yes"),
        revocation_link:    f.get("revocation").map(|s| s.to_string()),
      })
    }

    fn parse_revocation(&self, document: &str) -> Revocation {
      let f = fields(document);
      let get = |k: &str| f.get(k).copied().unwrap_or_default().to_owned();
      Revocation {
        status:                get("status"),
        petition_date:         get("filed"),
        council_decision_code: get("code"),
        council_decision_text: get("text"),
      }
    }
  }

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 17).unwrap() }

  fn entry(id: &str) -> ListingEntry {
    ListingEntry {
      case_id: CaseId::new(id).unwrap(),
      locator: format!("/expertise/{id}.html"),
    }
  }

  fn stored(id: &str, status: Status, checked_days_ago: i64) -> CaseRecord {
    CaseRecord {
      case_id:            CaseId::new(id).unwrap(),
      dissertant_name:    format!("Dissertant {id}"),
      dissertation_title: "Title".into(),
      adviser:            "Adviser".into(),
      opponents:          "One, Two".into(),
      council_name:       "D 1".into(),
      submission_date:    "01.01.2024".into(),
      petition_filed:     status == Status::Current,
      status,
      revocation:         (status == Status::Current)
        .then(Revocation::default),
      last_checked:       today() - Duration::days(checked_days_ago),
    }
  }

  fn snapshot(records: Vec<CaseRecord>) -> StoreSnapshot {
    StoreSnapshot {
      active:  records
        .into_iter()
        .map(|r| (r.case_id.clone(), r))
        .collect(),
      expired: BTreeSet::new(),
    }
  }

  fn config(new_days: i64, current_days: i64) -> PassConfig {
    PassConfig {
      refresh: RefreshPolicy {
        refresh_new_days:     new_days,
        refresh_current_days: current_days,
      },
      ..PassConfig::default()
    }
  }

  async fn run(
    source: &FakeSource,
    archive: &FakeArchive,
    config: PassConfig,
    listing: &[ListingEntry],
    snapshot: &StoreSnapshot,
  ) -> PassOutcome {
    Pipeline::new(source, &LineExtractor, archive, config, today())
      .run(listing, snapshot)
      .await
  }

  #[tokio::test]
  async fn unseen_case_is_fetched_and_logged_as_new() {
    let source = FakeSource::default()
      .with("/expertise/a1.html", "name: Alpha\ndate: 01.01.2023");
    let archive = FakeArchive::default();

    let out = run(
      &source,
      &archive,
      config(30, 7),
      &[entry("a1")],
      &StoreSnapshot::default(),
    )
    .await;

    assert_eq!(out.batch.active.len(), 1);
    assert_eq!(out.batch.active[0].status, Status::New);
    assert_eq!(out.batch.changelog.len(), 1);
    assert_eq!(out.batch.changelog[0].changed_fields, vec![NEW_CASE_MARKER]);
    assert_eq!(
      archive.preserved.lock().unwrap().as_slice(),
      &[(DocumentKind::Case, "a1".to_owned())]
    );
  }

  #[tokio::test]
  async fn stale_new_case_with_petition_becomes_update() {
    let two_years_ago = today() - Duration::days(2 * 365);
    let doc = format!(
      "name: X\ndate: {}\npetition: yes\nrevocation: /rev/x42",
      two_years_ago.format("%d.%m.%Y")
    );
    let source = FakeSource::default()
      .with("/expertise/X42.html", &doc)
      .with("/rev/x42", "status: filed\nfiled: 01.09.2026\ncode: D 7");
    let archive = FakeArchive::default();
    let snap = snapshot(vec![stored("X42", Status::New, 40)]);

    let out = run(&source, &archive, config(30, 7), &[entry("X42")], &snap).await;

    assert_eq!(source.requests(), vec!["/expertise/X42.html", "/rev/x42"]);
    let record = &out.batch.active[0];
    assert_eq!(record.status, Status::Current);
    assert!(record.petition_filed);
    assert_eq!(record.last_checked, today());

    assert_eq!(out.batch.changelog.len(), 1);
    let entry = &out.batch.changelog[0];
    assert_eq!(entry.date, today());
    assert!(entry.changed_fields.contains(&"status".to_owned()));
    assert!(entry.changed_fields.contains(&"petition_filed".to_owned()));

    assert!(out.activity.entries().iter().any(|a| matches!(
      a,
      Activity::Updated { changed_fields, .. }
        if changed_fields.starts_with(&[MaterialField::Status, MaterialField::PetitionFiled])
    )));
    assert!(matches!(
      out.activity.entries().last(),
      Some(Activity::Summary { updates }) if updates.len() == 1
    ));
  }

  #[tokio::test]
  async fn final_ruling_is_reused_without_fetch() {
    let mut record = stored("r1", Status::Current, 1_000);
    record.revocation = Some(Revocation {
      council_decision_text: "Council decided: degree revoked".into(),
      ..Revocation::default()
    });
    let source = FakeSource::default();
    let archive = FakeArchive::default();
    let snap = snapshot(vec![record.clone()]);

    let out = run(&source, &archive, config(0, 0), &[entry("r1")], &snap).await;

    assert!(source.requests().is_empty());
    assert_eq!(out.batch.active, vec![record]);
    assert!(out.batch.changelog.is_empty());
    assert!(matches!(out.activity.entries()[1], Activity::FinalRuling { .. }));
  }

  #[tokio::test]
  async fn fresh_case_is_reused_without_fetch() {
    let record = stored("f1", Status::New, 3);
    let source = FakeSource::default();
    let archive = FakeArchive::default();
    let snap = snapshot(vec![record.clone()]);

    let out = run(&source, &archive, config(30, 7), &[entry("f1")], &snap).await;

    assert!(source.requests().is_empty());
    assert_eq!(out.batch.active, vec![record]);
    assert!(matches!(
      out.activity.entries()[1],
      Activity::Fresh { days_since_check: 3, .. }
    ));
  }

  #[tokio::test]
  async fn unchanged_case_keeps_stored_copy_verbatim() {
    let record = stored("u1", Status::New, 60);
    let source = FakeSource::default()
      .with("/expertise/u1.html", "name: Renamed\ndate: 01.01.2024");
    let archive = FakeArchive::default();
    let snap = snapshot(vec![record.clone()]);

    let out = run(&source, &archive, config(30, 7), &[entry("u1")], &snap).await;

    assert_eq!(source.requests().len(), 1);
    assert_eq!(out.batch.active, vec![record]);
    assert!(out.batch.changelog.is_empty());
  }

  #[tokio::test]
  async fn failures_do_not_abort_the_pass() {
    let source = FakeSource::default()
      .with("/expertise/bad.html", "name: no date here")
      .with("/expertise/baddate.html", "name: B\ndate: sometime")
      .with("/expertise/ok.html", "name: Ok\ndate: 01.01.2024");
    let archive = FakeArchive::default();
    let listing = [entry("missing"), entry("bad"), entry("baddate"), entry("ok")];

    let out = run(
      &source,
      &archive,
      config(30, 7),
      &listing,
      &StoreSnapshot::default(),
    )
    .await;

    let stages: Vec<_> = out
      .activity
      .failures()
      .map(|a| match a {
        Activity::Failed { stage, .. } => *stage,
        _ => unreachable!(),
      })
      .collect();
    assert_eq!(
      stages,
      vec![FailureStage::Fetch, FailureStage::Extract, FailureStage::Classify]
    );

    // The unparseable documents were still preserved.
    let preserved = archive.preserved.lock().unwrap().clone();
    assert_eq!(preserved.len(), 3);

    assert_eq!(out.batch.active.len(), 1);
    assert_eq!(out.batch.active[0].case_id.as_str(), "ok");
  }

  #[tokio::test]
  async fn expired_cases_never_reach_active_batch() {
    let source = FakeSource::default()
      .with("/expertise/old.html", "name: Old\ndate: 01.01.2001\npetition: yes")
      .with("/expertise/gone.html", "name: Gone\ndate: 01.01.2024");
    let archive = FakeArchive::default();
    let mut snap = snapshot(vec![stored("old", Status::New, 100)]);
    snap.expired.insert(CaseId::new("gone").unwrap());

    let out = run(
      &source,
      &archive,
      config(30, 7),
      &[entry("gone"), entry("old")],
      &snap,
    )
    .await;

    // Already-expired ids are dropped from the listing before processing.
    assert_eq!(source.requests(), vec!["/expertise/old.html"]);
    assert!(out.batch.active.is_empty());
    assert_eq!(out.batch.expired.len(), 1);
    assert_eq!(out.batch.expired[0].status, Status::Expired);
    assert!(out.batch.changelog.is_empty());
  }

  #[tokio::test]
  async fn unlisted_stored_cases_are_not_in_batch() {
    let source = FakeSource::default()
      .with("/expertise/n1.html", "name: N\ndate: 01.01.2024");
    let archive = FakeArchive::default();
    let snap = snapshot(vec![stored("elsewhere", Status::New, 100)]);

    let out = run(&source, &archive, config(30, 7), &[entry("n1")], &snap).await;

    assert_eq!(out.batch.active.len(), 1);
    assert_eq!(out.batch.active[0].case_id.as_str(), "n1");
  }

  #[tokio::test]
  async fn activity_follows_listing_order() {
    let source = FakeSource::default()
      .with("/expertise/b.html", "name: B\ndate: 01.01.2024");
    let archive = FakeArchive::default();
    let snap = snapshot(vec![stored("a", Status::New, 1)]);

    let out =
      run(&source, &archive, config(30, 7), &[entry("a"), entry("b")], &snap)
        .await;

    let kinds: Vec<&str> = out
      .activity
      .entries()
      .iter()
      .map(|a| match a {
        Activity::Checking { .. } => "checking",
        Activity::Fresh { .. } => "fresh",
        Activity::Discovered { .. } => "discovered",
        Activity::NewCase { .. } => "new",
        Activity::Summary { .. } => "summary",
        _ => "other",
      })
      .collect();
    assert_eq!(kinds, ["checking", "fresh", "discovered", "new", "summary"]);
  }

  #[tokio::test]
  async fn repeated_listing_entry_is_handled_once() {
    let source = FakeSource::default()
      .with("/expertise/x42.html", "name: X\ndate: 01.01.2024");
    let archive = FakeArchive::default();

    let out = run(
      &source,
      &archive,
      config(30, 7),
      &[entry("x42"), entry("x42")],
      &StoreSnapshot::default(),
    )
    .await;

    assert_eq!(source.requests().len(), 1);
    assert_eq!(out.batch.active.len(), 1);
    assert_eq!(out.batch.changelog.len(), 1);
  }

  #[tokio::test]
  async fn failed_revocation_fetch_drops_the_case() {
    let source = FakeSource::default().with(
      "/expertise/p1.html",
      "name: P\ndate: 01.01.2024\npetition: yes\nrevocation: /rev/p1",
    );
    let archive = FakeArchive::default();

    let out = run(
      &source,
      &archive,
      config(30, 7),
      &[entry("p1")],
      &StoreSnapshot::default(),
    )
    .await;

    assert_eq!(source.requests(), vec!["/expertise/p1.html", "/rev/p1"]);
    assert!(out.batch.is_empty());
    assert!(matches!(
      out.activity.failures().collect::<Vec<_>>().as_slice(),
      [Activity::Failed { stage: FailureStage::Fetch, .. }]
    ));
  }

  #[tokio::test(start_paused = true)]
  async fn consecutive_fetches_are_paced() {
    let source = FakeSource::default()
      .with("/expertise/a.html", "name: A\ndate: 01.01.2024")
      .with("/expertise/b.html", "name: B\ndate: 01.01.2024")
      .with("/expertise/c.html", "name: C\ndate: 01.01.2024");
    let archive = FakeArchive::default();
    let paced = PassConfig {
      pacing: std::time::Duration::from_secs(2),
      ..config(30, 7)
    };

    let started = tokio::time::Instant::now();
    let out = run(
      &source,
      &archive,
      paced,
      &[entry("a"), entry("b"), entry("c")],
      &StoreSnapshot::default(),
    )
    .await;

    // Three fetches, two pauses; no pause before the first.
    assert_eq!(out.batch.active.len(), 3);
    let elapsed = started.elapsed();
    assert!(elapsed >= std::time::Duration::from_secs(4));
    assert!(elapsed < std::time::Duration::from_secs(6));
  }
}
