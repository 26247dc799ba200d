//! Incremental pagination over a [`QueryService`].
//!
//! [`PaginationController`] owns the accumulated result set for the active
//! filter criteria. Applying new criteria starts a new *epoch*: records are
//! cleared, page 1 is requested, and any response still in flight for an
//! older epoch is dropped when it arrives. Further pages are appended by
//! [`fetch_next_page`](PaginationController::fetch_next_page), which never
//! has more than one request outstanding.
//!
//! State sits behind one async lock that is never held across a service
//! call, so all methods take `&self` and the controller can be shared.

use serde::Serialize;
use tokio::sync::Mutex;
use userdir_core::filter::FilterCriteria;

use crate::error::ClientError;
use crate::service::QueryService;

// ---------------------------------------------------------------------------
// Outcomes and phases
// ---------------------------------------------------------------------------

/// What a fetch call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page 1 replaced the result set.
    Loaded { count: usize },
    /// The next page was appended.
    Appended { added: usize },
    /// No request was made.
    Skipped(SkipReason),
    /// The next page failed; accumulated records are untouched.
    SoftFailed,
    /// The response belonged to an older epoch and was dropped.
    Discarded,
}

/// Why [`PaginationController::fetch_next_page`] made no request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyLoadingMore,
    InitialLoading,
    InitialFailed,
    NotLoaded,
    Exhausted,
}

/// Lifecycle of the controller.
///
/// ```text
/// Idle -> LoadingInitial -> Ready <-> LoadingMore
///              |   ^
///              v   | retry
///         ErrorInitial
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    Idle,
    LoadingInitial,
    Ready,
    LoadingMore,
    ErrorInitial,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Read-only copy of the accumulated state handed to presentation.
#[derive(Debug, Clone)]
pub struct DirectorySnapshot<R> {
    /// Accumulated records in arrival order.
    pub records: Vec<R>,
    pub total_matching: u64,
    /// Last page merged into `records` (1-based).
    pub current_page: u32,
    pub is_loading_initial: bool,
    pub is_loading_more: bool,
    /// Failure of the initial load; presentation offers a retry.
    pub last_error: Option<ClientError>,
    /// Failure of the latest incremental fetch.
    pub soft_error: Option<ClientError>,
    /// Filter generation these records belong to.
    pub epoch: u64,
    pub criteria: FilterCriteria,
    /// Page 1 for the current epoch has arrived.
    pub initial_loaded: bool,
}

impl<R> Default for DirectorySnapshot<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total_matching: 0,
            current_page: 1,
            is_loading_initial: false,
            is_loading_more: false,
            last_error: None,
            soft_error: None,
            epoch: 0,
            criteria: FilterCriteria::default(),
            initial_loaded: false,
        }
    }
}

impl<R> DirectorySnapshot<R> {
    pub fn phase(&self) -> ControllerPhase {
        if self.is_loading_initial {
            ControllerPhase::LoadingInitial
        } else if self.last_error.is_some() {
            ControllerPhase::ErrorInitial
        } else if !self.initial_loaded {
            ControllerPhase::Idle
        } else if self.is_loading_more {
            ControllerPhase::LoadingMore
        } else {
            ControllerPhase::Ready
        }
    }

    /// Every matching record has been loaded.
    pub fn is_exhausted(&self) -> bool {
        self.records.len() as u64 >= self.total_matching
    }

    fn skip_reason(&self) -> Option<SkipReason> {
        if self.is_loading_more {
            Some(SkipReason::AlreadyLoadingMore)
        } else if self.is_loading_initial {
            Some(SkipReason::InitialLoading)
        } else if self.last_error.is_some() {
            Some(SkipReason::InitialFailed)
        } else if !self.initial_loaded {
            Some(SkipReason::NotLoaded)
        } else if self.is_exhausted() {
            Some(SkipReason::Exhausted)
        } else {
            None
        }
    }

    /// Keep `records.len() <= total_matching` even if a service misreports.
    fn clamp_to_total(&mut self) {
        let total = usize::try_from(self.total_matching).unwrap_or(usize::MAX);
        if self.records.len() > total {
            tracing::warn!(
                loaded = self.records.len(),
                total = self.total_matching,
                "Service returned more records than its total, truncating",
            );
            self.records.truncate(total);
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Accumulates pages of `Q::Record` for the active filter criteria.
pub struct PaginationController<Q: QueryService> {
    service: Q,
    state: Mutex<DirectorySnapshot<Q::Record>>,
}

impl<Q: QueryService> PaginationController<Q> {
    /// A controller in the `Idle` phase. Nothing is fetched until
    /// [`apply_filters`](Self::apply_filters) is called.
    pub fn new(service: Q) -> Self {
        Self {
            service,
            state: Mutex::new(DirectorySnapshot::default()),
        }
    }

    pub fn service(&self) -> &Q {
        &self.service
    }

    /// Clone of the current state.
    pub async fn snapshot(&self) -> DirectorySnapshot<Q::Record> {
        self.state.lock().await.clone()
    }

    pub async fn phase(&self) -> ControllerPhase {
        self.state.lock().await.phase()
    }

    /// Replace the criteria, reset accumulation and load page 1.
    ///
    /// Invalid criteria are rejected before any state changes. A transport
    /// failure is recorded in `last_error` and returned. If newer criteria
    /// were applied while this request was in flight, the response is
    /// dropped and `Discarded` is returned.
    pub async fn apply_filters(
        &self,
        criteria: FilterCriteria,
    ) -> Result<FetchOutcome, ClientError> {
        criteria.validate()?;

        let epoch = {
            let mut state = self.state.lock().await;
            state.epoch += 1;
            state.criteria = criteria.clone();
            state.records.clear();
            state.total_matching = 0;
            state.current_page = 1;
            state.is_loading_initial = true;
            state.is_loading_more = false;
            state.last_error = None;
            state.soft_error = None;
            state.initial_loaded = false;
            state.epoch
        };
        tracing::debug!(epoch, search = %criteria.search, "Applying filters");

        let result = self.service.query(&criteria, 1).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            tracing::debug!(epoch, current = state.epoch, "Discarding stale initial page");
            return Ok(FetchOutcome::Discarded);
        }
        state.is_loading_initial = false;

        match result {
            Ok(page) => {
                state.records = page.records;
                state.total_matching = page.total_matching;
                state.current_page = 1;
                state.initial_loaded = true;
                state.clamp_to_total();
                let count = state.records.len();
                tracing::debug!(epoch, count, total = state.total_matching, "Initial page loaded");
                Ok(FetchOutcome::Loaded { count })
            }
            Err(e) => {
                tracing::warn!(epoch, error = %e, "Initial page failed");
                state.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Append the next page if one is needed and none is in flight.
    ///
    /// Failures are soft: they are kept in `soft_error` and the
    /// accumulated records stay as they were.
    pub async fn fetch_next_page(&self) -> FetchOutcome {
        let (epoch, criteria, page) = {
            let mut state = self.state.lock().await;
            if let Some(reason) = state.skip_reason() {
                tracing::trace!(?reason, "Next page not needed");
                return FetchOutcome::Skipped(reason);
            }
            state.is_loading_more = true;
            state.soft_error = None;
            (state.epoch, state.criteria.clone(), state.current_page + 1)
        };
        tracing::debug!(epoch, page, "Fetching next page");

        let result = self.service.query(&criteria, page).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            tracing::debug!(epoch, page, current = state.epoch, "Discarding stale page");
            return FetchOutcome::Discarded;
        }
        state.is_loading_more = false;

        match result {
            Ok(result_page) => {
                let before = state.records.len();
                state.total_matching = result_page.total_matching;
                state.records.extend(result_page.records);
                state.current_page = page;
                state.clamp_to_total();
                let added = state.records.len().saturating_sub(before);
                tracing::debug!(epoch, page, added, total = state.total_matching, "Page appended");
                FetchOutcome::Appended { added }
            }
            Err(e) => {
                tracing::warn!(epoch, page, error = %e, "Next page failed");
                state.soft_error = Some(e);
                FetchOutcome::SoftFailed
            }
        }
    }

    /// Re-apply the current criteria after a failed initial load.
    pub async fn retry_initial_load(&self) -> Result<FetchOutcome, ClientError> {
        let criteria = self.state.lock().await.criteria.clone();
        tracing::info!("Retrying initial load");
        self.apply_filters(criteria).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_flags() {
        let mut snap: DirectorySnapshot<()> = DirectorySnapshot::default();
        assert_eq!(snap.phase(), ControllerPhase::Idle);

        snap.is_loading_initial = true;
        assert_eq!(snap.phase(), ControllerPhase::LoadingInitial);

        snap.is_loading_initial = false;
        snap.last_error = Some(ClientError::Transport("down".into()));
        assert_eq!(snap.phase(), ControllerPhase::ErrorInitial);

        snap.last_error = None;
        snap.initial_loaded = true;
        assert_eq!(snap.phase(), ControllerPhase::Ready);

        snap.is_loading_more = true;
        assert_eq!(snap.phase(), ControllerPhase::LoadingMore);
    }

    #[test]
    fn skip_reason_prefers_in_flight_work() {
        let mut snap: DirectorySnapshot<()> = DirectorySnapshot::default();
        assert_eq!(snap.skip_reason(), Some(SkipReason::NotLoaded));

        snap.initial_loaded = true;
        snap.total_matching = 0;
        assert_eq!(snap.skip_reason(), Some(SkipReason::Exhausted));

        snap.total_matching = 10;
        assert_eq!(snap.skip_reason(), None);

        snap.is_loading_more = true;
        assert_eq!(snap.skip_reason(), Some(SkipReason::AlreadyLoadingMore));
    }

    #[test]
    fn clamp_truncates_to_total() {
        let mut snap = DirectorySnapshot {
            records: vec![1, 2, 3, 4],
            total_matching: 2,
            ..DirectorySnapshot::default()
        };
        snap.clamp_to_total();
        assert_eq!(snap.records, vec![1, 2]);
    }
}
