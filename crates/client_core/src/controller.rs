//! Filter/pagination controller: draft edits, commits and response reconciliation.
//!
//! The controller is a plain state machine. It never sleeps and never does I/O;
//! callers pass the current instant in and dispatch the [`ListingRequest`]s it
//! hands back. [`crate::session::ListingSession`] is the async driver.

use std::{sync::Arc, time::Duration};

use shared::{
    filter::{FilterQuery, FilterState},
    protocol::{ListingPage, ListingResponse, PaginationLink},
};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::debounce::Debouncer;

/// Navigation flags attached to every controller commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitOptions {
    pub preserve_state: bool,
    pub replace: bool,
    pub preserve_scroll: bool,
}

impl VisitOptions {
    pub const LISTING: VisitOptions = VisitOptions {
        preserve_state: true,
        replace: true,
        preserve_scroll: true,
    };
}

impl Default for VisitOptions {
    fn default() -> Self {
        Self::LISTING
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitReason {
    Search,
    Role,
    Company,
    Page,
    Manual,
}

impl CommitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CommitReason::Search => "search",
            CommitReason::Role => "role",
            CommitReason::Company => "company",
            CommitReason::Page => "page",
            CommitReason::Manual => "manual",
        }
    }
}

/// One navigation/fetch request issued by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub seq: u64,
    pub filter: FilterState,
    pub reason: CommitReason,
    pub options: VisitOptions,
}

impl ListingRequest {
    pub fn query(&self) -> FilterQuery {
        self.filter.to_query()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Settled,
    Pending { seq: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    Applied,
    /// A newer commit was issued after this one; the response was dropped.
    Stale { latest: u64 },
}

pub struct ListingController<T> {
    draft: FilterState,
    committed: FilterState,
    canonical: FilterState,
    page: Arc<ListingPage<T>>,
    debouncer: Debouncer,
    last_seq: u64,
    status: CommitStatus,
}

impl<T> ListingController<T> {
    /// Mounts on an already hydrated payload. Nothing is fetched.
    pub fn new(initial: FilterState, page: ListingPage<T>, search_debounce: Duration) -> Self {
        Self {
            draft: initial.clone(),
            committed: initial.clone(),
            canonical: initial,
            page: Arc::new(page),
            debouncer: Debouncer::new(search_debounce),
            last_seq: 0,
            status: CommitStatus::Settled,
        }
    }

    pub fn draft(&self) -> &FilterState {
        &self.draft
    }

    /// Filter of the most recently issued commit.
    pub fn committed(&self) -> &FilterState {
        &self.committed
    }

    /// Filter last confirmed by the server.
    pub fn canonical(&self) -> &FilterState {
        &self.canonical
    }

    pub fn page(&self) -> Arc<ListingPage<T>> {
        Arc::clone(&self.page)
    }

    pub fn status(&self) -> CommitStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, CommitStatus::Pending { .. })
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn set_search_text(&mut self, value: impl Into<String>, now: Instant) {
        self.draft.search = value.into();
        self.debouncer.arm(now);
    }

    /// Commits the draft search once the debounce window has passed quietly.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<ListingRequest> {
        if !self.debouncer.fire(now) {
            return None;
        }
        if self.draft.search == self.committed.search {
            debug!(search = %self.draft.search, "search unchanged after debounce; skipping commit");
            return None;
        }
        let filter = self.draft.first_page();
        Some(self.issue(filter, CommitReason::Search))
    }

    pub fn set_role(&mut self, value: impl Into<String>) -> Option<ListingRequest> {
        self.draft.role = value.into();
        if self.draft.role == self.committed.role {
            return None;
        }
        let filter = self.draft.first_page();
        Some(self.issue(filter, CommitReason::Role))
    }

    pub fn set_company(&mut self, value: impl Into<String>) -> Option<ListingRequest> {
        self.draft.company_id = value.into();
        if self.draft.company_id == self.committed.company_id {
            return None;
        }
        let filter = self.draft.first_page();
        Some(self.issue(filter, CommitReason::Company))
    }

    /// Navigates to the link's page keeping the committed filters. Disabled links do nothing.
    pub fn go_to_page(&mut self, link: &PaginationLink) -> Option<ListingRequest> {
        let target = link.target_page?;
        let filter = self.committed.with_page(target);
        Some(self.issue(filter, CommitReason::Page))
    }

    /// Commits the draft exactly as it stands.
    pub fn commit(&mut self) -> ListingRequest {
        let filter = self.draft.clone();
        self.issue(filter, CommitReason::Manual)
    }

    fn issue(&mut self, filter: FilterState, reason: CommitReason) -> ListingRequest {
        self.last_seq += 1;
        let seq = self.last_seq;
        if filter.search == self.draft.search {
            self.debouncer.cancel();
        }
        self.committed = filter.clone();
        self.status = CommitStatus::Pending { seq };
        debug!(seq, reason = reason.as_str(), query = %filter.to_query(), "listing commit issued");
        ListingRequest {
            seq,
            filter,
            reason,
            options: VisitOptions::LISTING,
        }
    }

    pub fn apply_response(&mut self, seq: u64, response: ListingResponse<T>) -> ResponseOutcome {
        if seq != self.last_seq {
            warn!(seq, latest = self.last_seq, "dropping stale listing response");
            return ResponseOutcome::Stale {
                latest: self.last_seq,
            };
        }

        let canonical = response
            .filters
            .unwrap_or_else(|| self.committed.clone());
        if !canonical.same_filters(&self.committed) {
            debug!(
                seq,
                sent = %self.committed.to_query(),
                applied = %canonical.to_query(),
                "server normalized listing filters"
            );
        }
        self.page = Arc::new(response.page);

        self.committed = canonical.clone();
        self.canonical = canonical;
        self.resync_draft();
        self.status = CommitStatus::Settled;
        debug!(seq, items = self.page.items.len(), "listing response applied");
        ResponseOutcome::Applied
    }

    /// Transport failure for `seq`. Canonical state and page are untouched; committed
    /// and draft fall back to the canonical filter so the same edit can be retried.
    pub fn fail(&mut self, seq: u64) {
        if seq != self.last_seq {
            return;
        }
        self.committed = self.canonical.clone();
        self.resync_draft();
        self.status = CommitStatus::Settled;
    }

    /// Search text is left alone while a debounce is pending.
    fn resync_draft(&mut self) {
        self.draft.role = self.canonical.role.clone();
        self.draft.company_id = self.canonical.company_id.clone();
        self.draft.page = self.canonical.page;
        if !self.debouncer.is_armed() {
            self.draft.search = self.canonical.search.clone();
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
