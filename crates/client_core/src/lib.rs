use std::time::Duration;

use anyhow::{Context, Result};
use shared::filter::FilterState;
use tracing::info;
use url::Url;

pub mod controller;
pub mod debounce;
pub mod navigation;
pub mod session;
pub mod transport;
pub mod view;

pub use controller::{
    CommitReason, CommitStatus, ListingController, ListingRequest, ResponseOutcome, VisitOptions,
};
pub use debounce::{Debouncer, DEFAULT_SEARCH_DEBOUNCE};
pub use navigation::{MemoryHistory, NavigationBoundary};
pub use session::{
    ListingSession, ListingSnapshot, SessionCommand, SessionError, SessionEvent, SessionHandle,
};
pub use transport::{HttpListingTransport, ListingTransport, DEFAULT_REQUEST_TIMEOUT};
pub use view::{Cell, ListingView, PaginationControl, TableRow};

/// Performs the hosting page's first render for `location` and mounts a controller on it.
///
/// This is the only fetch outside a commit; the controller itself never loads on mount.
pub async fn mount_from_location<T, Tr>(
    transport: &Tr,
    location: &Url,
    search_debounce: Duration,
) -> Result<ListingController<T>>
where
    Tr: ListingTransport<T> + ?Sized,
{
    let requested = FilterState::from_url(location);
    let response = transport
        .fetch(&requested)
        .await
        .with_context(|| format!("failed to load initial listing for {location}"))?;

    let initial = response.filters.clone().unwrap_or(requested);
    info!(
        %location,
        items = response.page.items.len(),
        query = %initial.to_query(),
        "listing mounted"
    );
    Ok(ListingController::new(initial, response.page, search_debounce))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
