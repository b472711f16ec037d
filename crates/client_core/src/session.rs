//! Async driver for a [`ListingController`].
//!
//! One task owns the controller and multiplexes UI commands, fetch completions and
//! the search debounce deadline. Fetches run as their own tasks and report back by
//! commit sequence; there is no request cancellation, the controller drops stale
//! responses instead.

use std::sync::Arc;

use anyhow::Result;
use shared::{
    filter::FilterState,
    protocol::{ListingPage, ListingResponse, PaginationLink},
};
use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, info, warn};

use crate::{
    controller::{CommitReason, CommitStatus, ListingController, ListingRequest, ResponseOutcome},
    navigation::NavigationBoundary,
    transport::ListingTransport,
};

const COMMAND_QUEUE_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    SetSearch(String),
    SetRole(String),
    SetCompany(String),
    GoToPage(PaginationLink),
    Commit,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    CommitIssued {
        seq: u64,
        reason: CommitReason,
        query: String,
    },
    ResponseApplied {
        seq: u64,
    },
    StaleResponseDropped {
        seq: u64,
        latest: u64,
    },
    FetchFailed {
        seq: u64,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("listing session has shut down")]
    Closed,
}

/// Fully formed view of the controller published after every transition.
pub struct ListingSnapshot<T> {
    pub draft: FilterState,
    pub committed: FilterState,
    pub canonical: FilterState,
    pub page: Arc<ListingPage<T>>,
    pub status: CommitStatus,
}

impl<T> ListingSnapshot<T> {
    fn of(controller: &ListingController<T>) -> Self {
        Self {
            draft: controller.draft().clone(),
            committed: controller.committed().clone(),
            canonical: controller.canonical().clone(),
            page: controller.page(),
            status: controller.status(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, CommitStatus::Pending { .. })
    }
}

impl<T> Clone for ListingSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            draft: self.draft.clone(),
            committed: self.committed.clone(),
            canonical: self.canonical.clone(),
            page: Arc::clone(&self.page),
            status: self.status,
        }
    }
}

pub struct SessionHandle<T> {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<ListingSnapshot<T>>,
    events: broadcast::Sender<SessionEvent>,
}

impl<T> Clone for SessionHandle<T> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            snapshots: self.snapshots.clone(),
            events: self.events.clone(),
        }
    }
}

impl<T> SessionHandle<T> {
    pub async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    pub async fn set_search(&self, value: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::SetSearch(value.into())).await
    }

    pub async fn set_role(&self, value: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::SetRole(value.into())).await
    }

    pub async fn set_company(&self, value: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::SetCompany(value.into())).await
    }

    pub async fn go_to_page(&self, link: PaginationLink) -> Result<(), SessionError> {
        self.send(SessionCommand::GoToPage(link)).await
    }

    pub async fn commit(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Commit).await
    }

    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }

    pub fn snapshot(&self) -> ListingSnapshot<T> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Waits until a published snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&ListingSnapshot<T>) -> bool,
    ) -> Result<ListingSnapshot<T>, SessionError> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Waits for the current commit, if any, to settle.
    pub async fn settled(&self) -> Result<ListingSnapshot<T>, SessionError> {
        self.wait_for(|snapshot| !snapshot.is_pending()).await
    }
}

type Completion<T> = (u64, Result<ListingResponse<T>>);

pub struct ListingSession<T, Tr, N> {
    controller: ListingController<T>,
    transport: Arc<Tr>,
    navigator: N,
    snapshots: watch::Sender<ListingSnapshot<T>>,
    events: broadcast::Sender<SessionEvent>,
}

impl<T, Tr, N> ListingSession<T, Tr, N>
where
    T: Send + Sync + 'static,
    Tr: ListingTransport<T> + 'static,
    N: NavigationBoundary + 'static,
{
    /// Starts the session task. The join handle yields the navigator back on shutdown.
    pub fn spawn(
        controller: ListingController<T>,
        transport: Arc<Tr>,
        navigator: N,
    ) -> (SessionHandle<T>, JoinHandle<N>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(ListingSnapshot::of(&controller));
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let session = Self {
            controller,
            transport,
            navigator,
            snapshots: snapshot_tx,
            events: event_tx.clone(),
        };
        let task = tokio::spawn(session.run(command_rx));

        (
            SessionHandle {
                commands: command_tx,
                snapshots: snapshot_rx,
                events: event_tx,
            },
            task,
        )
    }

    async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) -> N {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion<T>>();
        info!(location = %self.navigator.location(), "listing session started");

        loop {
            let deadline = self.controller.next_deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(SessionCommand::Shutdown) => break,
                    Some(command) => self.handle(command, &done_tx),
                },
                Some((seq, result)) = done_rx.recv() => self.settle(seq, result),
                _ = sleep_until(deadline) => {
                    if let Some(request) = self.controller.poll_debounce(Instant::now()) {
                        self.dispatch(request, &done_tx);
                    }
                }
            }
            self.snapshots
                .send_replace(ListingSnapshot::of(&self.controller));
        }

        debug!("listing session stopped");
        self.navigator
    }

    fn handle(&mut self, command: SessionCommand, done: &mpsc::UnboundedSender<Completion<T>>) {
        let request = match command {
            SessionCommand::SetSearch(value) => {
                self.controller.set_search_text(value, Instant::now());
                None
            }
            SessionCommand::SetRole(value) => self.controller.set_role(value),
            SessionCommand::SetCompany(value) => self.controller.set_company(value),
            SessionCommand::GoToPage(link) => {
                let request = self.controller.go_to_page(&link);
                if request.is_none() {
                    debug!(label = %link.label, "ignoring disabled pagination link");
                }
                request
            }
            SessionCommand::Commit => Some(self.controller.commit()),
            SessionCommand::Shutdown => None,
        };

        if let Some(request) = request {
            self.dispatch(request, done);
        }
    }

    fn dispatch(&mut self, request: ListingRequest, done: &mpsc::UnboundedSender<Completion<T>>) {
        let query = request.query();
        let url = query.apply_to(self.navigator.location());
        self.navigator.visit(url, request.options);

        let _ = self.events.send(SessionEvent::CommitIssued {
            seq: request.seq,
            reason: request.reason,
            query: query.to_query_string(),
        });

        let transport = Arc::clone(&self.transport);
        let done = done.clone();
        let ListingRequest { seq, filter, .. } = request;
        tokio::spawn(async move {
            let result = transport.fetch(&filter).await;
            let _ = done.send((seq, result));
        });
    }

    fn settle(&mut self, seq: u64, result: Result<ListingResponse<T>>) {
        let event = match result {
            Ok(response) => match self.controller.apply_response(seq, response) {
                ResponseOutcome::Applied => SessionEvent::ResponseApplied { seq },
                ResponseOutcome::Stale { latest } => {
                    SessionEvent::StaleResponseDropped { seq, latest }
                }
            },
            Err(err) => {
                let message = format!("{err:#}");
                warn!(seq, error = %message, "listing fetch failed");
                self.controller.fail(seq);
                SessionEvent::FetchFailed { seq, message }
            }
        };
        let _ = self.events.send(event);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
