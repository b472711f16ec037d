//! Interactive terminal host for a listing session.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use client_core::{
    mount_from_location, HttpListingTransport, ListingSession, ListingSnapshot, ListingView,
    MemoryHistory, SessionEvent, SessionHandle, TableRow,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::ListingResource,
    filter::{FilterField, PageNumber},
    protocol::{ListingPage, PaginationLink},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{debug, info};

use crate::config::Settings;

const HELP: &str = "\
commands:
  search <text>   type into the search box (alias: s); empty text clears it
  role <value>    pick a role; empty value clears it
  company <id>    pick a company; empty value clears it
  page <n>        follow the numbered pagination control
  next | prev     follow the Next / Previous control
  commit          re-issue the current filters
  show            print the current table
  help            this text
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseInput {
    Search(String),
    Role(String),
    Company(String),
    Page(PageNumber),
    Next,
    Previous,
    Commit,
    Show,
    Help,
    Quit,
}

/// Parses one line of user input. Blank lines yield `Ok(None)`.
pub fn parse_input(line: &str) -> Result<Option<BrowseInput>, String> {
    let line = line.trim_start();
    if line.trim().is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line.trim_end(), ""),
    };

    let input = match command.to_ascii_lowercase().as_str() {
        "search" | "s" => BrowseInput::Search(rest.to_string()),
        "role" => BrowseInput::Role(rest.to_string()),
        "company" => BrowseInput::Company(rest.to_string()),
        "page" | "p" => {
            let page = rest
                .parse::<u32>()
                .ok()
                .and_then(PageNumber::new)
                .ok_or_else(|| format!("'{rest}' is not a page number"))?;
            BrowseInput::Page(page)
        }
        "next" | "n" => BrowseInput::Next,
        "prev" | "previous" => BrowseInput::Previous,
        "commit" => BrowseInput::Commit,
        "show" | "ls" => BrowseInput::Show,
        "help" | "?" => BrowseInput::Help,
        "quit" | "exit" | "q" => BrowseInput::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(input))
}

/// Rejects a non-empty filter value the listing has no control for.
pub fn ensure_supported(resource: ListingResource, field: FilterField, value: &str) -> Result<()> {
    if !value.is_empty() && !resource.supports(field) {
        bail!(
            "the {resource} listing has no '{}' filter",
            field.query_key()
        );
    }
    Ok(())
}

/// Finds the rendered pagination control a navigation input refers to.
pub fn link_for<T>(page: &ListingPage<T>, input: &BrowseInput) -> Result<PaginationLink, String> {
    let link = match input {
        BrowseInput::Page(target) => page
            .link_to(*target)
            .ok_or_else(|| format!("page {target} is not offered by this listing"))?,
        BrowseInput::Next => page
            .link_labelled("Next")
            .ok_or_else(|| "this listing has no Next control".to_string())?,
        BrowseInput::Previous => page
            .link_labelled("Previous")
            .ok_or_else(|| "this listing has no Previous control".to_string())?,
        _ => return Err("not a pagination command".into()),
    };
    if !link.is_enabled() {
        return Err(format!("'{}' is disabled", link.display_label()));
    }
    Ok(link.clone())
}

pub fn render_snapshot<T: TableRow>(snapshot: &ListingSnapshot<T>) -> String {
    let view = ListingView::render(
        snapshot.page.as_ref(),
        &snapshot.canonical,
        snapshot.is_pending(),
    );
    let mut out = format!("?{}", snapshot.canonical.to_query());
    if snapshot.is_pending() {
        out.push_str(" (loading)");
    }
    out.push('\n');
    out.push_str(&view.to_text());
    out
}

pub async fn run<T>(resource: ListingResource, settings: &Settings) -> Result<()>
where
    T: DeserializeOwned + TableRow + Send + Sync + 'static,
{
    let transport = Arc::new(HttpListingTransport::for_resource(
        &settings.server_url,
        resource,
        settings.request_timeout(),
    )?);
    let location = transport.endpoint().clone();
    let controller =
        mount_from_location::<T, _>(transport.as_ref(), &location, settings.search_debounce())
            .await?;

    let (handle, session) = ListingSession::spawn(controller, transport, MemoryHistory::new(location));
    let printer = tokio::spawn(print_events(handle.clone()));
    print!("{}", render_snapshot(&handle.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let input = match parse_input(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match input {
            BrowseInput::Quit => break,
            BrowseInput::Help => println!("{HELP}"),
            BrowseInput::Show => print!("{}", render_snapshot(&handle.snapshot())),
            BrowseInput::Commit => handle.commit().await?,
            BrowseInput::Search(text) => handle.set_search(text).await?,
            BrowseInput::Role(value) => {
                match ensure_supported(resource, FilterField::Role, &value) {
                    Ok(()) => handle.set_role(value).await?,
                    Err(err) => eprintln!("{err}"),
                }
            }
            BrowseInput::Company(value) => {
                match ensure_supported(resource, FilterField::Company, &value) {
                    Ok(()) => handle.set_company(value).await?,
                    Err(err) => eprintln!("{err}"),
                }
            }
            BrowseInput::Page(_) | BrowseInput::Next | BrowseInput::Previous => {
                let snapshot = handle.snapshot();
                match link_for(snapshot.page.as_ref(), &input) {
                    Ok(link) => handle.go_to_page(link).await?,
                    Err(message) => eprintln!("{message}"),
                }
            }
        }
    }

    handle.shutdown().await?;
    let history = session.await.context("listing session task failed")?;
    printer.abort();
    info!(%resource, visits = history.len(), "browse finished");
    Ok(())
}

async fn print_events<T: TableRow>(handle: SessionHandle<T>) {
    let mut events = handle.subscribe();
    loop {
        match events.recv().await {
            Ok(SessionEvent::CommitIssued { seq, reason, query }) => {
                debug!(seq, reason = reason.as_str(), "commit issued");
                println!("loading ?{query}");
            }
            Ok(SessionEvent::ResponseApplied { .. }) => match handle.settled().await {
                Ok(snapshot) => print!("{}", render_snapshot(&snapshot)),
                Err(_) => break,
            },
            Ok(SessionEvent::StaleResponseDropped { seq, latest }) => {
                debug!(seq, latest, "stale listing response dropped");
            }
            Ok(SessionEvent::FetchFailed { message, .. }) => {
                eprintln!("request failed: {message}");
            }
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "event printer lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
#[path = "tests/browse_tests.rs"]
mod tests;
