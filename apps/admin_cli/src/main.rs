use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{mount_from_location, HttpListingTransport, ListingView, TableRow};
use serde::de::DeserializeOwned;
use shared::{
    domain::{
        CompanySummary, InventoryItemSummary, ListingResource, MaintenanceReportSummary,
        StoreSummary, UserSummary,
    },
    filter::{FilterField, FilterState, PageNumber},
};
use tracing_subscriber::EnvFilter;

mod browse;
mod config;

use browse::ensure_supported;
use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "hydro-admin", about = "Browse admin listings from the terminal")]
struct Cli {
    /// Config file; `admin.toml` in the working directory is read when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one page and print it.
    List {
        resource: ListingResource,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        role: String,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Interactive filter and pagination session.
    Browse { resource: ListingResource },
}

impl Command {
    fn resource(&self) -> ListingResource {
        match self {
            Command::List { resource, .. } | Command::Browse { resource } => *resource,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }

    match cli.command.resource() {
        ListingResource::Users => run::<UserSummary>(cli.command, &settings).await,
        ListingResource::Companies => run::<CompanySummary>(cli.command, &settings).await,
        ListingResource::Stores => run::<StoreSummary>(cli.command, &settings).await,
        ListingResource::Inventory => run::<InventoryItemSummary>(cli.command, &settings).await,
        ListingResource::MaintenanceReports => {
            run::<MaintenanceReportSummary>(cli.command, &settings).await
        }
    }
}

async fn run<T>(command: Command, settings: &Settings) -> Result<()>
where
    T: DeserializeOwned + TableRow + Send + Sync + 'static,
{
    match command {
        Command::List {
            resource,
            search,
            role,
            company,
            page,
            json,
        } => {
            let filter = FilterState {
                search,
                role,
                company_id: company,
                page: page.and_then(PageNumber::new).unwrap_or(PageNumber::FIRST),
            };
            list::<T>(resource, filter, json, settings).await
        }
        Command::Browse { resource } => browse::run::<T>(resource, settings).await,
    }
}

async fn list<T>(
    resource: ListingResource,
    filter: FilterState,
    json: bool,
    settings: &Settings,
) -> Result<()>
where
    T: DeserializeOwned + TableRow + Send + Sync + 'static,
{
    for field in [FilterField::Search, FilterField::Role, FilterField::Company] {
        ensure_supported(resource, field, &filter.get(field))?;
    }

    let transport = HttpListingTransport::for_resource(
        &settings.server_url,
        resource,
        settings.request_timeout(),
    )?;
    let location = transport.request_url(&filter);
    let controller =
        mount_from_location::<T, _>(&transport, &location, settings.search_debounce()).await?;

    let view = ListingView::render(
        controller.page().as_ref(),
        controller.canonical(),
        controller.is_pending(),
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.to_text());
    }
    Ok(())
}
