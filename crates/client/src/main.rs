use std::fmt::Write;
use std::sync::Arc;

use advising_client::collaborators::{AuthState, QueryState, TracingNotifier};
use advising_client::search::search_documents;
use advising_client::{AdvisingService, FeedAction, FeedController, FeedSnapshot, FeedState};
use advising_core::config::ClientSettings;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "advising")]
#[command(about = "Browse drop-in advising sessions and advising documents", version)]
struct Args {
    /// Overrides ADVISING_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Overrides ADVISING_TOKEN.
    #[arg(long, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List drop-ins in a time window, grouped by day.
    Events {
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        #[arg(long, default_value = "")]
        filter: String,
        /// Weeks to move the window; negative goes back.
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        weeks: i64,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Show one drop-in.
    Event { id: i64 },
    /// Full-text search over advising documents.
    Search { query: String },
    Register { id: i64 },
    Unregister { id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    let settings = resolve_settings(ClientSettings::from_env().ok(), &args)?;
    let service = Arc::new(AdvisingService::new(&settings)?);

    match args.command {
        Command::Events {
            start,
            end,
            filter,
            weeks,
            page,
            page_size,
        } => {
            let mut state = FeedState::new(start.unwrap_or_else(Utc::now))
                .with_page_size(page_size.unwrap_or(settings.page_size));
            state.reduce(FeedAction::SetFilter(filter))?;
            if let Some(end) = end {
                state.reduce(FeedAction::SetEnd(end))?;
            }
            if let Some(page) = page {
                state.reduce(FeedAction::GotoPage(page))?;
            }

            let query = Arc::new(QueryState::new());
            let controller = feed_controller(service, &settings, query.clone(), state);
            controller.dispatch(FeedAction::ShiftWindow(weeks)).await?;

            print_feed(&controller.subscribe().borrow());
            let location: Vec<String> = query
                .snapshot()
                .into_iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            println!("\nlocation: ?{}", location.join("&"));
        }
        Command::Event { id } => {
            let event = service.get_event(id).await?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        Command::Search { query } => {
            let results = search_documents(&service, &query).await?;
            if results.documents.is_empty() {
                println!("No results for \"{}\"", results.query);
            }
            for hits in &results.documents {
                match &hits.document {
                    Some(doc) => println!("{} <{}>", doc.title, doc.link),
                    None => println!("Document {}", hits.document_id),
                }
                for section in &hits.sections {
                    println!("  - {}", section.title);
                }
            }
        }
        Command::Register { id } => {
            let controller = feed_controller(
                service,
                &settings,
                Arc::new(QueryState::new()),
                FeedState::new(Utc::now()),
            );
            controller.register(id).await?;
        }
        Command::Unregister { id } => {
            let controller = feed_controller(
                service,
                &settings,
                Arc::new(QueryState::new()),
                FeedState::new(Utc::now()),
            );
            controller.unregister(id).await?;
        }
    }

    Ok(())
}

fn resolve_settings(from_env: Option<ClientSettings>, args: &Args) -> anyhow::Result<ClientSettings> {
    let mut settings = match (from_env, &args.api_url) {
        (Some(settings), _) => settings,
        (None, Some(api_url)) => ClientSettings::new(api_url.clone()),
        (None, None) => anyhow::bail!("set ADVISING_API_URL or pass --api-url"),
    };
    if let Some(api_url) = &args.api_url {
        settings.api_url = api_url.trim_end_matches('/').to_string();
    }
    if let Some(token) = &args.token {
        settings.token = Some(token.clone());
    }
    Ok(settings)
}

fn feed_controller(
    service: Arc<AdvisingService>,
    settings: &ClientSettings,
    query: Arc<QueryState>,
    state: FeedState,
) -> FeedController {
    FeedController::new(
        service,
        Arc::new(AuthState::new(settings.is_authenticated())),
        query,
        Arc::new(TracingNotifier),
        state,
    )
}

fn print_feed(snapshot: &FeedSnapshot) {
    print!("{}", render_feed(snapshot, Utc::now()));
}

fn render_feed(snapshot: &FeedSnapshot, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    if let Some(message) = snapshot.message() {
        let _ = writeln!(out, "{message}");
        return out;
    }
    let groups = snapshot.grouped();
    if groups.is_empty() {
        let _ = writeln!(out, "No drop-ins in this window.");
    }
    for group in groups {
        let _ = writeln!(out, "{}", group.label);
        for event in group.items {
            let mut tags = Vec::new();
            if event.has_ended(now) {
                tags.push("ended".to_string());
            } else if event.is_ongoing(now) {
                tags.push("now".to_string());
            }
            if event.is_full() {
                tags.push("full".to_string());
            } else if let Some(n) = event.seats_remaining() {
                tags.push(format!("{n} seats left"));
            }
            if event.is_registered() {
                tags.push("registered".to_string());
            }
            let tags = if tags.is_empty() {
                String::new()
            } else {
                format!(" ({})", tags.join(", "))
            };
            let _ = writeln!(
                out,
                "  {}-{}  {} @ {}{}",
                event.start.format("%H:%M"),
                event.end.format("%H:%M"),
                event.name,
                event.location,
                tags
            );
        }
    }
    if let Some(page) = &snapshot.page {
        let _ = writeln!(
            out,
            "\npage {} of {} ({} total)",
            page.params.base.page + 1,
            page.page_count().max(1),
            page.length
        );
        let mut hints = Vec::new();
        if page.has_previous_page() {
            hints.push(format!("--page {} for the previous page", page.params.base.page - 1));
        }
        if page.has_next_page() {
            hints.push(format!("--page {} for the next page", page.params.base.page + 1));
        }
        if !hints.is_empty() {
            let _ = writeln!(out, "{}", hints.join(", "));
        }
    }
    out
}
