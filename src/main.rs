use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use driver_messages::api::ApiClient;
use driver_messages::app::AppState;
use driver_messages::messages::{BroadcastComposer, MessageStore, MessagesSession, Navigator, Notifier};
use driver_messages::storage::{self, SnapshotCache};
use driver_messages::{Conversation, RemoteApi, UserId};
use log::{debug, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "driver-messages", version, about = "Message your passengers from the terminal")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    driver: Option<String>,
    #[arg(long, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List conversations
    List {
        /// Show the last cached list without contacting the server
        #[arg(long)]
        offline: bool,
    },
    /// Open a conversation
    Show { conversation: String },
    /// Message one passenger (the first conversation unless told otherwise)
    Send {
        #[arg(long, conflicts_with = "to")]
        conversation: Option<String>,
        /// Passenger id, bypassing the conversation list
        #[arg(long)]
        to: Option<String>,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Message every passenger on your current rides
    Broadcast {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print or save the effective configuration
    Config {
        #[arg(long)]
        save: bool,
    },
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        eprintln!("✓ {message}");
    }

    fn failure(&self, message: &str) {
        eprintln!("✗ {message}");
    }
}

struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn conversation_selected(&self, conversation: &Conversation) {
        println!("── {} · Passenger", conversation.counterparty.name);
    }
}

fn print_row(conversation: &Conversation, is_active: bool, is_unread: bool) {
    let marker = if is_active { '>' } else { ' ' };
    let dot = if is_unread { '•' } else { ' ' };
    let glyph = conversation.counterparty.avatar_glyph().unwrap_or('?');
    println!(
        "{marker} [{glyph}] {:<20} {:<40} {dot}  ({})",
        conversation.counterparty.name, conversation.last_message, conversation.id
    );
}

fn settings(cli: &Cli) -> anyhow::Result<AppState> {
    let mut state = match &cli.config {
        Some(path) => AppState::load_from(path),
        None => AppState::load(),
    }
    .context("loading configuration")?;
    if let Some(url) = &cli.base_url {
        state.base_url = url.clone();
    }
    if let Some(driver) = &cli.driver {
        state.driver_id = Some(driver.clone());
    }
    if let Some(token) = &cli.token {
        state.token = Some(token.clone());
    }
    Ok(state)
}

fn open_cache(state: &AppState) -> anyhow::Result<SnapshotCache> {
    let path = state
        .cache_path
        .clone()
        .or_else(storage::default_db_path)
        .context("no data directory for the conversation cache")?;
    Ok(SnapshotCache::open(&path)?)
}

fn remember(state: &AppState, driver: &UserId, snapshot: &[Conversation]) {
    let result = open_cache(state).and_then(|mut cache| Ok(cache.replace(driver, snapshot)?));
    if let Err(e) = result {
        warn!("Could not update conversation cache: {e:#}");
    }
}

async fn print_cached(state: &AppState, driver: UserId, api: Arc<dyn RemoteApi>) -> anyhow::Result<()> {
    let cached = open_cache(state)?.conversations(&driver)?;
    if cached.is_empty() {
        println!("No cached conversations.");
    }
    let session = MessagesSession::with_store(
        driver,
        api,
        Arc::new(ConsoleNotifier),
        Arc::new(ConsoleNavigator),
        MessageStore::with_snapshot(cached.clone())?,
    );
    session.selector().reconcile(&cached).await;
    for row in session.rows().await {
        print_row(&row.conversation, row.is_active, row.is_unread);
    }
    Ok(())
}

// Coordinators already told the user what went wrong.
fn exit_code(result: driver_messages::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn find_conversation(session: &MessagesSession, wanted: &str) -> anyhow::Result<Conversation> {
    match session.store().snapshot().await.into_iter().find(|c| c.id.to_string() == wanted) {
        Some(found) => Ok(found),
        None => bail!("no conversation {wanted}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let state = settings(&cli)?;

    if let Command::Config { save } = &cli.command {
        if *save {
            match &cli.config {
                Some(path) => state.save_to(path)?,
                None => state.save()?,
            }
        }
        print!("{}", toml::to_string_pretty(&state)?);
        return Ok(ExitCode::SUCCESS);
    }

    let driver = state.driver()?;
    let base_url = state.base_url()?;
    let api: Arc<dyn RemoteApi> = Arc::new(ApiClient::new(&base_url, state.token.clone(), state.request_timeout())?);

    if let Command::List { offline: true } = &cli.command {
        print_cached(&state, driver, api).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let session = MessagesSession::new(driver.clone(), api.clone(), Arc::new(ConsoleNotifier), Arc::new(ConsoleNavigator));
    // Not fatal: broadcasts and direct sends do not need the list.
    let loaded = match session.refresh().await {
        Ok(snapshot) => {
            remember(&state, &driver, &snapshot);
            true
        }
        Err(e) => {
            warn!("Conversation list unavailable: {e}");
            false
        }
    };

    let code = match cli.command {
        Command::List { .. } if !loaded => {
            print_cached(&state, driver, api).await?;
            ExitCode::SUCCESS
        }
        Command::List { .. } => {
            let rows = session.rows().await;
            if rows.is_empty() {
                println!("No conversations yet.");
            }
            for row in rows {
                print_row(&row.conversation, row.is_active, row.is_unread);
            }
            ExitCode::SUCCESS
        }
        Command::Show { conversation } => {
            let found = find_conversation(&session, &conversation).await?;
            let code = exit_code(session.select(Some(&found.id)).await.map(|_| ()));
            println!("{}", found.last_message);
            code
        }
        Command::Send { conversation, to, text } => {
            let text = text.join(" ");
            let result = if let Some(to) = to {
                session.send(&UserId::from(to.as_str()), &text).await
            } else {
                if let Some(wanted) = conversation {
                    let found = find_conversation(&session, &wanted).await?;
                    if let Err(e) = session.select(Some(&found.id)).await {
                        return Ok(exit_code(Err(e)));
                    }
                }
                session.send_to_active(&text).await
            };
            if result.is_ok() {
                let latest = session.store().snapshot().await;
                if !latest.is_empty() {
                    remember(&state, &driver, &latest);
                }
            }
            exit_code(result)
        }
        Command::Broadcast { text } => {
            let mut composer = BroadcastComposer::new();
            composer.open()?;
            composer.edit(text.join(" "))?;
            exit_code(session.submit_broadcast(&mut composer).await)
        }
        Command::Config { .. } => ExitCode::SUCCESS,
    };
    Ok(code)
}
