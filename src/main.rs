use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};
use watchlist_builder::config::Configuration;
use watchlist_builder::http::HttpClient;
use watchlist_builder::models::{DraftEntry, Genre, Platform, WatchlistEntry};
use watchlist_builder::suggest::SuggestionSettings;
use watchlist_builder::{Notice, TmdbClient, WatchlistApp, WatchlistStore};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

const HELP: &str = "\
commands:
  title <text>                                  type into the title field
  add <title> | <platform> | <genre> | <link>   submit an entry
  list                                          show the watchlist
  delete <n>                                    ask to delete entry n
  confirm | cancel                              answer the pending delete
  quit";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting watchlist-builder v{}", env!("CARGO_PKG_VERSION"));

    let config = Configuration::from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    let http_client = HttpClient::new(config.request_timeout())?;
    let lookup = Arc::new(TmdbClient::new(http_client, config.tmdb.clone()));
    let store = Arc::new(WatchlistStore::new());
    let app = WatchlistApp::new(
        store,
        lookup,
        SuggestionSettings {
            debounce: config.debounce_delay(),
            max_results: config.max_suggestions(),
        },
    );

    let printers = [
        tokio::spawn(print_suggestions(app.suggestions())),
        tokio::spawn(print_notices(app.notices())),
    ];

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => {}
            "title" => app.on_title_input(rest),
            "add" => match parse_draft(rest) {
                Ok(draft) => {
                    if let Err(e) = app.on_submit(draft).await {
                        println!("{}", e);
                    }
                }
                Err(e) => println!("{}", e),
            },
            "list" => print_list(
                &app.store().snapshot(),
                app.pending_delete_position(),
                config.tmdb.image_base_url(),
            ),
            "delete" => match rest.trim().parse::<usize>() {
                Ok(n) if n > 0 => match app.on_delete_requested(n - 1) {
                    Ok(pending) => println!("{} (confirm/cancel)", pending.prompt()),
                    Err(e) => println!("{}", e),
                },
                _ => println!("usage: delete <n>, counting from 1"),
            },
            "confirm" => {
                if let Err(e) = app.on_confirm() {
                    println!("{}", e);
                }
            }
            "cancel" => app.on_cancel(),
            "quit" | "exit" => break,
            _ => println!("{}", HELP),
        }
    }

    app.teardown();
    for printer in printers {
        printer.abort();
    }
    Ok(())
}

// Fields the user leaves out stay empty so validation can report them.
fn parse_draft(input: &str) -> Result<DraftEntry> {
    let mut fields = input.split('|').map(str::trim);
    let title = fields.next().unwrap_or_default();
    let platform = match fields.next().filter(|s| !s.is_empty()) {
        Some(s) => Some(s.parse::<Platform>()?),
        None => None,
    };
    let genre = match fields.next().filter(|s| !s.is_empty()) {
        Some(s) => Some(s.parse::<Genre>()?),
        None => None,
    };
    let link = fields.next().unwrap_or_default();

    Ok(DraftEntry {
        title: title.to_string(),
        platform,
        genre,
        link: link.to_string(),
    })
}

fn print_list(entries: &[WatchlistEntry], pending: Option<usize>, image_base_url: &str) {
    if entries.is_empty() {
        println!("The watchlist is empty.");
        return;
    }

    for (i, entry) in entries.iter().enumerate() {
        let marker = if pending == Some(i) { "  [delete?]" } else { "" };
        println!("{}. {} <{}>{}", i + 1, entry.title, entry.href(), marker);
        println!("   Platform: {}  Genre: {}", entry.platform, entry.genre);
        if let Some(stars) = entry.stars() {
            println!("   Rating: {:.1}/5", stars);
        }
        if let Some(cast) = entry.cast_line() {
            println!("   Cast: {}", cast);
        }
        if let Some(poster) = entry.poster_url(image_base_url) {
            println!("   Poster: {}", poster);
        }
    }
}

async fn print_suggestions(mut rx: watch::Receiver<Vec<String>>) {
    while rx.changed().await.is_ok() {
        let suggestions = rx.borrow_and_update().clone();
        if suggestions.is_empty() {
            debug!("Suggestion list cleared");
        } else {
            println!("suggestions: {}", suggestions.join(" / "));
        }
    }
}

async fn print_notices(mut rx: broadcast::Receiver<Notice>) {
    loop {
        match rx.recv().await {
            Ok(notice) => println!("{}", notice),
            Err(broadcast::error::RecvError::Lagged(n)) => debug!("Missed {} notices", n),
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
