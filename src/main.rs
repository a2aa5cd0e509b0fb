//! Tripvoice CLI entry point.
//!
//! Provides `trip` and `expense` for one-shot parsing, `listen` for feeding
//! transcript events over stdin, and `serve` for the HTTP service.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use tripvoice::config::Config;
use tripvoice::extractors::{parse_expense_query_intent, parse_trip_intent};
use tripvoice::form::TripForm;
use tripvoice::transcript::{Accepted, ListeningSession, TranscriptEvent};

/// Tripvoice: voice-driven trip planning and expense queries.
#[derive(Parser)]
#[command(name = "tripvoice", version, about)]
struct Cli {
    /// Config file; defaults to `~/.tripvoice/config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Parse a trip-planning utterance and print the intent as JSON.
    Trip {
        /// Utterance text.
        text: String,
        /// Date relative phrases resolve against (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Trip length assumed when a start date is named without a duration.
        #[arg(long)]
        default_duration: Option<u32>,
    },
    /// Parse an expense question and print the intent as JSON.
    Expense {
        /// Utterance text.
        text: String,
        /// Date relative phrases resolve against (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Read transcript events from stdin and print the trip form after each final.
    Listen {
        /// Date relative phrases resolve against (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Run the HTTP parser service.
    Serve {
        /// Listen address, overriding the config file.
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Trip {
            text,
            today,
            default_duration,
        } => {
            tripvoice::logging::init_cli(&config.logging.level);
            let days = default_duration.unwrap_or(config.parser.default_duration_days);
            print_json(&parse_trip_intent(&text, resolve_today(today), days))
        }
        Command::Expense { text, today } => {
            tripvoice::logging::init_cli(&config.logging.level);
            print_json(&parse_expense_query_intent(&text, resolve_today(today)))
        }
        Command::Listen { today } => {
            tripvoice::logging::init_cli(&config.logging.level);
            handle_listen(&config, resolve_today(today)).await
        }
        Command::Serve { addr } => handle_serve(config, addr).await,
    }
}

fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize result")?;
    println!("{json}");
    Ok(())
}

/// One stdin line of the `listen` protocol.
enum ListenLine {
    Start,
    Stop,
    Event(TranscriptEvent),
}

fn parse_listen_line(line: &str) -> Option<ListenLine> {
    let line = line.trim();
    match line {
        "start" => return Some(ListenLine::Start),
        "stop" => return Some(ListenLine::Stop),
        "cancel" => return Some(ListenLine::Event(TranscriptEvent::Cancelled)),
        _ => {}
    }
    let (kind, text) = line.split_once(':')?;
    let text = text.trim().to_owned();
    match kind.trim() {
        "interim" => Some(ListenLine::Event(TranscriptEvent::Interim(text))),
        "final" => Some(ListenLine::Event(TranscriptEvent::Final(text))),
        _ => None,
    }
}

/// Drive a listening session from stdin until EOF.
async fn handle_listen(config: &Config, today: NaiveDate) -> anyhow::Result<()> {
    let mut session = ListeningSession::new();
    let mut form = TripForm::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(parsed) = parse_listen_line(&line) else {
            warn!(line = %line, "unrecognised transcript line");
            continue;
        };

        let outcome = match parsed {
            ListenLine::Start => session.start().map(|generation| {
                debug!(generation, "session started");
            }),
            ListenLine::Stop => session.stop(),
            ListenLine::Event(event) => match session.accept(event) {
                Ok(Accepted::Interim(text)) => {
                    debug!(text = %text, "interim transcript");
                    Ok(())
                }
                Ok(Accepted::Final(transcript)) => {
                    if session.is_current(&transcript) {
                        let intent = parse_trip_intent(
                            &transcript.text,
                            today,
                            config.parser.default_duration_days,
                        );
                        info!(
                            generation = transcript.generation,
                            confidence = %intent.confidence,
                            "final transcript parsed"
                        );
                        form.apply(&intent);
                        print_json(&form)?;
                    }
                    Ok(())
                }
                Ok(Accepted::Cancelled) => Ok(()),
                Err(e) => Err(e),
            },
        };

        if let Err(e) = outcome {
            warn!(error = %e, line = %line, "transcript line ignored");
        }
    }

    Ok(())
}

/// Run the HTTP service with production logging.
async fn handle_serve(mut config: Config, addr: Option<String>) -> anyhow::Result<()> {
    if let Some(addr) = addr {
        config.server.addr = addr;
    }
    let logs_dir = config.logs_dir()?;
    let _logging_guard = tripvoice::logging::init_production(&logs_dir, &config.logging.level)?;

    info!(
        logs = %logs_dir.display(),
        default_duration_days = config.parser.default_duration_days,
        "tripvoice service starting"
    );
    tripvoice::server::serve(&config).await
}
