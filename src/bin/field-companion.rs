use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use field_companion::chat;
use field_companion::config::load_config;
use field_companion::geo::{format_coords, RouteSummary};
use field_companion::llm::FallbackChain;
use field_companion::notes::{save_note_and_clear_draft, search_notes_ranked, NoteInput};
use field_companion::persist::{BoundedLocalStore, PersistOutcome};
use field_companion::scripture::BibleVersion;
use field_companion::state::{now_ms, ChatMode};
use field_companion::store::{open_store, DeviceStore};
use field_companion::telemetry::init_tracing;

#[derive(Parser)]
#[command(author, version, about = "Field companion: chat, notes and route history")]
struct Cli {
    /// TOML config file; `FIELD_COMPANION__*` variables override it
    #[arg(long, env = "FIELD_COMPANION_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what is stored
    Status,
    /// Ask a question and store the answer in chat history
    Ask { question: String },
    #[command(subcommand)]
    Note(NoteCommand),
    #[command(subcommand)]
    Notes(NotesCommand),
    /// Summarise the tracked meta-mode route
    Route,
    /// Change the stored Bible version or chat display mode
    Settings {
        /// nwt, kjv, asv or eth
        #[arg(long)]
        bible_version: Option<String>,
        /// ai or scripture
        #[arg(long)]
        chat_mode: Option<String>,
    },
    /// Apply routine trimming and save
    Trim,
}

#[derive(Subcommand)]
enum NoteCommand {
    /// Add a note
    Add {
        #[arg(long, default_value = "")]
        person: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long, default_value = "")]
        followup: String,
    },
}

#[derive(Subcommand)]
enum NotesCommand {
    /// Ranked search over person, content and tags
    Search { query: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(&cfg.log_level)?;

    let store = BoundedLocalStore::with_limits(
        open_store(&cfg.store)?,
        cfg.trim.routine,
        cfg.trim.emergency,
    );
    let mut snapshot = store.restore();

    match cli.command {
        Commands::Status => {
            println!("chat turns:        {}", snapshot.chat_history.len());
            println!("notes:             {}", snapshot.notes.len());
            println!("meta suggestions:  {}", snapshot.meta_suggestions.len());
            println!("location samples:  {}", snapshot.meta_location_history.len());
            println!(
                "teleprompter:      {} chars",
                snapshot.teleprompter_content.chars().count()
            );
            println!("bible version:     {}", snapshot.bible_version.display_name());
            println!("chat mode:         {}", snapshot.chat_mode.tag());
            return Ok(());
        }
        Commands::Ask { question } => {
            let chain = FallbackChain::from_config(&cfg);
            let turn = chat::ask(&mut snapshot, &chain, &question)?;
            println!(
                "{}",
                chat::display_turn(&turn, snapshot.chat_mode, snapshot.bible_version)
            );
            if !turn.ai_sources.is_empty() {
                println!("\nSources: {}", turn.ai_sources.join(", "));
            }
        }
        Commands::Note(NoteCommand::Add {
            person,
            content,
            tags,
            followup,
        }) => {
            let input = NoteInput {
                person,
                content,
                tags,
                followup,
                ..NoteInput::default()
            };
            let id = save_note_and_clear_draft(&mut snapshot, &store, None, &input, now_ms())?;
            println!("saved note {id}");
        }
        Commands::Notes(NotesCommand::Search { query }) => {
            let hits = search_notes_ranked(&snapshot.notes, &query);
            if hits.is_empty() {
                println!("no notes match \"{query}\"");
            }
            for note in hits {
                println!("{}  {}  [{}]", note.datetime, note.person, note.tags.join(", "));
                println!("    {}", note.content.lines().next().unwrap_or_default());
            }
            return Ok(());
        }
        Commands::Route => {
            match RouteSummary::from_samples(&snapshot.meta_location_history) {
                Some(route) => {
                    println!("{}", route.stats_line());
                    println!("duration: {} minutes", route.duration_minutes);
                    println!("start:    {}", format_coords(route.start.0, route.start.1));
                    println!("end:      {}", format_coords(route.end.0, route.end.1));
                }
                None => println!("no route tracked"),
            }
            return Ok(());
        }
        Commands::Settings {
            bible_version,
            chat_mode,
        } => {
            if let Some(tag) = bible_version {
                let version = BibleVersion::from_tag(&tag)
                    .ok_or_else(|| anyhow!("unknown bible version: {tag}"))?;
                chat::set_bible_version(&mut snapshot, version);
            }
            if let Some(tag) = chat_mode {
                let mode =
                    ChatMode::from_tag(&tag).ok_or_else(|| anyhow!("unknown chat mode: {tag}"))?;
                chat::set_chat_mode(&mut snapshot, mode);
            }
            println!(
                "{} • {}",
                snapshot.bible_version.display_name(),
                snapshot.chat_mode.tag()
            );
        }
        Commands::Trim => {}
    }

    save(&store, &mut snapshot)
}

fn save<S: DeviceStore>(
    store: &BoundedLocalStore<S>,
    snapshot: &mut field_companion::state::Snapshot,
) -> Result<()> {
    match store.persist(snapshot) {
        PersistOutcome::Saved { bytes, trimmed } => {
            info!(bytes, removed = trimmed.total(), "state saved");
            Ok(())
        }
        PersistOutcome::SavedAfterEmergencyTrim {
            bytes, emergency, ..
        } => {
            println!(
                "storage was full; dropped {} older entries to make room",
                emergency.total()
            );
            info!(bytes, "state saved after emergency trim");
            Ok(())
        }
        PersistOutcome::Failed { reason } => bail!("could not save state: {reason}"),
    }
}
