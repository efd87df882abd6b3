//! Terminal client over the StickyNote store.
//!
//! # Responsibility
//! - Map one subcommand to one store operation.
//! - Keep output line-oriented so it stays scriptable.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stickynote_core::storage::encode_notes;
use stickynote_core::{
    init_logging_from_config, Note, NoteColor, NoteId, NotePatch, NoteStore, SqliteSlotStorage,
    StoreConfig,
};

#[derive(Debug, Parser)]
#[command(name = "stickynote", version, about = "Color-tagged local notes")]
struct Cli {
    /// Storage file; overrides STICKYNOTE_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Slot key inside the storage file; overrides STICKYNOTE_STORAGE_KEY.
    #[arg(long, global = true)]
    key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List notes, pinned first then most recently updated.
    List {
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Create a note, optionally filling title and content.
    New {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Change fields of an existing note.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, conflicts_with = "unpin")]
        pin: bool,
        #[arg(long)]
        unpin: bool,
        #[arg(long)]
        color: Option<NoteColor>,
    },
    /// Copy a note under a new id.
    Duplicate { id: String },
    /// Remove a note.
    Delete { id: String },
    /// Print one note in full.
    Show { id: String },
    /// Print the raw persisted JSON array.
    Export,
    /// Print note counts.
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    let storage = SqliteSlotStorage::open(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    let mut store = NoteStore::load(storage, config.storage_key.clone());
    log::info!("event=cli_command module=cli status=start");

    run(&mut store, cli.command)?;
    if let Some(err) = store.last_persist_error() {
        bail!("changes were not saved: {err}");
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = StoreConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(key) = &cli.key {
        config.storage_key = key.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(store: &mut NoteStore<SqliteSlotStorage>, command: Command) -> Result<()> {
    match command {
        Command::List { search } => {
            store.set_search_term(search.unwrap_or_default());
            for card in store.cards() {
                println!(
                    "{} {:<6} {} {}  {}",
                    if card.pinned { "*" } else { " " },
                    card.color,
                    card.updated_at,
                    card.id,
                    card.display_title
                );
            }
        }
        Command::New { title, content } => {
            let id = store.create();
            let patch = NotePatch {
                title,
                content,
                ..NotePatch::default()
            };
            if !patch.is_empty() {
                store.update(&id, patch);
            }
            println!("{id}");
        }
        Command::Edit {
            id,
            title,
            content,
            pin,
            unpin,
            color,
        } => {
            let id = NoteId::from(id);
            let patch = NotePatch {
                title,
                content,
                pinned: pin_flag(pin, unpin),
                color,
            };
            if patch.is_empty() {
                bail!("nothing to change; pass --title, --content, --pin, --unpin or --color");
            }
            let note = store
                .update(&id, patch)
                .with_context(|| format!("note not found: {id}"))?;
            print_note(note);
        }
        Command::Duplicate { id } => {
            let id = NoteId::from(id);
            let copy = store
                .duplicate(&id)
                .with_context(|| format!("note not found: {id}"))?;
            println!("{copy}");
        }
        Command::Delete { id } => {
            let id = NoteId::from(id);
            if !store.delete(&id) {
                bail!("note not found: {id}");
            }
        }
        Command::Show { id } => {
            let id = NoteId::from(id);
            if !store.select(&id) {
                bail!("note not found: {id}");
            }
            if let Some(note) = store.active_note() {
                print_note(note);
            }
        }
        Command::Export => {
            println!("{}", encode_notes(store.notes())?);
        }
        Command::Stats => {
            let summary = store.summary();
            println!("total={} pinned={}", summary.total, summary.pinned);
        }
    }
    Ok(())
}

fn pin_flag(pin: bool, unpin: bool) -> Option<bool> {
    match (pin, unpin) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn print_note(note: &Note) {
    println!("id:      {}", note.id);
    println!("title:   {}", note.title);
    println!("color:   {}", note.color);
    println!("pinned:  {}", note.pinned);
    println!("created: {}", note.created_at);
    println!("updated: {}", note.updated_at);
    println!();
    println!("{}", note.content);
}

#[cfg(test)]
mod tests {
    use super::{pin_flag, Cli, Command};
    use clap::Parser;
    use stickynote_core::NoteColor;

    #[test]
    fn pin_flags_map_to_patch_values() {
        assert_eq!(pin_flag(true, false), Some(true));
        assert_eq!(pin_flag(false, true), Some(false));
        assert_eq!(pin_flag(false, false), None);
    }

    #[test]
    fn edit_parses_color_and_global_db_flag() {
        let cli = Cli::try_parse_from([
            "stickynote",
            "edit",
            "abc",
            "--color",
            "pink",
            "--db",
            "/tmp/notes.sqlite3",
        ])
        .unwrap();
        assert!(cli.db.is_some());
        match cli.command {
            Command::Edit { id, color, .. } => {
                assert_eq!(id, "abc");
                assert_eq!(color, Some(NoteColor::Pink));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn pin_and_unpin_conflict() {
        assert!(Cli::try_parse_from(["stickynote", "edit", "abc", "--pin", "--unpin"]).is_err());
    }
}
