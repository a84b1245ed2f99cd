//! Interactive read-eval-print loop over a single open [`Database`].
//!
//! Lines are either a dot-command (`.help`, `.use`, `.quit`) or a verb
//! followed by arguments (`create docs 3`, `search docs [1.0,0.0] 5`).
//! Arguments containing spaces (JSON vectors, metadata) are passed whole as
//! the last token by convention, not re-split.

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use velesdb_core::Database;

use crate::commands;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Starts the REPL against the database at `path`, creating it if absent.
pub fn run(path: PathBuf) -> Result<()> {
    println!("VelesDB v{VERSION} — type .help for commands, .quit to exit");
    println!("database: {}", path.display());

    let db = Database::open(&path).context("failed to open database")?;
    let mut active: Option<String> = None;

    let mut editor = DefaultEditor::new()?;
    let history_path = path.join(".velesdb_history");
    let _ = editor.load_history(&history_path);

    loop {
        let prompt = match &active {
            Some(name) => format!("velesdb[{name}]> "),
            None => "velesdb> ".to_string(),
        };
        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                if line == ".quit" || line == ".exit" {
                    break;
                }
                match dispatch(&db, line, &mut active) {
                    Ok(Some(output)) => println!("{output}"),
                    Ok(None) => (),
                    Err(e) => println!("error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => println!("use .quit to exit"),
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                println!("error: {e}");
                break;
            }
        }
    }

    let _ = editor.save_history(&history_path);
    Ok(())
}

/// Runs one line, returning printable output or `None` for commands that
/// only mutate REPL state (e.g. `.use`).
fn dispatch(db: &Database, line: &str, active: &mut Option<String>) -> Result<Option<String>> {
    if let Some(rest) = line.strip_prefix(".use ") {
        *active = Some(rest.trim().to_string());
        return Ok(None);
    }
    if line == ".help" {
        return Ok(Some(HELP.to_string()));
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();

    let output = match verb {
        "list" => commands::list_collections(db),
        "show" => commands::show_collection(db, rest)?,
        "create" => {
            let mut args = rest.split_whitespace();
            let name = args.next().context("usage: create <name> <dimension> [metric] [index_kind]")?;
            let dimension: usize = args.next().context("missing dimension")?.parse()?;
            commands::create_collection(db, name, dimension, args.next(), args.next())?
        }
        "drop" => commands::drop_collection(db, rest)?,
        "insert" => {
            let (name, rest) = collection_or_active(rest, active)?;
            let mut args = rest.splitn(3, char::is_whitespace);
            let id = args.next().context("usage: insert [<collection>] <id> <vector> [metadata]")?;
            let vector = args.next().context("missing vector")?;
            commands::insert_point(db, &name, id, vector, args.next())?
        }
        "get" => {
            let (name, rest) = collection_or_active(rest, active)?;
            commands::get_point(db, &name, rest.trim())?
        }
        "delete" => {
            let (name, rest) = collection_or_active(rest, active)?;
            commands::delete_point(db, &name, rest.trim())?
        }
        "search" => {
            let (name, rest) = collection_or_active(rest, active)?;
            let mut args = rest.splitn(3, char::is_whitespace);
            let vector = args.next().context("usage: search [<collection>] <vector> <k> [filter]")?;
            let k: usize = args.next().context("missing k")?.parse()?;
            commands::search(db, &name, vector, k, args.next())?
        }
        other => anyhow::bail!("unknown command '{other}', try .help"),
    };
    Ok(Some(output))
}

/// If `active` is set, `rest` is taken whole as the remaining argument and
/// the active collection name is used. Otherwise the first token of `rest`
/// is the collection name.
fn collection_or_active<'a>(rest: &'a str, active: &Option<String>) -> Result<(String, &'a str)> {
    if let Some(name) = active {
        return Ok((name.clone(), rest));
    }
    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().context("no active collection; pass one explicitly or run .use <name>")?;
    Ok((name.to_string(), parts.next().unwrap_or_default()))
}

const HELP: &str = "\
.use <name>                          set the active collection
.quit / .exit                        leave the REPL
list                                 list open collections
show <collection>                    show a collection's stats
create <name> <dim> [metric] [kind]  create a collection
drop <collection>                    drop a collection
insert [<coll>] <id> <vec> [meta]    insert a point
get [<coll>] <id>                    fetch a point
delete [<coll>] <id>                 delete a point
search [<coll>] <vec> <k> [filter]   search for nearest points";
