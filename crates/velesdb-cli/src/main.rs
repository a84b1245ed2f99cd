//! `VelesDB` CLI — interactive REPL and one-shot commands over a local database.
//!
//! Usage:
//!   `velesdb repl ./data`
//!   `velesdb create ./data docs 3 cosine flat`
//!   `velesdb search ./data docs '[1.0,0.0,0.0]' 5`

mod commands;
mod repl;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use velesdb_core::Database;

/// VelesDB CLI — high-performance embedded vector database.
#[derive(Parser)]
#[command(name = "velesdb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive REPL.
    Repl {
        /// Path to the database directory.
        #[arg(default_value = "./data")]
        path: PathBuf,
    },
    /// List open collections.
    List {
        /// Path to the database directory.
        path: PathBuf,
    },
    /// Show a single collection's stats.
    Show {
        /// Path to the database directory.
        path: PathBuf,
        /// Collection name.
        collection: String,
    },
    /// Create a collection.
    Create {
        /// Path to the database directory.
        path: PathBuf,
        /// Collection name.
        name: String,
        /// Vector dimensionality.
        dimension: usize,
        /// Distance metric: cosine, euclidean, dot, manhattan.
        metric: Option<String>,
        /// Index kind: flat, hnsw.
        index_kind: Option<String>,
    },
    /// Drop a collection.
    Drop {
        /// Path to the database directory.
        path: PathBuf,
        /// Collection name.
        collection: String,
    },
    /// Insert or overwrite a point.
    Insert {
        /// Path to the database directory.
        path: PathBuf,
        /// Collection name.
        collection: String,
        /// Point id.
        id: String,
        /// Embedding, as a JSON array of numbers.
        vector: String,
        /// Metadata, as a JSON object.
        metadata: Option<String>,
    },
    /// Fetch a point by id.
    Get {
        /// Path to the database directory.
        path: PathBuf,
        /// Collection name.
        collection: String,
        /// Point id.
        id: String,
    },
    /// Delete a point by id.
    Delete {
        /// Path to the database directory.
        path: PathBuf,
        /// Collection name.
        collection: String,
        /// Point id.
        id: String,
    },
    /// Search for the nearest points to a query vector.
    Search {
        /// Path to the database directory.
        path: PathBuf,
        /// Collection name.
        collection: String,
        /// Query embedding, as a JSON array of numbers.
        vector: String,
        /// Number of results to return.
        #[arg(default_value = "10")]
        k: usize,
        /// Metadata filter, as JSON.
        filter: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Repl { path } => repl::run(path)?,
        Commands::List { path } => {
            let db = Database::open(&path)?;
            println!("{}", commands::list_collections(&db));
        }
        Commands::Show { path, collection } => {
            let db = Database::open(&path)?;
            println!("{}", commands::show_collection(&db, &collection)?);
        }
        Commands::Create { path, name, dimension, metric, index_kind } => {
            let db = Database::open(&path)?;
            println!(
                "{}",
                commands::create_collection(&db, &name, dimension, metric.as_deref(), index_kind.as_deref())?
            );
        }
        Commands::Drop { path, collection } => {
            let db = Database::open(&path)?;
            println!("{}", commands::drop_collection(&db, &collection)?);
        }
        Commands::Insert { path, collection, id, vector, metadata } => {
            let db = Database::open(&path)?;
            println!(
                "{}",
                commands::insert_point(&db, &collection, &id, &vector, metadata.as_deref())?
            );
        }
        Commands::Get { path, collection, id } => {
            let db = Database::open(&path)?;
            println!("{}", commands::get_point(&db, &collection, &id)?);
        }
        Commands::Delete { path, collection, id } => {
            let db = Database::open(&path)?;
            println!("{}", commands::delete_point(&db, &collection, &id)?);
        }
        Commands::Search { path, collection, vector, k, filter } => {
            let db = Database::open(&path)?;
            print!("{}", commands::search(&db, &collection, &vector, k, filter.as_deref())?);
        }
    }

    Ok(())
}
