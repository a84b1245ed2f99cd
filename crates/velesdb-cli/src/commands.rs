//! Command implementations shared between the one-shot CLI subcommands and
//! the interactive REPL. Every function here takes an already-open
//! [`Database`] and returns a formatted string; it does not print or exit.

use anyhow::{anyhow, Context, Result};
use serde_json::Value as JsonValue;
use velesdb_core::{Condition, CollectionOptions, Database, Filter, Point, SearchRequest};

/// `info` / `list` — one line per open collection.
#[must_use]
pub fn list_collections(db: &Database) -> String {
    let names = db.list_collections();
    if names.is_empty() {
        return "No collections.".to_string();
    }
    let mut out = String::new();
    for name in names {
        if let Some(collection) = db.get_collection(&name) {
            let stats = collection.stats();
            out.push_str(&format!(
                "{name}  dims={}  metric={}  index={:?}  points={}\n",
                stats.dimensions, stats.metric, stats.index_kind, stats.vector_count
            ));
        }
    }
    out
}

/// `show <collection>` — a single collection's stats.
pub fn show_collection(db: &Database, name: &str) -> Result<String> {
    let collection = db
        .get_collection(name)
        .ok_or_else(|| anyhow!("collection '{name}' not found"))?;
    let stats = collection.stats();
    Ok(format!(
        "name: {name}\ndimensions: {}\nmetric: {}\nindex_kind: {:?}\nvector_count: {}\nstorage_bytes: {}\ncache: {:?}",
        stats.dimensions, stats.metric, stats.index_kind, stats.vector_count,
        stats.storage_bytes, stats.cache_stats,
    ))
}

/// `create <name> <dimension> [metric] [index_kind]`.
pub fn create_collection(
    db: &Database,
    name: &str,
    dimension: usize,
    metric: Option<&str>,
    index_kind: Option<&str>,
) -> Result<String> {
    let metric = metric
        .map(|m| m.to_lowercase().parse())
        .transpose()
        .map_err(|_| anyhow!("invalid metric"))?;
    let index_kind = index_kind
        .map(|k| k.to_lowercase().parse())
        .transpose()
        .map_err(|_| anyhow!("invalid index kind"))?;
    let options = CollectionOptions { dimensions: dimension, metric, index_kind };
    db.create_collection(name, options)
        .with_context(|| format!("failed to create collection '{name}'"))?;
    Ok(format!("created collection '{name}'"))
}

/// `drop <collection>`.
pub fn drop_collection(db: &Database, name: &str) -> Result<String> {
    db.drop_collection(name).with_context(|| format!("failed to drop collection '{name}'"))?;
    Ok(format!("dropped collection '{name}'"))
}

/// `insert <collection> <id> <vector-json> [metadata-json]`.
pub fn insert_point(
    db: &Database,
    collection: &str,
    id: &str,
    vector_json: &str,
    metadata_json: Option<&str>,
) -> Result<String> {
    let collection = db
        .get_collection(collection)
        .ok_or_else(|| anyhow!("collection '{collection}' not found"))?;
    let vector: Vec<f32> = serde_json::from_str(vector_json).context("vector must be a JSON array of numbers")?;
    let mut point = Point::new(id, vector);
    if let Some(raw) = metadata_json {
        let metadata: JsonValue = serde_json::from_str(raw).context("metadata must be valid JSON")?;
        point = point.with_metadata(metadata);
    }
    collection.insert(&point)?;
    Ok(format!("inserted '{id}' into '{}'", collection.name()))
}

/// `get <collection> <id>`.
pub fn get_point(db: &Database, collection: &str, id: &str) -> Result<String> {
    let collection = db
        .get_collection(collection)
        .ok_or_else(|| anyhow!("collection '{collection}' not found"))?;
    match collection.get(id)? {
        Some(point) => Ok(serde_json::to_string_pretty(&point)?),
        None => Ok(format!("'{id}' not found")),
    }
}

/// `delete <collection> <id>`.
pub fn delete_point(db: &Database, collection: &str, id: &str) -> Result<String> {
    let collection = db
        .get_collection(collection)
        .ok_or_else(|| anyhow!("collection '{collection}' not found"))?;
    if collection.delete(id)? {
        Ok(format!("deleted '{id}'"))
    } else {
        Ok(format!("'{id}' not found"))
    }
}

/// `search <collection> <vector-json> <k> [filter-json]`.
pub fn search(
    db: &Database,
    collection: &str,
    vector_json: &str,
    k: usize,
    filter_json: Option<&str>,
) -> Result<String> {
    let collection = db
        .get_collection(collection)
        .ok_or_else(|| anyhow!("collection '{collection}' not found"))?;
    let vector: Vec<f32> = serde_json::from_str(vector_json).context("vector must be a JSON array of numbers")?;
    let filter = filter_json
        .map(|raw| -> Result<Filter> {
            let condition: Condition = serde_json::from_str(raw).context("filter must be valid JSON")?;
            Ok(Filter::new(condition))
        })
        .transpose()?;

    let response = collection.search(&SearchRequest {
        vector: Some(vector),
        k,
        filter,
        with_metadata: true,
        ..SearchRequest::default()
    })?;

    let mut out = String::new();
    for hit in response.hits {
        out.push_str(&format!("{}\t{:.6}\t{}\n", hit.id, hit.score, hit.metadata.unwrap_or_default()));
    }
    Ok(out)
}
