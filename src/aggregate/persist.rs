use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::aggregate::{Collections, OutputLayout};
use crate::ids::compare_ids;
use crate::util::{ensure_directory, write_json_indented};

pub fn persist(
    layout: &OutputLayout,
    store: &Collections,
    delimiter: &str,
    indent: usize,
) -> Result<Vec<PathBuf>> {
    ensure_directory(&layout.dir)?;

    let documents = [
        ("languages", stored_collection(&store.languages, delimiter)?),
        ("verses", stored_collection(&store.verses, delimiter)?),
        ("pages", stored_collection(&store.pages, delimiter)?),
        ("chapters", stored_collection(&store.chapters, delimiter)?),
        ("sections", stored_collection(&store.sections, delimiter)?),
        (
            "explanations",
            stored_collection(&store.explanations, delimiter)?,
        ),
    ];

    let mut written = Vec::with_capacity(documents.len());
    for (collection, document) in documents {
        let path = layout.path_for(collection);
        write_json_indented(&path, &document, indent)?;
        written.push(path);
    }

    let counts = store.counts();
    info!(
        dir = %layout.dir.display(),
        pages = counts.pages,
        verses = counts.verses,
        chapters = counts.chapters,
        sections = counts.sections,
        explanations = counts.explanations,
        "persisted collections"
    );

    Ok(written)
}

fn stored_collection<T: Serialize>(
    records: &BTreeMap<String, T>,
    delimiter: &str,
) -> Result<Value> {
    let mut document = serde_json::to_value(records).context("failed to serialize collection")?;

    if let Value::Object(entries) = &mut document {
        for record in entries.values_mut() {
            let Value::Object(fields) = record else {
                continue;
            };
            for field in fields.values_mut() {
                if let Value::Array(items) = field {
                    items.sort_by(|a, b| {
                        compare_ids(
                            a.as_str().unwrap_or_default(),
                            b.as_str().unwrap_or_default(),
                            delimiter,
                        )
                    });
                }
            }
        }
    }

    Ok(document)
}
