use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::aggregate::{Collections, Cursor, OutputLayout, UNSET_TRACKER};
use crate::ids::compare_ids;
use crate::model::IdSet;

#[derive(Debug)]
pub struct ResumedState {
    pub store: Collections,
    pub cursor: Cursor,
}

#[derive(Debug)]
pub enum PriorState {
    Loaded(ResumedState),
    Defaulted {
        state: ResumedState,
        reason: anyhow::Error,
    },
}

impl PriorState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn state(&self) -> &ResumedState {
        match self {
            Self::Loaded(state) | Self::Defaulted { state, .. } => state,
        }
    }

    pub fn into_state(self) -> ResumedState {
        match self {
            Self::Loaded(state) | Self::Defaulted { state, .. } => state,
        }
    }
}

pub fn load_prior_state(layout: &OutputLayout, page_start: u32, delimiter: &str) -> PriorState {
    match read_collections(layout) {
        Ok(store) => {
            let cursor = resume_cursor(&store, page_start, delimiter);
            info!(
                dir = %layout.dir.display(),
                page_start,
                chapter = %cursor.chapter,
                section = %cursor.section,
                "resuming from prior output"
            );
            PriorState::Loaded(ResumedState { store, cursor })
        }
        Err(reason) => {
            warn!(
                dir = %layout.dir.display(),
                reason = %format!("{reason:#}"),
                "prior output unavailable, starting from empty collections"
            );
            PriorState::Defaulted {
                state: ResumedState {
                    store: Collections::default(),
                    cursor: Cursor::default(),
                },
                reason,
            }
        }
    }
}

pub fn resume_cursor(store: &Collections, page_start: u32, delimiter: &str) -> Cursor {
    let page = store.pages.get(&page_start.to_string());

    let chapter = page
        .and_then(|page| first_id(&page.chapters, delimiter))
        .or_else(|| store.chapters.last_key_value().map(|(id, _)| id.clone()))
        .unwrap_or_else(|| UNSET_TRACKER.to_string());
    let section = page
        .and_then(|page| first_id(&page.sections, delimiter))
        .or_else(|| store.sections.last_key_value().map(|(id, _)| id.clone()))
        .unwrap_or_else(|| UNSET_TRACKER.to_string());

    Cursor { chapter, section }
}

fn first_id(ids: &IdSet, delimiter: &str) -> Option<String> {
    ids.iter()
        .min_by(|a, b| compare_ids(a, b, delimiter))
        .cloned()
}

fn read_collections(layout: &OutputLayout) -> Result<Collections> {
    Ok(Collections {
        languages: read_collection(&layout.path_for("languages"))?,
        verses: read_collection(&layout.path_for("verses"))?,
        pages: read_collection(&layout.path_for("pages"))?,
        chapters: read_collection(&layout.path_for("chapters"))?,
        sections: read_collection(&layout.path_for("sections"))?,
        explanations: read_collection(&layout.path_for("explanations"))?,
    })
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, T>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
