use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::{info, warn};

use crate::aggregate::{COLLECTION_NAMES, OutputLayout, PriorState, load_prior_state};
use crate::cli::StatusArgs;
use crate::util::{sha256_file, system_time_utc_string};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub entries: usize,
    pub sha256: String,
    pub modified_at: Option<String>,
}

pub fn run(args: StatusArgs) -> Result<()> {
    let layout = OutputLayout::new(&args.output_dir, &args.file_prefix);

    info!(
        output_dir = %layout.dir.display(),
        file_prefix = %layout.file_prefix,
        "status requested"
    );

    for collection in COLLECTION_NAMES {
        let path = layout.path_for(collection);
        match inspect_file(&path) {
            Ok(Some(summary)) => info!(
                collection,
                path = %path.display(),
                entries = summary.entries,
                sha256 = %summary.sha256,
                modified_at = %summary.modified_at.unwrap_or_default(),
                "collection file"
            ),
            Ok(None) => warn!(collection, path = %path.display(), "collection file missing"),
            Err(err) => warn!(
                collection,
                path = %path.display(),
                error = %format!("{err:#}"),
                "collection file unreadable"
            ),
        }
    }

    let prior = load_prior_state(&layout, args.page_start, &args.delimiter);
    let state = prior.state();
    let resume = match &prior {
        PriorState::Loaded(_) => "loaded",
        PriorState::Defaulted { .. } => "defaulted",
    };
    info!(
        resume,
        page_start = args.page_start,
        chapter = %state.cursor.chapter,
        section = %state.cursor.section,
        "resume plan"
    );

    Ok(())
}

pub fn inspect_file(path: &Path) -> Result<Option<FileSummary>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document: Value = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let Value::Object(entries) = document else {
        bail!("expected a JSON object keyed by id in {}", path.display());
    };

    let modified_at = fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .ok()
        .map(system_time_utc_string);

    Ok(Some(FileSummary {
        entries: entries.len(),
        sha256: sha256_file(path)?,
        modified_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Collections, persist};

    #[test]
    fn inspect_file_reports_missing_files_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let summary = inspect_file(&dir.path().join("quran_pages.json")).unwrap();
        assert!(summary.is_none());
    }

    #[test]
    fn inspect_file_counts_entries_and_hashes_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quran_languages.json");
        fs::write(&path, r#"{"AR":{"id":"AR","name":"Arabic"},"EN":{"id":"EN","name":"English"}}"#)
            .unwrap();

        let summary = inspect_file(&path).unwrap().unwrap();
        assert_eq!(summary.entries, 2);
        assert_eq!(summary.sha256.len(), 64);
        assert!(summary.modified_at.is_some());
    }

    #[test]
    fn run_reports_resume_plan_when_a_collection_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path(), "quran_");
        persist(&layout, &Collections::default(), ":", 2).unwrap();
        fs::write(layout.path_for("sections"), "{ not json").unwrap();

        let args = StatusArgs {
            output_dir: dir.path().to_path_buf(),
            file_prefix: "quran_".to_string(),
            delimiter: ":".to_string(),
            page_start: 1,
        };

        assert!(inspect_file(&layout.path_for("sections")).is_err());
        run(args).unwrap();
        assert!(!load_prior_state(&layout, 1, ":").is_loaded());
    }

    #[test]
    fn inspect_file_rejects_non_object_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quran_pages.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(inspect_file(&path).is_err());
    }
}
