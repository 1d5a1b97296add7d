use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::source::{PageSource, RawVerseFields};

#[derive(Debug, Default)]
pub struct RecordFileSource {
    pages: BTreeMap<u32, Vec<RawVerseFields>>,
}

impl RecordFileSource {
    pub fn open(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read capture file {}", path.display()))?;
        let source = Self::parse(&raw)
            .with_context(|| format!("failed to parse capture file {}", path.display()))?;

        info!(
            path = %path.display(),
            pages = source.pages.len(),
            "opened capture file"
        );
        Ok(source)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let mut pages: BTreeMap<u32, Vec<RawVerseFields>> = BTreeMap::new();

        for (index, line) in raw.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: RawVerseFields = serde_json::from_str(line)
                .with_context(|| format!("malformed record on line {line_number}"))?;
            let page = fields
                .page_badge
                .trim()
                .parse::<u32>()
                .with_context(|| {
                    format!(
                        "invalid page badge {:?} on line {line_number}",
                        fields.page_badge
                    )
                })?;
            pages.entry(page).or_default().push(fields);
        }

        Ok(Self { pages })
    }
}

impl PageSource for RecordFileSource {
    fn page_fields(&mut self, page: u32) -> Result<Vec<RawVerseFields>> {
        self.pages
            .remove(&page)
            .with_context(|| format!("capture file has no records for page {page}"))
    }
}
