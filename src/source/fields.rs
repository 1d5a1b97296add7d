use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::VerseRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVerseFields {
    pub page_badge: String,
    pub verse_element_id: String,
    pub chapter_badge: String,
    pub chapter_name: String,
    pub chapter_title: String,
    pub section_title: String,
    pub explanation_name: String,
    pub explanation_text: String,
    pub glyphs: Vec<String>,
}

pub struct FieldNormalizer {
    verse_id_prefix: Regex,
    non_digits: Regex,
    digits: Regex,
}

impl FieldNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            verse_id_prefix: Regex::new(r"sura_[0-9]+_aya_")
                .context("failed to compile verse element id regex")?,
            non_digits: Regex::new(r"[^0-9]").context("failed to compile non-digit regex")?,
            digits: Regex::new(r"[0-9]+").context("failed to compile digit regex")?,
        })
    }

    pub fn normalize(&self, raw: &RawVerseFields) -> Result<VerseRecord> {
        let page_number = parse_number(&raw.page_badge, "page badge")?;
        let chapter_number = parse_number(&raw.chapter_badge, "chapter badge")?;

        let verse_text = self.verse_id_prefix.replace(raw.verse_element_id.trim(), "");
        let verse_number = parse_number(&verse_text, "verse element id")
            .with_context(|| format!("unexpected verse element id: {}", raw.verse_element_id))?;

        let section_digits = self.non_digits.replace_all(&raw.section_title, "");
        let section_number = parse_number(&section_digits, "section title")
            .with_context(|| format!("unexpected section title: {}", raw.section_title))?;

        let chapter_arabic_name = self
            .digits
            .replace_all(&raw.chapter_title, "")
            .trim()
            .to_string();
        if chapter_arabic_name.is_empty() {
            bail!("chapter title has no name: {:?}", raw.chapter_title);
        }

        Ok(VerseRecord {
            page_number,
            verse_number,
            chapter_number,
            section_number,
            chapter_name: raw.chapter_name.trim().to_string(),
            chapter_arabic_name,
            explanation_text: raw.explanation_text.clone(),
            explanation_name: raw.explanation_name.clone(),
            glyphs: raw.glyphs.clone(),
        })
    }
}

fn parse_number(text: &str, field: &str) -> Result<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        bail!("missing {field}");
    }
    trimmed
        .parse::<u32>()
        .with_context(|| format!("invalid {field}: {trimmed:?}"))
}
