use tracing::warn;

use crate::aggregate::{Collections, GlyphFixes};
use crate::ids::composite_key;
use crate::model::{
    Chapter, EXPLANATION_LANGUAGE, Explanation, IdSet, Page, Section, Verse, VerseRecord,
};

pub const UNSET_TRACKER: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub chapter: String,
    pub section: String,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            chapter: UNSET_TRACKER.to_string(),
            section: UNSET_TRACKER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub verse_id: String,
    pub chapter_changed: bool,
    pub section_changed: bool,
}

#[derive(Debug, Clone)]
pub struct MergeEngine {
    delimiter: String,
    fixes: GlyphFixes,
}

impl MergeEngine {
    pub fn new(delimiter: &str) -> Self {
        Self::with_fixes(delimiter, GlyphFixes::builtin(delimiter))
    }

    fn with_fixes(delimiter: &str, fixes: GlyphFixes) -> Self {
        Self {
            delimiter: delimiter.to_string(),
            fixes,
        }
    }

    pub fn begin_page(&self, store: &mut Collections, page_number: u32) -> bool {
        let page_id = page_number.to_string();
        if store.pages.contains_key(&page_id) {
            return false;
        }
        store.pages.insert(page_id, Page::new(page_number));
        true
    }

    pub fn merge_verse_record(
        &self,
        store: &mut Collections,
        cursor: &mut Cursor,
        record: &VerseRecord,
    ) -> MergeOutcome {
        let page_id = record.page_number.to_string();
        let verse_id = composite_key(record.chapter_number, record.verse_number, &self.delimiter);
        let chapter_id = record.chapter_number.to_string();
        let section_id = record.section_number.to_string();
        let explanation_id = verse_id.clone();

        self.begin_page(store, record.page_number);

        store.explanations.insert(
            explanation_id.clone(),
            Explanation {
                id: explanation_id.clone(),
                text: record.explanation_text.clone(),
                name: record.explanation_name.clone(),
                language: EXPLANATION_LANGUAGE.to_string(),
                verse: verse_id.clone(),
                page: page_id.clone(),
                section: section_id.clone(),
                chapter: chapter_id.clone(),
            },
        );

        let mut glyphs = IdSet::new();
        for glyph in &record.glyphs {
            if !self.fixes.is_extra(&verse_id, glyph) {
                glyphs.insert(glyph.clone());
            }
        }
        glyphs.extend(self.fixes.missing_for(&verse_id).iter().cloned());

        store.verses.insert(
            verse_id.clone(),
            Verse {
                id: verse_id.clone(),
                number: record.verse_number,
                arabic_unicodes: glyphs,
                explanations: IdSet::from([explanation_id]),
                page: page_id.clone(),
                section: section_id.clone(),
                chapter: chapter_id.clone(),
            },
        );

        let chapter_changed = chapter_id != cursor.chapter;
        if chapter_changed {
            cursor.chapter = chapter_id.clone();
        }
        let section_changed = section_id != cursor.section;
        if section_changed {
            cursor.section = section_id.clone();
        }

        let chapter = store.chapters.entry(chapter_id.clone()).or_insert_with(|| {
            Chapter::new(
                record.chapter_number,
                &record.chapter_name,
                &record.chapter_arabic_name,
            )
        });
        chapter.sections.insert(section_id.clone());
        chapter.verses.insert(verse_id.clone());

        let section = store
            .sections
            .entry(section_id.clone())
            .or_insert_with(|| Section::new(record.section_number));
        section.chapters.insert(chapter_id.clone());
        section.verses.insert(verse_id.clone());

        if let Some(page) = store.pages.get_mut(&page_id) {
            page.sections.insert(section_id);
            page.chapters.insert(chapter_id);
            page.verses.insert(verse_id.clone());
        }

        MergeOutcome {
            verse_id,
            chapter_changed,
            section_changed,
        }
    }

    // Attribution goes to whatever chapter/section is current once the page's
    // last verse has merged, not to every chapter/section seen on the page.
    pub fn finish_page(&self, store: &mut Collections, cursor: &Cursor, page_number: u32) {
        let page_id = page_number.to_string();

        match store.chapters.get_mut(&cursor.chapter) {
            Some(chapter) => {
                chapter.pages.insert(page_id.clone());
            }
            None => warn!(page = page_number, chapter = %cursor.chapter, "no current chapter to attribute page to"),
        }

        match store.sections.get_mut(&cursor.section) {
            Some(section) => {
                section.pages.insert(page_id);
            }
            None => warn!(page = page_number, section = %cursor.section, "no current section to attribute page to"),
        }
    }
}
