use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::model::{Chapter, Explanation, Language, Page, Section, Verse, builtin_languages};

mod glyph_fixes;
mod merge;
mod persist;
mod resume;

pub use glyph_fixes::GlyphFixes;
pub use merge::{Cursor, MergeEngine, UNSET_TRACKER};
pub use persist::persist;
pub use resume::{PriorState, ResumedState, load_prior_state};

pub const COLLECTION_NAMES: [&str; 6] = [
    "languages",
    "verses",
    "pages",
    "chapters",
    "sections",
    "explanations",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub languages: BTreeMap<String, Language>,
    pub pages: BTreeMap<String, Page>,
    pub verses: BTreeMap<String, Verse>,
    pub chapters: BTreeMap<String, Chapter>,
    pub sections: BTreeMap<String, Section>,
    pub explanations: BTreeMap<String, Explanation>,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            languages: builtin_languages(),
            pages: BTreeMap::new(),
            verses: BTreeMap::new(),
            chapters: BTreeMap::new(),
            sections: BTreeMap::new(),
            explanations: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionCounts {
    pub pages: usize,
    pub verses: usize,
    pub chapters: usize,
    pub sections: usize,
    pub explanations: usize,
}

impl Collections {
    pub fn counts(&self) -> CollectionCounts {
        CollectionCounts {
            pages: self.pages.len(),
            verses: self.verses.len(),
            chapters: self.chapters.len(),
            sections: self.sections.len(),
            explanations: self.explanations.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub dir: PathBuf,
    pub file_prefix: String,
}

impl OutputLayout {
    pub fn new(dir: &Path, file_prefix: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            file_prefix: file_prefix.to_string(),
        }
    }

    pub fn path_for(&self, collection: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}.json", self.file_prefix, collection))
    }
}
