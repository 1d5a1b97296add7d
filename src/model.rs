use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub type IdSet = BTreeSet<String>;

pub const NO_BASMALAH_CHAPTERS: [u32; 2] = [1, 9];
pub const EXPLANATION_LANGUAGE: &str = "AR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub number: u32,
    pub verses: IdSet,
    pub chapters: IdSet,
    pub sections: IdSet,
}

impl Page {
    pub fn new(number: u32) -> Self {
        Self {
            id: number.to_string(),
            number,
            verses: IdSet::new(),
            chapters: IdSet::new(),
            sections: IdSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub id: String,
    pub number: u32,
    pub arabic_unicodes: IdSet,
    pub explanations: IdSet,
    pub page: String,
    pub section: String,
    pub chapter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub number: u32,
    pub name: String,
    pub arabic_unicode: String,
    pub basmalah: bool,
    pub verses: IdSet,
    pub pages: IdSet,
    pub sections: IdSet,
}

impl Chapter {
    pub fn new(number: u32, name: &str, arabic_unicode: &str) -> Self {
        Self {
            id: number.to_string(),
            number,
            name: name.to_string(),
            arabic_unicode: arabic_unicode.to_string(),
            basmalah: !NO_BASMALAH_CHAPTERS.contains(&number),
            verses: IdSet::new(),
            pages: IdSet::new(),
            sections: IdSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub verses: IdSet,
    pub pages: IdSet,
    pub chapters: IdSet,
}

impl Section {
    pub fn new(number: u32) -> Self {
        Self {
            id: number.to_string(),
            verses: IdSet::new(),
            pages: IdSet::new(),
            chapters: IdSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub id: String,
    pub text: String,
    pub name: String,
    pub language: String,
    pub verse: String,
    pub page: String,
    pub section: String,
    pub chapter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: String,
    pub name: String,
}

pub fn builtin_languages() -> BTreeMap<String, Language> {
    [("AR", "Arabic"), ("EN", "English")]
        .into_iter()
        .map(|(id, name)| {
            (
                id.to_string(),
                Language {
                    id: id.to_string(),
                    name: name.to_string(),
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseRecord {
    pub page_number: u32,
    pub verse_number: u32,
    pub chapter_number: u32,
    pub section_number: u32,
    pub chapter_name: String,
    pub chapter_arabic_name: String,
    pub explanation_text: String,
    pub explanation_name: String,
    pub glyphs: Vec<String>,
}
