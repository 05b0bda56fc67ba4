use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::books::{Book, Testament};
use crate::errors::ConvertError;

lazy_static! {
    // 창1:1, 요일3:16
    static ref RE_VERSE_KEY: Regex = Regex::new(r"^([가-힣]+)(\d+):(\d+)$").unwrap();
}

/// Identifies a verse in the flat lookup map, rendered as `창1:1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseKey {
    pub abbr: String,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseKey {
    pub fn new(abbr: &str, chapter: u32, verse: u32) -> Self {
        VerseKey { abbr: abbr.to_string(), chapter, verse }
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}", self.abbr, self.chapter, self.verse)
    }
}

impl FromStr for VerseKey {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = RE_VERSE_KEY.captures(s)
            .ok_or_else(|| ConvertError::InvalidReference(s.to_string()))?;

        let chapter = caps[2].parse::<u32>()
            .map_err(|_| ConvertError::InvalidReference(s.to_string()))?;
        let verse = caps[3].parse::<u32>()
            .map_err(|_| ConvertError::InvalidReference(s.to_string()))?;

        Ok(VerseKey { abbr: caps[1].to_string(), chapter, verse })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub verse: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter: u32,
    pub verses: BTreeMap<u32, Verse>,
}

impl Chapter {
    pub fn new(chapter: u32) -> Self {
        Chapter { chapter, verses: BTreeMap::new() }
    }
}

/// One book of the nested output, keyed by its full name in [`Bible`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEntry {
    pub name: String,
    pub abbr: String,
    pub testament: Testament,
    pub order: u32,
    pub chapters: BTreeMap<u32, Chapter>,
}

impl BookEntry {
    pub fn new(book: &Book) -> Self {
        BookEntry {
            name: book.name.to_string(),
            abbr: book.abbr.to_string(),
            testament: book.testament,
            order: book.order,
            chapters: BTreeMap::new(),
        }
    }

    pub fn verse_count(&self) -> usize {
        self.chapters.values().map(|c| c.verses.len()).sum()
    }
}

/// Nested book → chapter → verse aggregate. Books keep the order in which they
/// were first seen in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bible {
    books: IndexMap<String, BookEntry>,
}

impl Bible {
    pub fn new() -> Self {
        Bible::default()
    }

    /// Inserts a verse, creating the book and chapter entries as needed.
    /// Returns the previous text if the verse was already present.
    pub fn insert_verse(&mut self, book: &Book, chapter: u32, verse: u32, text: String) -> Option<String> {
        let entry = self.books
            .entry(book.name.to_string())
            .or_insert_with(|| BookEntry::new(book));

        let ch = entry.chapters
            .entry(chapter)
            .or_insert_with(|| Chapter::new(chapter));

        ch.verses
            .insert(verse, Verse { verse, text })
            .map(|prev| prev.text)
    }

    pub fn contains_book(&self, name: &str) -> bool {
        self.books.contains_key(name)
    }

    pub fn book(&self, name: &str) -> Option<&BookEntry> {
        self.books.get(name)
    }

    pub fn books(&self) -> impl Iterator<Item = &BookEntry> {
        self.books.values()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn verse_count(&self) -> usize {
        self.books.values().map(|b| b.verse_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get_text(&self, book_name: &str, chapter: u32, verse: u32) -> Option<&str> {
        self.books.get(book_name)?
            .chapters.get(&chapter)?
            .verses.get(&verse)
            .map(|v| v.text.as_str())
    }

    /// Flattens into the `창1:1` → text map used by the reader app.
    pub fn to_flat(&self) -> FlatBible {
        let mut flat = FlatBible::new();
        for book in self.books.values() {
            for (c, chapter) in book.chapters.iter() {
                for (v, verse) in chapter.verses.iter() {
                    flat.insert(VerseKey::new(&book.abbr, *c, *v), verse.text.clone());
                }
            }
        }
        flat
    }
}

/// Flat `"<abbr><chapter>:<verse>"` → text map, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatBible(IndexMap<String, String>);

impl FlatBible {
    pub fn new() -> Self {
        FlatBible::default()
    }

    pub fn insert(&mut self, key: VerseKey, text: String) -> Option<String> {
        self.0.insert(key.to_string(), text)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Counters collected while parsing a line-oriented text file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Distinct verses in the aggregate
    pub verses: usize,
    pub books: usize,
    pub skipped_malformed: usize,
    pub skipped_unknown_book: usize,
    pub duplicates_replaced: usize,
    /// Verses kept although their chapter is past the book's chapter count
    pub chapters_out_of_range: usize,
    /// Encoding label the input was decoded with, when read from a file
    pub encoding: Option<String>,
}
