//! Converter for structured JSON Bible exports with numeric keys, as published
//! in the laisiangtho/bible repository:
//!
//! ```json
//! {"book": {"1": {"info": {"name": "창세기"},
//!                 "chapter": {"1": {"verse": {"1": {"text": "태초에 ..."}}}}}}}
//! ```
//!
//! The output is the flat `창1:1` → text map.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::books::book_by_name;
use crate::errors::{ConvertError, ConvertResult, SOURCE_CLONE_HINT};
use crate::logger;
use crate::types::{FlatBible, VerseKey};

#[derive(Debug, Clone, Deserialize)]
pub struct SourceBible {
    pub book: BTreeMap<u32, SourceBook>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceBook {
    pub info: SourceBookInfo,
    #[serde(default)]
    pub chapter: BTreeMap<u32, SourceChapter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceBookInfo {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceChapter {
    #[serde(default)]
    pub verse: BTreeMap<u32, SourceVerse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceVerse {
    pub text: String,
}

/// What to do with a book name that is not in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedNamePolicy {
    /// Use the source name as the key prefix and report it
    #[default]
    Verbatim,
    /// Abort the conversion
    Fail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub books: usize,
    pub verses: usize,
    /// Source names that had no abbreviation, in source order
    pub unmapped_names: Vec<String>,
}

pub fn load_source(path: &Path) -> ConvertResult<SourceBible> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConvertError::MissingInput {
                paths: vec![path.to_path_buf()],
                hint: Some(SOURCE_CLONE_HINT.to_string()),
            }
        } else {
            ConvertError::ReadInput { path: path.to_path_buf(), source: e }
        }
    })?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ConvertError::InvalidSource { path: path.to_path_buf(), source: e })
}

/// Flattens the source. `on_book` receives the source name, the abbreviation
/// used for it and the total number of books, once per book.
pub fn convert_source_with<F>(
    source: &SourceBible,
    policy: UnmappedNamePolicy,
    mut on_book: F,
) -> ConvertResult<(FlatBible, SourceReport)>
where
    F: FnMut(&str, &str, usize),
{
    let total = source.book.len();
    let mut flat = FlatBible::new();
    let mut report = SourceReport::default();

    for book in source.book.values() {
        let name = book.info.name.trim();

        let abbr = match book_by_name(name) {
            Some(b) => b.abbr,
            None => {
                if policy == UnmappedNamePolicy::Fail {
                    return Err(ConvertError::UnmappedBook(name.to_string()));
                }
                logger::warn(&format!("No abbreviation for book name '{}', using it verbatim", name));
                report.unmapped_names.push(name.to_string());
                name
            }
        };

        logger::info(&format!("Processing: {} ({})", name, abbr));
        on_book(name, abbr, total);
        report.books += 1;

        for (chapter_num, chapter) in book.chapter.iter() {
            for (verse_num, verse) in chapter.verse.iter() {
                let key = VerseKey::new(abbr, *chapter_num, *verse_num);
                if flat.insert(key, verse.text.trim().to_string()).is_none() {
                    report.verses += 1;
                }
            }
        }
    }

    Ok((flat, report))
}
