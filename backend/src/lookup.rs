//! Read-side queries over the flat `창1:1` → text map.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::books::{book_by_abbr, resolve_book};
use crate::errors::{ConvertError, ConvertResult};
use crate::types::{FlatBible, VerseKey};

lazy_static! {
    // 창1:1, 창세기 1:1, 창1:1-3, 요일 3:16-18
    static ref RE_REFERENCE: Regex = Regex::new(
        r"^\s*([가-힣0-9]*[가-힣])\s*(\d+)\s*:\s*(\d+)(?:\s*-\s*(\d+))?\s*$"
    ).unwrap();

    // Any stored key, including the verbatim book names the source converter keeps
    static ref RE_STORED_KEY: Regex = Regex::new(r"^(.+?)(\d+):(\d+)$").unwrap();
}

fn parse_stored_key(k: &str) -> Option<VerseKey> {
    let caps = RE_STORED_KEY.captures(k)?;
    let chapter = caps[2].parse::<u32>().ok()?;
    let verse = caps[3].parse::<u32>().ok()?;
    Some(VerseKey::new(&caps[1], chapter, verse))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Full book name
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub key: String,
}

/// A verse or verse range reference typed by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseReference {
    pub abbr: &'static str,
    pub chapter: u32,
    pub start_verse: u32,
    pub end_verse: u32,
}

impl VerseReference {
    pub fn parse(s: &str) -> ConvertResult<Self> {
        let invalid = || ConvertError::InvalidReference(s.to_string());

        let caps = RE_REFERENCE.captures(s).ok_or_else(invalid)?;
        let book = resolve_book(&caps[1]).ok_or_else(invalid)?;
        let chapter = caps[2].parse::<u32>().map_err(|_| invalid())?;
        let start_verse = caps[3].parse::<u32>().map_err(|_| invalid())?;
        let end_verse = match caps.get(4) {
            Some(m) => m.as_str().parse::<u32>().map_err(|_| invalid())?,
            None => start_verse,
        };

        if end_verse < start_verse {
            return Err(invalid());
        }

        Ok(VerseReference { abbr: book.abbr, chapter, start_verse, end_verse })
    }
}

pub struct BibleIndex {
    flat: FlatBible,
}

impl BibleIndex {
    pub fn from_flat(flat: FlatBible) -> Self {
        BibleIndex { flat }
    }

    pub fn load(path: &Path) -> ConvertResult<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConvertError::MissingInput { paths: vec![path.to_path_buf()], hint: None }
            } else {
                ConvertError::ReadInput { path: path.to_path_buf(), source: e }
            }
        })?;

        let flat: FlatBible = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ConvertError::InvalidSource { path: path.to_path_buf(), source: e })?;

        Ok(BibleIndex::from_flat(flat))
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// Book may be given as full name or abbreviation. Unknown names are used
    /// as-is, so keys written with a verbatim fallback stay reachable.
    fn abbr_for<'a>(book: &'a str) -> &'a str {
        match resolve_book(book) {
            Some(b) => b.abbr,
            None => book.trim(),
        }
    }

    /// Keys of this exact abbreviation.
    fn keys_of<'s, 'a>(&'s self, abbr: &'a str) -> impl Iterator<Item = (VerseKey, &'s str)> {
        self.flat.iter().filter_map(move |(k, text)| {
            let key = parse_stored_key(k)?;
            (key.abbr == abbr).then_some((key, text))
        })
    }

    pub fn get_verse(&self, book: &str, chapter: u32, verse: u32) -> Option<&str> {
        let key = VerseKey::new(Self::abbr_for(book), chapter, verse);
        self.flat.get(&key.to_string())
    }

    pub fn get_chapter(&self, book: &str, chapter: u32) -> BTreeMap<u32, &str> {
        let abbr = Self::abbr_for(book);
        self.keys_of(abbr)
            .filter(|(key, _)| key.chapter == chapter)
            .map(|(key, text)| (key.verse, text))
            .collect()
    }

    pub fn get_book(&self, book: &str) -> BTreeMap<u32, BTreeMap<u32, &str>> {
        let abbr = Self::abbr_for(book);
        let mut chapters: BTreeMap<u32, BTreeMap<u32, &str>> = BTreeMap::new();
        for (key, text) in self.keys_of(abbr) {
            chapters.entry(key.chapter).or_default().insert(key.verse, text);
        }
        chapters
    }

    /// Verses start..=end of one chapter; missing verses are skipped.
    pub fn get_verse_range(&self, book: &str, chapter: u32, start_verse: u32, end_verse: u32) -> Vec<&str> {
        let abbr = Self::abbr_for(book);
        (start_verse..=end_verse)
            .filter_map(|v| self.flat.get(&VerseKey::new(abbr, chapter, v).to_string()))
            .collect()
    }

    pub fn get_reference(&self, reference: &VerseReference) -> Vec<(VerseKey, &str)> {
        (reference.start_verse..=reference.end_verse)
            .filter_map(|v| {
                let key = VerseKey::new(reference.abbr, reference.chapter, v);
                let text = self.flat.get(&key.to_string())?;
                Some((key, text))
            })
            .collect()
    }

    /// Case-insensitive substring search over verse texts, in map order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }
        let lower_query = query.to_lowercase();

        let mut hits = Vec::new();
        for (k, text) in self.flat.iter() {
            if !text.to_lowercase().contains(&lower_query) {
                continue;
            }
            let Some(key) = parse_stored_key(k) else {
                continue;
            };

            let book = book_by_abbr(&key.abbr)
                .map(|b| b.name.to_string())
                .unwrap_or_else(|| key.abbr.clone());

            hits.push(SearchHit {
                book,
                chapter: key.chapter,
                verse: key.verse,
                text: text.to_string(),
                key: k.to_string(),
            });

            if hits.len() >= limit {
                break;
            }
        }

        hits
    }
}
