//! Parser for line-oriented Bible text files, one verse per line:
//!
//! ```text
//! 창1:1 <천지 창조> 태초에 하나님이 천지를 창조하시니라
//! 창1:2 땅이 혼돈하고 공허하며 ...
//! ```
//!
//! The optional `<...>` heading between the reference and the text is dropped.

use std::path::Path;

use encoding_rs::Encoding;
use lazy_static::lazy_static;
use regex::Regex;

use crate::books::{book_by_abbr, Book};
use crate::encoding::read_text_file;
use crate::errors::ConvertResult;
use crate::logger;
use crate::types::{Bible, ParseStats};

lazy_static! {
    static ref RE_VERSE_LINE: Regex = Regex::new(
        r"^([가-힣]+)(\d+):(\d+)\s*(?:<[^>]+>)?\s*(.+)$"
    ).unwrap();
}

/// One matched line, before the abbreviation is checked against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseLine<'a> {
    pub abbr: &'a str,
    pub chapter: u32,
    pub verse: u32,
    pub text: &'a str,
}

/// Matches a single line. Returns None for blank or malformed lines.
pub fn parse_line(line: &str) -> Option<VerseLine<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let caps = RE_VERSE_LINE.captures(line)?;
    let abbr = caps.get(1)?.as_str();
    let chapter = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let verse = caps.get(3)?.as_str().parse::<u32>().ok()?;
    let text = caps.get(4)?.as_str().trim();

    Some(VerseLine { abbr, chapter, verse, text })
}

/// Accumulates verses into a [`Bible`] and keeps the parse counters.
#[derive(Debug, Default)]
pub struct BibleBuilder {
    bible: Bible,
    stats: ParseStats,
}

/// What happened to a line fed into [`BibleBuilder::push_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Blank,
    Malformed,
    UnknownBook,
    /// Added a verse; carries the book if it was seen for the first time
    Added(Option<&'static Book>),
    Replaced,
}

impl BibleBuilder {
    pub fn new() -> Self {
        BibleBuilder::default()
    }

    pub fn push_line(&mut self, line: &str) -> LineOutcome {
        if line.trim().is_empty() {
            return LineOutcome::Blank;
        }

        let Some(parsed) = parse_line(line) else {
            self.stats.skipped_malformed += 1;
            return LineOutcome::Malformed;
        };

        let Some(book) = book_by_abbr(parsed.abbr) else {
            self.stats.skipped_unknown_book += 1;
            return LineOutcome::UnknownBook;
        };

        if parsed.chapter == 0 || parsed.chapter > book.chapter_count {
            self.stats.chapters_out_of_range += 1;
            logger::warn(&format!(
                "{} has {} chapters, got {}{}:{}",
                book.name, book.chapter_count, book.abbr, parsed.chapter, parsed.verse
            ));
        }

        let new_book = !self.bible.contains_book(book.name);

        match self.bible.insert_verse(book, parsed.chapter, parsed.verse, parsed.text.to_string()) {
            None => {
                self.stats.verses += 1;
                if new_book {
                    self.stats.books += 1;
                    LineOutcome::Added(Some(book))
                } else {
                    LineOutcome::Added(None)
                }
            }
            Some(_) => {
                self.stats.duplicates_replaced += 1;
                logger::warn(&format!(
                    "Duplicate verse {}{}:{}, keeping the later text",
                    book.abbr, parsed.chapter, parsed.verse
                ));
                LineOutcome::Replaced
            }
        }
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    pub fn finish(self) -> (Bible, ParseStats) {
        (self.bible, self.stats)
    }
}

/// Parses decoded text. `on_new_book` is called the first time each book appears.
pub fn parse_bible_text_with<F>(content: &str, mut on_new_book: F) -> (Bible, ParseStats)
where
    F: FnMut(&'static Book),
{
    let mut builder = BibleBuilder::new();

    for line in content.lines() {
        if let LineOutcome::Added(Some(book)) = builder.push_line(line) {
            logger::info(&format!("Processing: {}", book.name));
            on_new_book(book);
        }
    }

    let (bible, stats) = builder.finish();
    logger::info(&format!(
        "Parsed {} books, {} verses ({} malformed, {} unknown book, {} duplicates)",
        stats.books, stats.verses, stats.skipped_malformed,
        stats.skipped_unknown_book, stats.duplicates_replaced,
    ));

    (bible, stats)
}

/// Reads, decodes and parses a text file.
pub fn parse_bible_file_with<F>(
    path: &Path,
    encodings: &[&'static Encoding],
    on_new_book: F,
) -> ConvertResult<(Bible, ParseStats)>
where
    F: FnMut(&'static Book),
{
    let decoded = read_text_file(path, encodings)?;
    let (bible, mut stats) = parse_bible_text_with(&decoded.text, on_new_book);
    stats.encoding = Some(decoded.encoding.name().to_string());
    Ok((bible, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_bible_text(content: &str) -> (Bible, ParseStats) {
        parse_bible_text_with(content, |_| {})
    }

    #[test]
    fn test_parse_line_simple() {
        let parsed = parse_line("창1:1 태초에 하나님이 천지를 창조하시니라").unwrap();
        assert_eq!(parsed, VerseLine {
            abbr: "창",
            chapter: 1,
            verse: 1,
            text: "태초에 하나님이 천지를 창조하시니라",
        });
    }

    #[test]
    fn test_parse_line_drops_heading() {
        let parsed = parse_line("창1:1 <천지 창조> 태초에 하나님이").unwrap();
        assert_eq!(parsed.text, "태초에 하나님이");

        let parsed = parse_line("요일3:16<사랑>  그가 우리를 위하여  ").unwrap();
        assert_eq!(parsed.abbr, "요일");
        assert_eq!(parsed.chapter, 3);
        assert_eq!(parsed.verse, 16);
        assert_eq!(parsed.text, "그가 우리를 위하여");
    }

    #[test]
    fn test_parse_line_rejects_malformed() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   ").is_none());
        assert!(parse_line("창1 태초에").is_none());
        assert!(parse_line("창1:1").is_none());
        assert!(parse_line("Gen1:1 In the beginning").is_none());
        // chapter number overflows u32
        assert!(parse_line("창99999999999:1 text").is_none());
    }

    #[test]
    fn test_unknown_abbreviation_is_skipped() {
        let (bible, stats) = parse_bible_text("XX1:1 text\n가1:1 text\n창1:1 태초에");
        // XX does not match the Hangul pattern, 가 matches but is not a book
        assert_eq!(stats.skipped_malformed, 1);
        assert_eq!(stats.skipped_unknown_book, 1);
        assert_eq!(stats.verses, 1);
        assert_eq!(bible.book_count(), 1);
        assert!(bible.to_flat().iter().all(|(k, _)| k.starts_with('창')));
    }

    #[test]
    fn test_builder_outcomes() {
        let mut builder = BibleBuilder::new();
        assert_eq!(builder.push_line(""), LineOutcome::Blank);
        assert_eq!(builder.push_line("not a verse"), LineOutcome::Malformed);
        assert_eq!(builder.push_line("창1:1 a"), LineOutcome::Added(book_by_abbr("창")));
        assert_eq!(builder.push_line("창1:2 b"), LineOutcome::Added(None));
        assert_eq!(builder.push_line("창1:2 c"), LineOutcome::Replaced);
        assert_eq!(builder.stats().verses, 2);
        assert_eq!(builder.stats().duplicates_replaced, 1);

        let (bible, _) = builder.finish();
        assert_eq!(bible.get_text("창세기", 1, 2), Some("c"));
    }

    #[test]
    fn test_chapter_past_book_length_is_counted() {
        // 룻기 has 4 chapters
        let (bible, stats) = parse_bible_text("룻4:22 오벳은 이새를 낳고\n룻5:1 없는 장\n룻0:1 영 장");
        assert_eq!(stats.chapters_out_of_range, 2);
        assert_eq!(stats.verses, 3);
        assert_eq!(bible.get_text("룻기", 5, 1), Some("없는 장"));
    }

    #[test]
    fn test_new_book_callback_order() {
        let content = "창1:1 a\r\n창1:2 b\n출1:1 c\n\n마1:1 d\n";
        let mut seen = Vec::new();
        let (bible, stats) = parse_bible_text_with(content, |b| seen.push(b.name));
        assert_eq!(seen, vec!["창세기", "출애굽기", "마태복음"]);
        assert_eq!(stats.books, 3);
        assert_eq!(stats.verses, bible.verse_count());
        // \r is trimmed with the rest of the line
        assert_eq!(bible.get_text("창세기", 1, 1), Some("a"));
    }
}
