//! Static registry of the 66 books of the Protestant canon, with the Korean
//! abbreviations used by the 개역개정 text files and the reader app.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Testament {
    #[serde(rename = "구약")]
    Old,
    #[serde(rename = "신약")]
    New,
}

impl Testament {
    pub fn as_str(&self) -> &'static str {
        match self {
            Testament::Old => "구약",
            Testament::New => "신약",
        }
    }
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid Testament value: {0}")]
pub struct ParseTestamentError(String);

impl FromStr for Testament {
    type Err = ParseTestamentError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "구약" | "old" => Ok(Testament::Old),
            "신약" | "new" => Ok(Testament::New),
            _ => Err(ParseTestamentError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Book {
    /// Short code, e.g. 창
    pub abbr: &'static str,
    /// Full name, e.g. 창세기
    pub name: &'static str,
    pub testament: Testament,
    /// Canonical order, 1..=66
    pub order: u32,
    pub chapter_count: u32,
    /// Other spellings of the full name found in sources, e.g. 요한1서
    pub alt_names: &'static [&'static str],
}

const fn book(
    abbr: &'static str,
    name: &'static str,
    testament: Testament,
    order: u32,
    chapter_count: u32,
) -> Book {
    Book { abbr, name, testament, order, chapter_count, alt_names: &[] }
}

const fn book_alt(
    abbr: &'static str,
    name: &'static str,
    testament: Testament,
    order: u32,
    chapter_count: u32,
    alt_names: &'static [&'static str],
) -> Book {
    Book { abbr, name, testament, order, chapter_count, alt_names }
}

use Testament::{New, Old};

pub static BOOKS: [Book; 66] = [
    // 구약 39권
    book("창", "창세기", Old, 1, 50),
    book("출", "출애굽기", Old, 2, 40),
    book("레", "레위기", Old, 3, 27),
    book("민", "민수기", Old, 4, 36),
    book("신", "신명기", Old, 5, 34),
    book("수", "여호수아", Old, 6, 24),
    book("삿", "사사기", Old, 7, 21),
    book("룻", "룻기", Old, 8, 4),
    book("삼상", "사무엘상", Old, 9, 31),
    book("삼하", "사무엘하", Old, 10, 24),
    book("왕상", "열왕기상", Old, 11, 22),
    book("왕하", "열왕기하", Old, 12, 25),
    book("대상", "역대상", Old, 13, 29),
    book("대하", "역대하", Old, 14, 36),
    book("스", "에스라", Old, 15, 10),
    book("느", "느헤미야", Old, 16, 13),
    book("에", "에스더", Old, 17, 10),
    book("욥", "욥기", Old, 18, 42),
    book("시", "시편", Old, 19, 150),
    book("잠", "잠언", Old, 20, 31),
    book("전", "전도서", Old, 21, 12),
    book("아", "아가", Old, 22, 8),
    book("사", "이사야", Old, 23, 66),
    book("렘", "예레미야", Old, 24, 52),
    book("애", "예레미야애가", Old, 25, 5),
    book("겔", "에스겔", Old, 26, 48),
    book("단", "다니엘", Old, 27, 12),
    book("호", "호세아", Old, 28, 14),
    book("욜", "요엘", Old, 29, 3),
    book("암", "아모스", Old, 30, 9),
    book("옵", "오바댜", Old, 31, 1),
    book("욘", "요나", Old, 32, 4),
    book("미", "미가", Old, 33, 7),
    book("나", "나훔", Old, 34, 3),
    book("합", "하박국", Old, 35, 3),
    book("습", "스바냐", Old, 36, 3),
    book("학", "학개", Old, 37, 2),
    book("슥", "스가랴", Old, 38, 14),
    book("말", "말라기", Old, 39, 4),
    // 신약 27권
    book("마", "마태복음", New, 40, 28),
    book("막", "마가복음", New, 41, 16),
    book("눅", "누가복음", New, 42, 24),
    book("요", "요한복음", New, 43, 21),
    book("행", "사도행전", New, 44, 28),
    book("롬", "로마서", New, 45, 16),
    book("고전", "고린도전서", New, 46, 16),
    book("고후", "고린도후서", New, 47, 13),
    book("갈", "갈라디아서", New, 48, 6),
    book("엡", "에베소서", New, 49, 6),
    book("빌", "빌립보서", New, 50, 4),
    book("골", "골로새서", New, 51, 4),
    book("살전", "데살로니가전서", New, 52, 5),
    book("살후", "데살로니가후서", New, 53, 3),
    book("딤전", "디모데전서", New, 54, 6),
    book("딤후", "디모데후서", New, 55, 4),
    book("딛", "디도서", New, 56, 3),
    book("몬", "빌레몬서", New, 57, 1),
    book("히", "히브리서", New, 58, 13),
    book("약", "야고보서", New, 59, 5),
    book("벧전", "베드로전서", New, 60, 5),
    book("벧후", "베드로후서", New, 61, 3),
    book_alt("요일", "요한일서", New, 62, 5, &["요한1서"]),
    book_alt("요이", "요한이서", New, 63, 1, &["요한2서"]),
    book_alt("요삼", "요한삼서", New, 64, 1, &["요한3서"]),
    book("유", "유다서", New, 65, 1),
    book("계", "요한계시록", New, 66, 22),
];

lazy_static! {
    static ref BY_ABBR: HashMap<&'static str, &'static Book> =
        BOOKS.iter().map(|b| (b.abbr, b)).collect();

    static ref BY_NAME: HashMap<&'static str, &'static Book> = {
        let mut m = HashMap::new();
        for b in BOOKS.iter() {
            m.insert(b.name, b);
            for alt in b.alt_names {
                m.insert(*alt, b);
            }
        }
        m
    };
}

/// 창 -> 창세기
pub fn book_by_abbr(abbr: &str) -> Option<&'static Book> {
    BY_ABBR.get(abbr).copied()
}

/// 창세기 -> 창, also accepts alternate names
pub fn book_by_name(name: &str) -> Option<&'static Book> {
    BY_NAME.get(name).copied()
}

/// Resolves either a full name or an abbreviation.
pub fn resolve_book(name_or_abbr: &str) -> Option<&'static Book> {
    let s = name_or_abbr.trim();
    book_by_name(s).or_else(|| book_by_abbr(s))
}
