pub mod books;
pub mod types;
pub mod errors;
pub mod encoding;
pub mod text_parser;
pub mod source_json;
pub mod json_export;
pub mod convert;
pub mod lookup;
pub mod config;
pub mod logger;

use std::env;
use std::fs::create_dir_all;
use std::path::PathBuf;
use std::error::Error;
use app_dirs::{get_app_root, AppDataType, AppInfo};
use dotenvy::dotenv;

pub const APP_INFO: AppInfo = AppInfo{name: "bible-json", author: "reading-jesus"};

/// Default number of hits returned by a text search.
pub static SEARCH_LIMIT: usize = 50;

pub fn get_create_bible_app_root() -> Result<PathBuf, Box<dyn Error>> {
    // AppDataType::UserData
    // - Linux: ~/.local/share/bible-json
    let p = get_app_root(AppDataType::UserData, &APP_INFO)?;
    if !p.exists() {
        create_dir_all(&p)?;
    }
    Ok(p)
}

/// The base directory for the converter inputs, outputs and the log file.
///
/// Precedence: the BIBLE_DIR env var (also read from .env), then the user
/// data root of the app.
pub fn get_create_bible_dir() -> Result<PathBuf, Box<dyn Error>> {
    dotenv().ok();

    let bible_dir = match env::var("BIBLE_DIR") {
        Ok(s) if !s.is_empty() => PathBuf::from(s),
        _ => get_create_bible_app_root()?,
    };

    if !bible_dir.exists() {
        create_dir_all(&bible_dir)?;
    }
    Ok(bible_dir)
}
