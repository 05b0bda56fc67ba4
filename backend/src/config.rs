use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding::DEFAULT_ENCODING_LABELS;

pub const DEFAULT_TEXT_INPUTS: [&str; 2] = ["개역개정4판(구약+신약).txt", "개역한글판성경.txt"];
pub const DEFAULT_TEXT_OUTPUT: &str = "bible_full.json";
pub const DEFAULT_SOURCE_INPUT: &str = "github-bible/json/86.json";
pub const DEFAULT_SOURCE_OUTPUT: &str = "bible_klb.json";
pub const DEFAULT_LOOKUP_FILE: &str = "bible.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// book → chapter → verse objects
    #[default]
    #[serde(rename = "nested")]
    Nested,
    /// "창1:1" → text
    #[serde(rename = "flat")]
    Flat,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid OutputFormat value: {0}")]
pub struct ParseOutputFormatError(String);

impl FromStr for OutputFormat {
    type Err = ParseOutputFormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nested" => Ok(OutputFormat::Nested),
            "flat" => Ok(OutputFormat::Flat),
            _ => Err(ParseOutputFormatError(s.to_string())),
        }
    }
}

/// Resolved input and output locations for the converters.
///
/// Relative paths from the defaults or the environment are taken relative to
/// `bible_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    pub bible_dir: PathBuf,
    /// Tried in order, the first existing file is used
    pub text_inputs: Vec<PathBuf>,
    pub text_output: PathBuf,
    pub text_encodings: Vec<String>,
    pub text_format: OutputFormat,
    pub source_input: PathBuf,
    pub source_output: PathBuf,
    pub lookup_file: PathBuf,
}

impl ConverterConfig {
    /// The standard input and output file names under `bible_dir`.
    pub fn with_defaults(bible_dir: &Path) -> Self {
        ConverterConfig {
            bible_dir: bible_dir.to_path_buf(),
            text_inputs: DEFAULT_TEXT_INPUTS.iter().map(|p| bible_dir.join(p)).collect(),
            text_output: bible_dir.join(DEFAULT_TEXT_OUTPUT),
            text_encodings: DEFAULT_ENCODING_LABELS.iter().map(|s| s.to_string()).collect(),
            text_format: OutputFormat::default(),
            source_input: bible_dir.join(DEFAULT_SOURCE_INPUT),
            source_output: bible_dir.join(DEFAULT_SOURCE_OUTPUT),
            lookup_file: bible_dir.join(DEFAULT_LOOKUP_FILE),
        }
    }

    /// Defaults overridden by BIBLE_* environment variables.
    pub fn from_env(bible_dir: &Path) -> Self {
        Self::from_vars(bible_dir, |name| env::var(name).ok())
    }

    /// Same as [`ConverterConfig::from_env`] with an explicit variable source.
    pub fn from_vars<F>(bible_dir: &Path, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::with_defaults(bible_dir);
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("BIBLE_TEXT_INPUT") {
            config.text_inputs = split_list(&v).map(|p| config.resolve(p)).collect();
        }
        if let Some(v) = get("BIBLE_TEXT_OUTPUT") {
            config.text_output = config.resolve(&v);
        }
        if let Some(v) = get("BIBLE_TEXT_ENCODINGS") {
            config.text_encodings = split_list(&v).map(|s| s.to_string()).collect();
        }
        if let Some(v) = get("BIBLE_TEXT_FORMAT") {
            match v.parse::<OutputFormat>() {
                Ok(f) => config.text_format = f,
                Err(e) => crate::logger::warn(&format!("Ignoring BIBLE_TEXT_FORMAT: {}", e)),
            }
        }
        if let Some(v) = get("BIBLE_SOURCE_INPUT") {
            config.source_input = config.resolve(&v);
        }
        if let Some(v) = get("BIBLE_SOURCE_OUTPUT") {
            config.source_output = config.resolve(&v);
        }
        if let Some(v) = get("BIBLE_LOOKUP_FILE") {
            config.lookup_file = config.resolve(&v);
        }

        config
    }

    pub fn resolve(&self, p: &str) -> PathBuf {
        let path = PathBuf::from(p.trim());
        if path.is_absolute() {
            path
        } else {
            self.bible_dir.join(path)
        }
    }

    /// First of the text inputs that exists on disk.
    pub fn existing_text_input(&self) -> Option<&Path> {
        first_existing(&self.text_inputs)
    }
}

pub fn first_existing(paths: &[PathBuf]) -> Option<&Path> {
    paths.iter().map(|p| p.as_path()).find(|p| p.is_file())
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(|p| p.trim()).filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_under_bible_dir() {
        let config = ConverterConfig::with_defaults(Path::new("/data/bible"));
        assert_eq!(config.text_inputs[0], PathBuf::from("/data/bible/개역개정4판(구약+신약).txt"));
        assert_eq!(config.text_inputs[1], PathBuf::from("/data/bible/개역한글판성경.txt"));
        assert_eq!(config.text_output, PathBuf::from("/data/bible/bible_full.json"));
        assert_eq!(config.source_input, PathBuf::from("/data/bible/github-bible/json/86.json"));
        assert_eq!(config.text_encodings, vec!["cp949", "euc-kr", "utf-8"]);
        assert_eq!(config.text_format, OutputFormat::Nested);
    }

    #[test]
    fn test_vars_override_defaults() {
        let vars: HashMap<&str, &str> = [
            ("BIBLE_TEXT_INPUT", "a.txt, /abs/b.txt"),
            ("BIBLE_TEXT_ENCODINGS", "utf-8"),
            ("BIBLE_TEXT_FORMAT", "flat"),
            ("BIBLE_SOURCE_OUTPUT", "out/klb.json"),
            ("BIBLE_LOOKUP_FILE", " "),
        ].into_iter().collect();

        let config = ConverterConfig::from_vars(Path::new("/d"), |n| vars.get(n).map(|v| v.to_string()));

        assert_eq!(config.text_inputs, vec![PathBuf::from("/d/a.txt"), PathBuf::from("/abs/b.txt")]);
        assert_eq!(config.text_encodings, vec!["utf-8"]);
        assert_eq!(config.text_format, OutputFormat::Flat);
        assert_eq!(config.source_output, PathBuf::from("/d/out/klb.json"));
        // blank values keep the default
        assert_eq!(config.lookup_file, PathBuf::from("/d/bible.json"));
    }

    #[test]
    fn test_existing_text_input_falls_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ConverterConfig::with_defaults(dir.path());
        assert!(config.existing_text_input().is_none());

        std::fs::write(&config.text_inputs[1], "창1:1 a").unwrap();
        assert_eq!(config.existing_text_input(), Some(config.text_inputs[1].as_path()));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("FLAT".parse::<OutputFormat>().unwrap(), OutputFormat::Flat);
        assert!("tree".parse::<OutputFormat>().is_err());
    }
}
