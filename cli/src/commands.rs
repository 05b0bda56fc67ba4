use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};

use bible_backend::config::ConverterConfig;
use bible_backend::convert::{run_source_conversion, run_text_conversion, TextConversion};
use bible_backend::encoding::encodings_for_labels;
use bible_backend::json_export::format_size_mb;
use bible_backend::logger::{self, format_duration};
use bible_backend::lookup::{BibleIndex, VerseReference};
use bible_backend::source_json::UnmappedNamePolicy;

use crate::console;

/// Verses shown after a conversion, Genesis 1:1-3.
const SAMPLE_BOOK: &str = "창세기";
const SAMPLE_ABBR: &str = "창";
const SAMPLE_CHAPTER: u32 = 1;
const SAMPLE_VERSES: std::ops::RangeInclusive<u32> = 1..=3;

pub fn convert_text(config: &ConverterConfig) -> Result<()> {
    console::banner("Bible text to JSON");
    for input in config.text_inputs.iter() {
        println!("Input:  {}", input.display());
    }
    println!("Output: {}\n", config.text_output.display());

    let start = Instant::now();
    let encodings = encodings_for_labels(&config.text_encodings)?;

    if let Some(input) = config.existing_text_input() {
        if config.text_inputs.first().map(|p| p.as_path()) != Some(input) {
            logger::info(&format!("Primary text input missing, using {:?}", input));
            console::info(&format!("Using fallback input: {}", input.display()));
        }
    }

    let job = TextConversion {
        inputs: &config.text_inputs,
        output: &config.text_output,
        encodings: &encodings,
        format: config.text_format,
    };

    let outcome = run_text_conversion(&job, |book| {
        println!("  Processing: {}", book.name);
    })?;

    let stats = &outcome.stats;
    if let Some(encoding) = stats.encoding.as_ref() {
        console::ok(&format!("Decoded as {}", encoding));
    }
    console::ok(&format!("Parsed {} books, {} verses", stats.books, stats.verses));
    if stats.skipped_malformed + stats.skipped_unknown_book > 0 {
        console::info(&format!(
            "Skipped {} malformed lines and {} lines with an unknown book",
            stats.skipped_malformed, stats.skipped_unknown_book,
        ));
    }
    if stats.duplicates_replaced > 0 {
        console::warn(&format!("Replaced {} duplicate verses", stats.duplicates_replaced));
    }
    if stats.chapters_out_of_range > 0 {
        console::warn(&format!("{} verses have a chapter past the end of their book", stats.chapters_out_of_range));
    }

    console::ok(&format!("Saved JSON: {}", outcome.output.display()));
    println!("  File size: {}", format_size_mb(outcome.output_bytes));

    println!("  Elapsed: {}", format_duration(start.elapsed()));

    print_samples(|verse| outcome.bible.get_text(SAMPLE_BOOK, SAMPLE_CHAPTER, verse));

    Ok(())
}

pub fn convert_source(config: &ConverterConfig, strict: bool) -> Result<()> {
    console::banner("Structured JSON source to flat JSON");
    println!("Input:  {}", config.source_input.display());
    println!("Output: {}\n", config.source_output.display());

    let policy = if strict { UnmappedNamePolicy::Fail } else { UnmappedNamePolicy::Verbatim };

    let start = Instant::now();
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let result = run_source_conversion(&config.source_input, &config.source_output, policy, |name, abbr, total| {
        pb.set_length(total as u64);
        pb.set_message(format!("{} ({})", name, abbr));
        pb.inc(1);
    });
    pb.finish_and_clear();
    let outcome = result?;

    console::ok(&format!("Converted {} books, {} verses", outcome.report.books, outcome.report.verses));
    for name in outcome.report.unmapped_names.iter() {
        console::warn(&format!("No abbreviation for '{}', keys use the name as is", name));
    }

    console::ok(&format!("Saved JSON: {}", outcome.output.display()));
    println!("  File size: {}", format_size_mb(outcome.output_bytes));

    println!("  Elapsed: {}", format_duration(start.elapsed()));

    print_samples(|verse| outcome.flat.get(&format!("{}{}:{}", SAMPLE_ABBR, SAMPLE_CHAPTER, verse)));

    Ok(())
}

fn print_samples<'a, F>(lookup: F)
where
    F: Fn(u32) -> Option<&'a str>,
{
    let samples: Vec<(u32, &str)> = SAMPLE_VERSES
        .filter_map(|v| lookup(v).map(|text| (v, text)))
        .collect();
    if samples.is_empty() {
        return;
    }

    println!();
    console::banner(&format!("Sample: {} {}:{}-{}", SAMPLE_BOOK, SAMPLE_CHAPTER, SAMPLE_VERSES.start(), SAMPLE_VERSES.end()));
    for (verse, text) in samples {
        println!("{}{}:{} {}", SAMPLE_ABBR, SAMPLE_CHAPTER, verse, text);
    }
}

pub fn show_verse(file: &Path, reference: &str) -> Result<()> {
    let reference = VerseReference::parse(reference)?;
    let index = BibleIndex::load(file)?;

    let verses = index.get_reference(&reference);
    if verses.is_empty() {
        return Err(anyhow!("No verses found for {}{}:{} in {}",
                           reference.abbr, reference.chapter, reference.start_verse, file.display()));
    }

    for (key, text) in verses {
        println!("{} {}", key, text);
    }
    Ok(())
}

pub fn search(file: &Path, query: &str, limit: usize) -> Result<()> {
    let index = BibleIndex::load(file)?;
    let hits = index.search(query, limit);
    logger::info(&format!("Search '{}' in {:?}: {} hits", query, file, hits.len()));

    for hit in hits.iter() {
        println!("{} {}", hit.key, hit.text);
    }
    console::info(&format!("{} results", hits.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bible_backend::config::OutputFormat;
    use std::fs;
    use tempfile::TempDir;

    fn write_sample_text(config: &ConverterConfig) {
        fs::write(
            &config.text_inputs[1],
            "창1:1 <천지 창조> 태초에 하나님이 천지를 창조하시니라\n창1:2 땅이 혼돈하고\n요일1:1 태초부터\n",
        ).unwrap();
    }

    #[test]
    fn test_convert_text_with_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConverterConfig::with_defaults(dir.path());
        write_sample_text(&config);

        convert_text(&config).unwrap();
        assert!(config.text_output.is_file());
    }

    #[test]
    fn test_convert_text_flat_then_lookup() {
        let dir = TempDir::new().unwrap();
        let mut config = ConverterConfig::with_defaults(dir.path());
        config.text_format = OutputFormat::Flat;
        config.text_output = config.lookup_file.clone();
        write_sample_text(&config);

        convert_text(&config).unwrap();
        show_verse(&config.lookup_file, "창세기 1:1-2").unwrap();
        assert!(show_verse(&config.lookup_file, "창5:1").is_err());
        search(&config.lookup_file, "태초", 50).unwrap();
    }

    #[test]
    fn test_convert_text_unknown_encoding_label() {
        let dir = TempDir::new().unwrap();
        let mut config = ConverterConfig::with_defaults(dir.path());
        config.text_encodings = vec!["klingon".to_string()];
        write_sample_text(&config);

        assert!(convert_text(&config).is_err());
        assert!(!config.text_output.exists());
    }

    #[test]
    fn test_convert_source_missing_input() {
        let dir = TempDir::new().unwrap();
        let config = ConverterConfig::with_defaults(dir.path());

        let err = convert_source(&config, false).unwrap_err();
        assert!(crate::error_hint(&err).is_some());
        assert!(!config.source_output.exists());
    }

    #[test]
    fn test_convert_source_strict() {
        let dir = TempDir::new().unwrap();
        let config = ConverterConfig::with_defaults(dir.path());
        fs::create_dir_all(config.source_input.parent().unwrap()).unwrap();
        fs::write(
            &config.source_input,
            r#"{"book": {"1": {"info": {"name": "창세기"}, "chapter": {"1": {"verse": {"1": {"text": " 태초에 "}}}}},
                         "2": {"info": {"name": "Exodus"}, "chapter": {}}}}"#,
        ).unwrap();

        assert!(convert_source(&config, true).is_err());
        assert!(!config.source_output.exists());

        convert_source(&config, false).unwrap();
        let index = BibleIndex::load(&config.source_output).unwrap();
        assert_eq!(index.get_verse("창", 1, 1), Some("태초에"));
    }
}
