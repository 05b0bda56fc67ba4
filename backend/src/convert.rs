//! End-to-end runs of the two converters: locate input, transform, write output.
//! Nothing is written unless the input was found and fully converted.

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use crate::books::Book;
use crate::config::{first_existing, OutputFormat};
use crate::errors::{ConvertError, ConvertResult};
use crate::json_export::write_json_pretty;
use crate::logger;
use crate::source_json::{convert_source_with, load_source, SourceReport, UnmappedNamePolicy};
use crate::text_parser::parse_bible_file_with;
use crate::types::{Bible, FlatBible, ParseStats};

#[derive(Debug, Clone)]
pub struct TextConversion<'a> {
    /// Candidate input files, the first existing one is used
    pub inputs: &'a [PathBuf],
    pub output: &'a Path,
    pub encodings: &'a [&'static Encoding],
    pub format: OutputFormat,
}

#[derive(Debug)]
pub struct TextOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub output_bytes: u64,
    pub stats: ParseStats,
    pub bible: Bible,
}

pub fn run_text_conversion<F>(job: &TextConversion<'_>, on_new_book: F) -> ConvertResult<TextOutcome>
where
    F: FnMut(&'static Book),
{
    let input = first_existing(job.inputs)
        .ok_or_else(|| ConvertError::MissingInput { paths: job.inputs.to_vec(), hint: None })?
        .to_path_buf();

    logger::info(&format!("Text conversion: {:?} -> {:?}", input, job.output));

    let (bible, stats) = parse_bible_file_with(&input, job.encodings, on_new_book)?;
    if bible.is_empty() {
        return Err(ConvertError::NoVerses { path: input });
    }

    let output_bytes = match job.format {
        OutputFormat::Nested => write_json_pretty(job.output, &bible)?,
        OutputFormat::Flat => write_json_pretty(job.output, &bible.to_flat())?,
    };

    Ok(TextOutcome {
        input,
        output: job.output.to_path_buf(),
        output_bytes,
        stats,
        bible,
    })
}

#[derive(Debug)]
pub struct SourceOutcome {
    pub output: PathBuf,
    pub output_bytes: u64,
    pub report: SourceReport,
    pub flat: FlatBible,
}

pub fn run_source_conversion<F>(
    input: &Path,
    output: &Path,
    policy: UnmappedNamePolicy,
    on_book: F,
) -> ConvertResult<SourceOutcome>
where
    F: FnMut(&str, &str, usize),
{
    logger::info(&format!("Source conversion: {:?} -> {:?}", input, output));

    let source = load_source(input)?;
    let (flat, report) = convert_source_with(&source, policy, on_book)?;
    let output_bytes = write_json_pretty(output, &flat)?;

    Ok(SourceOutcome {
        output: output.to_path_buf(),
        output_bytes,
        report,
        flat,
    })
}
