mod commands;
mod console;

use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use bible_backend::config::{ConverterConfig, OutputFormat};
use bible_backend::errors::ConvertError;
use bible_backend::{get_create_bible_dir, logger, SEARCH_LIMIT};

#[derive(Parser, Debug)]
#[command(author, version, about = "Korean Bible text and JSON converters", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Optional path to the base directory of the input and output files.
    /// If not provided, the BIBLE_DIR environment variable will be used.
    #[arg(long, global = true, value_name = "DIRECTORY_PATH", env = "BIBLE_DIR")]
    bible_dir: Option<PathBuf>,

    /// Log level for the log file: silent, error, warn, info, debug.
    /// Overrides the LOG_LEVEL environment variable.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a line-oriented Bible text file (창1:1 ...) to JSON
    ConvertText {
        /// Input text file. Repeat to give fallbacks, the first existing file is used.
        #[arg(long = "input", value_name = "FILE")]
        inputs: Vec<PathBuf>,

        /// Output JSON file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Comma-separated encodings to try in order, e.g. cp949,euc-kr,utf-8
        #[arg(long, value_name = "LIST", value_delimiter = ',')]
        encodings: Vec<String>,

        /// nested (book/chapter/verse objects) or flat ("창1:1": text)
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,
    },

    /// Convert a structured JSON Bible export with numeric keys to the flat format
    ConvertSource {
        /// Source JSON file, e.g. github-bible/json/86.json
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output JSON file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Fail on book names without a known abbreviation instead of using them as is
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Print a verse or a verse range, e.g. 창1:1, "창세기 1:1-3"
    #[command(arg_required_else_help = true)]
    Verse {
        #[arg(value_name = "REFERENCE")]
        reference: String,

        /// Flat JSON file to read
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Search verse texts for a substring
    #[command(arg_required_else_help = true)]
    Search {
        query: String,

        /// Flat JSON file to read
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Maximum number of results
        #[arg(long, default_value_t = SEARCH_LIMIT)]
        limit: usize,
    },
}

/// The remediation hint of the first backend error in the chain.
fn error_hint(err: &anyhow::Error) -> Option<String> {
    err.chain()
        .filter_map(|e| e.downcast_ref::<ConvertError>())
        .find_map(|e| e.hint().map(|h| h.to_string()))
}

fn main() {
    // .env may define BIBLE_DIR and the other BIBLE_* settings.
    // Clap picks up BIBLE_DIR via `env = "BIBLE_DIR"`.
    dotenv().ok();

    let cli = Cli::parse();

    // Determine the base directory
    // Precedence:
    // - given with --bible-dir
    // - set with env var BIBLE_DIR
    // - get_create_bible_dir(), the user data folder
    // - the current directory
    let bible_dir = match cli.bible_dir {
        Some(path) => path,
        None => match get_create_bible_dir() {
            Ok(p) => p,
            Err(e) => {
                console::info(&format!("Failed to get the bible directory ({}), using the current directory.", e));
                PathBuf::from(".")
            }
        },
    };

    if !bible_dir.is_dir() {
        console::error(&format!("Directory does not exist or is not a directory: {:?}", bible_dir));
        exit(1);
    }

    // The log file goes under the resolved directory, also when it came from --bible-dir
    logger::init_in_dir(&bible_dir);

    if let Some(level) = cli.log_level.as_deref() {
        if !logger::set_log_level_str(level) {
            console::error(&format!("Invalid log level: {}", level));
            exit(1);
        }
        logger::debug(&format!("Log level: {}", logger::get_log_level().as_str()));
    }

    let mut config = ConverterConfig::from_env(&bible_dir);

    // === Execute the requested command ===

    let command_result = match cli.command {
        Commands::ConvertText { inputs, output, encodings, format } => {
            if !inputs.is_empty() {
                config.text_inputs = inputs;
            }
            if let Some(p) = output {
                config.text_output = p;
            }
            if !encodings.is_empty() {
                config.text_encodings = encodings;
            }
            if let Some(f) = format {
                config.text_format = f;
            }
            commands::convert_text(&config)
        }

        Commands::ConvertSource { input, output, strict } => {
            if let Some(p) = input {
                config.source_input = p;
            }
            if let Some(p) = output {
                config.source_output = p;
            }
            commands::convert_source(&config, strict)
        }

        Commands::Verse { reference, file } => {
            let file = file.unwrap_or(config.lookup_file);
            commands::show_verse(&file, &reference)
        }

        Commands::Search { query, file, limit } => {
            let file = file.unwrap_or(config.lookup_file);
            commands::search(&file, &query, limit)
        }
    };

    if let Err(e) = command_result {
        logger::error(&format!("{:#}", e));
        console::error(&format!("{:#}", e));
        if let Some(hint) = error_hint(&e) {
            eprintln!("\n{}", hint);
        }
        exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_convert_text() {
        let cli = Cli::try_parse_from([
            "bible_cli", "convert-text",
            "--input", "a.txt", "--input", "b.txt",
            "--encodings", "cp949,utf-8",
            "--format", "flat",
        ]).unwrap();

        match cli.command {
            Commands::ConvertText { inputs, output, encodings, format } => {
                assert_eq!(inputs, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
                assert!(output.is_none());
                assert_eq!(encodings, vec!["cp949", "utf-8"]);
                assert_eq!(format, Some(OutputFormat::Flat));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["bible_cli", "convert-text", "--format", "tree"]).is_err());
    }

    #[test]
    fn test_cli_search_default_limit() {
        let cli = Cli::try_parse_from(["bible_cli", "search", "태초"]).unwrap();
        match cli.command {
            Commands::Search { query, limit, .. } => {
                assert_eq!(query, "태초");
                assert_eq!(limit, 50);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_error_hint_from_backend_error() {
        let err = anyhow::Error::new(ConvertError::MissingInput {
            paths: vec![PathBuf::from("86.json")],
            hint: Some("clone it".to_string()),
        });
        assert_eq!(error_hint(&err).as_deref(), Some("clone it"));
        assert!(error_hint(&anyhow::anyhow!("plain")).is_none());
    }
}
