use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use chrono::{DateTime, Local};

use crate::get_create_bible_dir;

/// Number of rotated log files kept next to log.txt
const KEEP_LOG_FILES: usize = 5;

/// Log levels representing increasing verbosity.
///
/// Setting a log level enables that level and all less verbose levels below it:
///
/// - **Silent (0)**: No logging output
/// - **Error (1)**: Only error messages
/// - **Warn (2)**: Warning and error messages
/// - **Info (3)**: Informational, warning, and error messages (default)
/// - **Debug (4)**: All messages including debug output
///
/// The level can be set via the `LOG_LEVEL` environment variable or at runtime
/// using `set_log_level()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Silent = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Level {
    /// Parse a log level from a string (case insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "silent" => Some(Level::Silent),
            "error" => Some(Level::Error),
            "warn" => Some(Level::Warn),
            "info" => Some(Level::Info),
            "debug" => Some(Level::Debug),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Silent => "Silent",
            Level::Error => "Error",
            Level::Warn => "Warn",
            Level::Info => "Info",
            Level::Debug => "Debug",
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Rotates log files, keeping only the last few.
fn rotate_log_files(log_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match log_file.try_exists() {
        Ok(true) => {}
        Ok(false) | Err(_) => return Ok(()),
    }

    let modified = std::fs::metadata(log_file)?.modified()?;
    let datetime: DateTime<Local> = modified.into();
    let timestamp = datetime.format("%Y-%m-%dT%H-%M-%S");

    let parent = log_file.parent().ok_or("No parent directory")?;
    let new_path = parent.join(format!("log.{}.txt", timestamp));
    std::fs::rename(log_file, &new_path)?;

    let mut log_files: Vec<PathBuf> = std::fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|f| f.starts_with("log.") && f.ends_with(".txt") && f != "log.txt")
                .unwrap_or(false)
        })
        .collect();

    // Sorting by filename sorts by datetime
    log_files.sort();

    if log_files.len() > KEEP_LOG_FILES {
        for file in &log_files[0..log_files.len() - KEEP_LOG_FILES] {
            if let Err(e) = std::fs::remove_file(file) {
                eprintln!("Failed to remove old log file {:?}: {}", file, e);
            }
        }
    }

    Ok(())
}

pub struct Logger {
    log_file: PathBuf,
    disable_log: bool,
    enable_print_log: bool,
    level: Arc<Mutex<Level>>,
}

impl Logger {
    /// Logs to `<bible_dir>/log.txt`, where bible_dir comes from BIBLE_DIR or the app data root.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        if env_flag("DISABLE_LOG") {
            return Ok(Logger::in_dir(Path::new("")));
        }
        let data_dir = get_create_bible_dir()
            .map_err(|e| format!("Failed to get bible_dir: {}", e))?;
        Ok(Logger::in_dir(&data_dir))
    }

    /// Logs to `<dir>/log.txt`, rotating the previous log file.
    pub fn in_dir(dir: &Path) -> Self {
        let disable_log = env_flag("DISABLE_LOG");
        let enable_print_log = env_flag("ENABLE_PRINT_LOG");

        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Level::from_str(&v))
            .unwrap_or(Level::Info);

        let log_file = if disable_log {
            PathBuf::new()
        } else {
            let log_file = dir.join("log.txt");
            if let Err(e) = rotate_log_files(&log_file) {
                eprintln!("Failed to rotate log files: {}", e);
            }
            log_file
        };

        Logger {
            log_file,
            disable_log,
            enable_print_log,
            level: Arc::new(Mutex::new(level)),
        }
    }

    /// A logger that drops every message.
    pub fn disabled() -> Self {
        Logger {
            log_file: PathBuf::new(),
            disable_log: true,
            enable_print_log: false,
            level: Arc::new(Mutex::new(Level::Silent)),
        }
    }

    pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // stdout carries the converter's own progress lines
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;

        Ok(())
    }

    fn write_to_file(&self, message: &str) -> Result<(), Box<dyn std::error::Error>> {
        if self.disable_log {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ");
        let log_line = format!("[{}] {}\n", timestamp, message);

        file.write_all(log_line.as_bytes())?;

        Ok(())
    }

    fn enabled(&self, at: Level) -> bool {
        self.level.lock().map(|l| *l >= at).unwrap_or(true)
    }

    fn log(&self, at: Level, msg: &str) {
        if !self.enabled(at) {
            return;
        }

        if self.enable_print_log {
            match at {
                Level::Debug => tracing::debug!("{}", msg),
                Level::Info => tracing::info!("{}", msg),
                Level::Warn => tracing::warn!("{}", msg),
                Level::Error => tracing::error!("{}", msg),
                Level::Silent => {}
            }
        }

        let formatted_msg = format!("{}: {}", at.as_str().to_uppercase(), msg);
        if let Err(e) = self.write_to_file(&formatted_msg) {
            eprintln!("Failed to write to log file: {}", e);
        }
    }

    pub fn debug(&self, msg: &str) {
        self.log(Level::Debug, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(Level::Info, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.log(Level::Warn, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(Level::Error, msg);
    }

    /// Returns Level::Info if the lock cannot be acquired.
    pub fn get_level(&self) -> Level {
        self.level.lock().map(|l| *l).unwrap_or(Level::Info)
    }

    pub fn set_level(&self, new_level: Level) {
        if let Ok(mut level) = self.level.lock() {
            *level = new_level;
        }
    }
}

pub static LOGGER: OnceLock<Logger> = OnceLock::new();
static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

fn with_logger<F, R>(f: F) -> R
where
    F: FnOnce(&Logger) -> R,
{
    TRACING_INITIALIZED.get_or_init(|| {
        if let Err(e) = Logger::init_tracing() {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });

    let logger = LOGGER.get_or_init(|| {
        match Logger::new() {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("Failed to create logger: {}", e);
                Logger::disabled()
            }
        }
    });

    f(logger)
}

/// Sets up the global logger to write under `bible_dir`. Has to run before the
/// first message, returns false if the logger already exists.
pub fn init_in_dir(bible_dir: &Path) -> bool {
    LOGGER.set(Logger::in_dir(bible_dir)).is_ok()
}

pub fn info(msg: &str) {
    with_logger(|logger| logger.info(msg));
}

pub fn warn(msg: &str) {
    with_logger(|logger| logger.warn(msg));
}

pub fn error(msg: &str) {
    with_logger(|logger| logger.error(msg));
}

pub fn debug(msg: &str) {
    with_logger(|logger| logger.debug(msg));
}

pub fn get_log_level() -> Level {
    with_logger(|logger| logger.get_level())
}

pub fn set_log_level(level: Level) {
    with_logger(|logger| logger.set_level(level));
}

/// Set the log level from a string (case insensitive).
/// Returns false if the string is not a valid level.
pub fn set_log_level_str(level_str: &str) -> bool {
    if let Some(level) = Level::from_str(level_str) {
        set_log_level(level);
        true
    } else {
        false
    }
}

/// 00:01:05
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering_and_parse() {
        assert!(Level::Debug > Level::Info);
        assert!(Level::Silent < Level::Error);
        assert_eq!(Level::from_str("WARN"), Some(Level::Warn));
        assert_eq!(Level::from_str("verbose"), None);
        assert_eq!(Level::Info.as_str(), "Info");
    }

    #[test]
    fn test_disabled_logger_filters_everything() {
        let logger = Logger::disabled();
        assert_eq!(logger.get_level(), Level::Silent);
        assert!(!logger.enabled(Level::Error));
        logger.set_level(Level::Debug);
        assert!(logger.enabled(Level::Debug));
        // still never touches the filesystem
        logger.info("no-op");
    }

    #[test]
    fn test_rotate_keeps_last_files() {
        let dir = tempfile::TempDir::new().unwrap();
        for i in 0..7 {
            let name = format!("log.2024-01-0{}T00-00-00.txt", i + 1);
            std::fs::write(dir.path().join(name), "old").unwrap();
        }
        let log_file = dir.path().join("log.txt");
        std::fs::write(&log_file, "current").unwrap();

        rotate_log_files(&log_file).unwrap();

        assert!(!log_file.exists());
        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, KEEP_LOG_FILES);
    }

    #[test]
    fn test_logger_writes_under_given_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let logger = Logger::in_dir(dir.path());
        logger.set_level(Level::Info);
        logger.info("converted 창세기");

        if !env_flag("DISABLE_LOG") {
            let content = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
            assert!(content.contains("INFO: converted 창세기"));
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(3725)), "01:02:05");
    }
}
