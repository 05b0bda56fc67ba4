use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::errors::{ConvertError, ConvertResult};
use crate::logger;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Writes `value` as pretty JSON (two-space indent, non-ASCII kept as is).
/// Returns the size of the written file in bytes.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> ConvertResult<u64> {
    let write_err = |e: std::io::Error| ConvertError::Write { path: path.to_path_buf(), source: e };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| write_err(std::io::Error::other(e)))?;
    writer.flush().map_err(write_err)?;

    let size = fs::metadata(path).map_err(write_err)?.len();
    logger::info(&format!("Wrote {:?} ({} bytes)", path, size));

    Ok(size)
}

pub fn size_in_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// 1.23 MB
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} MB", size_in_mb(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_pretty_utf8_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out").join("bible.json");

        let mut m = BTreeMap::new();
        m.insert("창1:1", "태초에");

        let size = write_json_pretty(&path, &m).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert_eq!(content, "{\n  \"창1:1\": \"태초에\"\n}");
        assert_eq!(size, content.len() as u64);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        // a directory cannot be opened as a file
        let err = write_json_pretty(dir.path(), &vec![1, 2]).unwrap_err();
        assert!(matches!(err, ConvertError::Write { .. }));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size_mb(0), "0.00 MB");
        assert_eq!(format_size_mb(1024 * 1024 * 3 / 2), "1.50 MB");
    }
}
