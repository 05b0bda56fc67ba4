// Character encoding detection for legacy Korean Bible text files.
// Tries a list of candidate encodings in order and keeps the first one that
// decodes the whole file without errors.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::{Encoding, EUC_KR, UTF_16BE, UTF_16LE, UTF_8};

use crate::errors::{ConvertError, ConvertResult};
use crate::logger;

/// Candidate labels tried when none are configured.
pub const DEFAULT_ENCODING_LABELS: [&str; 3] = ["cp949", "euc-kr", "utf-8"];

#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
}

/// Resolves an encoding label. Accepts the WHATWG labels known to encoding_rs
/// plus the Windows code page names commonly used for Korean text.
pub fn encoding_for_label(label: &str) -> ConvertResult<&'static Encoding> {
    let normalized = label.trim().to_lowercase();
    match normalized.as_str() {
        // encoding_rs implements EUC-KR as the windows-949 superset
        "cp949" | "ms949" | "uhc" => Ok(EUC_KR),
        _ => Encoding::for_label(normalized.as_bytes())
            .ok_or_else(|| ConvertError::UnknownEncoding(label.to_string())),
    }
}

pub fn encodings_for_labels<S: AsRef<str>>(labels: &[S]) -> ConvertResult<Vec<&'static Encoding>> {
    labels.iter()
        .map(|l| encoding_for_label(l.as_ref()))
        .collect()
}

pub fn default_encodings() -> Vec<&'static Encoding> {
    DEFAULT_ENCODING_LABELS.iter()
        .map(|l| encoding_for_label(l))
        .collect::<ConvertResult<Vec<_>>>()
        .unwrap_or_else(|_| vec![EUC_KR, UTF_8])
}

/// Reads a text file, decodes it with the first candidate that fits, and
/// converts to Unix line endings.
pub fn read_text_file(path: &Path, candidates: &[&'static Encoding]) -> ConvertResult<DecodedText> {
    let mut file = File::open(path)
        .map_err(|e| ConvertError::ReadInput { path: path.to_path_buf(), source: e })?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ConvertError::ReadInput { path: path.to_path_buf(), source: e })?;

    decode_bytes(&bytes, candidates).ok_or_else(|| ConvertError::Decode {
        path: path.to_path_buf(),
        tried: tried_labels(&bytes, candidates),
    })
}

/// Strict decoding: a candidate is accepted only if every byte sequence is
/// valid for it. A byte order mark overrides the candidate list.
pub fn decode_bytes(bytes: &[u8], candidates: &[&'static Encoding]) -> Option<DecodedText> {
    if let Some((encoding, bom_len)) = detect_bom(bytes) {
        logger::info(&format!("Encoding: {} (BOM)", encoding.name()));
        return decode_strict(&bytes[bom_len..], encoding);
    }

    let mut tried: Vec<&'static Encoding> = Vec::new();
    for &encoding in candidates {
        if tried.contains(&encoding) {
            continue;
        }
        tried.push(encoding);

        match decode_strict(bytes, encoding) {
            Some(decoded) => {
                logger::info(&format!("Encoding: {}", encoding.name()));
                return Some(decoded);
            }
            None => logger::debug(&format!("Not decodable as {}", encoding.name())),
        }
    }

    None
}

fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Option<DecodedText> {
    let decoded = encoding.decode_without_bom_handling_and_without_replacement(bytes)?;
    Some(DecodedText {
        text: decoded.replace("\r\n", "\n"),
        encoding,
    })
}

fn tried_labels(bytes: &[u8], candidates: &[&'static Encoding]) -> Vec<String> {
    match detect_bom(bytes) {
        Some((encoding, _)) => vec![format!("{} (BOM)", encoding.name())],
        None => {
            let mut names: Vec<String> = Vec::new();
            for e in candidates {
                let name = e.name().to_string();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            names
        }
    }
}

/// Detects the encoding from a byte order mark. Returns the BOM length.
fn detect_bom(bytes: &[u8]) -> Option<(&'static Encoding, usize)> {
    // UTF-8 BOM: 0xEF 0xBB 0xBF
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some((UTF_8, 3));
    }

    // UTF-16LE BOM: 0xFF 0xFE
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Some((UTF_16LE, 2));
    }

    // UTF-16BE BOM: 0xFE 0xFF
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Some((UTF_16BE, 2));
    }

    None
}
