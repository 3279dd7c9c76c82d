//! Unified file reading strategies
//!
//! Provides consistent handling for:
//! - Binary files (sniffed from a bounded sample)
//! - Non-UTF-8 files (ordered encoding fallback)
//! - Read failures (folded into placeholder strings, never raised)
//!
//! The classifier and the reader share [`ENCODINGS`], so a file classified as
//! text is always one the reader can decode.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Number of leading bytes inspected by [`is_text_file`]
pub const SAMPLE_SIZE: usize = 1024;

/// Returned by [`read_text`] when no candidate encoding fits
pub const UNDECODABLE_MESSAGE: &str = "Error: Unable to decode file with available encodings";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Bytes with no assignment in the windows-1252 code page
const WINDOWS_1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Candidate text encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, with a leading byte-order mark stripped
    Utf8,
    /// windows-1252, strict (undefined bytes fail)
    Windows1252,
}

/// Decode order shared by the classifier and the reader
pub const ENCODINGS: [TextEncoding; 2] = [TextEncoding::Utf8, TextEncoding::Windows1252];

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }

    /// Decode the whole buffer, or `None` if it is not valid in this encoding
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                encoding_rs::UTF_8
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(Cow::into_owned)
            }
            TextEncoding::Windows1252 => {
                if bytes.iter().any(|b| WINDOWS_1252_UNDEFINED.contains(b)) {
                    return None;
                }
                encoding_rs::WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(Cow::into_owned)
            }
        }
    }
}

/// Outcome of one pass over the encoding list
#[derive(Debug)]
pub enum DecodeOutcome {
    /// The first encoding that accepted the bytes
    Decoded {
        text: String,
        encoding: TextEncoding,
    },
    /// Every candidate rejected the bytes
    DecodeFailed,
    /// The file could not be read at all
    IoFailed(io::Error),
}

/// Read a file and decode it with the first matching encoding
///
/// The file handle lives only for the duration of the read.
pub fn decode_file(path: &Path) -> DecodeOutcome {
    let bytes = match read_file_bytes(path) {
        Ok(b) => b,
        Err(e) => return DecodeOutcome::IoFailed(e),
    };

    for encoding in ENCODINGS {
        match encoding.decode(&bytes) {
            Some(text) => return DecodeOutcome::Decoded { text, encoding },
            None => continue,
        }
    }

    DecodeOutcome::DecodeFailed
}

/// Decide whether a file is textual
///
/// Unreadable files are reported as binary. Empty files are text. A NUL or
/// 0xFF byte in the first [`SAMPLE_SIZE`] bytes marks the file as binary;
/// otherwise the file is text iff some candidate encoding decodes all of it.
pub fn is_text_file(path: &Path) -> bool {
    let sample = match read_sample(path) {
        Ok(s) => s,
        Err(_) => return false,
    };

    if sample.is_empty() {
        return true;
    }

    if sample.iter().any(|&b| b == 0x00 || b == 0xFF) {
        return false;
    }

    matches!(decode_file(path), DecodeOutcome::Decoded { .. })
}

/// Read a presumed text file, folding failures into descriptive strings
///
/// Line endings are normalised: `\r\n` and lone `\r` both become `\n`.
pub fn read_text(path: &Path) -> String {
    match decode_file(path) {
        DecodeOutcome::Decoded { text, .. } => normalize_newlines(text),
        DecodeOutcome::DecodeFailed => UNDECODABLE_MESSAGE.to_string(),
        DecodeOutcome::IoFailed(e) => format!("Error reading file: {}", e),
    }
}

fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn read_sample(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buffer = Vec::with_capacity(SAMPLE_SIZE);
    file.take(SAMPLE_SIZE as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn read_file_bytes(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let capacity = file.metadata().map(|m| m.len() as usize).unwrap_or(0);
    let mut reader = BufReader::new(file);
    let mut buffer = Vec::with_capacity(capacity);
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}
