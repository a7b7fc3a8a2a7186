//! Document entries reported by the content engine, and the fixup transform.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Character that word processors leave behind in place of a double hyphen.
pub const UNWANTED_CHAR: char = '\u{00D0}';

/// Replacement for the UTF-8 encoding of [`UNWANTED_CHAR`].
pub const FIXUP_REPLACEMENT: &str = "--";

/// Suffix appended to the fixed-up copy of a document.
pub const FIXUP_SUFFIX: &str = "-new";

/// Front matter of a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Parsed metadata
    #[serde(default)]
    pub yaml: Value,
    /// Raw front matter text
    #[serde(default)]
    pub text: String,
}

/// A document known to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentEntry {
    /// Path relative to its document root
    pub path: String,
    /// Absolute path on disk
    pub fullpath: PathBuf,
    #[serde(default)]
    pub frontmatter: Frontmatter,
}

/// Replace every UTF-8 encoded occurrence of the unwanted character.
///
/// Works on raw bytes so documents with mixed or legacy encodings pass
/// through with every other byte untouched.
pub fn fixup_bytes(content: &[u8]) -> Vec<u8> {
    let mut encoded = [0u8; 4];
    let needle = UNWANTED_CHAR.encode_utf8(&mut encoded).as_bytes();
    let replacement = FIXUP_REPLACEMENT.as_bytes();

    let mut out = Vec::with_capacity(content.len());
    let mut rest = content;
    while let Some(at) = rest.windows(needle.len()).position(|w| w == needle) {
        out.extend_from_slice(&rest[..at]);
        out.extend_from_slice(replacement);
        rest = &rest[at + needle.len()..];
    }
    out.extend_from_slice(rest);
    out
}

/// Sibling path the fixed-up document is written to: `<path>-new`.
pub fn fixup_target(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(FIXUP_SUFFIX);
    PathBuf::from(name)
}
