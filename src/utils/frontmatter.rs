// Frontmatter parsing for slides source files
// A slides file opens with a `---` delimited key: value block; the body
// after the closing delimiter is free-form markup owned by the slide tool.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontmatterError {
    #[error("no frontmatter block found (the file must start with a '---' line)")]
    NoFrontmatter,
    #[error("frontmatter block opened with '---' but never closed")]
    Unterminated,
    #[error("frontmatter has no '{0}' key")]
    MissingKey(String),
}

/// Parsed frontmatter: the key-value entries in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: Vec<(String, String)>,
}

impl Frontmatter {
    /// Look up a key, returning the first matching value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a key that must be present
    pub fn require(&self, key: &str) -> Result<&str, FrontmatterError> {
        self.get(key)
            .ok_or_else(|| FrontmatterError::MissingKey(key.to_string()))
    }

    /// The `title` value, required for every lecture
    pub fn title(&self) -> Result<&str, FrontmatterError> {
        self.require("title")
    }
}

/// Split a slides source document into its frontmatter block and body.
///
/// The first line must be exactly `---`; the block runs until the next
/// `---` line. Entries are `key: value` lines; lines without a colon
/// (layout hints, blank lines) are skipped. Values may be single- or
/// double-quoted.
pub fn parse_frontmatter(source: &str) -> Result<(Frontmatter, &str), FrontmatterError> {
    let mut lines = source.split_inclusive('\n');

    let first = lines.next().unwrap_or("");
    if first.trim_end_matches(['\n', '\r']) != "---" {
        return Err(FrontmatterError::NoFrontmatter);
    }

    let mut entries = Vec::new();
    let mut consumed = first.len();
    let mut closed = false;

    for line in lines {
        consumed += line.len();
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "---" {
            closed = true;
            break;
        }
        if let Some((key, value)) = trimmed.split_once(':') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            entries.push((key.to_string(), unquote(value.trim()).to_string()));
        }
    }

    if !closed {
        return Err(FrontmatterError::Unterminated);
    }

    Ok((Frontmatter { entries }, &source[consumed..]))
}

/// Strip one matching pair of single or double quotes
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
