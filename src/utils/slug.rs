// Slug generation for lecture folder names
// Turns arbitrary user-supplied titles (any script) into filesystem- and
// URL-safe identifiers.

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

const MAX_SLUG_LENGTH: usize = 64;

/// Transliterate a single Cyrillic letter to its Latin digraph/letter.
/// Returns None for characters outside the Cyrillic table.
fn transliterate_cyrillic(c: char) -> Option<&'static str> {
    let mapped = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(mapped)
}

/// Map punctuation and symbols to words or separators.
/// Returns None for characters outside the symbol table.
fn map_symbol(c: char) -> Option<&'static str> {
    let mapped = match c {
        '@' => "-at-",
        '&' => "-and-",
        '#' => "-hash-",
        '+' => "-plus-",
        '%' => "-percent-",
        ' ' | '.' | '_' | '-' | '/' => "-",
        _ => return None,
    };
    Some(mapped)
}

/// Derive a filesystem- and URL-safe identifier from an arbitrary title.
///
/// Total: never fails and never returns an empty string. Cyrillic letters
/// transliterate to Latin, a fixed symbol table maps to words or
/// separators, everything else outside Latin alphanumerics becomes a
/// separator. Runs of separators collapse to one, the result is
/// lowercased, bounded to 64 characters, and falls back to a
/// `lecture-<timestamp>` identifier when nothing survives the mapping
/// (e.g. CJK-only input).
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if let Some(mapped) = transliterate_cyrillic(c) {
            slug.push_str(mapped);
        } else if let Some(mapped) = map_symbol(c) {
            slug.push_str(mapped);
        } else {
            slug.push('-');
        }
    }

    let mut collapsed = String::with_capacity(slug.len());
    for c in slug.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }
    let mut result = collapsed.trim_matches('-').to_string();

    if result.is_empty() {
        result = format!("lecture-{}", Utc::now().timestamp_millis());
    }

    if result.len() > MAX_SLUG_LENGTH {
        result.truncate(MAX_SLUG_LENGTH);
        result = result.trim_end_matches('-').to_string();
    }

    result
}

/// True iff `name` is a well-formed slug: a single alphanumeric, or
/// alphanumerics with interior hyphens only.
pub fn is_valid_slug(name: &str) -> bool {
    static SLUG_RE: OnceLock<Regex> = OnceLock::new();
    let re = SLUG_RE.get_or_init(|| {
        Regex::new("^[a-zA-Z0-9]$|^[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]$")
            .expect("static slug pattern compiles")
    });
    re.is_match(name)
}
