// Course name validation
// Course names become directory names and URL path segments, so the rules
// are stricter than for display titles.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

const MAX_COURSE_NAME_LENGTH: usize = 100;

/// Device names that Windows refuses as file names, matched against the
/// portion of the name before the first '.'
const RESERVED_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// A rejected course name, with one distinct variant per reason
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseNameError {
    #[error("Course name cannot be empty")]
    Empty,
    #[error("Course name is too long ({0} characters, maximum is {MAX_COURSE_NAME_LENGTH})")]
    TooLong(usize),
    #[error("Course name cannot contain Cyrillic letters; transliterate to Latin first")]
    CyrillicLetters,
    #[error("Course name cannot contain spaces; use '-' or '_' instead")]
    ContainsWhitespace,
    #[error("Course name cannot contain '{0}' (forbidden: < > : \" / \\ | ? *)")]
    ForbiddenCharacter(char),
    #[error("'{0}' is a reserved device name and cannot be used as a course name")]
    ReservedName(String),
    #[error("Course name must start and end with a letter or digit and may contain only letters, digits, '-', '.' and '_'")]
    InvalidFormat,
}

/// Validate a course name, returning the specific rejection reason
pub fn validate_course_name(name: &str) -> Result<(), CourseNameError> {
    if name.trim().is_empty() {
        return Err(CourseNameError::Empty);
    }

    if name.chars().count() > MAX_COURSE_NAME_LENGTH {
        return Err(CourseNameError::TooLong(name.chars().count()));
    }

    if name
        .chars()
        .any(|c| ('\u{0400}'..='\u{04FF}').contains(&c))
    {
        return Err(CourseNameError::CyrillicLetters);
    }

    if name.chars().any(char::is_whitespace) {
        return Err(CourseNameError::ContainsWhitespace);
    }

    if let Some(c) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(CourseNameError::ForbiddenCharacter(c));
    }

    let stem = name.split('.').next().unwrap_or(name);
    if RESERVED_NAMES.contains(&stem.to_ascii_lowercase().as_str()) {
        return Err(CourseNameError::ReservedName(stem.to_string()));
    }

    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9]$|^[a-zA-Z0-9][a-zA-Z0-9\-._]*[a-zA-Z0-9]$")
            .expect("static course name pattern compiles")
    });
    if !re.is_match(name) {
        return Err(CourseNameError::InvalidFormat);
    }

    Ok(())
}
