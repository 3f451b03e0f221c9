// Common error types for slidecourse

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::utils::frontmatter::FrontmatterError;

/// Classification of a failed build step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildErrorKind {
    /// The lecture directory is missing or has no slides source file
    LectureNotFound,
    /// The package-manager executable could not be found on this host
    NpmNotFound,
    /// The install or build step failed
    BuildFailed,
    /// A one-shot command exceeded its time limit
    Timeout,
}

impl BuildErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildErrorKind::LectureNotFound => "lecture-not-found",
            BuildErrorKind::NpmNotFound => "npm-not-found",
            BuildErrorKind::BuildFailed => "build-failed",
            BuildErrorKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for BuildErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error produced by the build pipeline
#[derive(Debug, Clone)]
pub struct BuildError {
    pub kind: BuildErrorKind,
    pub lecture: Option<String>,
    pub message: String,
    pub exit_code: Option<i32>,
}

impl BuildError {
    pub fn new(kind: BuildErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            lecture: None,
            message: message.into(),
            exit_code: None,
        }
    }

    pub fn with_lecture(mut self, lecture: impl Into<String>) -> Self {
        self.lecture = Some(lecture.into());
        self
    }

    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(lecture) = &self.lecture {
            write!(f, " lecture '{}':", lecture)?;
        }
        write!(f, " {}", self.message)?;
        if let Some(code) = self.exit_code {
            write!(f, " (exit code {})", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for BuildError {}

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum CourseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
    #[error("{0}")]
    Build(#[from] BuildError),
    /// The slides config changed on disk between read and write
    #[error("Conflicting write to {}: the file changed on disk during the update", path.display())]
    WriteConflict { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, CourseError>;

/// Error presentation for the CLI entry point: message plus exit code
pub struct UserError {
    pub message: String,
    pub exit_code: i32,
}

impl UserError {
    pub fn from_course_error(err: &CourseError) -> Self {
        let exit_code = match err {
            CourseError::Validation(_) => 2,
            CourseError::Build(build) => match build.kind {
                BuildErrorKind::LectureNotFound => 3,
                _ => 1,
            },
            _ => 1,
        };
        Self {
            message: err.to_string(),
            exit_code,
        }
    }

    pub fn print(&self) {
        eprintln!("Error: {}", self.message);
    }
}
