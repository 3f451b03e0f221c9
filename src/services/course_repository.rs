// Course/lecture repository
// Owns the two persisted JSON documents (course.json at the course root,
// slides.json inside the aggregated output directory) and the on-disk
// lecture enumeration. Read paths swallow missing/malformed files into
// None with a logged diagnostic; write paths propagate I/O errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::models::course::CourseConfig;
use crate::models::slides::SlidesConfig;
use crate::utils::error::{CourseError, Result};
use crate::utils::output::OutputSink;

/// Course metadata file name, at the course root
pub const COURSE_CONFIG_FILE: &str = "course.json";
/// Lecture list file name, inside the aggregated output directory
pub const SLIDES_CONFIG_FILE: &str = "slides.json";
/// The slides source file that marks a directory as a lecture
pub const SLIDES_SOURCE_FILE: &str = "slides.md";
/// Generated course index document name
pub const INDEX_FILE: &str = "index.html";

pub struct CourseRepository {
    root: PathBuf,
    sink: Arc<dyn OutputSink>,
    // Serializes read-modify-write sequences against slides.json within
    // this process; the content-hash check below covers everything else.
    write_lock: Mutex<()>,
}

impl CourseRepository {
    pub fn new(root: impl Into<PathBuf>, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            root: root.into(),
            sink,
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn course_config_path(&self) -> PathBuf {
        self.root.join(COURSE_CONFIG_FILE)
    }

    /// True iff the course metadata file exists at the root
    pub fn is_course_root(&self) -> bool {
        self.course_config_path().is_file()
    }

    /// Parse the course metadata file. Missing, unparsable, or blank-named
    /// configs all come back as None with a logged diagnostic.
    pub fn read_course_config(&self) -> Option<CourseConfig> {
        let path = self.course_config_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                self.sink
                    .write_line(&format!("cannot read {}: {}", path.display(), e));
                return None;
            }
        };

        let config: CourseConfig = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                self.sink
                    .write_line(&format!("{} is malformed: {}", path.display(), e));
                return None;
            }
        };

        if config.course_name.trim().is_empty() {
            self.sink
                .write_line(&format!("{} has a blank course_name", path.display()));
            return None;
        }

        Some(config)
    }

    /// Serialize and overwrite the course metadata file
    pub fn write_course_config(&self, config: &CourseConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| CourseError::Config(format!("cannot serialize course config: {e}")))?;
        fs::write(self.course_config_path(), content + "\n")?;
        Ok(())
    }

    /// The aggregated output directory, named after the course
    pub fn course_output_dir(&self) -> Option<PathBuf> {
        self.read_course_config()
            .map(|config| self.root.join(config.course_name))
    }

    fn slides_config_path(&self) -> Option<PathBuf> {
        self.course_output_dir()
            .map(|dir| dir.join(SLIDES_CONFIG_FILE))
    }

    /// Read the lecture list from the aggregated output directory.
    /// None when the course name is unknown, the file is missing, or the
    /// content is malformed.
    pub fn read_slides_config(&self) -> Option<SlidesConfig> {
        let path = self.slides_config_path()?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                self.sink
                    .write_line(&format!("cannot read {}: {}", path.display(), e));
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                self.sink
                    .write_line(&format!("{} is malformed: {}", path.display(), e));
                None
            }
        }
    }

    /// Write the lecture list, creating the output directory as needed
    pub fn write_slides_config(&self, config: &SlidesConfig) -> Result<()> {
        let path = self.slides_config_path().ok_or_else(|| {
            CourseError::Config("course name is unknown; cannot locate slides.json".to_string())
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| CourseError::Config(format!("cannot serialize slides config: {e}")))?;
        fs::write(&path, content + "\n")?;
        Ok(())
    }

    /// Update the entry matching `name` in place or append a new one,
    /// preserving the order of existing entries
    pub async fn add_or_update_lecture_entry(&self, name: &str, title: &str) -> Result<()> {
        self.modify_slides_config(|config| config.upsert(name, title))
            .await
    }

    /// Filter the entry for `name` out of the lecture list
    pub async fn remove_lecture_entry(&self, name: &str) -> Result<()> {
        self.modify_slides_config(|config| config.remove(name))
            .await
    }

    /// Read-modify-write of slides.json under the in-process lock, with a
    /// content-hash check so a file changed behind our back is a
    /// WriteConflict instead of a silent lost update.
    async fn modify_slides_config(&self, mutate: impl FnOnce(&mut SlidesConfig)) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let path = self.slides_config_path().ok_or_else(|| {
            CourseError::Config("course name is unknown; cannot locate slides.json".to_string())
        })?;

        let seen_digest = content_digest(&path);
        let mut config = self.read_slides_config().unwrap_or_default();
        mutate(&mut config);

        if content_digest(&path) != seen_digest {
            return Err(CourseError::WriteConflict { path });
        }
        self.write_slides_config(&config)
    }

    /// Enumerate lecture directories: subdirectories of the course root
    /// that contain the slides source file, excluding dotfiles and the
    /// aggregated output directory, sorted lexicographically. Enumeration
    /// failures log and return an empty list.
    pub fn list_lecture_directories(&self) -> Vec<String> {
        let output_dir_name = self
            .read_course_config()
            .map(|config| config.course_name);

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                self.sink
                    .write_line(&format!("cannot list {}: {}", self.root.display(), e));
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if output_dir_name.as_deref() == Some(name.as_str()) {
                continue;
            }
            let path = entry.path();
            if path.is_dir() && path.join(SLIDES_SOURCE_FILE).is_file() {
                names.push(name);
            }
        }
        names.sort();
        names
    }

    /// Absolute path of one lecture directory
    pub fn lecture_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// Digest of the file's current content; None when the file is absent
fn content_digest(path: &Path) -> Option<[u8; 32]> {
    fs::read(path).ok().map(|bytes| Sha256::digest(&bytes).into())
}
