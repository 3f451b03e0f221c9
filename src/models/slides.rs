use serde::{Deserialize, Serialize};

/// One lecture as recorded in `slides.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureEntry {
    /// Slug-safe folder identifier, unique within a course
    pub name: String,
    /// Free-text display title
    pub title: String,
}

impl LectureEntry {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
        }
    }
}

/// Ordered lecture list persisted as `slides.json` inside the aggregated
/// course-output directory; array order is display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidesConfig {
    pub slides: Vec<LectureEntry>,
}

impl SlidesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the entry for a lecture name, if recorded
    pub fn find(&self, name: &str) -> Option<&LectureEntry> {
        self.slides.iter().find(|entry| entry.name == name)
    }

    /// Update the entry matching `name` in place, or append a new one.
    /// Existing entries keep their position; new entries go to the end.
    pub fn upsert(&mut self, name: &str, title: &str) {
        match self.slides.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.title = title.to_string(),
            None => self.slides.push(LectureEntry::new(name, title)),
        }
    }

    /// Remove the entry matching `name`, if present
    pub fn remove(&mut self, name: &str) {
        self.slides.retain(|entry| entry.name != name);
    }
}
