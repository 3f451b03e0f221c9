use serde::{Deserialize, Serialize};

use crate::utils::validation::validate_course_name;

/// Course metadata persisted as `course.json` at the course root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseConfig {
    /// Course name; doubles as the aggregated output directory name
    pub course_name: String,
}

impl CourseConfig {
    /// Create a new CourseConfig with the given course name
    pub fn new(course_name: impl Into<String>) -> Self {
        Self {
            course_name: course_name.into(),
        }
    }

    /// Validate the course name according to the naming rules
    pub fn validate(&self) -> Result<(), String> {
        validate_course_name(&self.course_name).map_err(|e| e.to_string())
    }
}
