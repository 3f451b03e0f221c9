// Init command implementation
// Creates course.json, the aggregated output directory, an empty
// slides.json and the initial index page.

use std::path::PathBuf;

use serde_json::json;

use crate::cli::make_orchestrator;
use crate::models::course::CourseConfig;
use crate::models::package_manager::PackageManager;
use crate::models::slides::SlidesConfig;
use crate::utils::error::{CourseError, Result};
use crate::utils::validation::validate_course_name;

/// Initialize a course in the target directory
pub struct InitCommand {
    /// Course name (default: directory name)
    pub name: Option<String>,
    /// Overwrite existing course.json
    pub force: bool,
    /// Output JSON instead of human-readable text
    pub json: bool,
    /// Course root directory
    pub dir: PathBuf,
    /// Package manager for the lecture toolchain
    pub package_manager: PackageManager,
}

impl InitCommand {
    /// Execute the init command
    pub async fn execute(&self) -> Result<()> {
        let course_name = match &self.name {
            Some(name) => name.clone(),
            None => self
                .dir
                .canonicalize()
                .ok()
                .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_default(),
        };

        validate_course_name(&course_name)
            .map_err(|e| CourseError::Validation(e.to_string()))?;

        let orchestrator = make_orchestrator(&self.dir, self.package_manager);
        let repo = orchestrator.repository();

        if repo.is_course_root() && !self.force {
            return Err(CourseError::Validation(format!(
                "{} already exists (use --force to overwrite)",
                repo.course_config_path().display()
            )));
        }

        repo.write_course_config(&CourseConfig::new(&course_name))?;

        // Seed the aggregated output directory so the course is servable
        // before the first build
        if repo.read_slides_config().is_none() {
            repo.write_slides_config(&SlidesConfig::new())?;
        }
        orchestrator.regenerate_index();

        if self.json {
            let response = json!({
                "status": "success",
                "course_name": course_name,
                "config_path": repo.course_config_path(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .map_err(|e| CourseError::Config(format!("JSON serialization error: {e}")))?
            );
        } else {
            println!("Initialized course '{course_name}'");
            println!("  config: {}", repo.course_config_path().display());
            println!("\nNext steps:");
            println!("  slidecourse new \"My First Lecture\"");
            println!("  slidecourse build");
        }

        Ok(())
    }
}
