// New command implementation
// Scaffolds a lecture directory from the embedded template and records it
// in slides.json.

use std::path::PathBuf;

use serde_json::json;

use crate::cli::make_orchestrator;
use crate::models::package_manager::PackageManager;
use crate::services::scaffold;
use crate::utils::error::{CourseError, Result};
use crate::utils::slug::{generate_slug, is_valid_slug};

/// Scaffold a new lecture
pub struct NewCommand {
    /// Lecture title (any script)
    pub title: String,
    /// Folder name override
    pub name: Option<String>,
    /// Output JSON instead of human-readable text
    pub json: bool,
    /// Course root directory
    pub dir: PathBuf,
    /// Package manager for the lecture toolchain
    pub package_manager: PackageManager,
}

impl NewCommand {
    /// Execute the new command
    pub async fn execute(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CourseError::Validation(
                "Lecture title cannot be empty.\n\nUsage: slidecourse new <title>\nExample: slidecourse new \"Introduction\"".to_string(),
            ));
        }

        let orchestrator = make_orchestrator(&self.dir, self.package_manager);
        let repo = orchestrator.repository();

        if !repo.is_course_root() {
            return Err(CourseError::Validation(
                "This directory is not a course root.\n\nInitialize one first:\n  slidecourse init --name my-course".to_string(),
            ));
        }

        let name = match &self.name {
            Some(name) => {
                if !is_valid_slug(name) {
                    return Err(CourseError::Validation(format!(
                        "'{name}' is not a valid folder name.\n\nFolder names must be alphanumeric with interior hyphens only:\n  ✓ intro\n  ✓ lecture-1\n  ✗ -intro-"
                    )));
                }
                name.clone()
            }
            None => generate_slug(&self.title),
        };

        let lecture_dir = scaffold::scaffold_lecture(repo.root(), &name, self.title.trim())?;
        repo.add_or_update_lecture_entry(&name, self.title.trim())
            .await?;
        orchestrator.regenerate_index();

        if self.json {
            let response = json!({
                "status": "success",
                "name": name,
                "title": self.title.trim(),
                "path": lecture_dir,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .map_err(|e| CourseError::Config(format!("JSON serialization error: {e}")))?
            );
        } else {
            println!("Created lecture '{name}'");
            println!("  slides: {}", lecture_dir.join("slides.md").display());
            println!("\nNext steps:");
            println!("  slidecourse dev {name}");
            println!("  slidecourse build {name}");
        }

        Ok(())
    }
}
