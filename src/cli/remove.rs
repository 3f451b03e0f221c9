// Remove command implementation
// Deletes a lecture directory, its aggregated output and its slides.json
// entry, then regenerates the course index.

use std::path::PathBuf;

use dialoguer::Confirm;

use crate::cli::make_orchestrator;
use crate::models::package_manager::PackageManager;
use crate::utils::error::{CourseError, Result};
use crate::utils::fs_utils::remove_dir_if_exists;

/// Delete a lecture and its aggregated output
pub struct RemoveCommand {
    /// Lecture folder name
    pub lecture: String,
    /// Skip the confirmation prompt
    pub yes: bool,
    /// Course root directory
    pub dir: PathBuf,
    /// Package manager for the lecture toolchain
    pub package_manager: PackageManager,
}

impl RemoveCommand {
    /// Execute the remove command
    pub async fn execute(&self) -> Result<()> {
        let orchestrator = make_orchestrator(&self.dir, self.package_manager);
        let repo = orchestrator.repository();

        let lecture_dir = repo.lecture_dir(&self.lecture);
        if !lecture_dir.is_dir() {
            return Err(CourseError::Validation(format!(
                "No lecture named '{}' in this course.\n\nUse 'slidecourse list' to see the lectures.",
                self.lecture
            )));
        }

        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Delete lecture '{}' and its build output?",
                    self.lecture
                ))
                .default(false)
                .interact()
                .map_err(|e| CourseError::Config(format!("confirmation prompt failed: {e}")))?;
            if !confirmed {
                println!("Aborted");
                return Ok(());
            }
        }

        remove_dir_if_exists(&lecture_dir)?;
        if let Some(output_dir) = repo.course_output_dir() {
            remove_dir_if_exists(&output_dir.join(&self.lecture))?;
            repo.remove_lecture_entry(&self.lecture).await?;
            orchestrator.regenerate_index();
        }

        println!("Removed lecture '{}'", self.lecture);
        Ok(())
    }
}
