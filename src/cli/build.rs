// Build command implementation
// Builds one lecture or the whole course into the aggregated site.

use std::path::PathBuf;

use serde_json::json;

use crate::cli::make_orchestrator;
use crate::models::package_manager::PackageManager;
use crate::utils::error::{BuildError, BuildErrorKind, CourseError, Result};

/// Build one lecture, or every lecture in the course
pub struct BuildCommand {
    /// Lecture folder name; None builds the whole course
    pub lecture: Option<String>,
    /// Output JSON instead of human-readable text
    pub json: bool,
    /// Course root directory
    pub dir: PathBuf,
    /// Package manager for the lecture toolchain
    pub package_manager: PackageManager,
}

impl BuildCommand {
    /// Execute the build command
    pub async fn execute(&self) -> Result<()> {
        let orchestrator = make_orchestrator(&self.dir, self.package_manager);

        match &self.lecture {
            Some(name) => {
                orchestrator.build_lecture(name).await?;
                if self.json {
                    let response = json!({ "status": "success", "lecture": name });
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&response).map_err(|e| {
                            CourseError::Config(format!("JSON serialization error: {e}"))
                        })?
                    );
                } else {
                    println!("Built lecture '{name}'");
                }
                Ok(())
            }
            None => {
                let summary = orchestrator.build_course().await;

                if self.json {
                    let response = json!({
                        "status": if summary.is_success() { "success" } else { "failure" },
                        "built": summary.built,
                        "failed": summary
                            .failed
                            .iter()
                            .map(|f| json!({ "name": f.name, "error": f.error }))
                            .collect::<Vec<_>>(),
                    });
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&response).map_err(|e| {
                            CourseError::Config(format!("JSON serialization error: {e}"))
                        })?
                    );
                } else {
                    for name in &summary.built {
                        println!("  ✓ {name}");
                    }
                    for failed in &summary.failed {
                        println!("  ✗ {}: {}", failed.name, failed.error);
                    }
                    println!(
                        "Built {} of {} lecture(s)",
                        summary.built.len(),
                        summary.total()
                    );
                }

                if summary.is_success() {
                    Ok(())
                } else {
                    Err(CourseError::Build(BuildError::new(
                        BuildErrorKind::BuildFailed,
                        format!(
                            "{} of {} lecture(s) failed to build",
                            summary.failed.len(),
                            summary.total()
                        ),
                    )))
                }
            }
        }
    }
}
