// List command implementation

use std::fs;
use std::path::PathBuf;

use serde_json::json;

use crate::cli::make_orchestrator;
use crate::models::package_manager::PackageManager;
use crate::services::course_repository::{CourseRepository, SLIDES_SOURCE_FILE};
use crate::utils::error::{CourseError, Result};
use crate::utils::frontmatter::parse_frontmatter;

/// List the lectures in this course
pub struct ListCommand {
    /// Output JSON instead of human-readable text
    pub json: bool,
    /// Course root directory
    pub dir: PathBuf,
    /// Package manager for the lecture toolchain
    pub package_manager: PackageManager,
}

impl ListCommand {
    /// Execute the list command
    pub async fn execute(&self) -> Result<()> {
        let orchestrator = make_orchestrator(&self.dir, self.package_manager);
        let repo = orchestrator.repository();

        let lectures = repo.list_lecture_directories();
        let slides_config = repo.read_slides_config();

        let mut listed = Vec::new();
        for name in lectures {
            let recorded = slides_config
                .as_ref()
                .and_then(|config| config.find(&name).map(|entry| entry.title.clone()));
            let title = match recorded {
                Some(title) => title,
                None => frontmatter_title(repo, &name).unwrap_or_else(|| "(untitled)".to_string()),
            };
            listed.push((name, title));
        }

        if self.json {
            let response = json!({
                "lectures": listed
                    .iter()
                    .map(|(name, title)| json!({ "name": name, "title": title }))
                    .collect::<Vec<_>>(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .map_err(|e| CourseError::Config(format!("JSON serialization error: {e}")))?
            );
        } else if listed.is_empty() {
            println!("No lectures yet");
            println!("\nCreate one with:");
            println!("  slidecourse new \"My First Lecture\"");
        } else {
            println!("Lectures:");
            for (name, title) in &listed {
                println!("  {name}: {title}");
            }
        }

        Ok(())
    }
}

/// Title straight from the slides source, for lectures slides.json does
/// not know about yet
fn frontmatter_title(repo: &CourseRepository, name: &str) -> Option<String> {
    let source = fs::read_to_string(repo.lecture_dir(name).join(SLIDES_SOURCE_FILE)).ok()?;
    let (frontmatter, _) = parse_frontmatter(&source).ok()?;
    frontmatter.title().ok().map(str::to_string)
}
