// Build orchestrator
// Drives the per-lecture pipeline: ensure dependencies, build with the
// computed base path, copy artifacts into the aggregated course
// directory, reconcile the recorded title, regenerate the course index.
// Whole-course builds run the same pipeline per lecture, best-effort.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::models::package_manager::PackageManager;
use crate::services::course_repository::{CourseRepository, INDEX_FILE, SLIDES_SOURCE_FILE};
use crate::services::process_runner::{
    ProcessOutput, RunOptions, SessionHandle, StreamKind, ToolRunner,
};
use crate::services::scaffold;
use crate::utils::error::{BuildError, BuildErrorKind, CourseError, Result};
use crate::utils::frontmatter::parse_frontmatter;
use crate::utils::fs_utils::{copy_dir_recursive, remove_dir_if_exists};
use crate::utils::output::OutputSink;

/// Local build output subdirectory produced by the slide tool
pub const BUILD_OUTPUT_DIR: &str = "dist";
/// Dependency cache directory whose absence triggers an install
pub const DEPENDENCY_CACHE_DIR: &str = "node_modules";

const BUILD_SCRIPT: &str = "build";
const DEV_SCRIPT: &str = "dev";
const LECTURES_MARKER: &str = "<!-- slidecourse:lectures -->";

/// Maps a failed process result onto the build error taxonomy. The
/// taxonomy is the contract; this seam exists so the default
/// message-sniffing heuristic can be swapped for checked exit codes
/// without touching the orchestrator.
pub trait FailureClassifier: Send + Sync {
    fn classify(&self, output: &ProcessOutput, lecture: Option<&str>) -> BuildErrorKind;
}

/// Default classifier: inspects the failure message for tool-missing and
/// timeout markers
pub struct MessageHeuristicClassifier;

impl FailureClassifier for MessageHeuristicClassifier {
    fn classify(&self, output: &ProcessOutput, lecture: Option<&str>) -> BuildErrorKind {
        let message = output.stderr.to_lowercase();
        if message.contains("timed out") || message.contains("timeout") {
            return BuildErrorKind::Timeout;
        }
        let tool_missing = message.contains("enoent")
            || message.contains("not found")
            || message.contains("os error 2");
        if tool_missing && lecture.is_some() {
            return BuildErrorKind::NpmNotFound;
        }
        BuildErrorKind::BuildFailed
    }
}

/// One lecture that failed during a whole-course build
#[derive(Debug, Clone)]
pub struct FailedLecture {
    pub name: String,
    pub error: String,
}

/// Outcome of a whole-course build
#[derive(Debug, Clone, Default)]
pub struct CourseBuildSummary {
    pub built: Vec<String>,
    pub failed: Vec<FailedLecture>,
}

impl CourseBuildSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.built.len() + self.failed.len()
    }
}

pub struct BuildOrchestrator<R: ToolRunner> {
    repo: CourseRepository,
    runner: R,
    sink: Arc<dyn OutputSink>,
    package_manager: PackageManager,
    classifier: Box<dyn FailureClassifier>,
}

impl<R: ToolRunner> BuildOrchestrator<R> {
    pub fn new(
        repo: CourseRepository,
        runner: R,
        sink: Arc<dyn OutputSink>,
        package_manager: PackageManager,
    ) -> Self {
        Self {
            repo,
            runner,
            sink,
            package_manager,
            classifier: Box::new(MessageHeuristicClassifier),
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn repository(&self) -> &CourseRepository {
        &self.repo
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Build one lecture end to end. Steps 1-5 (existence check, install,
    /// base path, build, copy) abort the build on failure; title
    /// reconciliation and index regeneration afterwards are best-effort.
    pub async fn build_lecture(&self, name: &str) -> Result<()> {
        if let Err(err) = self.run_build_steps(name).await {
            self.sink.write_line(&format!("build failed: {err}"));
            return Err(CourseError::Build(err));
        }

        if let Err(err) = self.reconcile_title(name).await {
            // Title drift is cosmetic; never fail a finished build over it
            self.sink
                .write_line(&format!("title sync for '{name}' skipped: {err}"));
        }

        self.regenerate_index();
        self.sink.write_line(&format!("lecture '{name}' built"));
        Ok(())
    }

    /// Build every lecture in the course, in sorted order, isolating each
    /// lecture's failure so its siblings still build
    pub async fn build_course(&self) -> CourseBuildSummary {
        let lectures = self.repo.list_lecture_directories();
        self.sink
            .write_line(&format!("building {} lecture(s)", lectures.len()));

        let mut summary = CourseBuildSummary::default();
        for name in lectures {
            match self.build_lecture(&name).await {
                Ok(()) => summary.built.push(name),
                Err(err) => summary.failed.push(FailedLecture {
                    name,
                    error: err.to_string(),
                }),
            }
        }
        summary
    }

    async fn run_build_steps(&self, name: &str) -> std::result::Result<(), BuildError> {
        // Step 1: the lecture directory must exist and carry a slides source
        let lecture_dir = self.repo.lecture_dir(name);
        if !lecture_dir.join(SLIDES_SOURCE_FILE).is_file() {
            return Err(BuildError::new(
                BuildErrorKind::LectureNotFound,
                format!("no '{SLIDES_SOURCE_FILE}' in {}", lecture_dir.display()),
            )
            .with_lecture(name));
        }

        // Step 2: install dependencies when the cache directory is absent
        if !lecture_dir.join(DEPENDENCY_CACHE_DIR).is_dir() {
            self.sink
                .write_line(&format!("installing dependencies for '{name}'"));
            let install = self.package_manager.install_command();
            let output = self
                .runner
                .run(&install, &RunOptions::new(lecture_dir.as_path()))
                .await;
            if !output.success {
                return Err(self.process_error(&output, name, "dependency install failed"));
            }
        }

        // Step 3: the base path cannot be computed without a course name
        let Some(config) = self.repo.read_course_config() else {
            return Err(BuildError::new(
                BuildErrorKind::BuildFailed,
                "course name is not set; cannot compute the deployment base path",
            )
            .with_lecture(name));
        };
        let course_name = config.course_name;

        // Step 4: build with the deployment base path
        let base_path = format!("/{course_name}/{name}/");
        let command = self.package_manager.run_script_command(
            BUILD_SCRIPT,
            &["--base", &base_path, "--out", BUILD_OUTPUT_DIR],
        );
        self.sink
            .write_line(&format!("building '{name}' with base path {base_path}"));
        // Stream the build's output into the trace as it happens
        let mut forward = |_kind: StreamKind, line: &str| self.sink.write_line(line);
        let output = self
            .runner
            .run_streaming(&command, &RunOptions::new(lecture_dir.as_path()), &mut forward)
            .await;
        if !output.success {
            return Err(self.process_error(&output, name, "build command failed"));
        }

        // Step 5: clean rebuild of the aggregated destination
        let destination = self.repo.root().join(&course_name).join(name);
        self.copy_build_output(name, &lecture_dir, &destination)
            .map_err(|e| {
                BuildError::new(
                    BuildErrorKind::BuildFailed,
                    format!("cannot copy build output: {e}"),
                )
                .with_lecture(name)
            })
    }

    fn copy_build_output(
        &self,
        name: &str,
        lecture_dir: &Path,
        destination: &Path,
    ) -> io::Result<()> {
        // Stale files from a previous build must not linger
        remove_dir_if_exists(destination)?;
        fs::create_dir_all(destination)?;

        let build_output = lecture_dir.join(BUILD_OUTPUT_DIR);
        if build_output.is_dir() {
            let copied = copy_dir_recursive(&build_output, destination)?;
            self.sink
                .write_line(&format!("copied {copied} file(s) to {}", destination.display()));
        } else {
            self.sink.write_line(&format!(
                "'{name}' produced no '{BUILD_OUTPUT_DIR}' output; destination left empty"
            ));
        }
        Ok(())
    }

    fn process_error(&self, output: &ProcessOutput, lecture: &str, context: &str) -> BuildError {
        let kind = self.classifier.classify(output, Some(lecture));
        let detail = if output.stderr.trim().is_empty() {
            match output.exit_code {
                Some(code) => format!("exit code {code}"),
                None => "no diagnostic output".to_string(),
            }
        } else {
            output.stderr.trim().to_string()
        };
        BuildError::new(kind, format!("{context}: {detail}"))
            .with_lecture(lecture)
            .with_exit_code(output.exit_code)
    }

    /// Step 6: re-read the frontmatter title and update the recorded one
    /// when they differ
    async fn reconcile_title(&self, name: &str) -> Result<()> {
        let source_path = self.repo.lecture_dir(name).join(SLIDES_SOURCE_FILE);
        let source = fs::read_to_string(&source_path)?;
        let (frontmatter, _) = parse_frontmatter(&source)?;
        let title = frontmatter.title()?;

        let recorded = self
            .repo
            .read_slides_config()
            .and_then(|config| config.find(name).map(|entry| entry.title.clone()));
        if recorded.as_deref() != Some(title) {
            self.sink
                .write_line(&format!("recording title '{title}' for '{name}'"));
            self.repo.add_or_update_lecture_entry(name, title).await?;
        }
        Ok(())
    }

    /// Step 7: regenerate the course index page from slides.json.
    /// Best-effort polish: every failure here logs and returns.
    pub fn regenerate_index(&self) {
        let Some(output_dir) = self.repo.course_output_dir() else {
            self.sink
                .write_line("course name is unknown; skipping index regeneration");
            return;
        };

        // Always re-read from storage so the page reflects the latest
        // title and membership changes
        let config = self.repo.read_slides_config().unwrap_or_default();

        let Some(template) = scaffold::index_template() else {
            self.sink
                .write_line("index template is unavailable; skipping index regeneration");
            return;
        };

        let items: Vec<String> = config
            .slides
            .iter()
            .map(|entry| {
                format!(
                    "<li><a href=\"./{}/\">{}</a></li>",
                    entry.name,
                    escape_html(&entry.title)
                )
            })
            .collect();
        let rendered = template.replacen(LECTURES_MARKER, &items.join("\n        "), 1);

        let path = output_dir.join(INDEX_FILE);
        let written = fs::create_dir_all(&output_dir).and_then(|()| fs::write(&path, rendered));
        if let Err(e) = written {
            self.sink
                .write_line(&format!("cannot write {}: {}", path.display(), e));
        }
    }

    /// Start the dev server for one lecture as a foreground session.
    /// Returns once the session is started; the caller decides whether to
    /// wait on the handle.
    pub fn run_dev_server(&self, name: &str) -> Result<SessionHandle> {
        let lecture_dir = self.repo.lecture_dir(name);
        if !lecture_dir.join(SLIDES_SOURCE_FILE).is_file() {
            return Err(CourseError::Build(
                BuildError::new(
                    BuildErrorKind::LectureNotFound,
                    format!("no '{SLIDES_SOURCE_FILE}' in {}", lecture_dir.display()),
                )
                .with_lecture(name),
            ));
        }

        let command = self.package_manager.run_script_command(DEV_SCRIPT, &[]);
        self.sink
            .write_line(&format!("starting dev server for '{name}'"));
        self.runner
            .start_session(&command, &lecture_dir)
            .map_err(|e| {
                let kind = if e.kind() == io::ErrorKind::NotFound {
                    BuildErrorKind::NpmNotFound
                } else {
                    BuildErrorKind::BuildFailed
                };
                CourseError::Build(
                    BuildError::new(kind, format!("cannot start dev server: {e}"))
                        .with_lecture(name),
                )
            })
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
