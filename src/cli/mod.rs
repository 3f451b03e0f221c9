// CLI module for command-line interface

pub mod build;
pub mod dev;
pub mod init;
pub mod list;
pub mod new;
pub mod remove;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::models::package_manager::PackageManager;
use crate::services::build_orchestrator::BuildOrchestrator;
use crate::services::course_repository::CourseRepository;
use crate::services::process_runner::ProcessRunner;
use crate::utils::error::Result;
use crate::utils::output::{ConsoleSink, OutputSink};

use self::build::BuildCommand;
use self::dev::DevCommand;
use self::init::InitCommand;
use self::list::ListCommand;
use self::new::NewCommand;
use self::remove::RemoveCommand;

/// Main CLI structure
#[derive(Parser)]
#[command(name = "slidecourse")]
#[command(about = "A course manager for slide-deck lectures")]
#[command(long_about = r#"slidecourse manages a directory-based course of slide presentations:
it scaffolds lecture folders, drives the slide toolchain's dev server and
build command, and aggregates per-lecture builds into one deployable
course site.

Features:
  • Course and lecture scaffolding from embedded templates
  • Slug-safe folder names derived from any-script titles
  • Per-lecture builds with course-aware base paths
  • Aggregated course site with a generated index page
  • npm and pnpm toolchains

Examples:
  slidecourse init --name physics-101     Initialize a course here
  slidecourse new "О компании"            Scaffold lecture o-kompanii
  slidecourse build                       Build every lecture
  slidecourse build intro                 Build one lecture
  slidecourse dev intro                   Start the dev server
  slidecourse remove intro                Delete a lecture

For detailed documentation, visit: https://github.com/VesperAkshay/slidecourse"#)]
#[command(version)]
pub struct Cli {
    /// Course root directory (default: current directory)
    #[arg(long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Package manager used for the lecture toolchain
    #[arg(long, global = true, value_enum, default_value_t = PackageManager::Npm)]
    pub package_manager: PackageManager,

    #[command(subcommand)]
    pub command: Commands,
}

/// All available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a course in the current directory
    #[command(long_about = r#"Initialize a course in the target directory.

Writes course.json with the validated course name, creates the aggregated
output directory named after the course, seeds an empty slides.json and
generates the (empty) course index page.

Examples:
  slidecourse init --name physics-101     Explicit course name
  slidecourse init                        Use the directory name
  slidecourse init --force                Overwrite an existing course.json"#)]
    Init {
        /// Course name (default: current directory name)
        #[arg(long)]
        name: Option<String>,

        /// Overwrite existing course.json
        #[arg(long)]
        force: bool,

        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Scaffold a new lecture from the embedded template
    #[command(long_about = r#"Scaffold a new lecture.

Derives a slug-safe folder name from the title (Cyrillic titles
transliterate; anything unmappable falls back to a timestamped name),
materializes the embedded lecture template, records the lecture in
slides.json and regenerates the course index.

Examples:
  slidecourse new "Introduction"          Creates ./introduction
  slidecourse new "О компании"            Creates ./o-kompanii
  slidecourse new "Intro" --name day-1    Explicit folder name"#)]
    New {
        /// Lecture title (any script)
        title: String,

        /// Folder name override (must already be a valid slug)
        #[arg(long)]
        name: Option<String>,

        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Build one lecture, or every lecture in the course
    #[command(long_about = r#"Build lectures into the aggregated course site.

For each lecture: installs dependencies when node_modules is missing,
runs the build script with the deployment base path
/<course>/<lecture>/, copies the build output into the aggregated
course directory, reconciles the recorded title against the slides
source and regenerates the index page.

Whole-course builds are best-effort: one lecture's failure does not
abort its siblings, and the summary lists what failed.

Examples:
  slidecourse build                       Build the whole course
  slidecourse build intro                 Build a single lecture"#)]
    Build {
        /// Lecture folder name (if omitted, build the whole course)
        lecture: Option<String>,

        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Start the dev server for one lecture
    #[command(long_about = r#"Start the slide toolchain's dev server for a lecture.

The server runs as a foreground process with no time limit and stays
attached to the terminal until stopped.

Example:
  slidecourse dev intro"#)]
    Dev {
        /// Lecture folder name
        lecture: String,
    },

    /// List the lectures in this course
    List {
        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Delete a lecture and its aggregated output
    #[command(long_about = r#"Delete a lecture.

Removes the lecture directory, its aggregated build output, and its
slides.json entry, then regenerates the course index. Asks for
confirmation unless --yes is given.

Examples:
  slidecourse remove intro
  slidecourse remove intro --yes          Skip the confirmation prompt"#)]
    Remove {
        /// Lecture folder name
        lecture: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Shared construction of the repository/runner/orchestrator wiring.
/// Everything is built here once and handed down; no global state.
pub(crate) fn make_orchestrator(
    dir: &Path,
    package_manager: PackageManager,
) -> BuildOrchestrator<ProcessRunner> {
    let sink: Arc<dyn OutputSink> = Arc::new(ConsoleSink);
    let repo = CourseRepository::new(dir, Arc::clone(&sink));
    BuildOrchestrator::new(repo, ProcessRunner::new(), sink, package_manager)
}

/// CLI command dispatcher
pub struct CliDispatcher;

impl CliDispatcher {
    /// Execute a CLI command
    pub async fn execute(cli: Cli) -> Result<()> {
        let dir = cli.dir;
        let package_manager = cli.package_manager;

        match cli.command {
            Commands::Init { name, force, json } => {
                let cmd = InitCommand {
                    name,
                    force,
                    json,
                    dir,
                    package_manager,
                };
                cmd.execute().await
            }

            Commands::New { title, name, json } => {
                let cmd = NewCommand {
                    title,
                    name,
                    json,
                    dir,
                    package_manager,
                };
                cmd.execute().await
            }

            Commands::Build { lecture, json } => {
                let cmd = BuildCommand {
                    lecture,
                    json,
                    dir,
                    package_manager,
                };
                cmd.execute().await
            }

            Commands::Dev { lecture } => {
                let cmd = DevCommand {
                    lecture,
                    dir,
                    package_manager,
                };
                cmd.execute().await
            }

            Commands::List { json } => {
                let cmd = ListCommand {
                    json,
                    dir,
                    package_manager,
                };
                cmd.execute().await
            }

            Commands::Remove { lecture, yes } => {
                let cmd = RemoveCommand {
                    lecture,
                    yes,
                    dir,
                    package_manager,
                };
                cmd.execute().await
            }
        }
    }
}
