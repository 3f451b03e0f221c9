use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use slidecourse::models::course::CourseConfig;
use slidecourse::models::package_manager::PackageManager;
use slidecourse::models::slides::{LectureEntry, SlidesConfig};
use slidecourse::services::build_orchestrator::BuildOrchestrator;
use slidecourse::services::course_repository::CourseRepository;
use slidecourse::services::process_runner::{
    ProcessOutput, RunOptions, SessionHandle, StreamKind, ToolRunner,
};
use slidecourse::utils::error::{BuildErrorKind, CourseError};
use slidecourse::utils::output::BufferSink;

type Handler = Box<dyn Fn(&str, &RunOptions) -> ProcessOutput + Send + Sync>;

/// Scripted ToolRunner double: records every command and answers with
/// whatever the handler decides
struct FakeRunner {
    calls: Mutex<Vec<(String, PathBuf)>>,
    handler: Handler,
}

impl FakeRunner {
    fn new(handler: Handler) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            handler,
        }
    }

    fn succeeding() -> Self {
        Self::new(Box::new(|_, _| ProcessOutput {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: Some(0),
        }))
    }

    fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ToolRunner for FakeRunner {
    async fn run(&self, command_line: &str, opts: &RunOptions) -> ProcessOutput {
        self.calls
            .lock()
            .unwrap()
            .push((command_line.to_string(), opts.cwd.clone()));
        (self.handler)(command_line, opts)
    }

    async fn run_streaming(
        &self,
        command_line: &str,
        opts: &RunOptions,
        _on_chunk: &mut (dyn FnMut(StreamKind, &str) + Send),
    ) -> ProcessOutput {
        self.run(command_line, opts).await
    }

    fn start_session(&self, command_line: &str, cwd: &Path) -> io::Result<SessionHandle> {
        self.calls
            .lock()
            .unwrap()
            .push((command_line.to_string(), cwd.to_path_buf()));
        Ok(SessionHandle::detached())
    }
}

fn success_output() -> ProcessOutput {
    ProcessOutput {
        success: true,
        stdout: String::new(),
        stderr: String::new(),
        exit_code: Some(0),
    }
}

fn failure_output(stderr: &str, exit_code: Option<i32>) -> ProcessOutput {
    ProcessOutput {
        success: false,
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code,
    }
}

/// Handler that builds a minimal dist/ when the build script runs
fn dist_producing_handler() -> Handler {
    Box::new(|command, opts| {
        if command.contains("run build") {
            let dist = opts.cwd.join("dist");
            fs::create_dir_all(dist.join("assets")).unwrap();
            fs::write(dist.join("index.html"), "<html>built</html>").unwrap();
            fs::write(dist.join("assets/app.js"), "app").unwrap();
        }
        success_output()
    })
}

fn course_fixture(root: &Path, course_name: &str) {
    let sink = Arc::new(BufferSink::new());
    let repo = CourseRepository::new(root, sink);
    repo.write_course_config(&CourseConfig::new(course_name))
        .unwrap();
}

fn add_lecture(root: &Path, name: &str, title: &str, with_node_modules: bool) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("slides.md"),
        format!("---\ntitle: {title}\n---\n\n# {title}\n"),
    )
    .unwrap();
    fs::write(dir.join("package.json"), "{\"name\": \"lecture\"}").unwrap();
    if with_node_modules {
        fs::create_dir_all(dir.join("node_modules")).unwrap();
    }
}

fn orchestrator(root: &Path, runner: FakeRunner) -> BuildOrchestrator<FakeRunner> {
    let sink = Arc::new(BufferSink::new());
    let repo = CourseRepository::new(root, sink.clone());
    BuildOrchestrator::new(repo, runner, sink, PackageManager::Npm)
}

fn build_error_kind(err: &CourseError) -> BuildErrorKind {
    match err {
        CourseError::Build(build) => build.kind,
        other => panic!("expected a build error, got: {other}"),
    }
}

#[tokio::test]
async fn test_build_lecture_happy_path() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");
    add_lecture(tmp.path(), "intro", "Introduction", true);

    let orch = orchestrator(tmp.path(), FakeRunner::new(dist_producing_handler()));
    orch.build_lecture("intro").await.unwrap();

    // node_modules was present, so the only command is the build itself,
    // carrying the computed base path
    let calls = orch_calls(&orch);
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0,
        "npm run build -- --base /Physics101/intro/ --out dist"
    );
    assert_eq!(calls[0].1, tmp.path().join("intro"));

    // Build output was copied into the aggregated course directory
    let aggregated = tmp.path().join("Physics101/intro");
    assert_eq!(
        fs::read_to_string(aggregated.join("index.html")).unwrap(),
        "<html>built</html>"
    );
    assert!(aggregated.join("assets/app.js").exists());

    // Title was recorded and the index regenerated
    let slides: SlidesConfig =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("Physics101/slides.json")).unwrap())
            .unwrap();
    assert_eq!(slides.slides, vec![LectureEntry::new("intro", "Introduction")]);

    let index = fs::read_to_string(tmp.path().join("Physics101/index.html")).unwrap();
    assert!(index.contains("<a href=\"./intro/\">Introduction</a>"));
}

fn orch_calls(orch: &BuildOrchestrator<FakeRunner>) -> Vec<(String, PathBuf)> {
    // The orchestrator owns the runner; reach through for assertions
    orch.runner().calls()
}

#[tokio::test]
async fn test_build_lecture_installs_when_cache_missing() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");
    add_lecture(tmp.path(), "intro", "Introduction", false);

    let orch = orchestrator(tmp.path(), FakeRunner::new(dist_producing_handler()));
    orch.build_lecture("intro").await.unwrap();

    let calls = orch_calls(&orch);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "npm install");
    assert!(calls[1].0.starts_with("npm run build"));
}

#[tokio::test]
async fn test_missing_lecture_fails_before_any_process_runs() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");

    let orch = orchestrator(tmp.path(), FakeRunner::succeeding());
    let err = orch.build_lecture("ghost").await.unwrap_err();

    assert_eq!(build_error_kind(&err), BuildErrorKind::LectureNotFound);
    assert!(orch_calls(&orch).is_empty());
}

#[tokio::test]
async fn test_install_enoent_classifies_as_npm_not_found() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");
    add_lecture(tmp.path(), "intro", "Introduction", false);

    let orch = orchestrator(
        tmp.path(),
        FakeRunner::new(Box::new(|_, _| {
            failure_output("command not found (ENOENT): No such file or directory", None)
        })),
    );
    let err = orch.build_lecture("intro").await.unwrap_err();

    assert_eq!(build_error_kind(&err), BuildErrorKind::NpmNotFound);
    // Step 5 never ran: the aggregated output directory is untouched
    assert!(!tmp.path().join("Physics101/intro").exists());
}

#[tokio::test]
async fn test_build_failure_carries_stderr_and_exit_code() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");
    add_lecture(tmp.path(), "intro", "Introduction", true);

    let orch = orchestrator(
        tmp.path(),
        FakeRunner::new(Box::new(|_, _| {
            failure_output("error: render exploded", Some(2))
        })),
    );
    let err = orch.build_lecture("intro").await.unwrap_err();

    let CourseError::Build(build) = &err else {
        panic!("expected build error");
    };
    assert_eq!(build.kind, BuildErrorKind::BuildFailed);
    assert_eq!(build.lecture.as_deref(), Some("intro"));
    assert_eq!(build.exit_code, Some(2));
    assert!(build.message.contains("render exploded"));
}

#[tokio::test]
async fn test_timeout_flavored_failure_classifies_as_timeout() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");
    add_lecture(tmp.path(), "intro", "Introduction", true);

    let orch = orchestrator(
        tmp.path(),
        FakeRunner::new(Box::new(|_, _| {
            failure_output("command timed out after 300s", None)
        })),
    );
    let err = orch.build_lecture("intro").await.unwrap_err();
    assert_eq!(build_error_kind(&err), BuildErrorKind::Timeout);
}

#[tokio::test]
async fn test_missing_course_name_fails_before_building() {
    let tmp = TempDir::new().unwrap();
    // No course.json at all
    add_lecture(tmp.path(), "intro", "Introduction", true);

    let orch = orchestrator(tmp.path(), FakeRunner::succeeding());
    let err = orch.build_lecture("intro").await.unwrap_err();

    assert_eq!(build_error_kind(&err), BuildErrorKind::BuildFailed);
    assert!(orch_calls(&orch).is_empty());
}

#[tokio::test]
async fn test_rebuild_removes_stale_files() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");
    add_lecture(tmp.path(), "intro", "Introduction", true);

    let stale = tmp.path().join("Physics101/intro/stale.txt");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "left over from an old build").unwrap();

    let orch = orchestrator(tmp.path(), FakeRunner::new(dist_producing_handler()));
    orch.build_lecture("intro").await.unwrap();

    assert!(!stale.exists());
    assert!(tmp.path().join("Physics101/intro/index.html").exists());
}

#[tokio::test]
async fn test_missing_dist_leaves_empty_destination() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");
    add_lecture(tmp.path(), "intro", "Introduction", true);

    // Succeeds but produces no dist/
    let orch = orchestrator(tmp.path(), FakeRunner::succeeding());
    orch.build_lecture("intro").await.unwrap();

    let destination = tmp.path().join("Physics101/intro");
    assert!(destination.is_dir());
    assert_eq!(fs::read_dir(&destination).unwrap().count(), 0);
}

#[tokio::test]
async fn test_title_drift_is_reconciled() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");
    add_lecture(tmp.path(), "intro", "New", true);

    // slides.json still records the old title
    let sink = Arc::new(BufferSink::new());
    let repo = CourseRepository::new(tmp.path(), sink);
    repo.write_slides_config(&SlidesConfig {
        slides: vec![LectureEntry::new("intro", "Old")],
    })
    .unwrap();

    let orch = orchestrator(tmp.path(), FakeRunner::new(dist_producing_handler()));
    orch.build_lecture("intro").await.unwrap();

    let slides: SlidesConfig =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("Physics101/slides.json")).unwrap())
            .unwrap();
    assert_eq!(slides.slides, vec![LectureEntry::new("intro", "New")]);

    let index = fs::read_to_string(tmp.path().join("Physics101/index.html")).unwrap();
    assert!(index.contains(">New</a>"));
}

#[tokio::test]
async fn test_broken_frontmatter_does_not_fail_the_build() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");
    add_lecture(tmp.path(), "intro", "Introduction", true);
    // Slides source without any frontmatter: title sync must be skipped,
    // the build itself must still succeed
    fs::write(tmp.path().join("intro/slides.md"), "# No frontmatter here\n").unwrap();

    let orch = orchestrator(tmp.path(), FakeRunner::new(dist_producing_handler()));
    orch.build_lecture("intro").await.unwrap();

    assert!(tmp.path().join("Physics101/intro/index.html").exists());
}

#[tokio::test]
async fn test_build_course_with_zero_lectures() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");

    let orch = orchestrator(tmp.path(), FakeRunner::succeeding());
    let summary = orch.build_course().await;

    assert!(summary.is_success());
    assert_eq!(summary.total(), 0);
    assert!(orch_calls(&orch).is_empty());
}

#[tokio::test]
async fn test_build_course_is_best_effort() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");
    // Sorted order puts the failing lecture first, so a completed sibling
    // proves the loop continued past the failure
    add_lecture(tmp.path(), "aaa-broken", "Broken", true);
    add_lecture(tmp.path(), "zzz-fine", "Fine", true);

    let orch = orchestrator(
        tmp.path(),
        FakeRunner::new(Box::new(|command, opts| {
            if opts.cwd.ends_with("aaa-broken") {
                return failure_output("error: no slides", Some(1));
            }
            if command.contains("run build") {
                fs::create_dir_all(opts.cwd.join("dist")).unwrap();
                fs::write(opts.cwd.join("dist/index.html"), "ok").unwrap();
            }
            success_output()
        })),
    );
    let summary = orch.build_course().await;

    assert_eq!(summary.built, vec!["zzz-fine"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].name, "aaa-broken");
    assert!(tmp.path().join("Physics101/zzz-fine/index.html").exists());
    assert!(!tmp.path().join("Physics101/aaa-broken").exists());
}

#[tokio::test]
async fn test_run_dev_server_checks_lecture_exists() {
    let tmp = TempDir::new().unwrap();
    course_fixture(tmp.path(), "Physics101");
    add_lecture(tmp.path(), "intro", "Introduction", true);

    let orch = orchestrator(tmp.path(), FakeRunner::succeeding());

    let err = orch.run_dev_server("ghost").unwrap_err();
    assert_eq!(build_error_kind(&err), BuildErrorKind::LectureNotFound);

    let session = orch.run_dev_server("intro").unwrap();
    assert_eq!(session.wait().await, None);

    let calls = orch_calls(&orch);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "npm run dev");
    assert_eq!(calls[0].1, tmp.path().join("intro"));
}
