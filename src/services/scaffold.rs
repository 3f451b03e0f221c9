// Embedded templates and lecture scaffolding
// The scaffold tree under assets/ is compiled into the binary, so a
// freshly installed tool can create lectures and the course index without
// any support files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};

use crate::utils::error::{CourseError, Result};

static ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// The bundled course index template
pub fn index_template() -> Option<&'static str> {
    ASSETS
        .get_file("index.html")
        .and_then(|file| file.contents_utf8())
}

/// Materialize the embedded lecture template into `<root>/<name>`,
/// substituting the name and title placeholder tokens. Fails if the
/// directory already exists.
pub fn scaffold_lecture(root: &Path, name: &str, title: &str) -> Result<PathBuf> {
    let lecture_dir = root.join(name);
    if lecture_dir.exists() {
        return Err(CourseError::Validation(format!(
            "a directory named '{name}' already exists in this course"
        )));
    }

    let template_dir = ASSETS.get_dir("lecture").ok_or_else(|| {
        CourseError::Config("embedded lecture template is missing".to_string())
    })?;

    fs::create_dir_all(&lecture_dir)?;
    for file in template_dir.files() {
        let Some(file_name) = file.path().file_name() else {
            continue;
        };
        let Some(content) = file.contents_utf8() else {
            continue;
        };
        let rendered = content.replace("{{name}}", name).replace("{{title}}", title);
        fs::write(lecture_dir.join(file_name), rendered)?;
    }

    Ok(lecture_dir)
}
