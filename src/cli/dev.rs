// Dev command implementation
// Starts the slide toolchain's dev server as a foreground session.

use std::path::PathBuf;

use crate::cli::make_orchestrator;
use crate::models::package_manager::PackageManager;
use crate::utils::error::Result;

/// Start the dev server for one lecture
pub struct DevCommand {
    /// Lecture folder name
    pub lecture: String,
    /// Course root directory
    pub dir: PathBuf,
    /// Package manager for the lecture toolchain
    pub package_manager: PackageManager,
}

impl DevCommand {
    /// Execute the dev command
    pub async fn execute(&self) -> Result<()> {
        let orchestrator = make_orchestrator(&self.dir, self.package_manager);

        // The orchestrator returns once the session is started; the CLI
        // stays attached so the server owns the terminal until stopped.
        let session = orchestrator.run_dev_server(&self.lecture)?;
        let exit_code = session.wait().await;

        match exit_code {
            Some(0) | None => {}
            Some(code) => println!("dev server exited with code {code}"),
        }
        Ok(())
    }
}
