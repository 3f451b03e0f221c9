use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Enumeration of supported package managers for the lecture toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm (default)
    Npm,
    /// pnpm
    Pnpm,
}

impl PackageManager {
    /// Returns the executable name for this package manager
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
        }
    }

    /// Builds the dependency-install command line
    pub fn install_command(&self) -> String {
        format!("{} install", self.command())
    }

    /// Builds a `run <script>` command line, forwarding extra arguments
    /// to the script. npm needs the `--` separator; pnpm forwards directly.
    pub fn run_script_command(&self, script: &str, args: &[&str]) -> String {
        let mut command = format!("{} run {}", self.command(), script);
        if !args.is_empty() {
            if matches!(self, PackageManager::Npm) {
                command.push_str(" --");
            }
            for arg in args {
                command.push(' ');
                command.push_str(arg);
            }
        }
        command
    }
}

impl Default for PackageManager {
    fn default() -> Self {
        PackageManager::Npm
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}
