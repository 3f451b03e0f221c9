// slidecourse - course manager for slide-deck lectures
// Main CLI entry point

use clap::Parser;
use slidecourse::cli::{Cli, CliDispatcher};
use slidecourse::utils::error::UserError;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = CliDispatcher::execute(cli).await;

    if let Err(err) = result {
        let user_error = UserError::from_course_error(&err);
        user_error.print();
        process::exit(user_error.exit_code);
    }
}
