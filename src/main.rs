//! Kodegen Bundler Electron - multi-target packaging for Electron applications.
//!
//! This binary packages an application directory for macOS, Windows and Linux
//! by running the external packager and installer tools, and exits non-zero
//! if any requested target fails.

use kodegen_bundler_electron::cli::{self, OutputManager};
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            let output = OutputManager::new(false, false);
            output.error(&format!("Error: {}", e));
            for suggestion in e.recovery_suggestions() {
                let _ = output.indent_err(&suggestion);
            }
            1
        }
    };

    process::exit(exit_code);
}
