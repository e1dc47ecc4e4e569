//! Progress and summary rendering for a bundle run.

use super::OutputManager;
use crate::bundler::{
    ArtifactKind, BuildObserver, BuildPlan, BuildResult, BuildSummary, BuildTarget, CommandStep,
    Settings, TargetState,
};
use crate::error::Result;
use std::path::Path;

/// Renders one line per step, one summary per target and a final aggregate.
#[derive(Debug, Clone)]
pub struct Reporter {
    output: OutputManager,
}

impl Reporter {
    /// Creates a reporter writing through `output`.
    pub fn new(output: OutputManager) -> Self {
        Self { output }
    }

    /// Announces the run.
    pub fn run_started(&self, targets: &[BuildTarget], settings: &Settings) {
        let title = match settings.version_string() {
            Some(version) => format!("Bundling {} {}", settings.product_name(), version),
            None => format!("Bundling {}", settings.product_name()),
        };
        let _ = self.output.section(&title);
        let _ = self.output.verbose(&format!(
            "App directory: {}",
            settings.app_directory().display()
        ));
        let _ = self.output.verbose(&format!(
            "Output directory: {}",
            settings.out_directory().display()
        ));
        let names = targets
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let _ = self.output.info(&format!("Targets: {}", names));
    }

    /// Prints a plan without running it.
    pub fn print_plan(&self, plan: &BuildPlan) {
        let _ = self.output.section(&plan.target().to_string());
        for (index, step) in plan.steps().iter().enumerate() {
            let _ = self
                .output
                .info(&format!("[{}/{}] {}", index + 1, plan.len(), step.description));
            let _ = self.output.indent(&format!("> {}", step.display_command()));
        }
    }

    /// Prints the aggregate line and returns the process exit code.
    pub fn finish(&self, summary: &BuildSummary) -> i32 {
        let code = exit_code(summary);

        if code == 0 {
            let _ = self.output.section("Done");
            let _ = self.output.success(&format!(
                "All {} build(s) completed successfully",
                summary.requested
            ));
            return code;
        }

        let failed = summary
            .results
            .iter()
            .filter(|r| r.state == TargetState::Failed)
            .count();
        let cancelled = summary
            .results
            .iter()
            .filter(|r| r.state == TargetState::Cancelled)
            .count();
        let succeeded = summary.results.iter().filter(|r| r.succeeded()).count();

        let mut line = format!(
            "Build failed: {} succeeded, {} failed",
            succeeded, failed
        );
        if cancelled > 0 {
            line.push_str(&format!(", {} cancelled", cancelled));
        }
        if summary.not_attempted() > 0 {
            line.push_str(&format!(", {} not attempted", summary.not_attempted()));
        }

        let _ = self.output.section("Failed");
        self.output.error(&line);
        if let Some(message) = summary.first_error() {
            self.output.error(message);
        }

        code
    }
}

impl BuildObserver for Reporter {
    fn target_started(&self, target: &BuildTarget) {
        let _ = self.output.section(&target.to_string());
    }

    fn step_started(&self, _target: &BuildTarget, index: usize, total: usize, step: &CommandStep) {
        let _ = self
            .output
            .progress(&format!("[{}/{}] {}", index + 1, total, step.description));
        let _ = self.output.indent(&format!("> {}", step.display_command()));
    }

    fn target_finished(&self, result: &BuildResult) {
        match result.state {
            TargetState::Succeeded => {
                let _ = self.output.success(&format!(
                    "{} build complete ({:.1}s)",
                    result.target,
                    result.duration_ms as f64 / 1000.0
                ));
                for artifact in &result.artifacts {
                    let label = match artifact.kind {
                        ArtifactKind::PackagedApp => "app".to_string(),
                        ArtifactKind::Installer(format) => format.to_string(),
                    };
                    let _ = self.output.indent(&format!(
                        "{:<4} {} ({}, sha256 {})",
                        label,
                        artifact.path.display(),
                        format_size(artifact.size),
                        &artifact.checksum[..artifact.checksum.len().min(12)]
                    ));
                }
            }
            TargetState::Cancelled => {
                let _ = self
                    .output
                    .warn(&format!("{} build cancelled", result.target));
            }
            _ => {
                let message = result.error_message.as_deref().unwrap_or("unknown error");
                self.output
                    .error(&format!("{} build failed: {}", result.target, message));
            }
        }
    }
}

/// 0 when every requested target succeeded, 1 otherwise.
pub fn exit_code(summary: &BuildSummary) -> i32 {
    if summary.all_succeeded() { 0 } else { 1 }
}

/// Writes `summary` as pretty-printed JSON.
pub fn write_report(path: &Path, summary: &BuildSummary) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    log::info!("Wrote build report to {}", path.display());
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
