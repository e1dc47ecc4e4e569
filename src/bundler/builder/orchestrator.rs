//! Main bundler orchestration and coordination.
//!
//! This module provides the [`Bundler`] orchestrator that sequences planning
//! and execution across targets and aggregates their results.

use super::{
    BuildPlan, CommandStep,
    artifacts::{BundledArtifact, collect_artifacts},
    planner::plan,
    runner::StepRunner,
};
use crate::bundler::{
    Error, FailurePolicy, Result, Settings, error::ErrorExt, platform::BuildTarget,
};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Lifecycle of one target.
///
/// `Pending -> Running -> {Succeeded, Failed}`; a target that is running or
/// still pending when the run is interrupted ends `Cancelled`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    /// Not started yet
    Pending,
    /// Plan is executing
    Running,
    /// Every step exited with status zero
    Succeeded,
    /// Planning or a step failed
    Failed,
    /// Interrupted by the user
    Cancelled,
}

impl TargetState {
    /// True for states a target never leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TargetState::Succeeded | TargetState::Failed | TargetState::Cancelled
        )
    }
}

/// Final record for one target.
#[derive(Clone, Debug, serde::Serialize)]
pub struct BuildResult {
    /// Target that was built
    pub target: BuildTarget,
    /// Terminal state
    pub state: TargetState,
    /// Step that failed or was interrupted
    pub failed_step: Option<CommandStep>,
    /// Error that ended the target
    pub error_message: Option<String>,
    /// Artifacts found after a successful build
    pub artifacts: Vec<BundledArtifact>,
    /// Time spent on this target in milliseconds
    pub duration_ms: u64,
}

impl BuildResult {
    /// True iff the target succeeded.
    pub fn succeeded(&self) -> bool {
        self.state == TargetState::Succeeded
    }

    fn new(
        target: &BuildTarget,
        state: TargetState,
        failed_step: Option<CommandStep>,
        error_message: Option<String>,
        artifacts: Vec<BundledArtifact>,
        duration: Duration,
    ) -> Self {
        debug_assert!(state.is_terminal());
        Self {
            target: target.clone(),
            state,
            failed_step,
            error_message,
            artifacts,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn failed(
        target: &BuildTarget,
        step: Option<&CommandStep>,
        error: &Error,
        duration: Duration,
    ) -> Self {
        Self::new(
            target,
            TargetState::Failed,
            step.cloned(),
            Some(error.to_string()),
            Vec::new(),
            duration,
        )
    }

    fn cancelled(target: &BuildTarget, step: Option<&CommandStep>, duration: Duration) -> Self {
        Self::new(
            target,
            TargetState::Cancelled,
            step.cloned(),
            Some(Error::Cancelled.to_string()),
            Vec::new(),
            duration,
        )
    }
}

/// Outcome of a whole run.
#[derive(Clone, Debug, serde::Serialize)]
pub struct BuildSummary {
    /// Product that was bundled
    pub product_name: String,
    /// Product version, when known
    pub version: Option<String>,
    /// Number of targets the run was asked to build
    pub requested: usize,
    /// One entry per attempted (or cancelled) target, in build order
    pub results: Vec<BuildResult>,
    /// Policy the run used
    pub failure_policy: FailurePolicy,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

impl BuildSummary {
    /// True iff every requested target has a successful result.
    pub fn all_succeeded(&self) -> bool {
        self.results.len() == self.requested && self.results.iter().all(BuildResult::succeeded)
    }

    /// True if the run was interrupted.
    pub fn was_cancelled(&self) -> bool {
        self.results
            .iter()
            .any(|r| r.state == TargetState::Cancelled)
    }

    /// Results that did not succeed.
    pub fn unsuccessful(&self) -> impl Iterator<Item = &BuildResult> {
        self.results.iter().filter(|r| !r.succeeded())
    }

    /// Error message of the first unsuccessful target.
    pub fn first_error(&self) -> Option<&str> {
        self.unsuccessful()
            .find_map(|r| r.error_message.as_deref())
    }

    /// Targets that were never attempted because the run stopped early.
    pub fn not_attempted(&self) -> usize {
        self.requested.saturating_sub(self.results.len())
    }
}

/// Progress callbacks emitted while a run executes.
///
/// All methods default to doing nothing.
pub trait BuildObserver {
    /// A target moved from pending to running.
    fn target_started(&self, _target: &BuildTarget) {}

    /// A step is about to be spawned. `index` is zero-based.
    fn step_started(&self, _target: &BuildTarget, _index: usize, _total: usize, _step: &CommandStep) {
    }

    /// A target reached a terminal state.
    fn target_finished(&self, _result: &BuildResult) {}
}

impl BuildObserver for () {}

/// Main bundler orchestrator.
///
/// Builds targets one at a time. Within a target the first failing step ends
/// it; across targets the [`FailurePolicy`] decides whether the run goes on.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_electron::bundler::{
///     Bundler, LogOutput, PlatformSelection, ProcessRunner, Settings, resolve_targets,
/// };
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(settings: Settings) -> kodegen_bundler_electron::bundler::Result<()> {
/// let targets = resolve_targets("arm64", &PlatformSelection::All, &settings)?;
/// let cancel = CancellationToken::new();
/// let runner = ProcessRunner::new(Arc::new(LogOutput), cancel.clone());
///
/// let bundler = Bundler::new(settings);
/// let summary = bundler.run(&targets, &runner, &(), &cancel).await?;
/// println!("{} of {} succeeded", summary.results.iter().filter(|r| r.succeeded()).count(), summary.requested);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    settings: Settings,
}

impl Bundler {
    /// Creates a new bundler with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Plans every target without running anything.
    pub fn plan_all(&self, targets: &[BuildTarget]) -> Vec<Result<BuildPlan>> {
        targets
            .iter()
            .map(|target| plan(target, &self.settings))
            .collect()
    }

    /// Builds `targets` in order.
    ///
    /// Every target is planned before any tool runs. Under
    /// [`FailurePolicy::StopOnFirstFailure`] an unplannable target (a missing
    /// icon) fails the run without spawning anything; otherwise only the
    /// targets that planned are built.
    ///
    /// # Errors
    ///
    /// Only setup failures (the output directory cannot be created) are
    /// returned as errors; target failures are recorded in the summary.
    pub async fn run<R, O>(
        &self,
        targets: &[BuildTarget],
        runner: &R,
        observer: &O,
        cancel: &CancellationToken,
    ) -> Result<BuildSummary>
    where
        R: StepRunner,
        O: BuildObserver + ?Sized,
    {
        let out_dir = self.settings.out_directory();
        tokio::fs::create_dir_all(out_dir)
            .await
            .fs_context("creating output directory", out_dir)?;

        let policy = self.settings.failure_policy();
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(targets.len());

        // Every icon is checked before the first tool runs.
        let plans = self.plan_all(targets);
        let unplanned = plans.iter().filter(|p| p.is_err()).count();

        if unplanned > 0 && policy == FailurePolicy::StopOnFirstFailure {
            for (target, planned) in targets.iter().zip(&plans) {
                if let Err(e) = planned {
                    observer.target_started(target);
                    let result = BuildResult::failed(target, None, e, Duration::ZERO);
                    observer.target_finished(&result);
                    results.push(result);
                }
            }
            log::info!(
                "{} target(s) cannot be planned; nothing was run",
                unplanned
            );
            return Ok(self.summary(targets, results, started_at));
        }

        for (index, (target, planned)) in targets.iter().zip(plans).enumerate() {
            if cancel.is_cancelled() {
                cancel_remaining(&targets[index..], observer, &mut results);
                break;
            }

            observer.target_started(target);
            let result = match planned {
                Ok(plan) => self.build_target(&plan, runner, observer).await,
                Err(e) => {
                    log::debug!("{}: pending -> failed (planning)", target);
                    BuildResult::failed(target, None, &e, Duration::ZERO)
                }
            };
            observer.target_finished(&result);

            let state = result.state;
            results.push(result);

            match state {
                TargetState::Cancelled => {
                    cancel_remaining(&targets[index + 1..], observer, &mut results);
                    break;
                }
                TargetState::Failed if policy == FailurePolicy::StopOnFirstFailure => {
                    log::info!(
                        "Stopping after failed target; {} target(s) not attempted",
                        targets.len() - index - 1
                    );
                    break;
                }
                _ => {}
            }
        }

        Ok(self.summary(targets, results, started_at))
    }

    fn summary(
        &self,
        targets: &[BuildTarget],
        results: Vec<BuildResult>,
        started_at: DateTime<Utc>,
    ) -> BuildSummary {
        BuildSummary {
            product_name: self.settings.product_name().to_string(),
            version: self.settings.version_string().map(str::to_owned),
            requested: targets.len(),
            results,
            failure_policy: self.settings.failure_policy(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn build_target<R, O>(&self, plan: &BuildPlan, runner: &R, observer: &O) -> BuildResult
    where
        R: StepRunner,
        O: BuildObserver + ?Sized,
    {
        let target = plan.target();
        let started = Instant::now();
        log::debug!("{}: pending -> running", target);

        let total = plan.len();
        for (index, step) in plan.steps().iter().enumerate() {
            observer.step_started(target, index, total, step);

            match runner.run(step).await {
                Ok(outcome) => {
                    log::debug!(
                        "{}: step {}/{} done in {:.1?}",
                        target,
                        index + 1,
                        total,
                        outcome.duration
                    );
                }
                Err(e) if e.is_cancelled() => {
                    log::debug!("{}: running -> cancelled", target);
                    return BuildResult::cancelled(target, Some(step), started.elapsed());
                }
                Err(e) => {
                    log::debug!("{}: running -> failed", target);
                    return BuildResult::failed(target, Some(step), &e, started.elapsed());
                }
            }
        }

        let artifacts = collect_artifacts(target, &self.settings).await;
        log::debug!("{}: running -> succeeded", target);

        BuildResult::new(
            target,
            TargetState::Succeeded,
            None,
            None,
            artifacts,
            started.elapsed(),
        )
    }
}

fn cancel_remaining<O>(targets: &[BuildTarget], observer: &O, results: &mut Vec<BuildResult>)
where
    O: BuildObserver + ?Sized,
{
    for target in targets {
        let result = BuildResult::cancelled(target, None, Duration::ZERO);
        observer.target_finished(&result);
        results.push(result);
    }
}
