//! Planning, execution and orchestration of packaging steps.
//!
//! The bundler:
//! 1. Plans each [`BuildTarget`](crate::bundler::BuildTarget) into a [`BuildPlan`]
//! 2. Runs each step through a [`StepRunner`]
//! 3. Applies the failure policy across targets
//! 4. Collects produced artifacts and checksums
//! 5. Returns a [`BuildSummary`]
//!
//! # Module Organization
//!
//! - [`planner`] - Turning targets into ordered command steps
//! - [`runner`] - Spawning and supervising external processes
//! - [`orchestrator`] - Main [`Bundler`] struct and the per-target state machine
//! - [`artifacts`] - Locating produced artifacts
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`tool_detection`] - External tool availability checking

pub mod artifacts;
pub mod checksum;
pub mod orchestrator;
pub mod planner;
pub mod runner;
pub mod tool_detection;

pub use artifacts::{ArtifactKind, BundledArtifact};
pub use orchestrator::{BuildObserver, BuildResult, BuildSummary, Bundler, TargetState};
pub use planner::{BuildPlan, CommandStep, StepKind, plan};
pub use runner::{LogOutput, ProcessRunner, StepOutcome, StepOutput, StepRunner};
