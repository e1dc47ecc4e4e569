//! Command line interface for the Electron bundler.
//!
//! Parses arguments, merges them with `package.json` / `bundle.toml`,
//! resolves targets and drives the [`Bundler`](crate::bundler::Bundler).

mod args;
mod output;
mod reporter;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;
pub use reporter::{Reporter, exit_code, write_report};

use crate::bundler::{
    Bundler, FailurePolicy, PackageSettings, PlatformSelection, ProcessRunner, Settings,
    SettingsBuilder, builder::tool_detection::HAS_NPX, resolve_targets,
};
use crate::error::{BundlerError, CliError, Result};
use crate::metadata;
use path_absolutize::Absolutize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    run_with(args).await
}

/// Runs the bundler for already-parsed arguments and returns the exit code.
pub async fn run_with(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let runtime = RuntimeConfig::from(&args);
    let settings = load_settings(&args)?;

    let selection = PlatformSelection::parse(&args.platforms)?;
    let host_arch = args
        .arch
        .clone()
        .unwrap_or_else(|| std::env::consts::ARCH.to_string());
    let targets = resolve_targets(&host_arch, &selection, &settings)?;

    let reporter = Reporter::new(runtime.output().clone());

    if args.dry_run {
        return Ok(dry_run(&Bundler::new(settings), &targets, &reporter, &runtime));
    }

    if settings.bundle_settings().tools.runner() == Some("npx") && !*HAS_NPX {
        runtime.warn("npx not found on PATH; packaging steps will fail to start");
    }

    let cancel = CancellationToken::new();
    let interrupt_listener = {
        let cancel = cancel.clone();
        let output = runtime.output().clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = output.warn("Interrupt received, stopping current step...");
                cancel.cancel();
            }
        })
    };

    let runner = ProcessRunner::new(Arc::new(runtime.output().clone()), cancel.clone())
        .with_timeout(settings.step_timeout());

    reporter.run_started(&targets, &settings);
    let bundler = Bundler::new(settings);
    let outcome = bundler.run(&targets, &runner, &reporter, &cancel).await;
    interrupt_listener.abort();
    let summary = outcome?;

    if let Some(path) = &args.report {
        write_report(path, &summary)?;
        runtime.verbose_println(&format!("Report written to {}", path.display()));
    }

    Ok(reporter.finish(&summary))
}

/// Plans every target and prints the commands. Spawns nothing.
fn dry_run(
    bundler: &Bundler,
    targets: &[crate::bundler::BuildTarget],
    reporter: &Reporter,
    runtime: &RuntimeConfig,
) -> i32 {
    let mut failures = 0;
    for (target, plan) in targets.iter().zip(bundler.plan_all(targets)) {
        match plan {
            Ok(plan) => reporter.print_plan(&plan),
            Err(e) => {
                failures += 1;
                runtime
                    .output()
                    .error(&format!("{} cannot be planned: {}", target, e));
            }
        }
    }

    if failures == 0 { 0 } else { 1 }
}

/// Merges CLI arguments, `bundle.toml` and `package.json` into [`Settings`].
///
/// Precedence: command line, then config file, then package.json.
pub fn load_settings(args: &Args) -> Result<Settings> {
    let config = metadata::discover_config(&args.app_dir, args.config.as_deref())?;
    let app_metadata = metadata::load_app_metadata(&args.app_dir)?.unwrap_or_default();

    let product_name = [
        args.name.clone(),
        config.app.name.clone(),
        Some(app_metadata.product_name.clone()),
    ]
    .into_iter()
    .flatten()
    .find(|name| !name.trim().is_empty())
    .ok_or_else(|| {
        BundlerError::Cli(CliError::MissingArgument {
            argument: "--name".to_string(),
            reason: format!(
                "no productName or name in {}",
                args.app_dir.join("package.json").display()
            ),
        })
    })?;

    let package = PackageSettings {
        product_name,
        version: config.app.version.clone().or(app_metadata.version),
    };

    let failure_policy =
        if args.continue_on_failure || config.build.continue_on_failure.unwrap_or(false) {
            FailurePolicy::ContinueOnFailure
        } else {
            FailurePolicy::StopOnFirstFailure
        };

    let step_timeout = args
        .step_timeout
        .or(config.build.step_timeout_secs)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    let mut builder = SettingsBuilder::new()
        .app_directory(&args.app_dir)
        .package_settings(package)
        .bundle_settings(crate::bundler::BundleSettings {
            icons: config.icons,
            installers: config.installers,
            tools: config.tools,
        })
        .failure_policy(failure_policy)
        .step_timeout(step_timeout);

    // --out is relative to the invoking shell, [output] dir to the app directory.
    if let Some(out) = &args.out_dir {
        builder = builder.out_directory(out.absolutize()?);
    } else if let Some(out) = &config.output.dir {
        builder = builder.out_directory(out);
    }

    Ok(builder.build()?)
}
