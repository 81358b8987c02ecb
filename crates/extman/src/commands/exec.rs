//! Extension exec command

use anyhow::{anyhow, Context, Result};
use camino::Utf8Path;
use extman_extensions::{ClientLifecycle, ProcessRuntime};
use tracing::debug;

use crate::cli::ExecArgs;
use crate::utils::manager;

/// Launch the newest installed release and wait for it to exit
///
/// Returns the extension's exit code. The child is registered with
/// `lifecycle` so it is reaped even when this process exits early.
pub fn run(
    args: ExecArgs,
    config_dir: Option<&Utf8Path>,
    lifecycle: &ClientLifecycle,
) -> Result<i32> {
    let manager = manager(config_dir)?;
    let (release, binary) = manager
        .installed_binary(&args.name)
        .with_context(|| format!("Cannot run '{}'", args.name))?;

    debug!("Running {} {} from {}", args.name, release.version, binary.display());
    let runtime = ProcessRuntime::spawn(&args.name, &binary, &args.args)
        .with_context(|| format!("Failed to start {}", binary.display()))?;
    let id = lifecycle.register(Box::new(runtime));

    let code = lifecycle
        .with_runtime(id, |runtime| runtime.wait())
        .context("Failed to wait for extension")?;

    match code {
        Some(code) => {
            debug!("{} exited with status {}", args.name, code);
            Ok(code)
        }
        None => Err(anyhow!("{} was terminated by a signal", args.name)),
    }
}
