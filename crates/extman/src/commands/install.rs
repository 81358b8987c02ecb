//! Extension install command

use anyhow::{Context, Result};
use camino::Utf8Path;
use extman_extensions::InstallResult;

use crate::cli::InstallArgs;
use crate::output;
use crate::utils::manager;

pub fn run(args: InstallArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let manager = manager(config_dir)?;

    let (label, result) = if let Some(archive) = &args.archive {
        let result = output::with_spinner(&format!("Installing from {}...", archive), || {
            manager.install_from_file(archive.as_std_path())
        });
        (archive.to_string(), result)
    } else if let Some(url) = &args.url {
        let result = output::with_spinner(&format!("Downloading {}...", url), || {
            manager.install_from_url(url)
        });
        (url.clone(), result)
    } else {
        // clap guarantees a name when neither archive nor url is given
        let name = args.name.as_deref().unwrap_or_default();
        let result = output::with_spinner(&format!("Installing {}...", name), || {
            manager.install_from_catalog(name, args.version.as_deref())
        });
        (name.to_string(), result)
    };

    let installed = result.with_context(|| format!("Failed to install {}", label))?;
    report(&installed);
    Ok(())
}

fn report(result: &InstallResult) {
    output::success(&format!("Installed {} {}", result.name, result.version));
    output::field("Binary", result.binary_path.display());
    output::field("Digest", &result.digest);
}
