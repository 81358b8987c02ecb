//! Extension info command

use anyhow::{Context, Result};
use camino::Utf8Path;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::InfoArgs;
use crate::output;
use crate::utils::manager;

#[derive(Tabled, serde::Serialize)]
struct ArtifactRow {
    version: String,
    platform: String,
    sum: String,
    url: String,
}

/// Show the releases and per-platform artifacts of one extension
pub fn run(args: InfoArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let manager = manager(config_dir)?;
    let extension = manager
        .lookup(&args.name)
        .with_context(|| format!("Failed to look up '{}'", args.name))?;

    let rows: Vec<ArtifactRow> = extension
        .releases
        .iter()
        .flat_map(|release| {
            release.artifacts.iter().map(move |artifact| ArtifactRow {
                version: release.version.clone(),
                platform: format!("{}-{}", artifact.os, artifact.arch),
                sum: artifact.sum.clone(),
                url: artifact.url.clone().unwrap_or_else(|| "-".to_string()),
            })
        })
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&rows).context("Failed to serialize releases")?;
        println!("{}", json);
        return Ok(());
    }

    let installed = manager.installed_binary(&extension.name).ok();
    output::extension_heading(
        &extension.name,
        installed.as_ref().map(|(release, _)| release.version.as_str()),
    );
    if let Some(description) = &extension.description {
        output::field("Description", description);
    }
    if let Some(binary) = &extension.binary {
        output::field("Binary", binary);
    }
    output::field("Releases", extension.releases.len());
    match &installed {
        Some((_, path)) => output::field("Installed", path.display()),
        None => output::field("Installed", "no"),
    }

    if rows.is_empty() {
        output::note("No artifacts published");
    } else {
        println!();
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        println!("{}", table);
    }

    Ok(())
}
