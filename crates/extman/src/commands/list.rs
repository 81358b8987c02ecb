//! Extension list command

use anyhow::{Context, Result};
use camino::Utf8Path;
use tabled::{
    settings::{object::Columns, Modify, Style, Width},
    Table, Tabled,
};

use crate::cli::ListArgs;
use crate::output;
use crate::utils::manager;

#[derive(Tabled, serde::Serialize)]
struct ExtensionRow {
    name: String,
    #[tabled(rename = "latest version")]
    latest_version: String,
    releases: usize,
    status: String,
    description: String,
}

pub fn run(args: ListArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let manager = manager(config_dir)?;
    let catalog = manager
        .catalog()
        .context("Failed to load extension catalog")?;
    let installed = manager
        .installed()
        .context("Failed to read installed extensions")?;

    let rows: Vec<ExtensionRow> = catalog
        .extensions
        .iter()
        .filter(|ext| !args.installed || installed.contains(&ext.name))
        .map(|ext| ExtensionRow {
            name: ext.name.clone(),
            latest_version: ext
                .latest_release()
                .map(|r| r.version.clone())
                .unwrap_or_else(|| "-".to_string()),
            releases: ext.releases.len(),
            status: if installed.contains(&ext.name) {
                "installed".to_string()
            } else {
                "available".to_string()
            },
            description: ext.description.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    if args.json {
        let json =
            serde_json::to_string_pretty(&rows).context("Failed to serialize extensions to JSON")?;
        println!("{}", json);
    } else if rows.is_empty() {
        output::note("No extensions found");
    } else {
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        table.with(Modify::new(Columns::new(4..5)).with(Width::wrap(50).keep_words(true)));
        println!("{}", table);
    }

    Ok(())
}
