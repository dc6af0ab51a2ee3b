//! Subcommands.

pub mod card;
pub mod classify;
pub mod code;
pub mod config;

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use cardscan_core::ScanConfig;

/// Load the configuration from an explicit path, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ScanConfig> {
    if let Some(path) = config_path {
        return ScanConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config at {}", default_path.display());
        return ScanConfig::from_file(&default_path)
            .with_context(|| format!("Failed to load config from {}", default_path.display()));
    }

    Ok(ScanConfig::default())
}

/// Read an input file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        return Ok(input);
    }

    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write output to a file, or stdout when no file is given.
pub fn write_output(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output)?;
            eprintln!(
                "{} Output written to {}",
                console::style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", output),
    }
    Ok(())
}
