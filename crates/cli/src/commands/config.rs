//! Config Commands

use anyhow::{bail, Result};
use clap::Subcommand;
use std::path::Path;

use studio_common::ClientConfig;

use crate::output::{print_success, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn execute(cmd: ConfigCommands, config: &ClientConfig, path: &Path, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Show => match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            OutputFormat::Yaml => println!("{}", serde_yaml::to_string(config)?),
            OutputFormat::Table | OutputFormat::Plain => {
                println!("# {}", path.display());
                println!("{}", config.to_toml()?);
            }
        },

        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            ClientConfig::default().save(path)?;
            print_success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = ClientConfig::default();

        execute(ConfigCommands::Init { force: false }, &config, &path, OutputFormat::Plain).unwrap();
        assert_eq!(ClientConfig::load(&path).unwrap(), config);

        assert!(execute(ConfigCommands::Init { force: false }, &config, &path, OutputFormat::Plain).is_err());
        assert!(execute(ConfigCommands::Init { force: true }, &config, &path, OutputFormat::Plain).is_ok());
    }
}
