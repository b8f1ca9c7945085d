//! Config command

use crate::app::OutputFormat;
use anyhow::Result;
use docchat_core::Config;
use std::path::Path;

pub fn run(config: &Config, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Cli => {
            println!("# {}", path.display());
            print!("{}", serde_yaml::to_string(config)?);
        }
    }
    Ok(())
}
