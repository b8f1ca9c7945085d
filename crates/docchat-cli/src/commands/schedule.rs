//! Schedule command

use crate::app::OutputFormat;
use crate::input::StdinInput;
use anyhow::Result;
use docchat_core::{run_intake, IntakeFlow};

pub async fn run(format: OutputFormat) -> Result<()> {
    let mut input = StdinInput::new();
    let record = run_intake(IntakeFlow::new(), &mut input).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }
    Ok(())
}
