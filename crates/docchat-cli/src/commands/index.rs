//! Index command

use crate::app::{IndexArgs, OutputFormat};
use anyhow::Result;
use docchat_core::{ChatSession, Config};

pub async fn run(args: IndexArgs, config: Config, format: OutputFormat) -> Result<()> {
    let mut session = ChatSession::from_config(config)?;
    let report = session.load_document(&args.pdf).await?;
    session.persist_index();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Cli => {
            println!("Indexed:     {}", report.source.display());
            println!("Pages:       {}", report.pages);
            println!("Chunks:      {}", report.chunks);
            println!(
                "Embeddings:  {} ({} dimensions)",
                report.embedding_model, report.dimensions
            );
            println!("Time:        {} ms", report.elapsed_ms);
            println!("Index:       {}", report.index_dir.display());
        }
    }
    Ok(())
}
