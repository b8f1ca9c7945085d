//! Ask command

use crate::app::{AskArgs, OutputFormat};
use anyhow::Result;
use docchat_core::{ChatSession, Config, ReplyKind, Route};

const SCHEDULE_HINT: &str = "To arrange a call, run `docchat schedule`.";

pub async fn run(args: AskArgs, config: Config, format: OutputFormat) -> Result<()> {
    let mut session = ChatSession::from_config(config)?;
    let question = args.question.join(" ");

    // A one-shot question cannot carry an intake, so there is nothing to load
    if session.route(&question) == Route::Scheduling {
        match format {
            OutputFormat::Json => {
                let out = serde_json::json!({ "route": Route::Scheduling, "text": SCHEDULE_HINT });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            OutputFormat::Cli => println!("{}", SCHEDULE_HINT),
        }
        return Ok(());
    }

    session.load_document(&args.pdf).await?;
    let reply = session.respond(&question).await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        OutputFormat::Cli => {
            println!("{}", reply.text);
            if args.sources && reply.kind == ReplyKind::Answer {
                println!();
                super::print_sources(&reply.sources);
            }
        }
    }
    Ok(())
}
