//! Interactive chat command

use crate::app::ChatArgs;
use crate::input::StdinInput;
use anyhow::Result;
use docchat_core::{ChatSession, Config, ReplyKind};
use std::path::Path;

const HELP: &str = "Commands: /load <pdf>, /reset, /cancel, /help, /exit";

pub async fn run(args: ChatArgs, config: Config, verbose: bool) -> Result<()> {
    let mut session = ChatSession::from_config(config)?;

    if let Some(pdf) = &args.pdf {
        load(&mut session, pdf).await;
    } else if let Some(dir) = &args.index {
        session.attach_index(dir)?;
        println!("Bot: Index loaded. Ask me anything about the document.");
    } else {
        println!("Bot: Load a document with /load <pdf> to start asking questions.");
    }
    println!("{}", HELP);

    let mut input = StdinInput::new();
    while let Some(line) = input.read_line("You: ").await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "/exit" | "/quit" | "exit" | "quit" => break,
            "/help" => println!("{}", HELP),
            "/reset" => {
                session.clear_history();
                println!("Bot: Conversation cleared.");
            }
            "/cancel" => {
                if session.cancel_intake() {
                    println!("Bot: Okay, I won't arrange a call.");
                }
            }
            _ if line.starts_with("/load ") => {
                let path = line.trim_start_matches("/load ").trim();
                load(&mut session, Path::new(path)).await;
            }
            _ => {
                let reply = session.respond(line).await;
                println!("Bot: {}", reply.text);
                if verbose && reply.kind == ReplyKind::Answer {
                    super::print_sources(&reply.sources);
                }
            }
        }
    }

    Ok(())
}

/// Load failures are reported and the conversation carries on
async fn load(session: &mut ChatSession, pdf: &Path) {
    match session.load_document(pdf).await {
        Ok(report) => println!(
            "Bot: Loaded {} ({} pages, {} chunks). Ask me anything about it.",
            report.source.display(),
            report.pages,
            report.chunks
        ),
        Err(e) => println!("Bot: {}", e),
    }
}
