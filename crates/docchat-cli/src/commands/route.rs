//! Route command

use crate::app::{OutputFormat, RouteArgs};
use anyhow::Result;
use docchat_core::{Config, IntentRouter, KeywordRouter};

pub fn run(args: RouteArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let router = KeywordRouter::new(&config.router.triggers);
    let query = args.query.join(" ");
    let route = router.route(&query);

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({ "query": query, "route": route });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Cli => println!("{}", route),
    }
    Ok(())
}
