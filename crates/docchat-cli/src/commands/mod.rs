//! CLI command handlers

pub mod ask;
pub mod chat;
pub mod config;
pub mod index;
pub mod route;
pub mod schedule;

use docchat_core::SourceRef;

/// Print answer sources, best first
pub(crate) fn print_sources(sources: &[SourceRef]) {
    if sources.is_empty() {
        println!("Sources: none");
        return;
    }
    println!("Sources:");
    for (i, source) in sources.iter().enumerate() {
        println!(
            "  [{}] page {} (chunk {}, score {:.3})",
            i + 1,
            source.page,
            source.seq,
            source.score
        );
        println!("      {}", source.excerpt.replace('\n', " "));
    }
}
