//! Prompt construction for grounded answering

use super::Turn;
use crate::llm::ChatMessage;
use crate::search::SearchHit;

const ANSWER_SYSTEM_PROMPT: &str = "You are a helpful assistant answering questions about a \
document the user has uploaded. Use only the numbered excerpts provided to answer. If the \
excerpts do not contain the answer, say that you don't know. Keep answers concise.";

const CONDENSE_SYSTEM_PROMPT: &str = "Given a conversation and a follow-up question, rephrase \
the follow-up question to be a standalone question that can be understood without the \
conversation. Output only the standalone question.";

/// Messages asking the model to rewrite a follow-up as a standalone question
pub fn condense_messages(question: &str, history: &[Turn]) -> Vec<ChatMessage> {
    let transcript: String = history
        .iter()
        .map(|t| format!("Human: {}\nAssistant: {}\n", t.question, t.answer))
        .collect();

    vec![
        ChatMessage::system(CONDENSE_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Chat history:\n{}\nFollow-up question: {}\n\nStandalone question:",
            transcript, question
        )),
    ]
}

/// Full message sequence for one answer: instructions, prior turns, then
/// the retrieved excerpts with the question
pub fn answer_messages(question: &str, hits: &[SearchHit], history: &[Turn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(ChatMessage::system(ANSWER_SYSTEM_PROMPT));

    for turn in history {
        messages.push(ChatMessage::user(turn.question.clone()));
        messages.push(ChatMessage::assistant(turn.answer.clone()));
    }

    messages.push(ChatMessage::user(format!(
        "Excerpts:\n{}\nQuestion: {}",
        format_context(hits),
        question
    )));
    messages
}

fn format_context(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "(no relevant excerpts found)\n".to_string();
    }

    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "[{}] (page {})\n{}\n\n",
                i + 1,
                hit.chunk.metadata.page,
                hit.chunk.text.trim()
            )
        })
        .collect()
}

/// Strip the labels and quoting models tend to wrap a rewritten question in
pub fn clean_standalone(response: &str) -> String {
    let line = response
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");

    let line = line
        .strip_prefix("Standalone question:")
        .or_else(|| line.strip_prefix("standalone question:"))
        .unwrap_or(line)
        .trim();

    line.trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}
