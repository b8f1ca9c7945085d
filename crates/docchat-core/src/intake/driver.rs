use super::{IntakeFlow, IntakeRecord, IntakeStep};
use crate::error::{DocChatError, Result};
use async_trait::async_trait;

/// Source of user answers for an interactive intake
#[async_trait]
pub trait InputProvider: Send {
    /// Show `message` and wait for a reply. `None` means the user has gone away.
    async fn prompt(&mut self, message: &str) -> Result<Option<String>>;

    /// Show `message` without waiting for a reply
    async fn notify(&mut self, message: &str) -> Result<()>;
}

/// Run `flow` to completion against `input`, re-asking after every rejection
pub async fn run_intake(
    mut flow: IntakeFlow,
    input: &mut dyn InputProvider,
) -> Result<IntakeRecord> {
    let mut question = flow.prompt().to_string();

    loop {
        let Some(answer) = input.prompt(&question).await? else {
            tracing::info!("Intake aborted at {:?}", flow.stage());
            return Err(DocChatError::IntakeAborted);
        };

        match flow.submit(&answer) {
            IntakeStep::Next { prompt, .. } => question = prompt,
            IntakeStep::Retry { message, .. } => question = message,
            IntakeStep::Complete(record) => {
                input.notify(&record.confirmation_message()).await?;
                return Ok(record);
            }
        }
    }
}
