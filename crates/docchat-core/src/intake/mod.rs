//! Structured intake for "schedule a call" requests
//!
//! A linear state machine: name → email → phone → date → complete.
//! Each stage repeats until it receives a valid value. The machine is
//! push-driven (`submit`) so any transport can feed it; [`run_intake`]
//! drives it from an [`InputProvider`] for terminal-style hosts.

mod driver;
mod validate;

pub use driver::{run_intake, InputProvider};
pub use validate::{
    format_date, parse_appointment_date, validate_email, validate_name, validate_phone,
    DEFAULT_PHONE_REGION,
};

use crate::error::DocChatError;
use chrono::{DateTime, Local, NaiveDate};
use phonenumber::country;
use serde::{Deserialize, Serialize};

/// Contact details collected for a callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub name: String,
    pub email: String,
    /// E.164 form, e.g. "+16502530000"
    pub phone: String,
    pub appointment_date: NaiveDate,
}

impl IntakeRecord {
    /// Message echoing the captured details back to the user
    pub fn confirmation_message(&self) -> String {
        format!(
            "Thank you, {}! We'll call you on {} at {}. A confirmation will be sent to {}.",
            self.name,
            format_date(self.appointment_date),
            self.phone,
            self.email
        )
    }
}

/// Which field the flow is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStage {
    CollectName,
    CollectEmail,
    CollectPhone,
    CollectDate,
    Complete,
}

impl IntakeStage {
    /// Question shown to the user for this stage
    pub fn prompt(self) -> &'static str {
        match self {
            IntakeStage::CollectName => "Sure, I can arrange a call. What is your name?",
            IntakeStage::CollectEmail => "What is your email address?",
            IntakeStage::CollectPhone => "What phone number should we call?",
            IntakeStage::CollectDate => "When would you like the call? (e.g. \"next Friday\" or \"March 3 2025\")",
            IntakeStage::Complete => "All details collected.",
        }
    }
}

/// Result of feeding one input to the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeStep {
    /// Input accepted; ask the next question
    Next { stage: IntakeStage, prompt: String },
    /// Input rejected; the same question stands
    Retry {
        stage: IntakeStage,
        message: String,
    },
    /// Every field collected
    Complete(IntakeRecord),
}

/// How fields are checked; phone region and date reference are injectable
#[derive(Debug, Clone)]
pub struct FieldValidator {
    pub phone_region: country::Id,
    /// Anchor for relative dates; `None` uses the current local time
    pub reference_time: Option<DateTime<Local>>,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self {
            phone_region: DEFAULT_PHONE_REGION,
            reference_time: None,
        }
    }
}

impl FieldValidator {
    fn now(&self) -> DateTime<Local> {
        self.reference_time.unwrap_or_else(Local::now)
    }
}

/// One in-progress intake conversation
#[derive(Debug, Clone)]
pub struct IntakeFlow {
    stage: IntakeStage,
    validator: FieldValidator,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    record: Option<IntakeRecord>,
}

impl IntakeFlow {
    pub fn new() -> Self {
        Self::with_validator(FieldValidator::default())
    }

    pub fn with_validator(validator: FieldValidator) -> Self {
        Self {
            stage: IntakeStage::CollectName,
            validator,
            name: None,
            email: None,
            phone: None,
            record: None,
        }
    }

    pub fn stage(&self) -> IntakeStage {
        self.stage
    }

    /// The question currently awaiting an answer
    pub fn prompt(&self) -> &'static str {
        self.stage.prompt()
    }

    pub fn is_complete(&self) -> bool {
        self.stage == IntakeStage::Complete
    }

    /// Feed the answer to the current question
    pub fn submit(&mut self, input: &str) -> IntakeStep {
        let outcome = match self.stage {
            IntakeStage::CollectName => validate_name(input).map(|v| self.name = Some(v)),
            IntakeStage::CollectEmail => validate_email(input).map(|v| self.email = Some(v)),
            IntakeStage::CollectPhone => {
                validate_phone(input, self.validator.phone_region).map(|v| self.phone = Some(v))
            }
            IntakeStage::CollectDate => {
                parse_appointment_date(input, self.validator.now()).map(|date| {
                    self.record = Some(IntakeRecord {
                        name: self.name.take().unwrap_or_default(),
                        email: self.email.take().unwrap_or_default(),
                        phone: self.phone.take().unwrap_or_default(),
                        appointment_date: date,
                    });
                })
            }
            IntakeStage::Complete => Ok(()),
        };

        match outcome {
            Ok(()) => {
                self.stage = next_stage(self.stage);
                tracing::debug!("Intake advanced to {:?}", self.stage);
                match (self.stage, &self.record) {
                    (IntakeStage::Complete, Some(record)) => IntakeStep::Complete(record.clone()),
                    (stage, _) => IntakeStep::Next {
                        stage,
                        prompt: stage.prompt().to_string(),
                    },
                }
            }
            Err(err) => {
                tracing::debug!("Intake rejected input at {:?}: {}", self.stage, err);
                let message = match err {
                    DocChatError::ValidationRejected { message, .. } => message,
                    other => other.to_string(),
                };
                IntakeStep::Retry {
                    stage: self.stage,
                    message: format!("{}. {}", message, self.stage.prompt()),
                }
            }
        }
    }
}

impl Default for IntakeFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn next_stage(stage: IntakeStage) -> IntakeStage {
    match stage {
        IntakeStage::CollectName => IntakeStage::CollectEmail,
        IntakeStage::CollectEmail => IntakeStage::CollectPhone,
        IntakeStage::CollectPhone => IntakeStage::CollectDate,
        IntakeStage::CollectDate | IntakeStage::Complete => IntakeStage::Complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn flow() -> IntakeFlow {
        IntakeFlow::with_validator(FieldValidator {
            phone_region: DEFAULT_PHONE_REGION,
            reference_time: Some(Local.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()),
        })
    }

    #[test]
    fn test_happy_path() {
        let mut flow = flow();
        assert_eq!(flow.stage(), IntakeStage::CollectName);

        assert!(matches!(
            flow.submit("Ada Lovelace"),
            IntakeStep::Next { stage: IntakeStage::CollectEmail, .. }
        ));
        assert!(matches!(
            flow.submit("ada@example.com"),
            IntakeStep::Next { stage: IntakeStage::CollectPhone, .. }
        ));
        assert!(matches!(
            flow.submit("650-253-0000"),
            IntakeStep::Next { stage: IntakeStage::CollectDate, .. }
        ));

        match flow.submit("March 3 2025") {
            IntakeStep::Complete(record) => {
                assert_eq!(record.name, "Ada Lovelace");
                assert_eq!(record.email, "ada@example.com");
                assert_eq!(record.phone, "+16502530000");
                assert_eq!(format_date(record.appointment_date), "2025-03-03");
                let msg = record.confirmation_message();
                assert!(msg.contains("Ada Lovelace"));
                assert!(msg.contains("2025-03-03"));
                assert!(msg.contains("+16502530000"));
                assert!(msg.contains("ada@example.com"));
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(flow.is_complete());
    }

    #[test]
    fn test_invalid_input_retries_same_stage() {
        let mut flow = flow();
        flow.submit("Ada");

        for _ in 0..3 {
            match flow.submit("not-an-email") {
                IntakeStep::Retry { stage, message } => {
                    assert_eq!(stage, IntakeStage::CollectEmail);
                    assert!(message.contains("not a valid email"));
                }
                other => panic!("expected retry, got {other:?}"),
            }
        }
        assert_eq!(flow.stage(), IntakeStage::CollectEmail);

        flow.submit("ada@example.com");
        assert!(matches!(flow.submit("12"), IntakeStep::Retry { stage: IntakeStage::CollectPhone, .. }));
        flow.submit("+1 650 253 0000");
        assert!(matches!(flow.submit("blah"), IntakeStep::Retry { stage: IntakeStage::CollectDate, .. }));
        assert!(!flow.is_complete());
    }

    #[test]
    fn test_submit_after_complete_repeats_record() {
        let mut flow = flow();
        flow.submit("Ada");
        flow.submit("ada@example.com");
        flow.submit("650-253-0000");
        let first = flow.submit("2025-03-03");
        let again = flow.submit("anything");
        assert_eq!(first, again);
    }
}
