//! Outbound messaging seam. Real SMS delivery is out of scope; the default
//! dispatcher records the hand-off in the log and returns a receipt.

use crate::error::LifelineError;
use crate::types::{AlertInput, DispatchReceipt};
use ulid::Ulid;

pub trait AlertDispatcher: Send + Sync {
    fn dispatch(&self, input: &AlertInput) -> Result<DispatchReceipt, LifelineError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

impl AlertDispatcher for LogDispatcher {
    fn dispatch(&self, input: &AlertInput) -> Result<DispatchReceipt, LifelineError> {
        let correlation_id = format!("sms_{}", Ulid::new());
        let recipients = u32::try_from(input.recipients.len()).map_err(LifelineError::internal)?;
        let without_phone = input
            .recipients
            .iter()
            .filter(|recipient| recipient.phone.is_none())
            .count();
        tracing::info!(
            %correlation_id,
            kind = ?input.kind,
            recipients,
            without_phone,
            "alert handed to sms gateway"
        );
        Ok(DispatchReceipt {
            correlation_id,
            recipients,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlertKind, AlertRecipient, UserId};

    #[test]
    fn log_dispatcher_issues_sms_receipt() {
        let input = AlertInput {
            recipients: vec![
                AlertRecipient {
                    user_id: UserId::generate(),
                    phone: Some("+8801700000000".to_string()),
                },
                AlertRecipient {
                    user_id: UserId::generate(),
                    phone: None,
                },
            ],
            message: "Evacuate to the school building".to_string(),
            kind: AlertKind::Evacuation,
        };
        let receipt = LogDispatcher.dispatch(&input).unwrap();
        assert!(receipt.correlation_id.starts_with("sms_"));
        assert_eq!(receipt.correlation_id.len(), 4 + 26);
        assert_eq!(receipt.recipients, 2);
    }
}
