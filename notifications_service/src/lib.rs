// notifications_service/src/lib.rs
//
// Best-effort outbound mail. Messages go to an HTTP mail relay; delivery
// failure is logged by the dispatcher and never surfaces to the caller's
// request path.

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tokio::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("mail relay rejected the message with status {0}")]
    Relay(StatusCode),
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl OutgoingMail {
    /// The registration welcome message.
    pub fn welcome(full_name: &str, email: &str) -> Self {
        Self {
            to: email.to_string(),
            subject: format!("Welcome {full_name}"),
            text: format!(
                "Hi {full_name},\n\nThank you for registering with us. We're glad to have you!"
            ),
        }
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    endpoint: Option<String>,
    from: String,
}

impl Mailer {
    pub fn new(endpoint: String, from: String) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: Some(endpoint),
            from,
        })
    }

    /// A mailer with no relay configured; every message is dropped after a
    /// debug log. Used when the deployment has no relay, and by tests.
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: None,
            from: String::new(),
        }
    }

    pub async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let Some(endpoint) = &self.endpoint else {
            debug!(to = %mail.to, "mail relay disabled, dropping message");
            return Ok(());
        };

        let response = self
            .client
            .post(endpoint)
            .json(&RelayPayload {
                from: &self.from,
                to: &mail.to,
                subject: &mail.subject,
                text: &mail.text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailError::Relay(response.status()));
        }
        Ok(())
    }

    /// Fire-and-forget delivery. The spawned task owns the message; failure
    /// is logged and otherwise swallowed.
    pub fn dispatch(&self, mail: OutgoingMail) {
        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&mail).await {
                warn!(to = %mail.to, error = %e, "failed to deliver mail");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_mail_addresses_the_patient() {
        let mail = OutgoingMail::welcome("Amina Berrada", "amina@example.com");
        assert_eq!(mail.to, "amina@example.com");
        assert_eq!(mail.subject, "Welcome Amina Berrada");
        assert!(mail.text.contains("Hi Amina Berrada"));
    }

    #[tokio::test]
    async fn disabled_mailer_swallows_messages() {
        let mailer = Mailer::disabled();
        let mail = OutgoingMail::welcome("Amina Berrada", "amina@example.com");
        mailer.send(&mail).await.unwrap();
    }
}
