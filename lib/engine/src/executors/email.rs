//! Messaging send executor (SMTP email).
//!
//! Sends mail through an SMTP relay over STARTTLS. The transport sits
//! behind the [`Mailer`] trait so the executor can be tested with a fake;
//! the engine's tests never open a real SMTP connection.

use crate::context::ExecutionContext;
use crate::error::NodeError;
use crate::executors::NodeExecutor;
use crate::execution::LogLevel;
use crate::node::Node;
use crate::resolver::ResolvedInput;
use async_trait::async_trait;
use chrono::Utc;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::{Value as JsonValue, json};
use std::fmt;
use std::sync::Arc;

/// A fully resolved outbound message, including relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Errors from the mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailerError {
    /// An address or message part could not be built.
    InvalidMessage { reason: String },
    /// The SMTP transport failed (connect, STARTTLS, auth, or send).
    Transport { reason: String },
}

impl fmt::Display for MailerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMessage { reason } => write!(f, "invalid message: {reason}"),
            Self::Transport { reason } => write!(f, "smtp transport failed: {reason}"),
        }
    }
}

impl std::error::Error for MailerError {}

/// Trait for mail delivery.
///
/// The production implementation speaks SMTP; tests substitute a recorder.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers the message.
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError>;
}

/// SMTP mailer using a STARTTLS relay.
pub struct SmtpMailer;

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(email.from.parse().map_err(|e| MailerError::InvalidMessage {
                reason: format!("from address '{}': {e}", email.from),
            })?)
            .to(email.to.parse().map_err(|e| MailerError::InvalidMessage {
                reason: format!("to address '{}': {e}", email.to),
            })?)
            .subject(email.subject.clone())
            .body(email.body.clone())
            .map_err(|e| MailerError::InvalidMessage {
                reason: e.to_string(),
            })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&email.smtp_host)
            .map_err(|e| MailerError::Transport {
                reason: format!("relay {}: {e}", email.smtp_host),
            })?
            .port(email.smtp_port)
            .credentials(Credentials::new(
                email.username.clone(),
                email.password.clone(),
            ))
            .build();

        transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| MailerError::Transport {
                reason: e.to_string(),
            })
    }
}

/// Executes `send_email` nodes.
pub struct EmailExecutor {
    mailer: Arc<dyn Mailer>,
}

impl EmailExecutor {
    /// Creates an executor backed by the real SMTP transport.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mailer(Arc::new(SmtpMailer))
    }

    /// Creates an executor with a custom mail transport.
    #[must_use]
    pub fn with_mailer(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    fn build_email(node: &Node) -> Result<OutboundEmail, NodeError> {
        // Collect every missing required field before failing, so the
        // author fixes the configuration in one pass.
        let mut missing = Vec::new();
        let mut required = |field: &str| -> String {
            match node.config_non_empty_str(field) {
                Some(value) => value.to_string(),
                None => {
                    missing.push(field.to_string());
                    String::new()
                }
            }
        };

        let to = required("to");
        let subject = required("subject");
        let body = required("body");
        let smtp_host = required("smtpHost");
        let username = required("smtpUser");
        let password = required("smtpPassword");

        if !missing.is_empty() {
            return Err(NodeError::MissingConfig { fields: missing });
        }

        let smtp_port = match node.config_value("smtpPort") {
            None => 587,
            Some(value) => {
                let parsed = match value {
                    JsonValue::Number(n) => n.as_u64(),
                    JsonValue::String(s) => s.parse::<u64>().ok(),
                    _ => None,
                };
                parsed
                    .and_then(|p| u16::try_from(p).ok())
                    .ok_or_else(|| NodeError::InvalidConfig {
                        field: "smtpPort".to_string(),
                        reason: format!("'{value}' is not a port number"),
                    })?
            }
        };

        let from = node
            .config_non_empty_str("from")
            .unwrap_or(&username)
            .to_string();

        Ok(OutboundEmail {
            smtp_host,
            smtp_port,
            username,
            password,
            from,
            to,
            subject,
            body,
        })
    }
}

impl Default for EmailExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeExecutor for EmailExecutor {
    async fn execute(
        &self,
        node: &Node,
        _input: ResolvedInput,
        context: &mut ExecutionContext,
    ) -> Result<JsonValue, NodeError> {
        let email = Self::build_email(node)?;

        context.log(
            &node.id,
            format!("Sending email to {} via {}", email.to, email.smtp_host),
            LogLevel::Info,
        );

        self.mailer
            .send(&email)
            .await
            .map_err(|e| NodeError::External {
                reason: e.to_string(),
            })?;

        Ok(json!({
            "sent": true,
            "to": email.to,
            "subject": email.subject,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }
}
