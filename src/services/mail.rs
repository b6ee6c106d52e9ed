//! Outbound mail
//!
//! `MailService` sends the contact-form message through a pluggable
//! `MailTransport`. Delivery never fails the request: the service reports how
//! many messages went out and logs transport errors.

use crate::config::{MailConfig, MailTransportKind};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

/// A fully addressed plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Something that can deliver a message
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// SMTP delivery through lettre.
///
/// Port 465 uses implicit TLS; any other port negotiates STARTTLS.
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let builder = if config.smtp_port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        }
        .with_context(|| format!("Failed to create SMTP transport for {}", config.smtp_host))?
        .port(config.smtp_port);

        let builder = if config.smtp_username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
        };

        Ok(Self {
            mailer: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let mut builder = Message::builder()
            .from(
                mail.from
                    .parse()
                    .map_err(|e| anyhow!("Invalid from address {:?}: {}", mail.from, e))?,
            )
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN);

        for to in &mail.to {
            builder = builder.to(to
                .parse()
                .map_err(|e| anyhow!("Invalid recipient {:?}: {}", to, e))?);
        }

        let message = builder
            .body(mail.body.clone())
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        Ok(())
    }
}

/// Development transport that writes messages to the log instead of sending them
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleMailer;

#[async_trait]
impl MailTransport for ConsoleMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        tracing::info!(
            from = %mail.from,
            to = %mail.to.join(", "),
            subject = %mail.subject,
            "Outgoing mail (console transport):\n{}",
            mail.body
        );
        Ok(())
    }
}

/// Build the transport selected in configuration
pub fn transport_from_config(config: &MailConfig) -> Result<Arc<dyn MailTransport>> {
    match config.transport {
        MailTransportKind::Console => Ok(Arc::new(ConsoleMailer)),
        MailTransportKind::Smtp => Ok(Arc::new(SmtpMailer::new(config)?)),
    }
}

/// Sends contact messages from the configured address to the configured recipient
pub struct MailService {
    transport: Arc<dyn MailTransport>,
    from_address: String,
    recipient: String,
}

impl MailService {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        from_address: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            from_address: from_address.into(),
            recipient: recipient.into(),
        }
    }

    pub fn from_config(transport: Arc<dyn MailTransport>, config: &MailConfig) -> Self {
        Self::new(transport, &config.from_address, &config.recipient)
    }

    /// Send a contact message, returning the number of messages delivered.
    ///
    /// Transport errors are logged and reported as zero deliveries.
    pub async fn send_contact(&self, subject: &str, content: &str) -> usize {
        let mail = OutgoingMail {
            from: self.from_address.clone(),
            to: vec![self.recipient.clone()],
            subject: subject.to_string(),
            body: content.to_string(),
        };

        match self.transport.send(&mail).await {
            Ok(()) => {
                tracing::info!(subject = %mail.subject, "Contact message sent");
                1
            }
            Err(e) => {
                tracing::warn!("Failed to send contact message: {:#}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<OutgoingMail>>,
        fail: bool,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, mail: &OutgoingMail) -> Result<()> {
            self.sent.lock().unwrap().push(mail.clone());
            if self.fail {
                Err(anyhow!("connection refused"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_send_contact_uses_fixed_addresses() {
        let transport = Arc::new(RecordingTransport::default());
        let service = MailService::new(transport.clone(), "site@example.com", "desk@example.com");

        assert_eq!(service.send_contact("Hello", "Body text").await, 1);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "site@example.com");
        assert_eq!(sent[0].to, vec!["desk@example.com".to_string()]);
        assert_eq!(sent[0].subject, "Hello");
        assert_eq!(sent[0].body, "Body text");
    }

    #[tokio::test]
    async fn test_transport_failure_reports_zero() {
        let transport = Arc::new(RecordingTransport {
            fail: true,
            ..Default::default()
        });
        let service = MailService::new(transport.clone(), "a@example.com", "b@example.com");

        assert_eq!(service.send_contact("Hello", "Body").await, 0);
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_console_transport_always_delivers() {
        let service = MailService::from_config(Arc::new(ConsoleMailer), &MailConfig::default());
        assert_eq!(service.send_contact("Subject", "Body").await, 1);
    }

    #[tokio::test]
    async fn test_smtp_rejects_invalid_address() {
        let config = MailConfig {
            transport: MailTransportKind::Smtp,
            smtp_host: "localhost".to_string(),
            ..MailConfig::default()
        };
        let mailer = SmtpMailer::new(&config).expect("transport builds without connecting");
        let mail = OutgoingMail {
            from: "not an address".to_string(),
            to: vec!["desk@example.com".to_string()],
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        assert!(mailer.send(&mail).await.is_err());
    }
}
