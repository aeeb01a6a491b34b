//! Email delivery of notifications

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use super::notifications::Notifier;
use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::{Notification, Recipient},
};

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Build the message for a notification
    fn build_message(&self, to: &str, subject: &str, body: &str) -> AppResult<Message> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Bibliotheca");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<html><body><p>{}</p></body></html>"#,
                                body.replace('\n', "<br>")
                            )),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))
    }

    fn mailer(&self) -> AppResult<SmtpTransport> {
        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        Ok(mailer_builder.build())
    }

    /// Send a plain email; the SMTP exchange runs on the blocking pool
    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let email = self.build_message(to, subject, body)?;
        let mailer = self.mailer()?;

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailService {
    async fn dispatch(&self, recipient: &Recipient, notification: &Notification) -> AppResult<()> {
        let body = format!(
            "Hello {},\n\n{}\n\nBibliotheca",
            recipient.username, notification.message
        );
        self.send_email(&recipient.email, &notification.subject, &body)
            .await?;
        tracing::info!(
            "Notification email {} sent to user {}",
            notification.id,
            recipient.user_id
        );
        Ok(())
    }
}
