// src/services/mail.rs

//! Mail notifier.
//!
//! Sends one summary message per batch of new posts. The SMTP connection is
//! verified before anything is sent.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::auth::{SecretSource, smtp_credentials};
use crate::error::{AppError, Result};
use crate::models::{MailConfig, Post};

/// Port on which the relay speaks implicit TLS; any other port uses STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Subject and plain-text body of a summary message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailContent {
    pub subject: String,
    pub body: String,
}

/// Compose the summary for a batch: the count in the subject, one
/// title/url paragraph per post in the body.
pub fn compose(posts: &[Post], subject_prefix: &str) -> MailContent {
    let subject = format!(
        "{} {} new announcement(s)",
        subject_prefix.trim(),
        posts.len()
    )
    .trim_start()
    .to_string();

    let body = posts
        .iter()
        .map(|post| format!("{}\n{}", post.title, post.url))
        .collect::<Vec<_>>()
        .join("\n\n");

    MailContent { subject, body }
}

/// Sends the new-post summary.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message describing `posts`. Never called with an empty batch.
    async fn notify(&self, posts: &[Post]) -> Result<()>;
}

/// Notifier backed by an authenticated SMTP relay.
pub struct SmtpNotifier {
    config: MailConfig,
    secrets: Arc<dyn SecretSource>,
}

impl SmtpNotifier {
    pub fn new(config: MailConfig, secrets: Arc<dyn SecretSource>) -> Self {
        Self { config, secrets }
    }

    /// Build the transport with freshly loaded credentials.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let credentials = smtp_credentials(&self.config, self.secrets.as_ref())?;
        let host = self.config.smtp_host.as_str();

        let builder = if self.config.smtp_port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| AppError::notify(format!("cannot set up SMTP relay {host}: {e}")))?;

        Ok(builder
            .port(self.config.smtp_port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
            .build())
    }

    fn message(&self, content: MailContent) -> Result<Message> {
        let from = self.config.sender_mailbox().map_err(AppError::notify)?;
        let to = self.config.recipient_mailbox().map_err(AppError::notify)?;
        Message::builder()
            .from(from)
            .to(to)
            .subject(content.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(content.body)
            .map_err(|e| AppError::notify(format!("cannot build message: {e}")))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, posts: &[Post]) -> Result<()> {
        let content = compose(posts, &self.config.subject_prefix);
        let message = self.message(content)?;
        let transport = self.transport()?;

        match transport.test_connection().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(AppError::notify(format!(
                    "SMTP server {} did not accept the connection check",
                    self.config.smtp_host
                )));
            }
            Err(e) => {
                return Err(AppError::notify(format!(
                    "SMTP verification against {} failed: {e}",
                    self.config.smtp_host
                )));
            }
        }

        transport
            .send(message)
            .await
            .map_err(|e| AppError::notify(format!("sending mail failed: {e}")))?;

        log::info!(
            "Notified {} about {} new post(s)",
            self.config.recipient,
            posts.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn post(title: &str, url: &str) -> Post {
        Post {
            number: "1".to_string(),
            status: None,
            title: title.to_string(),
            deadline: String::new(),
            selected_date: String::new(),
            file: String::new(),
            url: url.to_string(),
        }
    }

    fn mail_config(port: u16) -> MailConfig {
        MailConfig {
            sender: "watcher@example.com".to_string(),
            recipient: "team@example.com".to_string(),
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: port,
            timeout_secs: 2,
            ..MailConfig::default()
        }
    }

    fn credentials() -> Arc<dyn SecretSource> {
        let secrets: HashMap<String, String> = [
            ("KAMS_SMTP_USERNAME".to_string(), "watcher".to_string()),
            ("KAMS_SMTP_PASSWORD".to_string(), "secret".to_string()),
        ]
        .into_iter()
        .collect();
        Arc::new(secrets)
    }

    #[test]
    fn test_compose_counts_and_lists_posts() {
        let posts = vec![
            post("첫 번째 공고", "https://example.com//a"),
            post("두 번째 공고", "https://example.com//b"),
        ];
        let content = compose(&posts, "[KAMS]");

        assert_eq!(content.subject, "[KAMS] 2 new announcement(s)");
        assert_eq!(
            content.body,
            "첫 번째 공고\nhttps://example.com//a\n\n두 번째 공고\nhttps://example.com//b"
        );
    }

    #[test]
    fn test_compose_without_prefix() {
        let content = compose(&[post("t", "u")], "");
        assert_eq!(content.subject, "1 new announcement(s)");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_auth_error() {
        let secrets: Arc<dyn SecretSource> = Arc::new(HashMap::<String, String>::new());
        let notifier = SmtpNotifier::new(mail_config(2525), secrets);
        let err = notifier.notify(&[post("t", "u")]).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[tokio::test]
    async fn test_bad_recipient_is_notify_error() {
        let config = MailConfig {
            recipient: "not an address".to_string(),
            ..mail_config(2525)
        };
        let notifier = SmtpNotifier::new(config, credentials());
        let err = notifier.notify(&[post("t", "u")]).await.unwrap_err();
        assert!(matches!(err, AppError::Notify(ref m) if m.contains("mail.recipient")));
    }

    #[tokio::test]
    async fn test_failed_verification_is_notify_error() {
        // Nothing listens on port 1, so the pre-send check cannot pass.
        let notifier = SmtpNotifier::new(mail_config(1), credentials());
        let err = notifier.notify(&[post("t", "u")]).await.unwrap_err();
        assert!(matches!(err, AppError::Notify(_)));
    }
}
