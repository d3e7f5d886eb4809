pub mod mailgun;

use async_trait::async_trait;

#[async_trait]
pub trait MailerProvider: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Dev-mode mailer: logs instead of delivering, so the flow works without
/// Mailgun credentials.
pub struct ConsoleMailer;

#[async_trait]
impl MailerProvider for ConsoleMailer {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        tracing::info!(to = %to, subject = %subject, body = %body, "outbound email (console)");
        Ok(())
    }
}
