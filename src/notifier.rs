use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use std::time::Duration;

use crate::config::MailConfig;

const CREDENTIALS_SUBJECT: &str = "Your Digital Cafe login credentials";
const DENIED_SUBJECT: &str = "Your Digital Cafe registration status";

/// Outbound account notifications. Delivery is best-effort: callers log failures
/// and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_credentials(
        &self,
        to: &str,
        username: &str,
        temp_password: &str,
    ) -> anyhow::Result<()>;

    async fn send_denied(&self, to: &str, reason: Option<&str>) -> anyhow::Result<()>;
}

/// Used when no mail transport is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send_credentials(&self, to: &str, username: &str, _: &str) -> anyhow::Result<()> {
        tracing::debug!(to, username, "mail disabled, credentials not sent");
        Ok(())
    }

    async fn send_denied(&self, to: &str, _: Option<&str>) -> anyhow::Result<()> {
        tracing::debug!(to, "mail disabled, denial not sent");
        Ok(())
    }
}

#[derive(Serialize)]
struct SendEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: String,
}

/// Sends through a JSON mail API (`POST {api_url}` with a bearer key).
pub struct MailApiNotifier {
    client: Client,
    config: MailConfig,
}

impl MailApiNotifier {
    pub fn new(config: MailConfig) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .user_agent("cafe-hub/1.0 (+reqwest)")
            .tcp_nodelay(true)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, config })
    }

    async fn send(&self, to: &str, subject: &str, text: String) -> anyhow::Result<()> {
        let email = SendEmail {
            from: &self.config.from,
            to: vec![to],
            subject,
            text,
        };

        let res = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&email)
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            tracing::info!(to, subject, "mail sent");
            Ok(())
        } else {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("mail API error: HTTP {status}: {body}")
        }
    }
}

#[async_trait]
impl Notifier for MailApiNotifier {
    async fn send_credentials(
        &self,
        to: &str,
        username: &str,
        temp_password: &str,
    ) -> anyhow::Result<()> {
        let text = format!(
            "Hello,\n\nYour Digital Cafe account is ready.\n\nUsername: {username}\nTemporary password: {temp_password}\n\nYou will be asked to change this password after your first login.\n"
        );
        self.send(to, CREDENTIALS_SUBJECT, text).await
    }

    async fn send_denied(&self, to: &str, reason: Option<&str>) -> anyhow::Result<()> {
        let mut text =
            String::from("Hello,\n\nYour Digital Cafe registration has been denied by the admin.\n");
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            text.push_str(&format!("\nReason: {reason}\n"));
        }
        self.send(to, DENIED_SUBJECT, text).await
    }
}

/// Sends credentials if the account has an address; failures are only logged.
pub async fn notify_credentials(
    notifier: &dyn Notifier,
    to: Option<&str>,
    username: &str,
    temp_password: &str,
) {
    let Some(to) = to.filter(|t| !t.trim().is_empty()) else {
        tracing::warn!(username, "no email on file, credentials not sent");
        return;
    };
    if let Err(err) = notifier.send_credentials(to, username, temp_password).await {
        tracing::warn!(error = %err, username, "credentials email failed");
    }
}

pub async fn notify_denied(notifier: &dyn Notifier, to: Option<&str>, reason: Option<&str>) {
    let Some(to) = to.filter(|t| !t.trim().is_empty()) else {
        return;
    };
    if let Err(err) = notifier.send_denied(to, reason).await {
        tracing::warn!(error = %err, to, "denial email failed");
    }
}
