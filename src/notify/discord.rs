//! # Discord Webhook Integration
//!
//! Posts new-ad notifications to a Discord channel through a webhook.
//!
//! ## Rate Limits
//!
//! Discord webhooks accept about 30 requests per minute and 2000 characters
//! of `content` per message. The orchestrator's politeness delay keeps a
//! pass well below the request limit; notification text is a handful of
//! short lines and never approaches the size limit.
//!
//! ## Environment Configuration
//!
//! Set `DISCORD_WEBHOOK_URL` to the webhook URL from the channel settings
//! (`https://discord.com/api/webhooks/{id}/{token}`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use crate::models::DiscordMessage;
use crate::traits::Notifier;

/// Discord webhook notification client.
///
/// Holds a reusable `reqwest::Client`, which pools connections and is cheap
/// to clone, so the notifier can be shared across scheduled passes.
#[derive(Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create Discord HTTP client")?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    /// Post `message` as the webhook's plain `content`.
    ///
    /// Network failures and non-success statuses are returned as errors so
    /// the caller can log them against the ad.
    async fn send(&self, message: &str) -> Result<()> {
        let payload = DiscordMessage {
            content: message.to_string(),
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .context("Discord webhook request failed")?;

        if response.status().is_success() {
            info!("Discord notification sent");
            Ok(())
        } else {
            let status = response.status();
            error!("Failed to send Discord notification: {}", status);
            anyhow::bail!("Discord answered with {status}")
        }
    }
}
