//! Telegram bot delivery

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use crate::models::TelegramMessage;
use crate::traits::Notifier;

/// Sends messages to a single chat through the Bot API
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create Telegram HTTP client")?;

        Ok(Self {
            client,
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        let endpoint = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let payload = TelegramMessage {
            chat_id: self.chat_id.clone(),
            text: message.to_string(),
            disable_web_page_preview: false,
        };

        let response = self
            .client
            .post(&endpoint)
            .json(&payload)
            .send()
            .await
            .context("Telegram request failed")?;

        if response.status().is_success() {
            info!("Telegram notification sent");
            Ok(())
        } else {
            let status = response.status();
            error!("Failed to send Telegram notification: {}", status);
            anyhow::bail!("Telegram answered with {status}")
        }
    }
}
