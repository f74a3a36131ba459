//! Notification text and delivery
//!
//! Messages are plain text: one `Label: value` line per known field, a
//! blank line, then the ad URL. Ad details are used when the ad page
//! yielded any; otherwise the search URL's summary is used.

pub mod discord;
pub mod telegram;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{DetailRecord, SearchSummary};
use crate::traits::Notifier;

pub use discord::DiscordNotifier;
pub use telegram::TelegramNotifier;

/// Lines for each extracted detail, in notification order
pub fn format_details(details: &DetailRecord) -> Vec<String> {
    [
        ("Zona", &details.neighbourhood),
        ("Precio", &details.price),
        ("Expensas", &details.expenses),
        ("Sup.", &details.surface),
        ("Ambientes", &details.rooms),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|value| format!("{label}: {value}")))
    .collect()
}

/// Lines for each recognized search parameter
pub fn format_summary(summary: &SearchSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(zone) = &summary.zone {
        lines.push(format!("Zona: {zone}"));
    }
    if let Some(price_range) = &summary.price_range {
        lines.push(format!("Precio: {price_range}"));
    }
    if let Some(min_surface) = &summary.min_surface {
        lines.push(format!("Sup. mínima: {min_surface} m2"));
    }
    lines
}

/// Build the notification for a new ad
pub fn format_message(
    ad_url: &str,
    summary: &SearchSummary,
    details: Option<&DetailRecord>,
) -> String {
    let lines = match details.filter(|details| details.has_details()) {
        Some(details) => format_details(details),
        None => format_summary(summary),
    };

    if lines.is_empty() {
        ad_url.to_string()
    } else {
        format!("{}\n\n{}", lines.join("\n"), ad_url)
    }
}

/// Notifier used when no delivery channel is configured; messages are only logged
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        info!("Notifications disabled, new ad:\n{}", message);
        Ok(())
    }
}

/// Pick the delivery channel from configuration. Telegram wins when both
/// Telegram and Discord are configured.
pub fn from_config(config: &Config) -> Result<Arc<dyn Notifier>> {
    if let (Some(token), Some(chat_id)) = (&config.telegram_bot_token, &config.telegram_chat_id) {
        info!("Sending notifications through Telegram");
        return Ok(Arc::new(TelegramNotifier::new(token, chat_id)?));
    }

    if let Some(webhook_url) = &config.discord_webhook_url {
        info!("Sending notifications through Discord");
        return Ok(Arc::new(DiscordNotifier::new(webhook_url)?));
    }

    warn!("No TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID or DISCORD_WEBHOOK_URL set - notifications will only be logged");
    Ok(Arc::new(DisabledNotifier))
}
