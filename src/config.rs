//! Runtime configuration, read from the environment (and `.env`)

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::politeness::RetryPolicy;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    /// Newline-delimited list of search URLs
    pub urls_file: PathBuf,
    /// Append-only log of seen ad URLs
    pub history_file: PathBuf,
    /// SQLite database holding extracted details
    pub database_url: String,
    /// Optional CSV copy of extracted details
    pub csv_export_path: Option<PathBuf>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub discord_webhook_url: Option<String>,
    /// Minimum interval between outbound requests
    pub politeness_delay: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Fetch details for already-seen ads too, keeping the archive fresh
    pub refresh_seen_details: bool,
    /// Cron expression; a single pass runs when unset
    pub schedule: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Ok(Self {
            urls_file: get("URLS_FILE")
                .unwrap_or_else(|| "urls_to_scrap.txt".to_string())
                .into(),
            history_file: get("HISTORY_FILE")
                .unwrap_or_else(|| "outputs/seen.txt".to_string())
                .into(),
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:outputs/properties.db".to_string()),
            csv_export_path: get("CSV_EXPORT_PATH").map(PathBuf::from),
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
            discord_webhook_url: get("DISCORD_WEBHOOK_URL"),
            politeness_delay: Duration::from_millis(parse_or(&get, "POLITENESS_DELAY_MS", 1000)?),
            retry_attempts: parse_or(&get, "RETRY_ATTEMPTS", 3)?,
            retry_delay: Duration::from_secs(parse_or(&get, "RETRY_DELAY_SECS", 5)?),
            request_timeout: Duration::from_secs(parse_or(&get, "REQUEST_TIMEOUT_SECS", 30)?),
            user_agent: get("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            refresh_seen_details: parse_or(&get, "REFRESH_SEEN_DETAILS", true)?,
            schedule: get("SCHEDULE"),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, self.retry_delay)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

/// Read the search URLs to process. Blank lines and `#` comments are skipped.
pub async fn load_search_urls(path: &Path) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read search URLs from {}", path.display()))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]).unwrap();

        assert_eq!(config.urls_file, PathBuf::from("urls_to_scrap.txt"));
        assert_eq!(config.history_file, PathBuf::from("outputs/seen.txt"));
        assert_eq!(config.database_url, "sqlite:outputs/properties.db");
        assert_eq!(config.csv_export_path, None);
        assert_eq!(config.politeness_delay, Duration::from_secs(1));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(5));
        assert!(config.refresh_seen_details);
        assert!(config.schedule.is_none());
        assert!(config.telegram_bot_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("POLITENESS_DELAY_MS", "250"),
            ("RETRY_ATTEMPTS", "10"),
            ("REFRESH_SEEN_DETAILS", "false"),
            ("SCHEDULE", "0 */15 * * * *"),
            ("CSV_EXPORT_PATH", "outputs/scraped_properties.csv"),
            ("TELEGRAM_BOT_TOKEN", "  "),
        ])
        .unwrap();

        assert_eq!(config.politeness_delay, Duration::from_millis(250));
        assert_eq!(config.retry_policy().max_attempts, 10);
        assert!(!config.refresh_seen_details);
        assert_eq!(config.schedule.as_deref(), Some("0 */15 * * * *"));
        assert_eq!(
            config.csv_export_path,
            Some(PathBuf::from("outputs/scraped_properties.csv"))
        );
        assert!(config.telegram_bot_token.is_none());
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = config_with(&[("RETRY_ATTEMPTS", "many")]).unwrap_err();
        assert!(err.to_string().contains("RETRY_ATTEMPTS"));
    }

    #[tokio::test]
    async fn test_load_search_urls() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("urls.txt");
        tokio::fs::write(
            &path,
            "# zonaprop\nhttps://www.zonaprop.com.ar/a.html\n\n  https://www.argenprop.com/b  \n",
        )
        .await
        .unwrap();

        let urls = load_search_urls(&path).await.unwrap();

        assert_eq!(
            urls,
            vec![
                "https://www.zonaprop.com.ar/a.html".to_string(),
                "https://www.argenprop.com/b".to_string(),
            ]
        );
    }
}
