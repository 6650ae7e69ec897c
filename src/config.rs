use crate::directory::LanguagePreference;
use crate::errors::ConfigError;
use std::env;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite:./db/wolt-checker.db";
const DEFAULT_WOLT_API_URL: &str = "https://restaurant-api.wolt.com";

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot credential
    pub telegram_bot_token: String,
    /// SQLite connection URL
    pub database_url: String,
    /// Port of the health check server
    pub http_port: u16,
    /// Base URL of the restaurant directory API
    pub wolt_api_url: String,
    /// Per-request timeout for directory calls
    pub directory_timeout: Duration,
    /// Interval between notifier passes
    pub poll_interval: Duration,
    /// How long an untouched conversation is kept
    pub session_idle: Duration,
    /// Name language order used in conversations
    pub bot_languages: LanguagePreference,
    /// Name language order used in reopening notifications
    pub notifier_languages: LanguagePreference,
    /// Whether the bot process also runs the notifier
    pub run_notifier: bool,
}

impl Config {
    /// Loads the configuration, failing if the bot token is absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        if token.trim().is_empty() {
            return Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
        }

        let database_url = Self::database_url_from_env();
        let wolt_api_url = var_or("WOLT_API_URL", DEFAULT_WOLT_API_URL)
            .trim_end_matches('/')
            .to_string();

        let http_port = parse_var("HTTP_PORT", 3000u16)?;
        let directory_timeout = Duration::from_secs(parse_positive("DIRECTORY_TIMEOUT_SECS", 10)?);
        let poll_interval = Duration::from_secs(parse_positive("POLL_INTERVAL_SECS", 10)?);
        let session_idle = Duration::from_secs(parse_positive("SESSION_IDLE_SECS", 1800)?);

        let bot_languages = LanguagePreference::new(
            var_or("PRIMARY_LANGUAGE", "he"),
            var_or("FALLBACK_LANGUAGE", "en"),
        );
        let notifier_languages = LanguagePreference::new(
            var_or("NOTIFIER_PRIMARY_LANGUAGE", "en"),
            var_or("NOTIFIER_FALLBACK_LANGUAGE", "he"),
        );

        let run_notifier = match env::var("RUN_NOTIFIER") {
            Ok(v) => match v.trim().to_lowercase().as_str() {
                "" | "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "RUN_NOTIFIER",
                        value: v,
                    })
                }
            },
            Err(_) => true,
        };

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            wolt_api_url,
            directory_timeout,
            poll_interval,
            session_idle,
            bot_languages,
            notifier_languages,
            run_notifier,
        })
    }

    /// Database URL alone, for tools that do not talk to Telegram.
    pub fn database_url_from_env() -> String {
        var_or("DATABASE_URL", DEFAULT_DATABASE_URL)
    }
}

// Blank values count as unset.
fn var_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse().map_err(|_| ConfigError::Invalid {
            var: name,
            value: v,
        }),
        _ => Ok(default),
    }
}

fn parse_positive(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let value = parse_var(name, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            var: name,
            value: "0".to_string(),
        });
    }
    Ok(value)
}
