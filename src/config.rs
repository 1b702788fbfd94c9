use crate::error::BotError;
use crate::utils::validation::{
    validate_poll_options, validate_poll_timing, validate_poll_title, validate_telegram_chat_id,
};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DEFAULT_NAMESPACE: &str = "Testing_TG_DB";
const DEFAULT_POLL_TITLE: &str = "Daily Poll";
const DEFAULT_POLL_OPTIONS: &str = "Option A|Option B";
const DEFAULT_DURATION_MINS: u64 = 60;
const DEFAULT_REMINDER_MINS: u64 = 15;
const DEFAULT_GRACE_SECS: u64 = 10;

/// Everything the bot needs for one run, validated once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub chat_id: i64,
    /// `None` runs the bot without persistence
    pub database_url: Option<String>,
    pub database_namespace: String,
    pub poll: PollSettings,
    pub image: Option<ImageSettings>,
    /// `None` disables the health server
    pub http_port: Option<u16>,
    pub shutdown_grace: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollSettings {
    pub title: String,
    pub duration_mins: u64,
    pub reminder_mins: u64,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSettings {
    pub source: ImageSource,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Url(Url),
    File(PathBuf),
}

impl ImageSource {
    /// Anything starting with `http://` or `https://` is a remote image, everything else a local path.
    pub fn parse(raw: &str) -> Result<Self, BotError> {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = Url::parse(raw)
                .map_err(|e| BotError::config(format!("DEFAULT_IMAGE_PATH is not a valid URL: {e}")))?;
            Ok(ImageSource::Url(url))
        } else {
            Ok(ImageSource::File(PathBuf::from(raw)))
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("TG_BOT_API_TOKEN")
            .ok_or_else(|| BotError::config("TG_BOT_API_TOKEN must be set"))?;

        let chat_id = get("TG_CHAT_ID")
            .ok_or_else(|| BotError::config("TG_CHAT_ID must be set"))?;
        let chat_id: i64 = chat_id
            .trim()
            .parse()
            .map_err(|_| BotError::config(format!("Invalid TG_CHAT_ID: '{chat_id}'")))?;
        validate_telegram_chat_id(chat_id)?;

        let database_url = get("DATABASE_URL").map(|url| url.trim().to_string());
        let database_namespace = get("DATABASE_NAME")
            .map(|ns| ns.trim().to_string())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let title = get("POLL_TITLE").unwrap_or_else(|| DEFAULT_POLL_TITLE.to_string());
        validate_poll_title(&title)?;

        let duration_mins = parse_number(get("POLL_DURATION_IN_MINS"), "POLL_DURATION_IN_MINS", DEFAULT_DURATION_MINS)?;
        let reminder_mins = parse_number(get("REMINDER_MINS"), "REMINDER_MINS", DEFAULT_REMINDER_MINS)?;
        validate_poll_timing(duration_mins, reminder_mins)?;

        let options = validate_poll_options(
            &get("POLL_OPTIONS").unwrap_or_else(|| DEFAULT_POLL_OPTIONS.to_string()),
        )?;

        let image = parse_image(&get)?;

        let http_port = match get("HTTP_PORT") {
            Some(port) => Some(
                port.trim()
                    .parse()
                    .map_err(|_| BotError::config("Invalid HTTP_PORT"))?,
            ),
            None => None,
        };

        let grace_secs = parse_number(get("SHUTDOWN_GRACE_SECS"), "SHUTDOWN_GRACE_SECS", DEFAULT_GRACE_SECS)?;
        if grace_secs == 0 {
            return Err(BotError::config("SHUTDOWN_GRACE_SECS must be greater than zero"));
        }

        Ok(Config {
            telegram_bot_token: token,
            chat_id,
            database_url,
            database_namespace,
            poll: PollSettings {
                title: title.trim().to_string(),
                duration_mins,
                reminder_mins,
                options,
            },
            image,
            http_port,
            shutdown_grace: Duration::from_secs(grace_secs),
        })
    }
}

fn parse_number(raw: Option<String>, key: &str, default: u64) -> Result<u64, BotError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| BotError::config(format!("Invalid {key}: '{value}' is not a whole number of minutes/seconds"))),
        None => Ok(default),
    }
}

fn parse_image<F>(get: &F) -> Result<Option<ImageSettings>, BotError>
where
    F: Fn(&str) -> Option<String>,
{
    let enabled = get("ENABLE_IMAGE_SENDING")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false);

    if !enabled {
        return Ok(None);
    }

    let Some(path) = get("DEFAULT_IMAGE_PATH") else {
        tracing::warn!("ENABLE_IMAGE_SENDING is set but DEFAULT_IMAGE_PATH is empty, image disabled");
        return Ok(None);
    };

    Ok(Some(ImageSettings {
        source: ImageSource::parse(&path)?,
        caption: get("DEFAULT_IMAGE_CAPTION").unwrap_or_default(),
    }))
}
