use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use platform_authn::AuthConfig;

use crate::positions::DEFAULT_POSITIONS_URL;

const MIN_SECRET_BYTES: usize = 32;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub cors_allowed_origins: Vec<String>,
    pub positions_url: String,
    pub mail: MailConfig,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MailTransport {
    #[default]
    Log,
    Ses,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub from: String,
    pub ses_region: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::Log,
            from: "no-reply@fedegon.com".into(),
            ses_region: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let jwt_secret =
            std::env::var("JWT_SECRET_BASE64").context("JWT_SECRET_BASE64 missing")?;
        let jwt_secret = decode_secret(&jwt_secret)?;

        let token_ttl_minutes = match std::env::var("TOKEN_TTL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("invalid TOKEN_TTL_MINUTES {raw:?}"))?,
            Err(_) => 60,
        };

        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let positions_url =
            std::env::var("POSITIONS_URL").unwrap_or_else(|_| DEFAULT_POSITIONS_URL.into());

        let defaults = MailConfig::default();
        let transport = match std::env::var("MAIL_TRANSPORT") {
            Ok(raw) => parse_transport(&raw)?,
            Err(_) => defaults.transport,
        };
        let mail = MailConfig {
            transport,
            from: std::env::var("MAIL_FROM").unwrap_or(defaults.from),
            ses_region: std::env::var("SES_REGION").ok(),
        };

        Ok(Self {
            auth: AuthConfig {
                jwt_secret,
                token_ttl_minutes,
            },
            cors_allowed_origins,
            positions_url,
            mail,
        })
    }
}

fn decode_secret(raw: &str) -> Result<Vec<u8>> {
    let bytes = STANDARD
        .decode(raw.trim())
        .context("invalid JWT_SECRET_BASE64")?;
    if bytes.len() < MIN_SECRET_BYTES {
        return Err(anyhow!(
            "JWT_SECRET_BASE64 must decode to at least {MIN_SECRET_BYTES} bytes"
        ));
    }
    Ok(bytes)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn parse_transport(raw: &str) -> Result<MailTransport> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "log" => Ok(MailTransport::Log),
        "ses" => Ok(MailTransport::Ses),
        other => Err(anyhow!("unknown MAIL_TRANSPORT {other:?} (use log|ses)")),
    }
}
