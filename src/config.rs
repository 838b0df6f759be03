use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Database connection URL; the file is created on first run
    #[arg(long, env = "FAROL_DATABASE_URL", default_value = "sqlite://db/subscriptions.sqlite")]
    pub database_url: String,

    /// Log output format
    #[arg(long, env = "FAROL_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub vapid: VapidConfig,

    #[command(flatten)]
    pub delivery: DeliveryConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "FAROL_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
}

#[derive(Clone, Debug, Args)]
pub struct VapidConfig {
    /// VAPID public key (base64url, uncompressed P-256 point), served to browsers
    #[arg(long, env = "FAROL_VAPID_PUBLIC_KEY")]
    pub public_key: String,

    /// VAPID private key (base64url, raw 32-byte P-256 scalar)
    #[arg(long, env = "FAROL_VAPID_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// VAPID subject claim, a mailto: or https: contact URL
    #[arg(long, env = "FAROL_VAPID_SUBJECT", default_value = "mailto:admin@example.com")]
    pub subject: String,
}

#[derive(Clone, Debug, Args)]
pub struct DeliveryConfig {
    /// Timeout for a single delivery attempt, in seconds
    #[arg(long, env = "FAROL_DELIVERY_TIMEOUT_SECS", default_value_t = 5)]
    pub timeout_secs: u64,

    /// TTL handed to the push service, in seconds
    #[arg(long, env = "FAROL_DELIVERY_TTL_SECS", default_value_t = 86_400)]
    pub ttl_secs: u32,

    /// Icon URL embedded in notification payloads
    #[arg(long, env = "FAROL_NOTIFICATION_ICON", default_value = "/badge.svg")]
    pub icon: String,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }
}

impl VapidConfig {
    /// Checks the key material shape at startup, before any delivery is
    /// attempted: the public key must decode to a 65-byte uncompressed P-256
    /// point and the private key to a raw 32-byte scalar.
    ///
    /// # Errors
    /// Returns an error describing the malformed key. Fatal at boot.
    pub fn validate(&self) -> anyhow::Result<()> {
        let public = URL_SAFE_NO_PAD
            .decode(&self.public_key)
            .map_err(|e| anyhow::anyhow!("VAPID public key is not valid base64url: {e}"))?;
        anyhow::ensure!(
            public.len() == 65 && public[0] == 0x04,
            "VAPID public key must be a 65-byte uncompressed P-256 point"
        );

        let private = URL_SAFE_NO_PAD
            .decode(&self.private_key)
            .map_err(|e| anyhow::anyhow!("VAPID private key is not valid base64url: {e}"))?;
        anyhow::ensure!(
            private.len() == 32,
            "VAPID private key must be a raw 32-byte P-256 scalar, got {} bytes",
            private.len()
        );

        Ok(())
    }
}
