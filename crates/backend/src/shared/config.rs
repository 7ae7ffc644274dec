use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
    pub avatar_bucket: String,
    pub passport_bucket: String,
    pub document_template_bucket: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub webhook_secret: String,
    /// id объекта, к которому привязываются входящие Telegram-чаты.
    pub default_object_id: i64,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[supabase]
url = ""
service_role_key = ""
avatar_bucket = "customer-avatars"
passport_bucket = "customer-passports"
document_template_bucket = "document-templates"

[telegram]
bot_token = ""
webhook_secret = ""
default_object_id = 0
"#;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Секреты перекрываются переменными окружения (SUPABASE_URL и т.д.).
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = read_config_file()?;
    apply_env_overrides(&mut config);
    Ok(config)
}

fn read_config_file() -> anyhow::Result<Config> {
    if let Some(config_path) = config_path_near_executable() {
        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            return Ok(config);
        } else {
            tracing::warn!("config.toml not found at: {}", config_path.display());
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

fn config_path_near_executable() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir: &Path = exe_path.parent()?;
    Some(exe_dir.join("config.toml"))
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(url) = std::env::var("SUPABASE_URL") {
        config.supabase.url = url;
    }
    if let Ok(key) = std::env::var("SUPABASE_SERVICE_ROLE_KEY") {
        config.supabase.service_role_key = key;
    }
    if let Ok(bucket) = std::env::var("SUPABASE_AVATAR_BUCKET") {
        config.supabase.avatar_bucket = bucket;
    }
    if let Ok(bucket) = std::env::var("SUPABASE_PASSPORT_BUCKET") {
        config.supabase.passport_bucket = bucket;
    }
    if let Ok(bucket) = std::env::var("SUPABASE_DOCUMENT_TEMPLATE_BUCKET") {
        config.supabase.document_template_bucket = bucket;
    }
    if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
        config.telegram.bot_token = token;
    }
    if let Ok(secret) = std::env::var("TELEGRAM_WEBHOOK_SECRET") {
        config.telegram.webhook_secret = secret;
    }
    if let Ok(raw) = std::env::var("TELEGRAM_DEFAULT_OBJECT_ID") {
        if let Ok(id) = raw.trim().parse::<i64>() {
            config.telegram.default_object_id = id;
        }
    }
}

/// Инициализация глобальной конфигурации при старте приложения.
pub fn init() -> anyhow::Result<&'static Config> {
    let config = load_config()?;
    Ok(CONFIG.get_or_init(|| config))
}

pub fn get() -> &'static Config {
    CONFIG.get_or_init(|| {
        let mut config: Config =
            toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse");
        apply_env_overrides(&mut config);
        config
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.supabase.avatar_bucket, "customer-avatars");
        assert_eq!(config.supabase.passport_bucket, "customer-passports");
        assert_eq!(config.telegram.default_object_id, 0);
    }
}
