use crate::llm::{DEFAULT_API_VERSION, DEFAULT_MODEL, GeminiSettings};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Seed prompt of the Sweet Home Bakery assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Bạn là chatbot tư vấn cho tiệm bánh ngọt "Sweet Home Bakery".
- Giới thiệu ngắn gọn, thân thiện.
- Menu gồm: Bánh kem 🎂, Bánh su kem 🍮, Bánh mì ngọt 🥐, Cupcake 🧁, Cookies 🍪, Trà sữa 🥤.
- Có nhận đặt bánh sinh nhật theo yêu cầu, giao hàng tận nơi tại Đà Nẵng.
- Khi khách hỏi giá thì trả lời cụ thể: bánh kem từ 120k, cupcake từ 15k/cái, cookies 10k/cái...
- Luôn xưng "Sweet Home" và nói chuyện thân thiện, lễ phép như nhân viên bán hàng."#;

/// Reply shown when an exchange fails.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "Xin lỗi, hệ thống đang bị lỗi. Vui lòng thử lại!";

/// Alert shown when a non-image file is attached.
pub const DEFAULT_REJECTION_MESSAGE: &str = "Chỉ chấp nhận file ảnh (JPEG, PNG, GIF, WEBP)";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model
    #[arg(long, env = "GEMINI_MODEL")]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory served under `/static`.
    pub static_dir: String,
    /// Maximum request body, bounds attachment uploads.
    pub body_limit_bytes: usize,
}

#[derive(Deserialize, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_version: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    pub system_prompt: String,
    pub fallback_message: String,
    pub rejection_message: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            rejection_message: DEFAULT_REJECTION_MESSAGE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.static_dir", "static")?
            .set_default("server.body_limit_bytes", 10 * 1024 * 1024)?
            .set_default("gemini.base_url", "https://generativelanguage.googleapis.com")?
            .set_default("gemini.api_version", DEFAULT_API_VERSION)?
            .set_default("gemini.model", DEFAULT_MODEL)?
            .set_default("chat.system_prompt", DEFAULT_SYSTEM_PROMPT)?
            .set_default("chat.fallback_message", DEFAULT_FALLBACK_MESSAGE)?
            .set_default("chat.rejection_message", DEFAULT_REJECTION_MESSAGE)?;

        // 2. Config file: explicit path must exist, ./config.* is optional
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // 3. Environment, e.g. CHATBOT_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("CHATBOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (and the env vars clap maps onto them)
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(key) = cli.api_key {
            builder = builder.set_override("gemini.api_key", key)?;
        }
        if let Some(model) = cli.model {
            builder = builder.set_override("gemini.model", model)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Resolve the settings used to build the Gemini driver.
    pub fn gemini_settings(&self) -> Result<GeminiSettings, config::ConfigError> {
        let base_url = self.gemini.base_url.trim();
        if base_url.is_empty() {
            return Err(config::ConfigError::Message(
                "gemini.base_url cannot be empty".to_string(),
            ));
        }

        let api_key = self
            .gemini
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                config::ConfigError::Message(
                    "Missing Gemini API key: set GEMINI_API_KEY or gemini.api_key".to_string(),
                )
            })?;

        Ok(GeminiSettings::new(base_url, api_key)
            .with_model(self.gemini.model.clone())
            .with_api_version(self.gemini.api_version.clone()))
    }
}
