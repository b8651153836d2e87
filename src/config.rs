use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    // Photos arrive base64-encoded inside the JSON body
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_base: String,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub text_api_key: Option<String>,
    #[serde(default)]
    pub image_api_key: Option<String>,
    #[serde(default)]
    pub text_model: Option<String>,
    #[serde(default)]
    pub image_model: Option<String>,
}

impl GeminiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for environment variable overrides)
        dotenvy::dotenv().ok();

        let image_model = env::var("NANO_BANANA_MODEL")
            .or_else(|_| env::var("GEMINI_IMAGE_MODEL"))
            .ok();

        let config = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.max_body_bytes", 10 * 1024 * 1024)?
            .set_default(
                "gemini.api_base",
                "https://generativelanguage.googleapis.com/v1beta/models",
            )?
            .set_default("gemini.request_timeout_secs", 60)?
            // config.yml is optional; defaults above cover a bare deployment
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("MAGIC_STORY")
                    .separator("__")
                    .try_parsing(true),
            )
            // Conventional variable names used by existing deployments
            .set_override_option("gemini.text_api_key", env::var("GEMINI_API_KEY").ok())?
            .set_override_option(
                "gemini.image_api_key",
                env::var("NANO_BANANA_API_KEY").ok(),
            )?
            .set_override_option("gemini.text_model", env::var("GEMINI_TEXT_MODEL").ok())?
            .set_override_option("gemini.image_model", image_model)?
            .build()?;

        config.try_deserialize()
    }
}
