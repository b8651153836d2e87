use crate::{
    config::Config,
    services::{GeminiClient, GenerativeProvider, ProviderCredentials, StoryService},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub story_service: Arc<StoryService>,
    pub credentials: Arc<ProviderCredentials>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let client = GeminiClient::from_config(&config.gemini)?;
        Ok(Self::with_provider(config, Arc::new(client)))
    }

    /// Build state around any provider (tests swap in a stub here)
    pub fn with_provider(config: Config, provider: Arc<dyn GenerativeProvider>) -> Self {
        let credentials = ProviderCredentials::from(&config.gemini);

        Self {
            story_service: Arc::new(StoryService::new(provider)),
            credentials: Arc::new(credentials),
            config: Arc::new(config),
        }
    }
}
