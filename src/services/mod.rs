pub mod extractor;
pub mod gemini_client;
pub mod prompts;
pub mod story_service;
pub mod validation;

pub use gemini_client::{GeminiClient, GenerativeProvider};
pub use story_service::{ProviderCredentials, StoryService};
