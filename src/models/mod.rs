pub mod common;
pub mod gemini;
pub mod story;
