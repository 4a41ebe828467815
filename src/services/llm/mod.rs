pub mod client;
pub mod prompt;

pub use client::LLMService;
pub use prompt::PromptBuilder;
