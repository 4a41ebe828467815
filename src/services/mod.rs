pub mod llm;
pub mod voice;
