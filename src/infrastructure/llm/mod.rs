mod gemini_client;
mod scripted_generators;

pub use gemini_client::{
    DEFAULT_GEMINI_BASE_URL, GeminiClient, GeminiImageGenerator, GeminiTextGenerator,
};
pub use scripted_generators::{ScriptedImageGenerator, ScriptedTextGenerator};
