mod openai_whisper_engine;
mod scripted_transcription_engine;

pub use openai_whisper_engine::{DEFAULT_OPENAI_BASE_URL, OpenAiWhisperEngine};
pub use scripted_transcription_engine::ScriptedTranscriptionEngine;
