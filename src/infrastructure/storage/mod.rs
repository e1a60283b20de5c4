mod local_audio_store;
mod memory_audio_store;

pub use local_audio_store::LocalAudioStore;
pub use memory_audio_store::InMemoryAudioStore;
