use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use super::cost_calculator::CostCalculator;
use super::prompts::DEFAULT_TRANSCRIPTION_PROMPT;
use super::result_normalizer::normalize_transcript;
use super::service_error::ServiceError;
use super::tier_selector::TierSelector;
use crate::application::ports::{
    AudioStore, AudioStoreError, TranscriptionEngine, TranscriptionRepository,
    TranscriptionRequest,
};
use crate::domain::{
    Operation, PROVIDER_OPENAI, StoragePath, Transcription, TranscriptionId, UsageArtifact,
    UsageEvent, UsageQuantities, UserId,
};

pub const ALLOWED_AUDIO_EXTENSIONS: &[&str] = &[
    ".m4a", ".mp3", ".wav", ".ogg", ".webm", ".mp4", ".aac", ".flac",
];

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Lowercased suffix of `filename` including the dot, if it is an accepted audio type.
pub fn audio_suffix(filename: &str) -> Option<String> {
    let name = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename);
    let dot = name.rfind('.')?;
    let suffix = name[dot..].to_ascii_lowercase();
    ALLOWED_AUDIO_EXTENSIONS
        .contains(&suffix.as_str())
        .then_some(suffix)
}

pub fn audio_content_type(suffix: Option<&str>) -> &'static str {
    match suffix.map(str::to_ascii_lowercase).as_deref() {
        Some(".m4a") | Some(".mp4") => "audio/mp4",
        Some(".wav") => "audio/wav",
        Some(".ogg") => "audio/ogg",
        Some(".webm") => "audio/webm",
        Some(".aac") => "audio/aac",
        Some(".flac") => "audio/flac",
        _ => "audio/mpeg",
    }
}

#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub filename: String,
    pub data: Bytes,
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredAudio {
    pub data: Bytes,
    pub content_type: &'static str,
    pub filename: String,
}

#[derive(Debug, Clone)]
pub struct TranscriptionOptions {
    pub language_hint: Option<String>,
    pub max_upload_bytes: usize,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            language_hint: Some("da".to_string()),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

pub struct TranscriptionService {
    engine: Arc<dyn TranscriptionEngine>,
    tiers: TierSelector,
    repository: Arc<dyn TranscriptionRepository>,
    audio_store: Arc<dyn AudioStore>,
    calculator: Arc<CostCalculator>,
    options: TranscriptionOptions,
}

impl TranscriptionService {
    pub fn new(
        engine: Arc<dyn TranscriptionEngine>,
        tiers: TierSelector,
        repository: Arc<dyn TranscriptionRepository>,
        audio_store: Arc<dyn AudioStore>,
        calculator: Arc<CostCalculator>,
        options: TranscriptionOptions,
    ) -> Self {
        Self {
            engine,
            tiers,
            repository,
            audio_store,
            calculator,
            options,
        }
    }

    #[instrument(skip(self, upload), fields(user = %user_id, filename = %upload.filename, bytes = upload.data.len()))]
    pub async fn transcribe_upload(
        &self,
        user_id: UserId,
        upload: AudioUpload,
    ) -> Result<Transcription, ServiceError> {
        let suffix = audio_suffix(&upload.filename).ok_or_else(|| {
            ServiceError::UnsupportedMedia(format!(
                "unsupported file type, allowed: {}",
                ALLOWED_AUDIO_EXTENSIONS.join(", ")
            ))
        })?;

        if upload.data.len() > self.options.max_upload_bytes {
            return Err(ServiceError::PayloadTooLarge(format!(
                "file too large, maximum is {} MB",
                self.options.max_upload_bytes / (1024 * 1024)
            )));
        }

        let prompt = upload
            .context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_TRANSCRIPTION_PROMPT)
            .to_string();

        let request = TranscriptionRequest {
            audio: upload.data.clone(),
            filename: upload.filename.clone(),
            language_hint: self.options.language_hint.clone(),
            prompt: Some(prompt),
        };

        let served = self
            .tiers
            .invoke(Operation::Transcribe, |credential| {
                let request = &request;
                async move {
                    normalize_transcript(
                        self.engine.transcribe(request, &credential).await,
                        credential.tier,
                    )
                }
            })
            .await
            .into_result()
            .map_err(ServiceError::Provider)?;

        let mut transcription = Transcription::new(
            user_id,
            Some(upload.filename.clone()),
            served.payload.duration_seconds,
            served.payload.text,
        );

        let path = StoragePath::for_audio(&user_id, &transcription.id, &suffix);
        match self.audio_store.store(&path, upload.data).await {
            Ok(written) => {
                debug!(path = %path, bytes = written, "Audio stored");
                transcription.audio_path = Some(path);
            }
            Err(e) => warn!(error = %e, "Failed to store audio, keeping transcription without it"),
        }

        let model = self.engine.model();
        let quantities = UsageQuantities::Audio {
            seconds: transcription.duration_seconds,
        };
        let usage = UsageEvent::new(
            user_id,
            PROVIDER_OPENAI,
            model,
            Operation::Transcribe,
            served.tier,
            quantities,
            self.calculator.price(model, &quantities),
            Some(UsageArtifact::Transcription(transcription.id)),
        );

        self.repository.create(&transcription, Some(&usage)).await?;

        info!(
            transcription = %transcription.id,
            tier = %served.tier,
            duration_seconds = transcription.duration_seconds,
            cost_usd = usage.cost_usd,
            "Transcription created"
        );

        Ok(transcription)
    }

    pub async fn get(
        &self,
        user_id: UserId,
        id: TranscriptionId,
    ) -> Result<Transcription, ServiceError> {
        self.repository
            .get(id, user_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<(Vec<Transcription>, i64), ServiceError> {
        let items = self
            .repository
            .list(user_id, skip.max(0), limit.max(0))
            .await?;
        let total = self.repository.count(user_id).await?;
        Ok((items, total))
    }

    #[instrument(skip(self, raw_text), fields(user = %user_id, transcription = %id))]
    pub async fn update_raw_text(
        &self,
        user_id: UserId,
        id: TranscriptionId,
        raw_text: Option<String>,
    ) -> Result<Transcription, ServiceError> {
        let mut transcription = self.get(user_id, id).await?;
        if let Some(raw_text) = raw_text {
            transcription.raw_text = raw_text;
            transcription.updated_at = chrono::Utc::now();
            self.repository.update(&transcription, None).await?;
        }
        Ok(transcription)
    }

    #[instrument(skip(self), fields(user = %user_id, transcription = %id))]
    pub async fn delete(&self, user_id: UserId, id: TranscriptionId) -> Result<(), ServiceError> {
        let transcription = self.get(user_id, id).await?;
        if !self.repository.delete(id, user_id).await? {
            return Err(not_found(id));
        }
        if let Some(path) = &transcription.audio_path {
            self.remove_audio(path).await;
        }
        info!("Transcription deleted");
        Ok(())
    }

    pub async fn fetch_audio(
        &self,
        user_id: UserId,
        id: TranscriptionId,
    ) -> Result<StoredAudio, ServiceError> {
        let transcription = self.get(user_id, id).await?;
        let path = transcription
            .audio_path
            .ok_or_else(|| ServiceError::NotFound("no audio attached".to_string()))?;

        let data = self.audio_store.fetch(&path).await.map_err(|e| match e {
            AudioStoreError::NotFound(_) => {
                ServiceError::NotFound("audio file not found".to_string())
            }
            other => ServiceError::Storage(other),
        })?;

        let suffix = path.suffix().map(str::to_string);
        let filename = transcription
            .filename
            .unwrap_or_else(|| format!("audio{}", suffix.as_deref().unwrap_or("")));

        Ok(StoredAudio {
            data,
            content_type: audio_content_type(suffix.as_deref()),
            filename,
        })
    }

    #[instrument(skip(self), fields(user = %user_id, transcription = %id))]
    pub async fn delete_audio(
        &self,
        user_id: UserId,
        id: TranscriptionId,
    ) -> Result<Transcription, ServiceError> {
        let mut transcription = self.get(user_id, id).await?;
        let path = transcription
            .audio_path
            .take()
            .ok_or_else(|| ServiceError::NotFound("no audio attached".to_string()))?;

        transcription.updated_at = chrono::Utc::now();
        self.repository.update(&transcription, None).await?;
        self.remove_audio(&path).await;
        Ok(transcription)
    }

    async fn remove_audio(&self, path: &StoragePath) {
        if let Err(e) = self.audio_store.delete(path).await {
            warn!(path = %path, error = %e, "Failed to delete stored audio");
        }
    }
}

fn not_found(id: TranscriptionId) -> ServiceError {
    ServiceError::NotFound(format!("transcription {id} not found"))
}
