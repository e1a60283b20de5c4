use std::sync::Arc;

use bytes::Bytes;

use diktat::application::ports::{ProviderError, TranscriptionRepository};
use diktat::application::services::{
    AudioUpload, DEFAULT_TRANSCRIPTION_PROMPT, ServiceError, TierSelector, audio_content_type,
    audio_suffix,
};
use diktat::domain::{ApiTier, Operation, UsageQuantities};
use diktat::infrastructure::audio::ScriptedTranscriptionEngine;
use diktat::infrastructure::llm::{ScriptedImageGenerator, ScriptedTextGenerator};

use crate::helpers::{
    FREE_KEY, FailingTranscriptionRepository, PAID_KEY, TEST_MAX_UPLOAD_BYTES, TestApp,
    random_user, seed_transcription, transcript, transcription_service_with,
};

fn upload(filename: &str, context: Option<&str>) -> AudioUpload {
    AudioUpload {
        filename: filename.to_string(),
        data: Bytes::from_static(b"fake-audio"),
        context: context.map(str::to_string),
    }
}

fn app_with_engine(engine: ScriptedTranscriptionEngine) -> TestApp {
    TestApp::new(
        engine,
        ScriptedTextGenerator::new(),
        ScriptedImageGenerator::new(),
    )
}

#[tokio::test]
async fn given_free_tier_transcribes_two_minutes_when_uploading_then_one_free_event_is_priced() {
    let app = app_with_engine(
        ScriptedTranscriptionEngine::new().respond(FREE_KEY, Ok(transcript("hej verden", 120.0))),
    );
    let user = random_user();

    let transcription = app
        .state
        .transcription_service
        .transcribe_upload(user, upload("memo.m4a", None))
        .await
        .unwrap();

    assert_eq!(transcription.raw_text, "hej verden");
    assert_eq!(transcription.duration_formatted(), "2:00");
    assert_eq!(app.engine.calls_for(PAID_KEY), 0);

    let events = app.store.usage_events().await;
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.operation, Operation::Transcribe);
    assert_eq!(event.tier, ApiTier::Free);
    assert_eq!(event.provider, "openai");
    assert_eq!(event.quantities, UsageQuantities::Audio { seconds: 120.0 });
    assert!((event.cost_usd - 2.0 * 0.006).abs() < 1e-9);
    assert_eq!(event.transcription_id(), Some(transcription.id));
}

#[tokio::test]
async fn given_free_tier_fails_when_uploading_then_paid_serves_and_is_billed() {
    let app = app_with_engine(
        ScriptedTranscriptionEngine::new()
            .respond(FREE_KEY, Err(ProviderError::RateLimited))
            .respond(PAID_KEY, Ok(transcript("betalt", 30.0))),
    );
    let user = random_user();

    app.state
        .transcription_service
        .transcribe_upload(user, upload("memo.mp3", None))
        .await
        .unwrap();

    assert_eq!(app.engine.calls_for(FREE_KEY), 1);
    assert_eq!(app.engine.calls_for(PAID_KEY), 1);
    let events = app.store.usage_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].tier, ApiTier::Paid);
}

#[tokio::test]
async fn given_both_tiers_fail_when_uploading_then_provider_error_and_nothing_persisted() {
    let app = app_with_engine(
        ScriptedTranscriptionEngine::new()
            .respond(FREE_KEY, Err(ProviderError::RateLimited))
            .respond(
                PAID_KEY,
                Err(ProviderError::Unauthorized("bad key".to_string())),
            ),
    );
    let user = random_user();

    let result = app
        .state
        .transcription_service
        .transcribe_upload(user, upload("memo.wav", None))
        .await;

    assert!(matches!(result, Err(ServiceError::Provider(ref m)) if m.contains("bad key")));
    assert!(app.store.usage_events().await.is_empty());
    assert!(app.audio.is_empty().await);
    let count = TranscriptionRepository::count(app.store.as_ref(), user)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn given_unsupported_extension_when_uploading_then_rejected_before_calling_provider() {
    let app = TestApp::empty();

    let result = app
        .state
        .transcription_service
        .transcribe_upload(random_user(), upload("notes.txt", None))
        .await;

    assert!(matches!(result, Err(ServiceError::UnsupportedMedia(_))));
    assert_eq!(app.engine.calls_for(FREE_KEY), 0);
}

#[tokio::test]
async fn given_oversized_upload_when_uploading_then_payload_too_large() {
    let app = TestApp::empty();
    let big = AudioUpload {
        filename: "long.m4a".to_string(),
        data: Bytes::from(vec![0u8; TEST_MAX_UPLOAD_BYTES + 1]),
        context: None,
    };

    let result = app
        .state
        .transcription_service
        .transcribe_upload(random_user(), big)
        .await;

    assert!(matches!(result, Err(ServiceError::PayloadTooLarge(_))));
}

#[tokio::test]
async fn given_context_when_uploading_then_it_replaces_the_default_prompt() {
    let app = app_with_engine(
        ScriptedTranscriptionEngine::new()
            .respond(FREE_KEY, Ok(transcript("a", 1.0)))
            .respond(FREE_KEY, Ok(transcript("b", 1.0))),
    );
    let user = random_user();
    let service = &app.state.transcription_service;

    service
        .transcribe_upload(user, upload("one.ogg", Some("Meeting about budgets")))
        .await
        .unwrap();
    service
        .transcribe_upload(user, upload("two.ogg", Some("   ")))
        .await
        .unwrap();

    let requests = app.engine.requests();
    assert_eq!(requests[0].prompt.as_deref(), Some("Meeting about budgets"));
    assert_eq!(requests[1].prompt.as_deref(), Some(DEFAULT_TRANSCRIPTION_PROMPT));
    assert_eq!(requests[0].language_hint.as_deref(), Some("da"));
}

#[tokio::test]
async fn given_stored_transcription_when_fetching_audio_then_returns_bytes_and_type() {
    let app = app_with_engine(
        ScriptedTranscriptionEngine::new().respond(FREE_KEY, Ok(transcript("hej", 3.0))),
    );
    let user = random_user();
    let service = &app.state.transcription_service;
    let transcription = service
        .transcribe_upload(user, upload("Voice.M4A", None))
        .await
        .unwrap();

    let audio = service.fetch_audio(user, transcription.id).await.unwrap();

    assert_eq!(audio.data, Bytes::from_static(b"fake-audio"));
    assert_eq!(audio.content_type, "audio/mp4");
    assert_eq!(audio.filename, "Voice.M4A");
}

#[tokio::test]
async fn given_transcription_when_deleting_audio_then_only_audio_is_removed() {
    let app = app_with_engine(
        ScriptedTranscriptionEngine::new().respond(FREE_KEY, Ok(transcript("hej", 3.0))),
    );
    let user = random_user();
    let service = &app.state.transcription_service;
    let transcription = service
        .transcribe_upload(user, upload("memo.flac", None))
        .await
        .unwrap();

    let updated = service.delete_audio(user, transcription.id).await.unwrap();

    assert!(updated.audio_path.is_none());
    assert!(app.audio.is_empty().await);
    assert!(service.get(user, transcription.id).await.is_ok());
    assert!(matches!(
        service.fetch_audio(user, transcription.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn given_transcription_when_deleting_then_audio_and_usage_are_removed() {
    let app = app_with_engine(
        ScriptedTranscriptionEngine::new().respond(FREE_KEY, Ok(transcript("hej", 3.0))),
    );
    let user = random_user();
    let service = &app.state.transcription_service;
    let transcription = service
        .transcribe_upload(user, upload("memo.webm", None))
        .await
        .unwrap();

    service.delete(user, transcription.id).await.unwrap();

    assert!(app.audio.is_empty().await);
    assert!(app.store.usage_events().await.is_empty());
    assert!(matches!(
        service.get(user, transcription.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn given_other_users_transcription_when_reading_then_not_found() {
    let app = app_with_engine(
        ScriptedTranscriptionEngine::new().respond(FREE_KEY, Ok(transcript("privat", 3.0))),
    );
    let owner = random_user();
    let service = &app.state.transcription_service;
    let transcription = service
        .transcribe_upload(owner, upload("memo.aac", None))
        .await
        .unwrap();

    let result = service.get(random_user(), transcription.id).await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn given_no_credentials_when_uploading_then_provider_error() {
    let app = TestApp::with_tiers(
        ScriptedTranscriptionEngine::new(),
        ScriptedTextGenerator::new(),
        ScriptedImageGenerator::new(),
        TierSelector::default(),
    );

    let result = app
        .state
        .transcription_service
        .transcribe_upload(random_user(), upload("memo.m4a", None))
        .await;

    assert!(matches!(result, Err(ServiceError::Provider(_))));
}

#[test]
fn given_filenames_when_resolving_suffix_then_only_audio_types_pass() {
    assert_eq!(audio_suffix("clip.MP3").as_deref(), Some(".mp3"));
    assert_eq!(audio_suffix("dir/sub.dir/clip.wav").as_deref(), Some(".wav"));
    assert_eq!(audio_suffix("C:\\rec\\take.flac").as_deref(), Some(".flac"));
    assert_eq!(audio_suffix("archive.zip"), None);
    assert_eq!(audio_suffix("noextension"), None);
    assert_eq!(audio_content_type(Some(".ogg")), "audio/ogg");
    assert_eq!(audio_content_type(None), "audio/mpeg");
}

#[tokio::test]
async fn given_repository_delete_fails_when_deleting_then_audio_is_kept() {
    let app = app_with_engine(
        ScriptedTranscriptionEngine::new().respond(FREE_KEY, Ok(transcript("hej", 3.0))),
    );
    let user = random_user();
    let transcription = app
        .state
        .transcription_service
        .transcribe_upload(user, upload("memo.ogg", None))
        .await
        .unwrap();
    let mut repository = FailingTranscriptionRepository::new(app.store.clone());
    repository.fail_delete = true;
    let service = transcription_service_with(&app, Arc::new(repository));

    let result = service.delete(user, transcription.id).await;

    assert!(matches!(result, Err(ServiceError::Repository(_))));
    assert_eq!(app.audio.len().await, 1);
    let audio = service.fetch_audio(user, transcription.id).await.unwrap();
    assert_eq!(audio.data, Bytes::from_static(b"fake-audio"));
}

#[tokio::test]
async fn given_row_deleted_concurrently_when_updating_then_not_found() {
    let app = TestApp::empty();
    let user = random_user();
    let transcription = seed_transcription(&app.store, user).await;
    let mut repository = FailingTranscriptionRepository::new(app.store.clone());
    repository.update_races_delete = true;
    let service = transcription_service_with(&app, Arc::new(repository));

    let result = service
        .update_raw_text(user, transcription.id, Some("ny tekst".to_string()))
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
