use diktat::application::ports::{ImageGenerationRepository, ProviderError};
use diktat::application::services::{IMAGE_SYSTEM_INSTRUCTION, ImageRequest, ServiceError};
use diktat::domain::{
    ApiTier, ImageGenerationId, ImageResolution, Operation, TranscriptionId, TurnRole,
    UsageQuantities,
};
use diktat::infrastructure::audio::ScriptedTranscriptionEngine;
use diktat::infrastructure::llm::{ScriptedImageGenerator, ScriptedTextGenerator};

use crate::helpers::{
    FREE_KEY, PAID_KEY, TestApp, image_response, random_user, seed_transcription,
    text_response,
};

fn app_with_images(images: ScriptedImageGenerator) -> TestApp {
    TestApp::new(ScriptedTranscriptionEngine::new(), ScriptedTextGenerator::new(), images)
}

fn request(prompt: &str) -> ImageRequest {
    ImageRequest {
        prompt: prompt.to_string(),
        session_id: None,
        transcription_id: None,
        aspect_ratio: "1:1".to_string(),
        resolution: ImageResolution::TwoK,
    }
}

#[tokio::test]
async fn given_new_prompt_when_generating_then_stores_first_turn_with_image_event() {
    let app = app_with_images(
        ScriptedImageGenerator::new().respond(FREE_KEY, Ok(image_response(b"png", Some(b"sig")))),
    );
    let user = random_user();

    let record = app
        .state
        .image_generation_service
        .generate(user, request("a lighthouse at dusk"))
        .await
        .unwrap();

    assert_eq!(record.turn_number, 1);
    assert!(record.parent_id.is_none());
    assert_eq!(record.image.as_ref().unwrap().data, b"png".to_vec());
    assert_eq!(record.continuation_token, Some(b"sig".to_vec()));
    assert_eq!(record.text_response.as_deref(), Some("Here is your image"));

    let events = app.store.usage_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation, Operation::GenerateImage);
    assert_eq!(events[0].image_generation_id(), Some(record.id));
    assert_eq!(
        events[0].quantities,
        UsageQuantities::Image {
            input_tokens: 1_000,
            output_tokens: 2_000,
            images_generated: 1,
            resolution: ImageResolution::TwoK,
        }
    );
    assert!((events[0].cost_usd - (0.002 + 0.024 + 0.134)).abs() < 1e-9);

    let sent = &app.images.requests()[0];
    assert!(sent.history.is_empty());
    assert_eq!(sent.system_instruction.as_deref(), Some(IMAGE_SYSTEM_INSTRUCTION));
}

#[tokio::test]
async fn given_session_when_generating_then_history_is_replayed_and_turn_increments() {
    let app = app_with_images(
        ScriptedImageGenerator::new()
            .respond(FREE_KEY, Ok(image_response(b"first", Some(b"sig-1"))))
            .respond(FREE_KEY, Ok(image_response(b"second", None))),
    );
    let user = random_user();
    let service = &app.state.image_generation_service;
    let first = service.generate(user, request("a boat")).await.unwrap();

    let second = service
        .generate(
            user,
            ImageRequest {
                session_id: Some(first.id),
                ..request("make it red")
            },
        )
        .await
        .unwrap();

    assert_eq!(second.turn_number, 2);
    assert_eq!(second.parent_id, Some(first.id));

    let sent = &app.images.requests()[1];
    assert_eq!(sent.history.len(), 2);
    assert_eq!(sent.history[0].role, TurnRole::User);
    assert_eq!(sent.history[0].text.as_deref(), Some("a boat"));
    assert_eq!(sent.history[1].role, TurnRole::Model);
    assert_eq!(sent.history[1].continuation_token, Some(b"sig-1".to_vec()));
    assert_eq!(sent.prompt, "make it red");
}

#[tokio::test]
async fn given_foreign_session_when_generating_then_not_found_without_provider_call() {
    let app = app_with_images(
        ScriptedImageGenerator::new().respond(FREE_KEY, Ok(image_response(b"x", None))),
    );
    let owner = random_user();
    let service = &app.state.image_generation_service;
    let theirs = service.generate(owner, request("private")).await.unwrap();

    let result = service
        .generate(
            random_user(),
            ImageRequest {
                session_id: Some(theirs.id),
                ..request("steal it")
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
    assert_eq!(app.images.requests().len(), 1);
}

#[tokio::test]
async fn given_unknown_transcription_when_generating_then_not_found() {
    let app = TestApp::empty();

    let result = app
        .state
        .image_generation_service
        .generate(
            random_user(),
            ImageRequest {
                transcription_id: Some(TranscriptionId::new()),
                ..request("x")
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn given_linked_transcription_when_generating_then_listed_for_it() {
    let app = app_with_images(
        ScriptedImageGenerator::new().respond(FREE_KEY, Ok(image_response(b"x", None))),
    );
    let user = random_user();
    let transcription = seed_transcription(&app.store, user).await;
    let service = &app.state.image_generation_service;

    let record = service
        .generate(
            user,
            ImageRequest {
                transcription_id: Some(transcription.id),
                ..request("illustrate my note")
            },
        )
        .await
        .unwrap();

    let linked = service
        .list_for_transcription(user, transcription.id)
        .await
        .unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, record.id);
}

#[tokio::test]
async fn given_unsupported_aspect_ratio_when_generating_then_validation_error() {
    let app = TestApp::empty();

    let result = app
        .state
        .image_generation_service
        .generate(
            random_user(),
            ImageRequest {
                aspect_ratio: "7:3".to_string(),
                ..request("x")
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn given_free_tier_returns_no_image_when_generating_then_paid_tier_is_used() {
    let app = app_with_images(
        ScriptedImageGenerator::new()
            .respond(FREE_KEY, Ok(text_response("no picture today", 5, 5)))
            .respond(PAID_KEY, Ok(image_response(b"paid", None))),
    );
    let user = random_user();

    let record = app
        .state
        .image_generation_service
        .generate(user, request("a fox"))
        .await
        .unwrap();

    assert_eq!(record.image.unwrap().data, b"paid".to_vec());
    let events = app.store.usage_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].tier, ApiTier::Paid);
}

#[tokio::test]
async fn given_both_tiers_fail_when_generating_then_nothing_is_persisted() {
    let app = app_with_images(
        ScriptedImageGenerator::new()
            .respond(FREE_KEY, Err(ProviderError::RateLimited))
            .respond(PAID_KEY, Err(ProviderError::RateLimited)),
    );
    let user = random_user();

    let result = app
        .state
        .image_generation_service
        .generate(user, request("a fox"))
        .await;

    assert!(matches!(result, Err(ServiceError::Provider(_))));
    assert!(app.store.usage_events().await.is_empty());
    let count = ImageGenerationRepository::count(app.store.as_ref(), user)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn given_parent_deleted_when_reading_child_then_parent_link_is_cleared() {
    let app = app_with_images(
        ScriptedImageGenerator::new()
            .respond(FREE_KEY, Ok(image_response(b"1", None)))
            .respond(FREE_KEY, Ok(image_response(b"2", None))),
    );
    let user = random_user();
    let service = &app.state.image_generation_service;
    let first = service.generate(user, request("one")).await.unwrap();
    let second = service
        .generate(
            user,
            ImageRequest {
                session_id: Some(first.id),
                ..request("two")
            },
        )
        .await
        .unwrap();

    service.delete(user, first.id).await.unwrap();

    let child = service.get(user, second.id).await.unwrap();
    assert!(child.parent_id.is_none());
    assert_eq!(app.store.usage_events().await.len(), 1);
}

#[tokio::test]
async fn given_missing_image_when_deleting_then_not_found() {
    let app = TestApp::empty();

    let result = app
        .state
        .image_generation_service
        .delete(random_user(), ImageGenerationId::new())
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
