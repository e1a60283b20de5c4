use std::sync::Arc;

use diktat::application::ports::{
    ImageGenerationRepository, TranscriptionRepository, UsageRepository,
};
use diktat::domain::{
    ApiTier, ImageGenerationRecord, ImageResolution, Operation, Transcription, UsageArtifact,
    UsageEvent, UsageQuantities,
};
use diktat::infrastructure::persistence::InMemoryStore;

use crate::helpers::{at, random_user, seed_transcription, usage_event};

fn image_usage(record: &ImageGenerationRecord) -> UsageEvent {
    UsageEvent::new(
        record.user_id,
        "gemini",
        "gemini-3-pro-image-preview",
        Operation::GenerateImage,
        ApiTier::Paid,
        UsageQuantities::Image {
            input_tokens: 100,
            output_tokens: 200,
            images_generated: 1,
            resolution: ImageResolution::TwoK,
        },
        0.14,
        Some(UsageArtifact::ImageGeneration(record.id)),
    )
}

#[tokio::test]
async fn given_transcription_with_usage_when_deleting_then_usage_and_image_links_are_cleared() {
    let store = Arc::new(InMemoryStore::new());
    let user = random_user();
    let transcription = Transcription::new(user, None, 30.0, "tekst".to_string());
    let usage = UsageEvent::new(
        user,
        "openai",
        "whisper-1",
        Operation::Transcribe,
        ApiTier::Free,
        UsageQuantities::Audio { seconds: 30.0 },
        0.003,
        Some(UsageArtifact::Transcription(transcription.id)),
    );
    TranscriptionRepository::create(store.as_ref(), &transcription, Some(&usage))
        .await
        .unwrap();
    let mut image = ImageGenerationRecord::new(user, "a cat".to_string(), None);
    image.transcription_id = Some(transcription.id);
    store.seed_image(image.clone()).await;

    let deleted = TranscriptionRepository::delete(store.as_ref(), transcription.id, user)
        .await
        .unwrap();

    assert!(deleted);
    assert!(store.usage_events().await.is_empty());
    let kept = ImageGenerationRepository::get(store.as_ref(), image.id, user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.transcription_id, None);
}

#[tokio::test]
async fn given_foreign_transcription_when_deleting_or_getting_then_treated_as_absent() {
    let store = Arc::new(InMemoryStore::new());
    let owner = random_user();
    let stranger = random_user();
    let transcription = seed_transcription(&store, owner).await;

    let fetched = TranscriptionRepository::get(store.as_ref(), transcription.id, stranger)
        .await
        .unwrap();
    let deleted = TranscriptionRepository::delete(store.as_ref(), transcription.id, stranger)
        .await
        .unwrap();

    assert!(fetched.is_none());
    assert!(!deleted);
    assert_eq!(
        TranscriptionRepository::count(store.as_ref(), owner).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn given_duplicate_transcription_when_creating_then_constraint_violation() {
    let store = Arc::new(InMemoryStore::new());
    let transcription = seed_transcription(&store, random_user()).await;

    let result = TranscriptionRepository::create(store.as_ref(), &transcription, None).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn given_many_transcriptions_when_listing_then_newest_first_and_paged() {
    let store = Arc::new(InMemoryStore::new());
    let user = random_user();
    for day in 1..=5 {
        let mut transcription = Transcription::new(user, None, 1.0, format!("dag {day}"));
        transcription.created_at = at(2025, 3, day);
        TranscriptionRepository::create(store.as_ref(), &transcription, None)
            .await
            .unwrap();
    }

    let page = TranscriptionRepository::list(store.as_ref(), user, 1, 2)
        .await
        .unwrap();

    let texts: Vec<&str> = page.iter().map(|t| t.raw_text.as_str()).collect();
    assert_eq!(texts, vec!["dag 4", "dag 3"]);
}

#[tokio::test]
async fn given_image_chain_when_deleting_parent_then_child_loses_parent_link_and_usage_goes() {
    let store = Arc::new(InMemoryStore::new());
    let user = random_user();
    let root = ImageGenerationRecord::new(user, "a boat".to_string(), None);
    let child = ImageGenerationRecord::new(user, "make it red".to_string(), Some(&root));
    ImageGenerationRepository::create(store.as_ref(), &root, &image_usage(&root))
        .await
        .unwrap();
    ImageGenerationRepository::create(store.as_ref(), &child, &image_usage(&child))
        .await
        .unwrap();

    ImageGenerationRepository::delete(store.as_ref(), root.id, user)
        .await
        .unwrap();

    let orphan = ImageGenerationRepository::get(store.as_ref(), child.id, user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(orphan.parent_id, None);
    assert_eq!(orphan.turn_number, 2);
    let remaining = store.usage_events().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].image_generation_id(), Some(child.id));
}

#[tokio::test]
async fn given_usage_of_two_users_when_listing_then_scoped_and_newest_first() {
    let store = Arc::new(InMemoryStore::new());
    let user = random_user();
    let other = random_user();
    store
        .seed_usage(usage_event(user, Operation::Process, 0.01, at(2025, 1, 1)))
        .await;
    store
        .seed_usage(usage_event(user, Operation::Process, 0.02, at(2025, 2, 1)))
        .await;
    store
        .seed_usage(usage_event(other, Operation::Process, 0.05, at(2025, 3, 1)))
        .await;

    let listed = UsageRepository::list(store.as_ref(), user, 0, 10)
        .await
        .unwrap();
    let all = UsageRepository::all_for_user(store.as_ref(), other)
        .await
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].cost_usd, 0.02);
    assert_eq!(all.len(), 1);
}
