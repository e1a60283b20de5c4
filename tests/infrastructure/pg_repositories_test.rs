use chrono::Duration;

use diktat::application::ports::{
    ImageGenerationRepository, RepositoryError, StyleGuideRepository, TranscriptionRepository,
    UsageRepository,
};
use diktat::domain::{
    ApiTier, ImageGenerationRecord, ImageResolution, InlineImage, Operation, StoragePath,
    StyleGuide, Transcription, UsageArtifact, UsageEvent, UsageQuantities, UserId,
};

use crate::helpers::{TestPostgres, random_user};

fn transcription_for(user_id: UserId) -> Transcription {
    Transcription::new(
        user_id,
        Some("memo.m4a".to_string()),
        61.5,
        "hej med dig".to_string(),
    )
}

fn transcribe_usage(transcription: &Transcription) -> UsageEvent {
    UsageEvent::new(
        transcription.user_id,
        "openai",
        "whisper-1",
        Operation::Transcribe,
        ApiTier::Paid,
        UsageQuantities::Audio { seconds: 61.5 },
        0.00615,
        Some(UsageArtifact::Transcription(transcription.id)),
    )
}

fn image_usage(record: &ImageGenerationRecord) -> UsageEvent {
    UsageEvent::new(
        record.user_id,
        "gemini",
        "gemini-3-pro-image-preview",
        Operation::GenerateImage,
        ApiTier::Free,
        UsageQuantities::Image {
            input_tokens: 1_000,
            output_tokens: 2_000,
            images_generated: 1,
            resolution: ImageResolution::FourK,
        },
        0.0,
        Some(UsageArtifact::ImageGeneration(record.id)),
    )
}

fn guide_for(user_id: UserId, name: &str) -> StyleGuide {
    StyleGuide::new(user_id, name.to_string(), None, None)
}

#[tokio::test]
async fn given_transcription_with_usage_when_creating_then_both_are_read_back() {
    let test_pg = TestPostgres::new().await;
    let user = random_user();

    let mut transcription = transcription_for(user);
    transcription.audio_path = Some(StoragePath::for_audio(&user, &transcription.id, "m4a"));
    let usage = transcribe_usage(&transcription);

    test_pg
        .transcriptions
        .create(&transcription, Some(&usage))
        .await
        .expect("Failed to create transcription");

    let retrieved = test_pg
        .transcriptions
        .get(transcription.id, user)
        .await
        .expect("Failed to retrieve transcription")
        .expect("Transcription not found");

    assert_eq!(retrieved.id, transcription.id);
    assert_eq!(retrieved.filename.as_deref(), Some("memo.m4a"));
    assert_eq!(retrieved.duration_seconds, 61.5);
    assert_eq!(retrieved.raw_text, "hej med dig");
    assert_eq!(retrieved.audio_path, transcription.audio_path);

    let events = test_pg
        .usage
        .all_for_user(user)
        .await
        .expect("Failed to list usage");

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.id, usage.id);
    assert_eq!(event.provider, "openai");
    assert_eq!(event.model, "whisper-1");
    assert_eq!(event.operation, Operation::Transcribe);
    assert_eq!(event.tier, ApiTier::Paid);
    assert_eq!(event.quantities, UsageQuantities::Audio { seconds: 61.5 });
    assert_eq!(event.cost_usd, 0.00615);
    assert_eq!(
        event.artifact,
        Some(UsageArtifact::Transcription(transcription.id))
    );
}

#[tokio::test]
async fn given_other_owner_when_getting_transcription_then_absent() {
    let test_pg = TestPostgres::new().await;
    let transcription = transcription_for(random_user());

    test_pg
        .transcriptions
        .create(&transcription, None)
        .await
        .expect("Failed to create transcription");

    let retrieved = test_pg
        .transcriptions
        .get(transcription.id, random_user())
        .await
        .expect("Failed to query transcription");

    assert!(retrieved.is_none());
}

#[tokio::test]
async fn given_transcriptions_when_listing_page_then_newest_first_with_total_count() {
    let test_pg = TestPostgres::new().await;
    let user = random_user();

    let mut created = Vec::new();
    for minutes in 0..3 {
        let mut transcription = transcription_for(user);
        transcription.created_at += Duration::minutes(minutes);
        test_pg
            .transcriptions
            .create(&transcription, None)
            .await
            .expect("Failed to create transcription");
        created.push(transcription.id);
    }

    let page = test_pg
        .transcriptions
        .list(user, 1, 1)
        .await
        .expect("Failed to list transcriptions");
    let total = test_pg
        .transcriptions
        .count(user)
        .await
        .expect("Failed to count transcriptions");

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, created[1]);
    assert_eq!(total, 3);
}

#[tokio::test]
async fn given_transcription_with_usage_and_image_when_deleting_then_usage_cascades_and_image_is_detached()
 {
    let test_pg = TestPostgres::new().await;
    let user = random_user();

    let transcription = transcription_for(user);
    test_pg
        .transcriptions
        .create(&transcription, Some(&transcribe_usage(&transcription)))
        .await
        .expect("Failed to create transcription");

    let mut record = ImageGenerationRecord::new(user, "a fjord".to_string(), None);
    record.transcription_id = Some(transcription.id);
    test_pg
        .images
        .create(&record, &image_usage(&record))
        .await
        .expect("Failed to create image");

    let deleted = test_pg
        .transcriptions
        .delete(transcription.id, user)
        .await
        .expect("Failed to delete transcription");

    assert!(deleted);

    let events = test_pg.usage.all_for_user(user).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation, Operation::GenerateImage);

    let image = test_pg
        .images
        .get(record.id, user)
        .await
        .unwrap()
        .expect("Image should survive its transcription");
    assert_eq!(image.transcription_id, None);
}

#[tokio::test]
async fn given_missing_transcription_when_deleting_or_updating_then_not_found() {
    let test_pg = TestPostgres::new().await;
    let transcription = transcription_for(random_user());

    let deleted = test_pg
        .transcriptions
        .delete(transcription.id, transcription.user_id)
        .await
        .expect("Failed to run delete");
    let updated = test_pg.transcriptions.update(&transcription, None).await;

    assert!(!deleted);
    assert!(matches!(updated, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
async fn given_processed_text_with_usage_when_updating_then_row_and_usage_are_written() {
    let test_pg = TestPostgres::new().await;
    let user = random_user();

    let mut transcription = transcription_for(user);
    test_pg
        .transcriptions
        .create(&transcription, None)
        .await
        .expect("Failed to create transcription");

    transcription.instruction = Some("make it formal".to_string());
    transcription.processed_text = Some("Goddag.".to_string());
    let usage = UsageEvent::new(
        user,
        "gemini",
        "gemini-2.0-flash",
        Operation::Process,
        ApiTier::Free,
        UsageQuantities::Tokens {
            input_tokens: 120,
            output_tokens: 30,
        },
        0.0,
        Some(UsageArtifact::Transcription(transcription.id)),
    );

    test_pg
        .transcriptions
        .update(&transcription, Some(&usage))
        .await
        .expect("Failed to update transcription");

    let retrieved = test_pg
        .transcriptions
        .get(transcription.id, user)
        .await
        .unwrap()
        .expect("Transcription not found");
    assert_eq!(retrieved.processed_text.as_deref(), Some("Goddag."));
    assert_eq!(retrieved.instruction.as_deref(), Some("make it formal"));

    let events = test_pg.usage.list(user, 0, 10).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].quantities,
        UsageQuantities::Tokens {
            input_tokens: 120,
            output_tokens: 30,
        }
    );
    assert_eq!(events[0].tier, ApiTier::Free);
}

#[tokio::test]
async fn given_image_turns_when_deleting_parent_then_child_is_detached_and_parent_usage_removed() {
    let test_pg = TestPostgres::new().await;
    let user = random_user();

    let mut parent = ImageGenerationRecord::new(user, "a fjord".to_string(), None);
    parent.image = Some(InlineImage::new("image/png", vec![1, 2, 3]));
    parent.continuation_token = Some(vec![9, 9]);
    parent.text_response = Some("Here is your fjord".to_string());
    test_pg
        .images
        .create(&parent, &image_usage(&parent))
        .await
        .expect("Failed to create parent");

    let mut child = ImageGenerationRecord::new(user, "add a boat".to_string(), Some(&parent));
    child.created_at = parent.created_at + Duration::seconds(1);
    test_pg
        .images
        .create(&child, &image_usage(&child))
        .await
        .expect("Failed to create child");

    let stored_parent = test_pg
        .images
        .get(parent.id, user)
        .await
        .unwrap()
        .expect("Parent not found");
    assert_eq!(stored_parent.image, parent.image);
    assert_eq!(stored_parent.continuation_token, Some(vec![9, 9]));
    assert_eq!(stored_parent.turn_number, 1);

    let events = test_pg.usage.all_for_user(user).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].quantities,
        UsageQuantities::Image {
            input_tokens: 1_000,
            output_tokens: 2_000,
            images_generated: 1,
            resolution: ImageResolution::FourK,
        }
    );

    assert!(test_pg.images.delete(parent.id, user).await.unwrap());

    let stored_child = test_pg
        .images
        .get(child.id, user)
        .await
        .unwrap()
        .expect("Child not found");
    assert_eq!(stored_child.turn_number, 2);
    assert_eq!(stored_child.parent_id, None);

    let events = test_pg.usage.all_for_user(user).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].artifact,
        Some(UsageArtifact::ImageGeneration(child.id))
    );
}

#[tokio::test]
async fn given_two_guides_when_setting_default_twice_then_only_latest_is_default() {
    let test_pg = TestPostgres::new().await;
    let user = random_user();

    let first = guide_for(user, "Alpha");
    let second = guide_for(user, "Beta");
    test_pg.style_guides.create(&first).await.unwrap();
    test_pg.style_guides.create(&second).await.unwrap();

    test_pg
        .style_guides
        .set_default(first.id, user)
        .await
        .expect("Failed to set first default");
    test_pg
        .style_guides
        .set_default(second.id, user)
        .await
        .expect("Switching the default must not collide with the old one");

    let guides = test_pg.style_guides.list(user).await.unwrap();

    assert_eq!(guides.len(), 2);
    assert_eq!(guides[0].id, second.id);
    assert!(guides[0].is_default);
    assert!(!guides[1].is_default);
}

#[tokio::test]
async fn given_missing_guide_when_setting_default_then_not_found_and_old_default_kept() {
    let test_pg = TestPostgres::new().await;
    let user = random_user();

    let guide = guide_for(user, "Alpha");
    test_pg.style_guides.create(&guide).await.unwrap();
    test_pg.style_guides.set_default(guide.id, user).await.unwrap();

    let missing = guide_for(user, "Ghost");
    let result = test_pg.style_guides.set_default(missing.id, user).await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));

    let kept = test_pg
        .style_guides
        .get(guide.id, user)
        .await
        .unwrap()
        .expect("Guide not found");
    assert!(kept.is_default);
}

#[tokio::test]
async fn given_generated_guide_when_deleting_then_its_usage_cascades() {
    let test_pg = TestPostgres::new().await;
    let user = random_user();

    let mut guide = guide_for(user, "Alpha");
    test_pg.style_guides.create(&guide).await.unwrap();

    guide.guide_content = Some("Write short sentences.".to_string());
    let usage = UsageEvent::new(
        user,
        "gemini",
        "gemini-2.0-flash",
        Operation::GenerateStyle,
        ApiTier::Paid,
        UsageQuantities::Tokens {
            input_tokens: 400,
            output_tokens: 200,
        },
        0.00012,
        Some(UsageArtifact::StyleGuide(guide.id)),
    );
    test_pg
        .style_guides
        .update(&guide, Some(&usage))
        .await
        .expect("Failed to update guide");

    let events = test_pg.usage.all_for_user(user).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].artifact, Some(UsageArtifact::StyleGuide(guide.id)));

    assert!(test_pg.style_guides.delete(guide.id, user).await.unwrap());

    let events = test_pg.usage.all_for_user(user).await.unwrap();
    assert!(events.is_empty());
}
