// libs/doctor-cell/tests/availability_test.rs

use std::sync::Arc;

use assert_matches::assert_matches;

use doctor_cell::models::{AvailabilityError, CreateAvailabilityRequest, UpdateAvailabilityRequest};
use doctor_cell::services::AvailabilityService;
use shared_database::{AvailabilityRepository, InMemoryAvailabilityRepository};

const DATE: &str = "2025-03-10";

fn request(date: &str, start: &str, end: &str, duration: i64) -> CreateAvailabilityRequest {
    CreateAvailabilityRequest {
        date: Some(date.to_string()),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        slot_duration_minutes: Some(duration),
    }
}

fn service() -> (AvailabilityService, Arc<InMemoryAvailabilityRepository>) {
    let repo = Arc::new(InMemoryAvailabilityRepository::default());
    (AvailabilityService::with_repository(repo.clone()), repo)
}

#[tokio::test]
async fn test_create_availability_persists_normalised_block() {
    let (service, repo) = service();

    let block = service.create_availability("doc-1", request(DATE, "09:00", "12:00", 30)).await.unwrap();

    assert_eq!(block.doctor_id, "doc-1");
    assert_eq!(block.date, DATE);
    assert_eq!(block.start_time, "09:00");
    assert_eq!(block.end_time, "12:00");
    assert_eq!(block.slot_duration_minutes, Some(30));
    assert_eq!(repo.find_by_id(block.id).await.unwrap(), Some(block));
}

#[tokio::test]
async fn test_overlapping_availability_is_rejected_and_store_unchanged() {
    let (service, repo) = service();
    service.create_availability("doc-1", request(DATE, "09:00", "11:00", 30)).await.unwrap();

    for (start, end) in [("10:00", "12:00"), ("08:00", "09:30"), ("09:15", "09:45"), ("08:00", "13:00")] {
        let result = service.create_availability("doc-1", request(DATE, start, end, 15)).await;
        assert_matches!(
            result,
            Err(AvailabilityError::Overlap { ref requested, ref existing, .. })
                if requested == &format!("{}-{}", start, end) && existing == "09:00-11:00"
        );
    }

    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_overlap_message_names_both_ranges() {
    let (service, _) = service();
    service.create_availability("doc-1", request(DATE, "09:00", "11:00", 30)).await.unwrap();

    let err = service.create_availability("doc-1", request(DATE, "10:30", "12:00", 30)).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("10:30-12:00"), "{}", message);
    assert!(message.contains("09:00-11:00"), "{}", message);
}

#[tokio::test]
async fn test_touching_blocks_do_not_overlap() {
    let (service, repo) = service();

    service.create_availability("doc-1", request(DATE, "09:00", "10:00", 30)).await.unwrap();
    service.create_availability("doc-1", request(DATE, "10:00", "11:00", 30)).await.unwrap();
    service.create_availability("doc-1", request(DATE, "08:00", "09:00", 20)).await.unwrap();

    assert_eq!(repo.len().await, 3);
}

#[tokio::test]
async fn test_overlap_is_scoped_to_doctor_and_date() {
    let (service, repo) = service();

    service.create_availability("doc-1", request(DATE, "09:00", "10:00", 30)).await.unwrap();
    service.create_availability("doc-2", request(DATE, "09:00", "10:00", 30)).await.unwrap();
    service.create_availability("doc-1", request("2025-03-11", "09:00", "10:00", 30)).await.unwrap();

    assert_eq!(repo.len().await, 3);
}

#[tokio::test]
async fn test_create_validation_errors() {
    let (service, repo) = service();

    let cases = [
        request(DATE, "10:00", "09:00", 30),
        request(DATE, "09:00", "09:00", 30),
        request(DATE, "09:00", "10:00", 0),
        request(DATE, "25:00", "26:00", 30),
        request(DATE, "09:00", "10:60", 30),
        request("10/03/2025", "09:00", "10:00", 30),
        CreateAvailabilityRequest::default(),
    ];

    for case in cases {
        let result = service.create_availability("doc-1", case).await;
        assert_matches!(result, Err(AvailabilityError::Validation(_)));
    }

    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn test_update_merges_patch_and_keeps_other_fields() {
    let (service, _) = service();
    let block = service.create_availability("doc-1", request(DATE, "09:00", "10:00", 30)).await.unwrap();

    let patch = UpdateAvailabilityRequest {
        end_time: Some("11:00".to_string()),
        ..Default::default()
    };
    let updated = service.update_availability(block.id, "doc-1", patch).await.unwrap();

    assert_eq!(updated.id, block.id);
    assert_eq!(updated.start_time, "09:00");
    assert_eq!(updated.end_time, "11:00");
    assert_eq!(updated.slot_duration_minutes, Some(30));
    assert_eq!(updated.date, DATE);
    assert!(updated.updated_at >= block.updated_at);
}

#[tokio::test]
async fn test_update_ignores_own_range_but_checks_others() {
    let (service, _) = service();
    let first = service.create_availability("doc-1", request(DATE, "09:00", "10:00", 30)).await.unwrap();
    service.create_availability("doc-1", request(DATE, "11:00", "12:00", 30)).await.unwrap();

    let shift_within_own = UpdateAvailabilityRequest {
        start_time: Some("09:30".to_string()),
        end_time: Some("10:30".to_string()),
        ..Default::default()
    };
    assert!(service.update_availability(first.id, "doc-1", shift_within_own).await.is_ok());

    let collide = UpdateAvailabilityRequest {
        end_time: Some("11:30".to_string()),
        ..Default::default()
    };
    let result = service.update_availability(first.id, "doc-1", collide).await;
    assert_matches!(result, Err(AvailabilityError::Overlap { .. }));

    let stored = service.get_availability(first.id).await.unwrap();
    assert_eq!(stored.end_time, "10:30");
}

#[tokio::test]
async fn test_update_moving_date_checks_target_date() {
    let (service, _) = service();
    let first = service.create_availability("doc-1", request(DATE, "09:00", "10:00", 30)).await.unwrap();
    service.create_availability("doc-1", request("2025-03-11", "09:30", "10:30", 30)).await.unwrap();

    let patch = UpdateAvailabilityRequest {
        date: Some("2025-03-11".to_string()),
        ..Default::default()
    };
    let result = service.update_availability(first.id, "doc-1", patch).await;
    assert_matches!(result, Err(AvailabilityError::Overlap { ref date, .. }) if date == "2025-03-11");
}

#[tokio::test]
async fn test_update_revalidates_merged_values() {
    let (service, _) = service();
    let block = service.create_availability("doc-1", request(DATE, "09:00", "10:00", 30)).await.unwrap();

    let patch = UpdateAvailabilityRequest {
        start_time: Some("10:30".to_string()),
        ..Default::default()
    };
    let result = service.update_availability(block.id, "doc-1", patch).await;
    assert_matches!(result, Err(AvailabilityError::Validation(_)));
}

#[tokio::test]
async fn test_ownership_enforced_on_update_and_delete() {
    let (service, _) = service();
    let block = service.create_availability("doc-1", request(DATE, "09:00", "10:00", 30)).await.unwrap();

    let patch = UpdateAvailabilityRequest {
        slot_duration_minutes: Some(15),
        ..Default::default()
    };
    assert_matches!(
        service.update_availability(block.id, "doc-2", patch).await,
        Err(AvailabilityError::Unauthorized)
    );
    assert_matches!(
        service.delete_availability(block.id, "doc-2").await,
        Err(AvailabilityError::Unauthorized)
    );

    assert_eq!(service.get_availability(block.id).await.unwrap(), block);
}

#[tokio::test]
async fn test_missing_block_is_not_found() {
    let (service, _) = service();
    let id = uuid::Uuid::new_v4();

    assert_matches!(service.delete_availability(id, "doc-1").await, Err(AvailabilityError::NotFound));
    assert_matches!(
        service.update_availability(id, "doc-1", UpdateAvailabilityRequest::default()).await,
        Err(AvailabilityError::NotFound)
    );
}

#[tokio::test]
async fn test_delete_then_list() {
    let (service, _) = service();
    let kept = service.create_availability("doc-1", request("2025-03-12", "09:00", "10:00", 30)).await.unwrap();
    let removed = service.create_availability("doc-1", request(DATE, "14:00", "15:00", 30)).await.unwrap();
    service.create_availability("doc-1", request(DATE, "08:00", "09:00", 30)).await.unwrap();

    service.delete_availability(removed.id, "doc-1").await.unwrap();

    let listed = service.get_doctor_availability("doc-1").await.unwrap();
    let summary: Vec<(String, String)> = listed.iter()
        .map(|b| (b.date.clone(), b.start_time.clone()))
        .collect();
    assert_eq!(summary, vec![
        (DATE.to_string(), "08:00".to_string()),
        ("2025-03-12".to_string(), kept.start_time.clone()),
    ]);
}
