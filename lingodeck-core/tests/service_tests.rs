use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use lingodeck_core::{
    CardFields, CardService, Clock, CoreError, FixedClock, ImageRef, ListQuery, MemoryRepo,
    PracticeInput, Repository,
};

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn setup() -> (CardService, Arc<FixedClock>, Arc<MemoryRepo>) {
    let clock = Arc::new(FixedClock::new(at("2023-04-01T10:39:18Z")));
    let repo = Arc::new(MemoryRepo::new());
    let service = CardService::new(repo.clone(), clock.clone());
    (service, clock, repo)
}

fn fields(front: &str, back: &str, language: &str) -> CardFields {
    CardFields {
        front: front.into(),
        back: back.into(),
        language: language.into(),
        image: Some(ImageRef {
            file_name: format!("{}.webp", front.to_lowercase()),
            backup_url: None,
        }),
    }
}

#[tokio::test]
async fn created_cards_start_fresh() {
    let (service, clock, repo) = setup();
    let card = service.create_card(fields("Hello", "Hola", "English")).await.unwrap();

    assert_eq!(card.schedule.interval, 0);
    assert_eq!(card.schedule.repetition, 0);
    assert_eq!(card.schedule.ease_factor, 2.5);
    assert_eq!(card.schedule.due_date, clock.now());
    assert_eq!(repo.get_card(card.id).await.unwrap(), card);
}

#[tokio::test]
async fn invalid_fields_are_not_stored() {
    let (service, _clock, repo) = setup();
    let err = service.create_card(fields("", "Hola", "English")).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert!(repo.list_cards(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn practice_persists_new_schedule() {
    let (service, _clock, repo) = setup();
    let card = service.create_card(fields("Goodbye", "Adiós", "English")).await.unwrap();

    let practiced = service.practice_card(card.id, PracticeInput { grade: 5 }).await.unwrap();
    assert_eq!(practiced.schedule.interval, 1);
    assert_eq!(practiced.schedule.repetition, 1);
    assert!((practiced.schedule.ease_factor - 2.6).abs() < 1e-9);
    assert_eq!(practiced.schedule.due_date, at("2023-04-02T10:39:18Z"));

    let stored = repo.get_card(card.id).await.unwrap();
    assert_eq!(stored.schedule, practiced.schedule);
}

#[tokio::test]
async fn invalid_grade_leaves_card_untouched() {
    let (service, _clock, repo) = setup();
    let card = service.create_card(fields("Cat", "Gato", "English")).await.unwrap();

    for grade in [6, -1] {
        let err = service.practice_card(card.id, PracticeInput { grade }).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_) | CoreError::InvalidGrade(_)));
    }
    assert_eq!(repo.get_card(card.id).await.unwrap(), card);
}

#[tokio::test]
async fn practicing_a_missing_card_is_not_found() {
    let (service, _clock, _repo) = setup();
    let err = service
        .practice_card(uuid::Uuid::new_v4(), PracticeInput { grade: 3 })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound("card")));
}

#[tokio::test]
async fn editing_only_language_or_image_keeps_schedule() {
    let (service, clock, _repo) = setup();
    let card = service.create_card(fields("Dog", "Perro", "English")).await.unwrap();
    service.practice_card(card.id, PracticeInput { grade: 4 }).await.unwrap();
    let practiced = service.practice_card(card.id, PracticeInput { grade: 4 }).await.unwrap();
    assert_eq!(practiced.schedule.repetition, 2);

    clock.advance(Duration::days(3));
    let mut edit = fields("Dog", "Perro", "Spanish");
    edit.image = Some(ImageRef {
        file_name: "dog2.webp".into(),
        backup_url: Some("https://example.com/dog2.webp".into()),
    });
    let edited = service.modify_card(card.id, edit.clone()).await.unwrap();

    assert_eq!(edited.schedule, practiced.schedule);
    assert_eq!(edited.language, "Spanish");
    assert_eq!(edited.image, edit.image);
}

#[tokio::test]
async fn editing_text_resets_schedule() {
    let (service, clock, _repo) = setup();
    let card = service.create_card(fields("House", "Casa", "English")).await.unwrap();
    service.practice_card(card.id, PracticeInput { grade: 5 }).await.unwrap();
    service.practice_card(card.id, PracticeInput { grade: 5 }).await.unwrap();

    clock.advance(Duration::days(10));
    let edited = service
        .modify_card(card.id, fields("House", "casa", "English"))
        .await
        .unwrap();

    assert_eq!(edited.back, "casa");
    assert_eq!(edited.schedule.interval, 0);
    assert_eq!(edited.schedule.repetition, 0);
    assert_eq!(edited.schedule.ease_factor, 2.5);
    assert_eq!(edited.schedule.due_date, at("2023-04-11T10:39:18Z"));
}

#[tokio::test]
async fn listing_filters_and_paginates() {
    let (service, clock, _repo) = setup();
    for i in 0..8 {
        let lang = if i < 6 { "Spanish" } else { "French" };
        service
            .create_card(fields(&format!("word{i}"), &format!("palabra{i}"), lang))
            .await
            .unwrap();
        clock.advance(Duration::seconds(1));
    }

    let first = service.list_cards(ListQuery::default()).await.unwrap();
    assert_eq!(first.cards.len(), 5);
    assert_eq!(first.page, None);
    assert_eq!(first.cards[0].front, "word0");

    let query = ListQuery {
        limit: Some(3),
        page: Some(2),
        language: Some("Spanish".into()),
    };
    let second = service.list_cards(query).await.unwrap();
    assert_eq!(second.page, Some(2));
    let fronts: Vec<_> = second.cards.iter().map(|c| c.front.as_str()).collect();
    assert_eq!(fronts, ["word3", "word4", "word5"]);

    let bad = ListQuery {
        language: Some("spanish".into()),
        ..Default::default()
    };
    assert!(matches!(service.list_cards(bad).await, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn due_cards_follow_the_clock() {
    let (service, clock, _repo) = setup();
    let a = service.create_card(fields("One", "Uno", "Spanish")).await.unwrap();
    let b = service.create_card(fields("Two", "Dos", "Spanish")).await.unwrap();

    assert_eq!(service.due_cards(None).await.unwrap().len(), 2);

    service.practice_card(a.id, PracticeInput { grade: 5 }).await.unwrap();
    let due = service.due_cards(None).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, b.id);

    clock.advance(Duration::days(1));
    assert_eq!(service.due_cards(None).await.unwrap().len(), 2);
    assert_eq!(service.due_cards(Some(1)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_removes_card() {
    let (service, _clock, _repo) = setup();
    let card = service.create_card(fields("Tree", "Árbol", "Spanish")).await.unwrap();
    service.delete_card(card.id).await.unwrap();
    assert!(matches!(service.get_card(card.id).await, Err(CoreError::NotFound(_))));
    assert!(matches!(service.delete_card(card.id).await, Err(CoreError::NotFound(_))));
}
