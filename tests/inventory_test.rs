use biblioteca::db;
use biblioteca::domain::{CopyInput, CopyStatus, DomainError, Removal};
use biblioteca::infrastructure::AppState;
use biblioteca::services::inventory_service;
use serde_json::{Value, json};

async fn setup() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db)
}

fn input(value: Value) -> CopyInput {
    serde_json::from_value(value).expect("valid copy input")
}

fn book(title: &str, company: &str) -> CopyInput {
    input(json!({
        "title": title,
        "author": "Some Author",
        "cost": 12.5,
        "condition": "good",
        "coverType": "soft",
        "categories": ["novel"],
        "company": company,
    }))
}

#[tokio::test]
async fn test_create_group_assigns_code_and_group() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    let copy = inventory_service::create_group(copies, book("Rayuela", "acme"))
        .await
        .unwrap();

    assert!(copy.code.starts_with("BOOK-"));
    assert!(!copy.group_id.is_empty());
    assert_eq!(copy.copies_count, 1);
    assert_eq!(copy.status, CopyStatus::Available);
    assert_eq!(copy.cost, 12.5);
}

#[tokio::test]
async fn test_create_group_validates_input() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    let missing_cost = input(json!({
        "title": "Rayuela", "author": "Cortázar", "condition": "good",
        "coverType": "soft", "company": "acme"
    }));
    let err = inventory_service::create_group(copies, missing_cost)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let bad_cost = input(json!({
        "title": "Rayuela", "author": "Cortázar", "cost": "twelve", "condition": "good",
        "coverType": "soft", "company": "acme"
    }));
    assert!(matches!(
        inventory_service::create_group(copies, bad_cost).await,
        Err(DomainError::Validation(_))
    ));

    let bad_cover = input(json!({
        "title": "Rayuela", "author": "Cortázar", "cost": 3, "condition": "good",
        "coverType": "paperback", "company": "acme"
    }));
    assert!(matches!(
        inventory_service::create_group(copies, bad_cover).await,
        Err(DomainError::Validation(_))
    ));

    let no_company = input(json!({
        "title": "Rayuela", "author": "Cortázar", "cost": 3, "condition": "good",
        "coverType": "soft"
    }));
    assert!(matches!(
        inventory_service::create_group(copies, no_company).await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn test_adding_copies_updates_every_member_count() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    let first = inventory_service::create_group(copies, book("Rayuela", "acme"))
        .await
        .unwrap();
    inventory_service::add_copy(copies, first.id, CopyInput::default())
        .await
        .unwrap();
    let third = inventory_service::add_copy(
        copies,
        first.id,
        input(json!({ "location": "Shelf B", "condition": "new" })),
    )
    .await
    .unwrap();

    assert_eq!(third.copies_count, 3);
    assert_eq!(third.group_id, first.group_id);
    assert_eq!(third.title, "Rayuela");
    assert_eq!(third.location, "Shelf B");
    assert_ne!(third.code, first.code);

    let view = inventory_service::get_group(copies, first.id).await.unwrap();
    assert_eq!(view.representative.copies_count, 3);
    assert_eq!(view.copies.len(), 3);
    assert!(view.copies.iter().all(|c| c.copies_count == 3));
}

#[tokio::test]
async fn test_add_copy_to_missing_source() {
    let state = setup().await;
    let err = inventory_service::add_copy(state.copy_repo.as_ref(), 42, CopyInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_removing_last_copy_deletes_the_group() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    let first = inventory_service::create_group(copies, book("Rayuela", "acme"))
        .await
        .unwrap();
    let second = inventory_service::add_copy(copies, first.id, CopyInput::default())
        .await
        .unwrap();

    match inventory_service::remove_copy(copies, second.id).await.unwrap() {
        Removal::Decreased(view) => {
            assert_eq!(view.copies.len(), 1);
            assert_eq!(view.representative.copies_count, 1);
        }
        other => panic!("expected a decrease, got {:?}", other),
    }
    let remaining = copies.find_by_id(first.id).await.unwrap().unwrap();
    assert_eq!(remaining.copies_count, 1);

    match inventory_service::remove_copy(copies, first.id).await.unwrap() {
        Removal::GroupDeleted { group_id, .. } => assert_eq!(group_id, first.group_id),
        other => panic!("expected the group to be deleted, got {:?}", other),
    }
    assert_eq!(copies.count_group(&first.group_id).await.unwrap(), 0);
    assert!(matches!(
        inventory_service::get_group_by_group_id(copies, &first.group_id).await,
        Err(DomainError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_decrease_copy_stays_inside_the_group() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    let a = inventory_service::create_group(copies, book("Rayuela", "acme"))
        .await
        .unwrap();
    let a2 = inventory_service::add_copy(copies, a.id, CopyInput::default())
        .await
        .unwrap();
    let b = inventory_service::create_group(copies, book("Ficciones", "acme"))
        .await
        .unwrap();

    let err = inventory_service::decrease_copy(copies, a.id, Some(b.id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
    assert_eq!(copies.count_group(&b.group_id).await.unwrap(), 1);

    match inventory_service::decrease_copy(copies, a.id, Some(a2.id))
        .await
        .unwrap()
    {
        Removal::Decreased(view) => assert_eq!(view.representative.id, a.id),
        other => panic!("expected a decrease, got {:?}", other),
    }

    let removal = inventory_service::decrease_copy(copies, a.id, None)
        .await
        .unwrap();
    assert!(matches!(removal, Removal::GroupDeleted { .. }));
}

#[tokio::test]
async fn test_list_groups_paginates_per_tenant() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    for i in 0..13 {
        inventory_service::create_group(copies, book(&format!("Title {:02}", i), "acme"))
            .await
            .unwrap();
    }
    let other = inventory_service::create_group(copies, book("Title 99", "globex"))
        .await
        .unwrap();
    inventory_service::add_copy(copies, other.id, CopyInput::default())
        .await
        .unwrap();

    let page1 = inventory_service::list_groups(copies, Some("acme"), None, Vec::new(), 1)
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 12);
    assert_eq!(page1.total_pages, 2);
    assert_eq!(page1.total_items, 13);
    assert_eq!(page1.items[0].title, "Title 00");

    let page2 = inventory_service::list_groups(copies, Some("acme"), None, Vec::new(), 2)
        .await
        .unwrap();
    assert_eq!(page2.items.len(), 1);
    assert_eq!(page2.items[0].title, "Title 12");

    let globex = inventory_service::list_groups(copies, Some("globex"), None, Vec::new(), 1)
        .await
        .unwrap();
    assert_eq!(globex.total_items, 1);
    assert_eq!(globex.items[0].copies_count, 2);

    let err = inventory_service::list_groups(copies, None, None, Vec::new(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_list_groups_filters_by_search_and_category() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    inventory_service::create_group(copies, book("El Aleph", "acme"))
        .await
        .unwrap();
    inventory_service::create_group(
        copies,
        input(json!({
            "title": "Física I", "author": "Resnick", "cost": "40.10",
            "condition": "regular", "coverType": "hard",
            "categories": "science, textbook", "company": "acme"
        })),
    )
    .await
    .unwrap();

    let by_search = inventory_service::list_groups(copies, Some("acme"), Some("aleph"), Vec::new(), 1)
        .await
        .unwrap();
    assert_eq!(by_search.total_items, 1);
    assert_eq!(by_search.items[0].title, "El Aleph");

    let by_category = inventory_service::list_groups(
        copies,
        Some("acme"),
        None,
        vec!["textbook".to_string(), "poetry".to_string()],
        1,
    )
    .await
    .unwrap();
    assert_eq!(by_category.total_items, 1);
    assert_eq!(by_category.items[0].categories, vec!["science", "textbook"]);
}

#[tokio::test]
async fn test_search_folds_case_of_accented_letters() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    inventory_service::create_group(copies, book("Éxodo", "acme"))
        .await
        .unwrap();
    inventory_service::create_group(copies, book("Ética", "acme"))
        .await
        .unwrap();

    let listed = inventory_service::list_groups(copies, Some("acme"), Some("éxodo"), Vec::new(), 1)
        .await
        .unwrap();
    assert_eq!(listed.total_items, 1);
    assert_eq!(listed.items[0].title, "Éxodo");

    let hits = inventory_service::search(copies, Some("ÉTICA"), Some("acme"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].representative.title, "Ética");
}

#[tokio::test]
async fn test_search_lists_available_copies_only() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    let first = inventory_service::create_group(copies, book("Pedro Páramo", "acme"))
        .await
        .unwrap();
    let second = inventory_service::add_copy(copies, first.id, CopyInput::default())
        .await
        .unwrap();
    inventory_service::add_copy(copies, first.id, CopyInput::default())
        .await
        .unwrap();
    assert!(
        copies
            .transition_status(second.id, CopyStatus::Available, CopyStatus::Borrowed)
            .await
            .unwrap()
    );

    let hits = inventory_service::search(copies, Some("páramo"), None)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].available_copies.len(), 2);
    assert!(hits[0].available_copies.iter().all(|c| c.id != second.id));

    assert!(
        inventory_service::search(copies, Some("   "), None)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        inventory_service::search(copies, None, None)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_search_caps_the_number_of_groups() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    for i in 0..12 {
        inventory_service::create_group(copies, book(&format!("Atlas {}", i), "acme"))
            .await
            .unwrap();
    }

    let hits = inventory_service::search(copies, Some("atlas"), Some("acme"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 10);
}

#[tokio::test]
async fn test_general_info_fans_out_to_every_copy() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    let first = inventory_service::create_group(copies, book("Rayuela", "acme"))
        .await
        .unwrap();
    inventory_service::add_copy(copies, first.id, CopyInput::default())
        .await
        .unwrap();

    let (updated, view) = inventory_service::update_general_info(
        copies,
        &first.group_id,
        input(json!({ "title": "Rayuela (2nd ed.)", "coverType": "hard" })),
    )
    .await
    .unwrap();

    assert_eq!(updated, 2);
    assert!(view.copies.iter().all(|c| c.title == "Rayuela (2nd ed.)"));
    assert!(
        view.copies
            .iter()
            .all(|c| c.cover_type == biblioteca::domain::CoverType::Hard)
    );

    let err = inventory_service::update_general_info(
        copies,
        "no-such-group",
        input(json!({ "title": "X" })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_copy_info_touches_one_copy() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    let first = inventory_service::create_group(copies, book("Rayuela", "acme"))
        .await
        .unwrap();
    let second = inventory_service::add_copy(copies, first.id, CopyInput::default())
        .await
        .unwrap();

    let updated = inventory_service::update_copy_info(
        copies,
        second.id,
        input(json!({ "location": "Repair desk", "condition": "bad" })),
    )
    .await
    .unwrap();
    assert_eq!(updated.location, "Repair desk");

    let untouched = copies.find_by_id(first.id).await.unwrap().unwrap();
    assert_ne!(untouched.location, "Repair desk");

    let err = inventory_service::update_copy_info(copies, second.id, input(json!({ "title": "X" })))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_update_book_keeps_group_metadata_consistent() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    let first = inventory_service::create_group(copies, book("Rayuela", "acme"))
        .await
        .unwrap();
    let second = inventory_service::add_copy(copies, first.id, CopyInput::default())
        .await
        .unwrap();

    let updated = inventory_service::update_book(
        copies,
        second.id,
        input(json!({ "author": "Julio Cortázar", "observations": "torn cover" })),
    )
    .await
    .unwrap();
    assert_eq!(updated.author, "Julio Cortázar");
    assert_eq!(updated.observations, "torn cover");

    let sibling = copies.find_by_id(first.id).await.unwrap().unwrap();
    assert_eq!(sibling.author, "Julio Cortázar");
    assert_ne!(sibling.observations, "torn cover");
}

#[tokio::test]
async fn test_directories_are_distinct_and_sorted() {
    let state = setup().await;
    let copies = state.copy_repo.as_ref();

    inventory_service::create_group(copies, book("A", "globex"))
        .await
        .unwrap();
    inventory_service::create_group(
        copies,
        input(json!({
            "title": "B", "author": "X", "cost": 1, "condition": "good",
            "coverType": "soft", "categories": ["poetry", "novel"], "company": "acme"
        })),
    )
    .await
    .unwrap();

    assert_eq!(
        inventory_service::companies(copies).await.unwrap(),
        vec!["acme", "globex"]
    );
    assert_eq!(
        inventory_service::categories(copies).await.unwrap(),
        vec!["novel", "poetry"]
    );
}
