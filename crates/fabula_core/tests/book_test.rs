use fabula_core::{Book, BookAssets, BookStatus};

#[test]
fn submission_starts_in_preview_pending() {
    let book = Book::submit("Mira", 6, "dragons and stars", "photos/mira.jpg");
    assert_eq!(book.status, BookStatus::PreviewPending);
    assert_eq!(book.progress_percentage, 0);
    assert_eq!(book.page_count, fabula_core::DEFAULT_PAGE_COUNT);
    assert!(book.premise.is_none());
    assert!(book.error_message.is_none());
}

#[test]
fn status_uses_snake_case_wire_names() {
    assert_eq!(BookStatus::PreviewPending.to_string(), "preview_pending");
    assert_eq!(BookStatus::GeneratingCover.to_string(), "generating_cover");
    assert_eq!(BookStatus::Completed.to_string(), "completed");

    let json = serde_json::to_string(&BookStatus::PreviewReady).unwrap();
    assert_eq!(json, "\"preview_ready\"");
}

#[test]
fn fail_sets_message_and_clear_error_removes_it() {
    let mut book = Book::submit("Mira", 6, "", "photos/mira.jpg");
    book.fail(BookStatus::PreviewError, "cover generation failed");
    assert_eq!(book.status, BookStatus::PreviewError);
    assert_eq!(book.error_message.as_deref(), Some("cover generation failed"));

    book.clear_error();
    assert!(book.error_message.is_none());
}

#[test]
fn progress_is_clamped_to_100() {
    let mut book = Book::submit("Mira", 6, "", "photos/mira.jpg");
    book.set_progress("Assembling", 250);
    assert_eq!(book.progress_percentage, 100);
    assert_eq!(book.current_step, "Assembling");
}

#[test]
fn book_round_trips_through_json() {
    let mut book = Book::submit("Mira", 6, "dragons", "photos/mira.jpg");
    book.premise = Some(fabula_core::Premise {
        title: "The Starlight Voyage".to_string(),
        theme: "adventure".to_string(),
        summary: "A journey".to_string(),
        world_description: "Floating islands".to_string(),
        protagonist: fabula_core::Protagonist::new("Mira".to_string(), "curly hair".to_string()),
    });

    let json = serde_json::to_string(&book).unwrap();
    let restored: Book = serde_json::from_str(&json).unwrap();
    assert_eq!(book, restored);
}

#[test]
fn assets_track_page_completeness() {
    let mut assets = BookAssets::default();
    assert!(!assets.has_sheets());
    assert!(assets.pages_complete(0));

    for n in 1..=11u32 {
        assets.pages.insert(n, fabula_core::AssetHandle::new(format!("page_{n}.png")));
    }
    assert!(!assets.pages_complete(12));

    assets.pages.insert(12, fabula_core::AssetHandle::new("page_12.png"));
    assert!(assets.pages_complete(12));
}
