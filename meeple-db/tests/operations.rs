use meeple_core::{GameDetails, GameStatus};
use meeple_db::*;

fn catan_details() -> GameDetails {
    let mut details = GameDetails::bare(13, "CATAN");
    details.year_published = Some(1995);
    details.min_players = Some(3);
    details.max_players = Some(4);
    details.playing_time = Some(120);
    details.rating = Some(7.1);
    details.complexity = Some(2.3);
    details.categories = vec!["Negotiation".to_string()];
    details.mechanics = vec!["Dice Rolling".to_string(), "Trading".to_string()];
    details.designers = vec!["Klaus Teuber".to_string()];
    details
}

fn seafarers_details() -> GameDetails {
    let mut details = GameDetails::bare(325, "Catan: Seafarers");
    details.year_published = Some(1997);
    details.is_expansion = true;
    details.base_game_bgg_id = Some(13);
    details
}

// -- upsert tests --

#[test]
fn upsert_creates_game() {
    let conn = open_memory().unwrap();
    let game = upsert_game(&conn, &catan_details()).unwrap();

    assert_eq!(game.bgg_id, 13);
    assert_eq!(game.name, "CATAN");
    assert_eq!(game.year_published, Some(1995));
    assert_eq!(game.mechanics, vec!["Dice Rolling", "Trading"]);
    assert!(!game.is_expansion);
    assert_eq!(game.base_game_bgg_id, None);
}

#[test]
fn upsert_is_idempotent() {
    let conn = open_memory().unwrap();
    let first = upsert_game(&conn, &catan_details()).unwrap();
    let second = upsert_game(&conn, &catan_details()).unwrap();

    assert_eq!(first.id, second.id);
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn lookups_return_none_for_unknown_ids() {
    let conn = open_memory().unwrap();
    assert!(find_game_by_bgg_id(&conn, 4242).unwrap().is_none());
    assert!(find_game(&conn, 4242).unwrap().is_none());

    let game = upsert_game(&conn, &catan_details()).unwrap();
    let by_internal_id = find_game(&conn, game.id).unwrap().unwrap();
    assert_eq!(by_internal_id.bgg_id, 13);
}

#[test]
fn upsert_never_blanks_known_fields() {
    let conn = open_memory().unwrap();
    upsert_game(&conn, &catan_details()).unwrap();

    // A sparse record for the same game, as a search hit would produce.
    let game = upsert_game(&conn, &GameDetails::bare(13, "Catan")).unwrap();

    assert_eq!(game.name, "Catan");
    assert_eq!(game.year_published, Some(1995));
    assert_eq!(game.mechanics, vec!["Dice Rolling", "Trading"]);
    assert_eq!(game.rating, Some(7.1));
}

#[test]
fn upsert_preserves_custom_fields() {
    let conn = open_memory().unwrap();
    let game = upsert_game(&conn, &catan_details()).unwrap();
    update_custom_fields(
        &conn,
        game.bgg_id,
        &CustomFields {
            custom_title: Some("Settlers".to_string()),
            core_mechanic: Some("Trading".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let refreshed = upsert_game(&conn, &catan_details()).unwrap();
    assert_eq!(refreshed.custom_title.as_deref(), Some("Settlers"));
    assert_eq!(refreshed.core_mechanic.as_deref(), Some("Trading"));
}

#[test]
fn upsert_rejects_self_referencing_expansion() {
    let conn = open_memory().unwrap();
    let mut details = GameDetails::bare(99, "Ouroboros");
    details.is_expansion = true;
    details.base_game_bgg_id = Some(99);

    let result = upsert_game(&conn, &details);
    assert!(matches!(result, Err(StoreError::InvalidRelationship(_))));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn upsert_stores_expansion_link() {
    let conn = open_memory().unwrap();
    let game = upsert_game(&conn, &seafarers_details()).unwrap();

    assert!(game.is_expansion);
    assert_eq!(game.base_game_bgg_id, Some(13));
}

// -- expansion relationship tests --

#[test]
fn set_expansion_relationship_links_and_clears() {
    let conn = open_memory().unwrap();
    upsert_game(&conn, &GameDetails::bare(325, "Catan: Seafarers")).unwrap();

    set_expansion_relationship(&conn, 325, true, Some(13)).unwrap();
    let game = find_game_by_bgg_id(&conn, 325).unwrap().unwrap();
    assert!(game.is_expansion);
    assert_eq!(game.base_game_bgg_id, Some(13));

    set_expansion_relationship(&conn, 325, false, None).unwrap();
    let game = find_game_by_bgg_id(&conn, 325).unwrap().unwrap();
    assert!(!game.is_expansion);
    assert_eq!(game.base_game_bgg_id, None);
}

#[test]
fn clearing_expansion_drops_stale_base() {
    let conn = open_memory().unwrap();
    upsert_game(&conn, &seafarers_details()).unwrap();

    // Demoting to base game ignores any base id passed alongside.
    set_expansion_relationship(&conn, 325, false, Some(13)).unwrap();
    let game = find_game_by_bgg_id(&conn, 325).unwrap().unwrap();
    assert!(!game.is_expansion);
    assert_eq!(game.base_game_bgg_id, None);
}

#[test]
fn set_expansion_relationship_rejects_self_reference() {
    let conn = open_memory().unwrap();
    upsert_game(&conn, &GameDetails::bare(325, "Catan: Seafarers")).unwrap();

    let result = set_expansion_relationship(&conn, 325, true, Some(325));
    assert!(matches!(result, Err(StoreError::InvalidRelationship(_))));

    // The row is untouched.
    let game = find_game_by_bgg_id(&conn, 325).unwrap().unwrap();
    assert!(!game.is_expansion);
}

#[test]
fn set_expansion_relationship_unknown_game() {
    let conn = open_memory().unwrap();
    let result = set_expansion_relationship(&conn, 4242, true, Some(13));
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}

// -- custom field tests --

#[test]
fn update_custom_fields_sets_and_clears() {
    let conn = open_memory().unwrap();
    upsert_game(&conn, &catan_details()).unwrap();

    let game = update_custom_fields(
        &conn,
        13,
        &CustomFields {
            custom_title: Some("Settlers".to_string()),
            core_mechanic: Some("Trading".to_string()),
            additional_mechanic_1: Some("Network Building".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(game.custom_title.as_deref(), Some("Settlers"));
    assert_eq!(game.display_name(), "Settlers");

    // An empty string clears; None leaves alone.
    let game = update_custom_fields(
        &conn,
        13,
        &CustomFields {
            custom_title: Some(String::new()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(game.custom_title, None);
    assert_eq!(game.core_mechanic.as_deref(), Some("Trading"));
    assert_eq!(game.display_name(), "CATAN");
}

#[test]
fn update_custom_fields_unknown_game() {
    let conn = open_memory().unwrap();
    let result = update_custom_fields(&conn, 4242, &CustomFields::default());
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}

// -- library tests --

#[test]
fn add_to_library_then_duplicate() {
    let conn = open_memory().unwrap();
    let game = upsert_game(&conn, &catan_details()).unwrap();

    let first = add_to_library(&conn, 1, game.id, GameStatus::Owned).unwrap();
    let row = match first {
        AddOutcome::Added(row) => row,
        other => panic!("expected Added, got {other:?}"),
    };
    assert_eq!(row.status, GameStatus::Owned);

    // The duplicate is absorbed and the original status wins.
    let second = add_to_library(&conn, 1, game.id, GameStatus::Wishlist).unwrap();
    match second {
        AddOutcome::AlreadyPresent(existing) => {
            assert_eq!(existing.id, row.id);
            assert_eq!(existing.status, GameStatus::Owned);
        }
        other => panic!("expected AlreadyPresent, got {other:?}"),
    }

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM user_games", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn same_game_for_two_users() {
    let conn = open_memory().unwrap();
    let game = upsert_game(&conn, &catan_details()).unwrap();

    let first = add_to_library(&conn, 1, game.id, GameStatus::Owned).unwrap();
    let second = add_to_library(&conn, 2, game.id, GameStatus::Wishlist).unwrap();
    assert!(matches!(first, AddOutcome::Added(_)));
    assert!(matches!(second, AddOutcome::Added(_)));
}

#[test]
fn duplicate_adds_from_two_connections_keep_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.db");
    let conn_a = open_database(&path).unwrap();
    let conn_b = open_database(&path).unwrap();

    let game = upsert_game(&conn_a, &catan_details()).unwrap();
    let first = add_to_library(&conn_a, 1, game.id, GameStatus::Owned).unwrap();
    let second = add_to_library(&conn_b, 1, game.id, GameStatus::Wishlist).unwrap();

    assert!(matches!(first, AddOutcome::Added(_)));
    match second {
        AddOutcome::AlreadyPresent(row) => assert_eq!(row.status, GameStatus::Owned),
        other => panic!("expected AlreadyPresent, got {other:?}"),
    }

    let count: i64 = conn_b
        .query_row("SELECT COUNT(*) FROM user_games", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn update_user_game_partial() {
    let conn = open_memory().unwrap();
    let game = upsert_game(&conn, &catan_details()).unwrap();
    let row = match add_to_library(&conn, 1, game.id, GameStatus::Owned).unwrap() {
        AddOutcome::Added(row) => row,
        other => panic!("expected Added, got {other:?}"),
    };

    let updated = update_user_game(
        &conn,
        row.id,
        &UserGameUpdate {
            personal_rating: Some(8.5),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(updated.personal_rating, Some(8.5));
    assert_eq!(updated.status, GameStatus::Owned);

    let updated = update_user_game(
        &conn,
        row.id,
        &UserGameUpdate {
            status: Some(GameStatus::WantTradeSell),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(updated.status, GameStatus::WantTradeSell);
    assert_eq!(updated.personal_rating, Some(8.5));
}

#[test]
fn update_user_game_rejects_out_of_range_rating() {
    let conn = open_memory().unwrap();
    let game = upsert_game(&conn, &catan_details()).unwrap();
    let row = match add_to_library(&conn, 1, game.id, GameStatus::Owned).unwrap() {
        AddOutcome::Added(row) => row,
        other => panic!("expected Added, got {other:?}"),
    };

    for rating in [0.5, 11.0] {
        let result = update_user_game(
            &conn,
            row.id,
            &UserGameUpdate {
                personal_rating: Some(rating),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StoreError::InvalidValue(_))));
    }
}

#[test]
fn remove_from_library_twice() {
    let conn = open_memory().unwrap();
    let game = upsert_game(&conn, &catan_details()).unwrap();
    let row = match add_to_library(&conn, 1, game.id, GameStatus::Owned).unwrap() {
        AddOutcome::Added(row) => row,
        other => panic!("expected Added, got {other:?}"),
    };

    remove_from_library(&conn, row.id).unwrap();
    assert!(find_user_game(&conn, row.id).unwrap().is_none());

    let again = remove_from_library(&conn, row.id);
    assert!(matches!(again, Err(StoreError::NotFound { .. })));
}
