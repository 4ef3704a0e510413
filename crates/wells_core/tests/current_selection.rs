use rusqlite::Connection;
use wells_core::db::open_db_in_memory;
use wells_core::{
    CurrentQuery, CurrentWells, SqliteWellRepository, Well, WellRepoError, WellRepository,
    WellType,
};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const NOW: i64 = 10 * DAY_MS;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn create_type(repo: &SqliteWellRepository<'_>, title: &str, slug: &str) -> WellType {
    let well_type = WellType::new(title, slug).unwrap();
    repo.create_well_type(&well_type).unwrap();
    well_type
}

fn create_well(
    repo: &SqliteWellRepository<'_>,
    well_type: &WellType,
    pub_date: i64,
    expires: Option<i64>,
    active: bool,
) -> Well {
    let mut well = Well::new(well_type.clone());
    well.pub_date = pub_date;
    well.expires = expires;
    well.active = active;
    repo.create_well(&well).unwrap();
    well
}

#[test]
fn returns_latest_eligible_well_for_title() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();
    let well_type = create_type(&repo, "homepage-features", "homepage-features");

    create_well(&repo, &well_type, NOW - 3 * DAY_MS, None, true);
    let latest = create_well(&repo, &well_type, NOW - DAY_MS, None, true);
    // Newer but inactive, newer but unpublished, newer but expired: all skipped.
    create_well(&repo, &well_type, NOW - 1, None, false);
    create_well(&repo, &well_type, NOW + DAY_MS, None, true);
    create_well(&repo, &well_type, NOW - 1, Some(NOW - 1), true);

    let current = repo
        .get_current_by_title("homepage-features", NOW)
        .unwrap();
    assert_eq!(current.uuid, latest.uuid);
}

#[test]
fn expires_equal_to_now_means_expired() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();
    let well_type = create_type(&repo, "sidebar", "sidebar");

    create_well(&repo, &well_type, NOW - DAY_MS, Some(NOW), true);
    let err = repo.get_current_by_title("sidebar", NOW).unwrap_err();
    assert!(matches!(err, WellRepoError::NotFound(_)));

    // One millisecond earlier the same well is still current.
    let current = repo.get_current_by_title("sidebar", NOW - 1).unwrap();
    assert!(current.is_current_at(NOW - 1));
}

#[test]
fn selects_by_slug() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();
    let well_type = create_type(&repo, "Homepage Features", "homepage-features");
    let well = create_well(&repo, &well_type, NOW - DAY_MS, None, true);

    let current = repo.get_current_by_slug("homepage-features", NOW).unwrap();
    assert_eq!(current.uuid, well.uuid);

    let err = repo.get_current_by_slug("missing", NOW).unwrap_err();
    assert!(matches!(err, WellRepoError::NotFound(_)));
}

#[test]
fn unknown_title_is_not_found() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();

    let err = repo.get_current_by_title("nope", NOW).unwrap_err();
    assert!(matches!(err, WellRepoError::NotFound(_)));
}

#[test]
fn tie_on_pub_date_breaks_on_greatest_uuid() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();
    let well_type = create_type(&repo, "homepage", "homepage");

    let a = create_well(&repo, &well_type, NOW - DAY_MS, None, true);
    let b = create_well(&repo, &well_type, NOW - DAY_MS, None, true);
    let expected = if a.uuid > b.uuid { a.uuid } else { b.uuid };

    let current = repo.get_current_by_title("homepage", NOW).unwrap();
    assert_eq!(current.uuid, expected);
}

#[test]
fn bulk_omits_titles_with_no_eligible_well() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();

    let type_a = create_type(&repo, "A", "type-a");
    let type_b = create_type(&repo, "B", "type-b");
    let well_a = create_well(&repo, &type_a, NOW - DAY_MS, None, true);
    // B exists but only with an expired well.
    create_well(&repo, &type_b, NOW - 2 * DAY_MS, Some(NOW - DAY_MS), true);

    let titles = vec!["A".to_string(), "B".to_string()];
    let current = repo.get_current_by_titles(&titles, NOW).unwrap();

    assert_eq!(current.len(), 1);
    assert_eq!(current.get("A").unwrap().uuid, well_a.uuid);
    assert!(!current.contains_key("B"));
}

#[test]
fn bulk_keys_every_result_by_its_own_title() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();

    let type_a = create_type(&repo, "A", "type-a");
    let type_b = create_type(&repo, "B", "type-b");
    let type_c = create_type(&repo, "C", "type-c");
    let well_a = create_well(&repo, &type_a, NOW - 3 * DAY_MS, None, true);
    let well_b = create_well(&repo, &type_b, NOW - 2 * DAY_MS, None, true);
    let well_c = create_well(&repo, &type_c, NOW - DAY_MS, None, true);

    let titles = vec!["A".to_string(), "B".to_string(), "C".to_string()];
    let current = repo.get_current_by_titles(&titles, NOW).unwrap();

    // Every title keeps its own selection; no entry overwrites another.
    assert_eq!(current.len(), 3);
    assert_eq!(current.get("A").unwrap().uuid, well_a.uuid);
    assert_eq!(current.get("B").unwrap().uuid, well_b.uuid);
    assert_eq!(current.get("C").unwrap().uuid, well_c.uuid);
}

#[test]
fn bulk_picks_latest_eligible_per_title() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();

    let type_a = create_type(&repo, "A", "type-a");
    create_well(&repo, &type_a, NOW - 4 * DAY_MS, None, true);
    let latest_a = create_well(&repo, &type_a, NOW - DAY_MS, None, true);
    create_well(&repo, &type_a, NOW - 1, None, false);

    let titles = vec!["A".to_string()];
    let current = repo.get_current_by_titles(&titles, NOW).unwrap();
    assert_eq!(current.get("A").unwrap().uuid, latest_a.uuid);
}

#[test]
fn bulk_with_empty_title_set_is_empty() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();

    let current = repo.get_current_by_titles(&[], NOW).unwrap();
    assert!(current.is_empty());
}

#[test]
fn dispatcher_prefers_titles_then_title_then_slug() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();

    let type_a = create_type(&repo, "A", "type-a");
    let type_b = create_type(&repo, "B", "type-b");
    let well_a = create_well(&repo, &type_a, NOW - DAY_MS, None, true);
    let well_b = create_well(&repo, &type_b, NOW - DAY_MS, None, true);

    let query = CurrentQuery {
        titles: vec!["A".to_string()],
        title: Some("B".to_string()),
        slug: Some("type-b".to_string()),
    };
    match repo.get_current(&query, NOW).unwrap() {
        CurrentWells::ByTitle(map) => {
            assert_eq!(map.get("A").unwrap().uuid, well_a.uuid);
        }
        other => panic!("expected bulk result, got {other:?}"),
    }

    let query = CurrentQuery {
        title: Some("B".to_string()),
        slug: Some("type-a".to_string()),
        ..CurrentQuery::default()
    };
    match repo.get_current(&query, NOW).unwrap() {
        CurrentWells::Single(well) => assert_eq!(well.uuid, well_b.uuid),
        other => panic!("expected single result, got {other:?}"),
    }
}

#[test]
fn empty_query_fails_as_not_found() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();

    let err = repo.get_current(&CurrentQuery::default(), NOW).unwrap_err();
    assert!(matches!(err, WellRepoError::NotFound(_)));
}

#[test]
fn homepage_features_worked_example() {
    let conn = setup();
    let repo = SqliteWellRepository::try_new(&conn).unwrap();
    let well_type = create_type(&repo, "homepage-features", "homepage-features");

    let fresh = create_well(&repo, &well_type, NOW - DAY_MS, None, true);
    // Older and already expired an hour before now.
    create_well(
        &repo,
        &well_type,
        NOW - 2 * DAY_MS,
        Some(NOW - 60 * 60 * 1000),
        true,
    );

    let current = repo
        .get_current_by_title("homepage-features", NOW)
        .unwrap();
    assert_eq!(current.uuid, fresh.uuid);
}
