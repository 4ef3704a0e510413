use uuid::Uuid;
use wells_core::{ContentRef, Node, Well, WellType};

#[test]
fn well_display_ends_with_never_when_no_expiry() {
    let well_type = WellType::new("some-random-title-42", "some-random-title-42").unwrap();
    let mut well = Well::new(well_type);
    well.pub_date = 1_700_000_000_000;

    assert_eq!(
        well.to_string(),
        "some-random-title-42 (1700000000000 - Never)"
    );
}

#[test]
fn well_display_ends_with_expiry_when_present() {
    let well_type = WellType::new("some-random-title-42", "some-random-title-42").unwrap();
    let mut well = Well::new(well_type);
    well.pub_date = 1_700_000_000_000;
    well.expires = Some(1_700_000_000_000);

    assert_eq!(
        well.to_string(),
        "some-random-title-42 (1700000000000 - 1700000000000)"
    );
}

#[test]
fn well_title_is_the_same_as_well_type_title() {
    let well_type = WellType::new("Homepage Features", "homepage-features").unwrap();
    let well = Well::new(well_type.clone());
    assert_eq!(well.title(), well_type.title);
}

#[test]
fn well_new_defaults_to_active_and_never_expiring() {
    let well_type = WellType::new("sidebar", "sidebar").unwrap();
    let well = Well::new(well_type);

    assert!(!well.uuid.is_nil());
    assert!(well.active);
    assert_eq!(well.expires, None);
    assert!(well.pub_date > 0);
}

#[test]
fn well_serialization_uses_expected_wire_fields() {
    let type_id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let well_id = Uuid::parse_str("66666666-7777-4888-9999-aaaaaaaaaaaa").unwrap();
    let well_type = WellType::with_id(type_id, "Homepage", "homepage").unwrap();
    let mut well = Well::with_id(well_id, well_type);
    well.pub_date = 1_700_000_000_000;
    well.expires = Some(1_700_000_360_000);

    let json = serde_json::to_value(&well).unwrap();
    assert_eq!(json["uuid"], well_id.to_string());
    assert_eq!(json["type"]["uuid"], type_id.to_string());
    assert_eq!(json["type"]["title"], "Homepage");
    assert_eq!(json["type"]["slug"], "homepage");
    assert_eq!(json["pub_date"], 1_700_000_000_000_i64);
    assert_eq!(json["expires"], 1_700_000_360_000_i64);
    assert_eq!(json["active"], true);

    let decoded: Well = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, well);
}

#[test]
fn node_serialization_round_trips_content_ref() {
    let node = Node::new(Uuid::new_v4(), ContentRef::new("story", Uuid::new_v4()), 5);

    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["content"]["kind"], "story");
    assert_eq!(json["sort_order"], 5);

    let decoded: Node = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, node);
}
