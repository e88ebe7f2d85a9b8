use mcoffline_core::identity::{offline_uuid, offline_uuid_string};
use proptest::prelude::*;

#[test]
fn derives_reference_uuids() {
    assert_eq!(
        offline_uuid_string("Notch"),
        "b50ad385-829d-3141-a216-7e7d7539ba7f"
    );
    assert_eq!(
        offline_uuid_string("Alice"),
        "10920508-d5d8-3eed-93d2-92f193afe7d7"
    );
    assert_eq!(
        offline_uuid_string("Bob"),
        "faa5dca3-c3d4-354b-ae1b-dde9e5a14b3b"
    );
}

#[test]
fn string_form_is_canonical() {
    let id = offline_uuid_string("Alice");
    let groups: Vec<usize> = id.split('-').map(str::len).collect();
    assert_eq!(groups, vec![8, 4, 4, 4, 12]);
    assert_eq!(id, id.to_lowercase());
}

proptest! {
    #[test]
    fn derivation_is_deterministic(name in "[A-Za-z0-9_]{1,16}") {
        prop_assert_eq!(offline_uuid(&name), offline_uuid(&name));
        prop_assert_eq!(offline_uuid_string(&name), offline_uuid(&name).to_string());
    }

    #[test]
    fn every_name_gets_a_version_3_uuid(name in "\\PC{1,32}") {
        prop_assert_eq!(offline_uuid(&name).get_version_num(), 3);
    }
}
