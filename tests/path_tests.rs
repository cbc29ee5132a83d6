// Path Tests
//
// Attribute paths, casts and sort keys.

use ftrack_query::{attr, Error, SortDirection, SortKey};

#[test]
fn chaining_appends_segments() {
    assert_eq!(attr("a").attr("b").to_string(), "a.b");
    assert_eq!(attr("a.b").attr("c.d").segments().len(), 4);
}

#[test]
fn cast_wraps_last_segment() {
    assert_eq!(
        attr("parent").cast("Project").attr("status").to_string(),
        "parent[Project].status"
    );
}

#[test]
fn reserved_suffix_yields_sort_key() {
    let key = attr("parent_id.desc").sort_key().unwrap();
    assert_eq!(key.to_string(), "parent_id descending");
    assert_eq!(attr("name.ascending").sort_key().unwrap().to_string(), "name ascending");
    assert!(attr("name").sort_key().is_none());
    assert!(attr("desc").sort_key().is_none());
}

#[test]
fn parses_sort_specs() {
    let key: SortKey = "name".parse().unwrap();
    assert_eq!(key.direction, SortDirection::Ascending);
    let key: SortKey = "project.name desc".parse().unwrap();
    assert!(key.is_descending());
    assert_eq!(key.path.to_string(), "project.name");

    match "name sideways".parse::<SortKey>() {
        Err(Error::UnknownSortDirection(token)) => assert_eq!(token, "sideways"),
        other => panic!("unexpected {:?}", other),
    }
}
