// Rendering Tests
//
// Worked examples of the query grammar, one section per construct.

use ftrack_query::{
    and, and_, attr, not, not_, or, or_, select, Criterion, EntityRef, Error, Expr, Value,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

// ============================================================================
// Section: Predicates
// ============================================================================

#[test]
fn equality_renders_is() {
    assert_eq!(attr("version").is(5).to_string(), "version is 5");
}

#[test]
fn negated_equality_prepends_not() {
    assert_eq!((!attr("version").is(5)).to_string(), "not version is 5");
}

#[test]
fn ordering_operators() {
    assert_eq!(attr("a").gt(1).to_string(), "a > 1");
    assert_eq!(attr("a").ge(1).to_string(), "a >= 1");
    assert_eq!(attr("a").lt(1).to_string(), "a < 1");
    assert_eq!(attr("a").le(1).to_string(), "a <= 1");
    assert_eq!(attr("a").is_not("x").to_string(), "a is_not \"x\"");
    assert_eq!(attr("a").is_(None::<i64>).to_string(), "a is none");
}

#[test]
fn literal_forms() {
    assert_eq!(attr("a").is(true).to_string(), "a is True");
    assert_eq!(attr("a").is(false).to_string(), "a is False");
    assert_eq!(attr("a").is(2.0).to_string(), "a is 2.0");
    assert_eq!(attr("a").is(0.25).to_string(), "a is 0.25");
    let decimal = Decimal::from_str("1.50").unwrap();
    assert_eq!(attr("a").is(decimal).to_string(), "a is 1.50");
    assert_eq!(
        attr("name").is("The \"Thing\"").to_string(),
        r#"name is "The \"Thing\"""#
    );
}

#[test]
fn temporal_operators() {
    assert_eq!(
        attr("start_date").after("2024-01-01").to_string(),
        "start_date after \"2024-01-01\""
    );
    assert_eq!(
        attr("end_date").before("2024-12-31").to_string(),
        "end_date before \"2024-12-31\""
    );
}

#[test]
fn chained_paths() {
    let path = attr("parent").attr("status").attr("name");
    assert_eq!(path.is("Done").to_string(), "parent.status.name is \"Done\"");
    assert_eq!(
        attr("parent").cast("Shot").attr("name").is("sh010").to_string(),
        "parent[Shot].name is \"sh010\""
    );
}

// ============================================================================
// Section: Patterns
// ============================================================================

#[test]
fn startswith_escapes_wildcards() {
    assert_eq!(
        attr("parent.name").startswith("a%b").to_string(),
        r#"parent.name like "a\%b%""#
    );
}

#[test]
fn endswith_and_contains() {
    assert_eq!(attr("name").endswith("_v1").to_string(), "name like \"%_v1\"");
    assert_eq!(attr("name").contains("50%").to_string(), r#"name like "%50\%%""#);
}

#[test]
fn patterns_escape_backslashes() {
    assert_eq!(attr("path").startswith("C:\\").to_string(), r#"path like "C:\\%""#);
    assert_eq!(
        attr("path").contains(r"a\%b").to_string(),
        r#"path like "%a\\\%b%""#
    );
    assert_eq!(attr("path").endswith("\\").to_string(), r#"path like "%\\""#);
}

#[test]
fn text_with_backslashes_stays_quoted() {
    assert_eq!(attr("path").is("C:\\").to_string(), r#"path is "C:\\""#);
    assert_eq!(
        attr("name").is(r#"a\"b"#).to_string(),
        r#"name is "a\\\"b""#
    );
    assert_eq!(
        attr("path").in_(["C:\\", "D:"]).unwrap().to_string(),
        r#"path in ("C:\\", "D:")"#
    );
}

#[test]
fn explicit_patterns_are_untouched() {
    assert_eq!(attr("name").like("sh%").to_string(), "name like \"sh%\"");
    assert_eq!(attr("name").not_like("%tmp%").to_string(), "name not_like \"%tmp%\"");
}

// ============================================================================
// Section: Entities
// ============================================================================

#[test]
fn entity_comparison_targets_id() {
    let project = EntityRef::new("Project", "abc-123");
    assert_eq!(attr("project").is(&project).to_string(), "project.id is \"abc-123\"");
    assert_eq!(
        (!attr("project").is(project)).to_string(),
        "not project.id is \"abc-123\""
    );
}

#[test]
fn entity_membership_lists_identifiers() {
    let a = EntityRef::new("Shot", "s1");
    let b = EntityRef::new("Shot", "s2");
    assert_eq!(
        attr("parent").in_([a, b]).unwrap().to_string(),
        "parent.id in (\"s1\", \"s2\")"
    );
}

#[test]
fn numeric_entity_identifier_compares_as_number() {
    let job = EntityRef::new("Job", 12);
    assert_eq!(attr("job").is_not(job).to_string(), "job.id is_not 12");
}

#[test]
fn entity_field_criterion_targets_id() {
    let project = EntityRef::new("Project", "p1");
    let expr = and_([("project", project)]).unwrap();
    assert_eq!(expr.to_string(), "project.id is \"p1\"");
}

#[test]
fn mixed_membership_is_rejected() {
    let shot = EntityRef::new("Shot", "s1");
    let result = attr("parent").in_([Value::from(shot), Value::from("s2")]);
    assert!(matches!(result, Err(Error::MixedMembership)));
}

// ============================================================================
// Section: Membership
// ============================================================================

#[test]
fn value_membership() {
    assert_eq!(attr("id").in_([1, 2, 3]).unwrap().to_string(), "id in (1, 2, 3)");
    assert_eq!(
        attr("name").not_in(["a", "b"]).unwrap().to_string(),
        "name not_in (\"a\", \"b\")"
    );
}

#[test]
fn empty_membership_stays_valid() {
    let empty: [i64; 0] = [];
    assert_eq!(attr("id").in_(empty).unwrap().to_string(), "id in (\"\")");
}

#[test]
fn subquery_membership_defaults_to_identifier() {
    let shots = select("Shot").where_([("name", "sh010")]).unwrap();
    assert_eq!(
        attr("parent").in_([shots]).unwrap().to_string(),
        "parent in (select id from Shot where name is \"sh010\")"
    );
    assert_eq!(
        attr("parent_id").in_([select("Shot")]).unwrap().to_string(),
        "parent_id in (select id from Shot)"
    );
}

#[test]
fn subquery_membership_keeps_the_given_path() {
    assert_eq!(
        attr("name").in_([select("Task")]).unwrap().to_string(),
        "name in (select id from Task)"
    );
    assert_eq!(
        attr("parent").not_in([select("Shot")]).unwrap().to_string(),
        "parent not_in (select id from Shot)"
    );
}

#[test]
fn subquery_membership_keeps_every_projected_column() {
    let shots = select("Shot").populate(["name", "status"]);
    assert_eq!(
        attr("parent.name").in_([&shots]).unwrap().to_string(),
        "parent.name in (select name, status from Shot)"
    );

    let tasks = select("Task")
        .populate(["name", "project"])
        .where_([("name", "abc")])
        .unwrap();
    assert_eq!(
        attr("id").in_([tasks]).unwrap().to_string(),
        "id in (select name, project from Task where name is \"abc\")"
    );
}

#[test]
fn several_subqueries_are_rejected() {
    let result = attr("id").in_([select("Shot"), select("Task")]);
    assert!(matches!(result, Err(Error::MultipleSubqueries)));
}

#[test]
fn subquery_equality_is_rejected() {
    let result = and_([Criterion::field("parent", select("Shot"))]);
    match result {
        Err(Error::SubqueryComparison(key)) => assert_eq!(key, "parent"),
        other => panic!("unexpected {:?}", other),
    }
}

// ============================================================================
// Section: Relationships
// ============================================================================

#[test]
fn has_and_any_nest_conditions() {
    assert_eq!(
        attr("parent").has([("name", "sh010")]).unwrap().to_string(),
        "parent has (name is \"sh010\")"
    );
    assert_eq!(
        attr("children")
            .any(criteria_of_two())
            .unwrap()
            .to_string(),
        "children any (name is \"abc\" and status.name is \"Done\")"
    );
}

fn criteria_of_two() -> Vec<Criterion> {
    vec![
        Criterion::field("name", "abc"),
        attr("status.name").is("Done").into(),
    ]
}

#[test]
fn relationship_keeps_or_brackets() {
    let expr = attr("children")
        .any([or!(name = "a", name = "b").unwrap()])
        .unwrap();
    assert_eq!(expr.to_string(), "children any ((name is \"a\" or name is \"b\"))");
}

// ============================================================================
// Section: Combinators
// ============================================================================

#[test]
fn and_joins_without_brackets() {
    let expr = and!(attr("version").gt(3), version = 1).unwrap();
    assert_eq!(expr.to_string(), "version > 3 and version is 1");
}

#[test]
fn or_is_always_bracketed() {
    let expr = or!(attr("version").gt(3), version = 1).unwrap();
    assert_eq!(expr.to_string(), "(version > 3 or version is 1)");
}

#[test]
fn not_negates_an_or_group() {
    let expr = not!(attr("version").is(5), version = 6).unwrap();
    assert_eq!(expr.to_string(), "not (version is 5 or version is 6)");
}

#[test]
fn not_of_one_term_has_no_brackets() {
    assert_eq!(not_([attr("a").is(1)]).unwrap().to_string(), "not a is 1");
}

#[test]
fn single_terms_are_not_wrapped() {
    assert_eq!(or_([attr("a").is(1)]).unwrap().to_string(), "a is 1");
    assert_eq!(and_(Vec::<Expr>::new()).unwrap().to_string(), "");
}

#[test]
fn or_nested_in_and() {
    let expr = and_([
        attr("a").is(1),
        or_([attr("b").is(2), attr("c").is(3)]).unwrap(),
    ])
    .unwrap();
    assert_eq!(expr.to_string(), "a is 1 and (b is 2 or c is 3)");
}

#[test]
fn negated_and_is_bracketed() {
    let expr = !and_([attr("a").is(1), attr("b").is(2)]).unwrap();
    assert_eq!(expr.to_string(), "not (a is 1 and b is 2)");
}

#[test]
fn operator_sugar() {
    let expr = attr("a").is(1) & (attr("b").is(2) | attr("c").is(3));
    assert_eq!(expr.to_string(), "a is 1 and (b is 2 or c is 3)");
    assert_eq!((!!attr("a").is(1)).to_string(), "a is 1");
}

#[test]
fn raw_text_passes_through() {
    let expr = and_(["status.name is \"Done\"", "name like \"sh%\""]).unwrap();
    assert_eq!(expr.to_string(), "status.name is \"Done\" and name like \"sh%\"");
    assert_eq!(
        (!Expr::raw("a is 1 or b is 2")).to_string(),
        "not (a is 1 or b is 2)"
    );
}

#[test]
fn raw_text_brackets_only_top_level_connectives() {
    let cases = [
        ("a is 1 and b is 2", "not (a is 1 and b is 2)"),
        ("(a is 1 or b is 2)", "not (a is 1 or b is 2)"),
        ("name is \"x and y\"", "not name is \"x and y\""),
        ("(a is 1) or (b is 2)", "not ((a is 1) or (b is 2))"),
        ("a is 1", "not a is 1"),
    ];
    for (text, expected) in cases {
        assert_eq!(Expr::raw(text).negate().to_string(), expected, "{}", text);
    }
}

#[test]
fn raw_text_with_escaped_quote_keeps_scanning() {
    let text = r#"name is "x\" and y" or b is 2"#;
    assert_eq!(Expr::raw(text).negate().to_string(), format!("not ({})", text));
}

#[test]
fn empty_groups_vanish() {
    let expr = Expr::all(vec![Expr::And(vec![]), attr("a").is(1)]);
    assert_eq!(expr, attr("a").is(1));
    assert!(Expr::And(vec![]).negate().is_empty());
}

#[test]
fn dotted_keys_through_maps() {
    let mut map = BTreeMap::new();
    map.insert("parent.name", "sh010");
    map.insert("name", "compositing");
    assert_eq!(
        and_([map]).unwrap().to_string(),
        "name is \"compositing\" and parent.name is \"sh010\""
    );
}

#[test]
fn none_entries_mean_no_constraint() {
    let status: Option<Expr> = None;
    let expr = and!(status, name = "x").unwrap();
    assert_eq!(expr.to_string(), "name is \"x\"");
}

#[test]
fn bare_entities_are_ambiguous() {
    let task = EntityRef::new("Task", "t1");
    assert!(matches!(and!(task.clone()), Err(Error::AmbiguousEntity(_))));
    match and_([Criterion::from(task)]) {
        Err(Error::AmbiguousEntity(name)) => assert_eq!(name, "<Task(t1)>"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn none_items_are_dropped() {
    let items: Vec<Criterion> = vec![None::<Expr>.into(), attr("a").is(1).into()];
    assert_eq!(and_(items).unwrap().to_string(), "a is 1");
}

#[test]
fn maps_expand_in_key_order() {
    let mut map = BTreeMap::new();
    map.insert("b", 2);
    map.insert("a", 1);
    assert_eq!(and_([map]).unwrap().to_string(), "a is 1 and b is 2");
}

#[test]
fn keyword_macro_mixes_forms() {
    let items = ftrack_query::criteria!(attr("a").gt(1), name = "x", "raw is 1");
    assert_eq!(items.len(), 3);
    assert_eq!(
        and_(items).unwrap().to_string(),
        "a > 1 and name is \"x\" and raw is 1"
    );
}

// ============================================================================
// Section: Call Sugar
// ============================================================================

#[test]
fn invoke_is_equality() {
    use ftrack_query::Invocation;
    match attr("name").invoke("x") {
        Invocation::Filter(expr) => assert_eq!(expr.to_string(), "name is \"x\""),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn invoke_on_direction_suffix_sorts() {
    use ftrack_query::Invocation;
    match attr("name.desc").invoke(Value::Null) {
        Invocation::Sort(key) => assert_eq!(key.to_string(), "name descending"),
        other => panic!("unexpected {:?}", other),
    }
}
