// Statement Tests
//
// Rendering and copy-on-write behaviour of select, create, update and delete.

use ftrack_query::{
    and_, attr, delete, insert, select, update, Clauses, Error, Options, Select, SortDirection,
    Statement,
};

// ============================================================================
// Section: Select
// ============================================================================

#[test]
fn select_with_projection_and_limit() {
    let stmt = select("Task")
        .where_([("name", "Test")])
        .unwrap()
        .populate(["type_id"])
        .limit(2);
    assert_eq!(stmt.to_string(), "select type_id from Task where name is \"Test\" limit 2");
}

#[test]
fn select_without_projection_is_the_entity() {
    assert_eq!(select("Task").to_string(), "Task");
}

#[test]
fn dotted_select_projects_the_field() {
    assert_eq!(select("Task.name").to_string(), "select name from Task");
}

#[test]
fn from_paths_shares_one_entity_type() {
    let stmt = Select::from_paths(["Task.name", "Task.parent.name"]).unwrap();
    assert_eq!(stmt.to_string(), "select name, parent.name from Task");
}

#[test]
fn from_paths_rejects_mixed_types() {
    match Select::from_paths(["Task.name", "Shot.name"]) {
        Err(Error::MixedEntityTypes(a, b)) => {
            assert_eq!(a, "Task");
            assert_eq!(b, "Shot");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn clauses_render_in_fixed_order() {
    let stmt = select("Task")
        .limit(10)
        .offset(20)
        .sort("name descending")
        .unwrap()
        .group_by(["status"])
        .where_([("parent.name", "sh010")])
        .unwrap()
        .populate(["name", "status.name"]);
    assert_eq!(
        stmt.to_string(),
        "select name, status.name from Task where parent.name is \"sh010\" \
         group by status order by name descending offset 20 limit 10"
    );
}

#[test]
fn clauses_render_with_and_without_projection() {
    let clauses = Clauses {
        entity_type: "Task".to_string(),
        filters: vec![attr("name").is("a")],
        projection: vec!["name".to_string()],
        group_by: vec!["status".to_string()],
        sort: vec![attr("name").desc()],
        offset: 5,
        limit: Some(10),
    };
    assert_eq!(
        clauses.render(true),
        "select name from Task where name is \"a\" group by status \
         order by name descending offset 5 limit 10"
    );
    assert_eq!(
        clauses.render(false),
        "Task where name is \"a\" group by status order by name descending offset 5 limit 10"
    );
}

#[test]
fn repeated_where_calls_are_anded() {
    let stmt = select("Task")
        .where_([attr("a").is(1)])
        .unwrap()
        .where_([and_([attr("b").is(2)]).unwrap() | attr("c").is(3)])
        .unwrap();
    assert_eq!(stmt.to_string(), "Task where a is 1 and (b is 2 or c is 3)");
}

#[test]
fn empty_where_adds_nothing() {
    let stmt = select("Task").where_(Vec::<(&str, i64)>::new()).unwrap();
    assert_eq!(stmt.to_string(), "Task");
}

#[test]
fn builders_leave_the_original_alone() {
    let base = select("Task").where_([("name", "a")]).unwrap();
    let before = base.to_string();
    let narrowed = base.clone().where_([("status.name", "Done")]).unwrap().limit(1);
    assert_eq!(base.to_string(), before);
    assert_ne!(narrowed.to_string(), before);
}

#[test]
fn statements_compare_by_rendered_clauses() {
    let a = select("Task").where_([("name", "x")]).unwrap().limit(1);
    let b = select("Task").limit(1).where_([("name", "x")]).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, b.limit(2));
}

// ============================================================================
// Section: Sorting
// ============================================================================

#[test]
fn sort_directions() {
    let stmt = select("Task")
        .sort("name")
        .unwrap()
        .sort("created_at desc")
        .unwrap()
        .sort("priority ascending")
        .unwrap();
    assert_eq!(
        stmt.to_string(),
        "Task order by name, created_at descending, priority"
    );
}

#[test]
fn unknown_sort_direction_names_the_token() {
    match select("Task").sort("name upward") {
        Err(Error::UnknownSortDirection(token)) => assert_eq!(token, "upward"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn clear_sort_drops_keys() {
    let stmt = select("Task").order_by("name").unwrap().clear_sort();
    assert_eq!(stmt.to_string(), "Task");
}

#[test]
fn reverse_flips_existing_keys_only() {
    let stmt = select("Task")
        .sort_by(attr("name").asc())
        .sort_by(attr("id").desc())
        .reverse()
        .sort("created_at")
        .unwrap();
    let directions: Vec<SortDirection> =
        stmt.clauses().sort.iter().map(|key| key.direction).collect();
    assert_eq!(
        directions,
        vec![
            SortDirection::Descending,
            SortDirection::Ascending,
            SortDirection::Ascending
        ]
    );
    assert_eq!(stmt.to_string(), "Task order by name descending, id, created_at");
}

// ============================================================================
// Section: Union
// ============================================================================

#[test]
fn union_ors_both_predicates() {
    let lhs = select("Task").where_([("a", 1), ("b", 2)]).unwrap();
    let rhs = select("Task").where_([("c", 3)]).unwrap();
    assert_eq!(
        (lhs | rhs).to_string(),
        "Task where ((a is 1 and b is 2) or c is 3)"
    );
}

#[test]
fn union_with_unfiltered_select_matches_everything() {
    let lhs = select("Task").where_([("a", 1)]).unwrap();
    assert_eq!((lhs | select("Task")).to_string(), "Task");
}

// ============================================================================
// Section: Create / Update / Delete
// ============================================================================

#[test]
fn create_renders_field_values() {
    let stmt = insert("Task").values([("name", "New Task")]);
    assert_eq!(stmt.to_string(), "create Task(name=\"New Task\")");
}

#[test]
fn later_values_replace_earlier_ones() {
    let stmt = insert("Task")
        .values([("name", "a")])
        .values([("status", "b")])
        .values([("name", "c")]);
    assert_eq!(stmt.to_string(), "create Task(name=\"c\", status=\"b\")");
}

#[test]
fn update_renders_where_then_set() {
    let stmt = update("Task")
        .where_([("name", "Old Task")])
        .unwrap()
        .values([("name", "New Task")]);
    assert_eq!(
        stmt.to_string(),
        "update Task where name is \"Old Task\" set (name=\"New Task\")"
    );
}

#[test]
fn update_without_values_has_empty_set() {
    assert_eq!(update("Task").limit(1).to_string(), "update Task limit 1 set ()");
}

#[test]
fn delete_renders_clauses() {
    let stmt = delete("Task").where_([("name", "My Task")]).unwrap().limit(1);
    assert_eq!(stmt.to_string(), "delete Task where name is \"My Task\" limit 1");
}

#[test]
fn mutations_reject_projection_and_grouping() {
    assert!(matches!(
        update("Task").populate(["name"]),
        Err(Error::ProjectionNotAllowed(_))
    ));
    assert!(matches!(
        update("Task").group_by(["name"]),
        Err(Error::GroupByNotAllowed(_))
    ));
    assert!(matches!(
        delete("Task").populate(["name"]),
        Err(Error::ProjectionNotAllowed(_))
    ));
    assert!(matches!(
        delete("Task").group_by(["name"]),
        Err(Error::GroupByNotAllowed(_))
    ));
}

#[test]
fn options_do_not_change_text() {
    let plain = delete("Task").where_([("name", "x")]).unwrap();
    let tuned = plain
        .clone()
        .options(Options::new().page_size(10).remove_components(true));
    assert_eq!(plain.to_string(), tuned.to_string());
    assert!(tuned.removes_components());
    assert!(!plain.removes_components());
}

#[test]
fn statement_enum_renders_each_kind() {
    let statements: Vec<Statement<'static>> = vec![
        select("Task").into(),
        insert("Task").values([("name", "a")]).into(),
        update("Task").values([("name", "a")]).into(),
        delete("Task").into(),
    ];
    let rendered: Vec<String> = statements.iter().map(|s| s.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "Task",
            "create Task(name=\"a\")",
            "update Task set (name=\"a\")",
            "delete Task"
        ]
    );
}

#[test]
fn subquery_form_projects_identifier() {
    assert_eq!(select("Shot").subquery().to_string(), "select id from Shot");
}

#[test]
fn subquery_form_keeps_the_projection() {
    assert_eq!(
        select("Shot").populate(["name", "project"]).subquery().to_string(),
        "select name, project from Shot"
    );
}
