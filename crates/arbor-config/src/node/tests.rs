use super::*;

fn tree(json: serde_json::Value) -> Node {
    Node::from_json(json).unwrap()
}

#[test]
fn test_get_and_default() {
    let node = tree(serde_json::json!({"a": 1}));
    assert_eq!(node.get("a"), Some(&Value::Integer(1)));
    assert!(node.get("b").is_none());

    let fallback = Value::from("none");
    assert_eq!(node.get_or("b", &fallback), &fallback);
    assert_eq!(node.get_or("a", &fallback), &Value::Integer(1));
}

#[test]
fn test_set_keeps_position_on_replace() {
    let mut node = tree(serde_json::json!({"a": 1, "b": 2, "c": 3}));
    let previous = node.set("b", "two");
    assert_eq!(previous, Some(Value::Integer(2)));
    assert_eq!(node.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
}

#[test]
fn test_set_borrowed_node_copies_it() {
    let source = tree(serde_json::json!({"inner": {"x": 1}}));
    let mut target = Node::new();

    target.set("copy", source.child("inner").unwrap());
    target
        .at_mut(&Scope::from_keys(["copy"]))
        .unwrap()
        .set("x", 99);

    assert_eq!(
        source.child("inner").unwrap().get("x"),
        Some(&Value::Integer(1))
    );
    assert_eq!(
        target.child("copy").unwrap().get("x"),
        Some(&Value::Integer(99))
    );
}

#[test]
fn test_remove_preserves_order() {
    let mut node = tree(serde_json::json!({"a": 1, "b": 2, "c": 3}));
    node.remove("a");
    assert_eq!(node.keys().collect::<Vec<_>>(), vec!["b", "c"]);
}

#[test]
fn test_at_navigates_nodes_only() {
    let node = tree(serde_json::json!({"a": {"b": {"c": 1}}, "leaf": 5}));
    assert!(node.at(&Scope::from_keys(["a", "b"])).is_some());
    assert!(node.at(&Scope::from_keys(["a", "missing"])).is_none());
    assert!(node.at(&Scope::from_keys(["leaf"])).is_none());
    assert_eq!(node.at(&Scope::root()), Some(&node));
}

#[test]
fn test_merge_fills_missing_and_skips_present() {
    let base = tree(serde_json::json!({"x": 2, "y": 3}));
    let other = tree(serde_json::json!({"x": 1}));

    let outcome = base.merge(&other);

    assert_eq!(outcome.merged, base);
    assert!(outcome.added.is_empty());
    assert_eq!(outcome.skipped, vec!["x"]);
}

#[test]
fn test_merge_recurses_into_shared_subtrees() {
    let base = tree(serde_json::json!({"db": {"host": "localhost"}}));
    let other = tree(serde_json::json!({"db": {"host": "remote", "port": 5432}, "cache": {"ttl": 60}}));

    let outcome = base.merge(&other);

    let db = outcome.merged.child("db").unwrap();
    assert_eq!(db.get("host").unwrap().as_str(), Some("localhost"));
    assert_eq!(db.get("port").unwrap().as_integer(), Some(5432));
    assert_eq!(outcome.added, vec!["db/port", "cache"]);
    assert_eq!(outcome.skipped, vec!["db/host"]);
}

#[test]
fn test_merge_leaf_node_mismatch_is_skipped() {
    let base = tree(serde_json::json!({"a": "scalar", "b": {"c": 1}}));
    let other = tree(serde_json::json!({"a": {"nested": true}, "b": 7}));

    let outcome = base.merge(&other);

    assert_eq!(outcome.merged, base);
    assert_eq!(outcome.skipped, vec!["a", "b"]);
}

#[test]
fn test_merge_never_mutates_inputs() {
    let base = tree(serde_json::json!({"a": {"b": 1}}));
    let other = tree(serde_json::json!({"a": {"c": 2}, "d": 3}));
    let base_before = base.clone();
    let other_before = other.clone();

    let _ = base.merge(&other);

    assert_eq!(base, base_before);
    assert_eq!(other, other_before);
}

#[test]
fn test_merge_preserves_sides_for_reported_paths() {
    let base = tree(serde_json::json!({"a": 1, "n": {"x": "base"}}));
    let other = tree(serde_json::json!({"a": 2, "n": {"x": "other", "y": "new"}, "z": [1, 2]}));

    let outcome = base.merge(&other);
    let merged = &outcome.merged;

    for path in &outcome.skipped {
        let scope = Scope::from_keys(path.split('/'));
        let key = scope.keys().last().unwrap();
        let parent = scope.parent().unwrap();
        assert_eq!(
            merged.at(&parent).unwrap().get(key),
            base.at(&parent).unwrap().get(key)
        );
    }
    for path in &outcome.added {
        let scope = Scope::from_keys(path.split('/'));
        let key = scope.keys().last().unwrap();
        let parent = scope.parent().unwrap();
        assert_eq!(
            merged.at(&parent).unwrap().get(key),
            other.at(&parent).unwrap().get(key)
        );
    }
}

#[test]
fn test_sorted_alphabetical_recursive() {
    let node = tree(serde_json::json!({"b": {"z": 1, "a": 2}, "a": [{"y": 1, "x": 2}], "c": 3}));

    let sorted = node.sorted(false);
    assert_eq!(sorted.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert_eq!(
        sorted.child("b").unwrap().keys().collect::<Vec<_>>(),
        vec!["a", "z"]
    );
    let listed = sorted.get("a").unwrap().as_list().unwrap()[0]
        .as_node()
        .unwrap();
    assert_eq!(listed.keys().collect::<Vec<_>>(), vec!["x", "y"]);
}

#[test]
fn test_sorted_reverse() {
    let node = tree(serde_json::json!({"b": {"m": 1, "n": 2}, "a": 1, "c": 3}));

    let reversed = node.sorted(false).sorted(true);
    assert_eq!(reversed.keys().collect::<Vec<_>>(), vec!["c", "b", "a"]);
    assert_eq!(
        reversed.child("b").unwrap().keys().collect::<Vec<_>>(),
        vec!["n", "m"]
    );
}

#[test]
fn test_leaf_paths() {
    let node = tree(serde_json::json!({"a": {"b": 1, "c": {"d": true}}, "e": [1]}));
    assert_eq!(node.leaf_paths(), vec!["a/b", "a/c/d", "e"]);
}

#[test]
fn test_serialize_keeps_order() {
    let node = tree(serde_json::json!({"z": 1, "a": {"y": "s"}}));
    let json = serde_json::to_string(&node).unwrap();
    assert_eq!(json, r#"{"z":1,"a":{"y":"s"}}"#);
}
