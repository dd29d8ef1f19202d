use catalog_core::ordering::{apply_order, reorder};
use catalog_core::{
    CatalogConfig, CatalogError, DeletionSafety, FallbackResolver, MetaFieldSchema, UnsafeReason,
    category, schema_key, tree,
};
use serde_json::json;
use shared::models::{Category, MetaFieldCreate, MetaFieldType, SortOrderUpdate};

fn cat(id: i64, name: &str, parent_id: Option<i64>, level: u32, sort_order: i32) -> Category {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "slug": name.to_lowercase(),
        "parent_id": parent_id,
        "level": level,
        "sort_order": sort_order,
    }))
    .unwrap()
}

fn electronics() -> Vec<Category> {
    vec![
        cat(1, "Electronics", None, 0, 0),
        cat(2, "Phones", Some(1), 1, 0),
        cat(3, "Laptops", Some(1), 1, 1),
    ]
}

#[test]
fn test_electronics_tree_and_reorder() {
    let mut all = electronics();

    let forest = tree::build(&all, 3).unwrap();
    assert_eq!(forest.roots().len(), 1);
    let root = &forest.roots()[0];
    assert_eq!(root.category.name, "Electronics");
    let children: Vec<&str> = root.children.iter().map(|n| n.category.name.as_str()).collect();
    assert_eq!(children, vec!["Phones", "Laptops"]);

    let updates = category::reorder_siblings(Some(1), &[3, 2], &all).unwrap();
    assert_eq!(updates, vec![SortOrderUpdate::new(3, 0), SortOrderUpdate::new(2, 1)]);

    assert_eq!(apply_order(&mut all, &updates), 2);
    let forest = tree::build(&all, 3).unwrap();
    let children: Vec<&str> = forest.roots()[0]
        .children
        .iter()
        .map(|n| n.category.name.as_str())
        .collect();
    assert_eq!(children, vec!["Laptops", "Phones"]);
}

#[test]
fn test_screen_size_field_appended_with_derived_key() {
    let config = CatalogConfig::default();
    let mut schema = MetaFieldSchema::default();
    let mut ram = MetaFieldCreate::new("RAM", MetaFieldType::Number);
    ram.sort_order = Some(4);
    schema.add_field(ram, &config).unwrap();

    let mut screen = MetaFieldCreate::new("Screen Size", MetaFieldType::Number);
    screen.unit = Some("in".to_string());
    let field = schema.add_field(screen, &config).unwrap();

    assert_eq!(field.key, "screen_size");
    assert_eq!(field.sort_order, 5);
    assert_eq!(schema.keys(), vec!["ram", "screen_size"]);
}

#[test]
fn test_two_cycle_rejected() {
    let all = vec![cat(1, "A", Some(2), 1, 0), cat(2, "B", Some(1), 1, 0)];
    assert!(matches!(
        tree::build(&all, 3),
        Err(CatalogError::CyclicHierarchy(ids)) if ids.len() == 2
    ));
}

#[test]
fn test_fallback_safety_flips_with_valid_fallback() {
    let mut all = electronics();
    let resolver = FallbackResolver::new(&all);
    assert_eq!(
        resolver.can_delete(&all[1], 5, None),
        DeletionSafety::Unsafe(UnsafeReason::NoFallback)
    );

    let phones = category::set_fallback(2, Some(3), &all).unwrap();
    all[1] = phones;
    let resolver = FallbackResolver::new(&all);
    assert_eq!(resolver.can_delete(&all[1], 5, None), DeletionSafety::Safe);

    let plan = resolver.plan_deletion(&all[1], 5, None).unwrap();
    assert_eq!(plan.delete_category_id, 2);
    assert_eq!(plan.reassign_products_to, Some(3));
}

#[test]
fn test_rename_preserves_position() {
    let config = CatalogConfig::default();
    let mut schema = MetaFieldSchema::default();
    for label in ["RAM", "CPU", "GPU"] {
        schema
            .add_field(MetaFieldCreate::new(label, MetaFieldType::Text), &config)
            .unwrap();
    }
    let before = schema.get("cpu").cloned().unwrap();

    schema.rename_field("cpu", "processor", &config).unwrap();
    let after = schema.get("processor").unwrap();
    assert_eq!(after.sort_order, before.sort_order);
    assert_eq!(after.label, before.label);
    assert_eq!(after.kind, before.kind);
    assert_eq!(schema.keys(), vec!["ram", "processor", "gpu"]);
}

#[test]
fn test_acyclic_tree_depth_matches_level_and_count() {
    let all = vec![
        cat(1, "Electronics", None, 0, 0),
        cat(2, "Phones", Some(1), 1, 0),
        cat(3, "Laptops", Some(1), 1, 1),
        cat(4, "Android", Some(2), 2, 0),
        cat(5, "Rugged", Some(4), 3, 0),
        cat(6, "Books", None, 0, 1),
        cat(7, "Fiction", Some(6), 1, 0),
    ];
    let forest = tree::build(&all, 3).unwrap();

    assert_eq!(forest.len(), all.len());
    assert_eq!(forest.iter().count(), all.len());
    assert!(forest.iter().all(|node| node.depth == node.category.level));
    assert!(forest.level_mismatches().is_empty());
    assert!(tree::validate_levels(&all).is_ok());
}

#[test]
fn test_reorder_twice_is_idempotent() {
    let mut all = electronics();
    let order = [3, 2];
    let group: Vec<Category> = all[1..].to_vec();

    let first = reorder(&group, &order).unwrap();
    apply_order(&mut all, &first);
    let second = category::reorder_siblings(Some(1), &order, &all).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_normalized_key_always_unique_in_empty_schema() {
    for label in ["Screen Size", "Battery (mAh)", "wifi_6", "Colour / Finish"] {
        let key = schema_key::normalize(label).unwrap();
        assert_eq!(schema_key::normalize(&key).unwrap(), key);
        assert!(schema_key::validate_unique::<String>(&key, &[]).is_ok());
    }
}
