use alqvimia_actions::{
    ActionRegistry, ActionSchema, Condition, FieldDescriptor, RegistryBuilder, SchemaError,
};
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn test_every_builtin_type_resolves_with_unique_keys() {
    let registry = ActionRegistry::builtin();
    assert!(registry.len() > 100);

    for action_type in registry.action_types() {
        let schema = registry.resolve(action_type);
        assert!(!schema.is_fallback, "{action_type} fell back");

        let mut seen = HashSet::new();
        for key in schema.keys() {
            assert!(seen.insert(key), "{action_type} repeats field '{key}'");
        }
        for field in &schema.fields {
            for referenced in field.referenced_keys() {
                assert!(
                    seen.contains(referenced),
                    "{action_type}.{} references missing '{referenced}'",
                    field.key
                );
            }
        }
    }
}

#[test]
fn test_rest_put_inherits_rest_post_exactly() {
    let registry = ActionRegistry::builtin();
    let put = registry.resolve("rest_put");
    let post = registry.resolve("rest_post");

    assert_eq!(put.fields, post.fields);
    assert_eq!(put.title, "PUT Request");
    assert_eq!(put.lineage, vec!["rest_post", "rest_get"]);
    assert!(registry.schema("rest_put").unwrap().fields.is_empty());
}

#[test]
fn test_http_aliases_follow_two_levels_of_inheritance() {
    let registry = ActionRegistry::builtin();
    let keys = |id: &str| -> Vec<String> {
        registry.resolve(id).keys().map(String::from).collect()
    };
    assert_eq!(keys("http_put"), keys("rest_post"));
    assert_eq!(keys("http_get"), keys("rest_get"));
    assert!(keys("rest_delete").contains(&"confirm".to_string()));
}

#[test]
fn test_recorded_action_types_are_registered() {
    let registry = ActionRegistry::builtin();
    for id in ["window", "click", "doubleClick", "right", "type", "input", "select"] {
        assert!(registry.contains(id), "missing {id}");
    }
    let input = registry.resolve("input");
    assert!(input.field("clearBefore").is_some());
    assert_eq!(
        registry.resolve("doubleClick").field("clickCount").unwrap().default,
        Some(serde_json::json!(2))
    );
}

#[test]
fn test_containers() {
    let registry = ActionRegistry::builtin();
    for id in ["if_condition", "for_loop", "for_each", "while_loop", "try_catch"] {
        assert!(registry.resolve(id).is_container, "{id} is not a container");
    }
    assert!(!registry.resolve("click").is_container);
}

#[test]
fn test_categories_only_list_registered_types() {
    let registry = ActionRegistry::builtin();
    assert!(registry.category("http-requests").is_some());
    for category in registry.categories() {
        for member in &category.action_types {
            assert!(registry.contains(member), "{} lists {member}", category.id);
        }
    }
    assert_eq!(registry.category_of("excel_read").unwrap().id, "excel");
    // abstract bases stay out of the palette
    assert!(registry.category_of("excel_sheet").is_none());
}

#[test]
fn test_common_fields() {
    let registry = ActionRegistry::builtin();
    let keys: Vec<_> = registry
        .common_fields()
        .iter()
        .map(|f| f.key.as_str())
        .collect();
    assert_eq!(
        keys,
        vec![
            "timeout",
            "retryCount",
            "retryDelay",
            "continueOnError",
            "waitBefore",
            "waitAfter",
            "screenshotOnError"
        ]
    );
    assert!(registry.resolve("click").field("retryCount").is_none());
}

#[test]
fn test_unknown_type_gets_blank_panel() {
    let registry = ActionRegistry::builtin();
    let schema = registry.resolve("sap_connect_v9");
    assert!(schema.is_fallback);
    assert_eq!(schema.title, "sap_connect_v9");
    assert!(schema.fields.is_empty());
    assert!(!registry.contains("sap_connect_v9"));
}

#[test]
fn test_resolution_is_cached() {
    let registry = ActionRegistry::builtin();
    assert!(Arc::ptr_eq(
        &registry.resolve("excel_read"),
        &registry.resolve("excel_read")
    ));
}

#[test]
fn test_cycle_fails_the_build() {
    let result = RegistryBuilder::new()
        .schema(ActionSchema::new("base", "Base", "").extends("leaf"))
        .schema(ActionSchema::new("middle", "Middle", "").extends("base"))
        .schema(ActionSchema::new("leaf", "Leaf", "").extends("middle"))
        .build();
    match result {
        Err(SchemaError::Cycle { chain }) => {
            assert_eq!(chain.first(), chain.last());
            assert_eq!(chain.len(), 4);
        }
        other => panic!("expected a cycle error, got {other:?}"),
    }
}

#[test]
fn test_override_must_keep_referenced_keys_valid() {
    let result = RegistryBuilder::new()
        .schema(
            ActionSchema::new("parent", "Parent", "")
                .field(FieldDescriptor::toggle("saveAs", "Save"))
                .field(FieldDescriptor::text("path", "Path").when(Condition::equals("saveAs", true))),
        )
        .schema(
            ActionSchema::new("child", "Child", "")
                .extends("parent")
                .field(FieldDescriptor::text("path", "Path").when(Condition::equals("later", 1))),
        )
        .build();
    assert!(matches!(
        result,
        Err(SchemaError::DanglingReference { ref action_type, .. }) if action_type == "child"
    ));
}

#[test]
fn test_resolve_from_many_threads() {
    let registry = Arc::new(
        RegistryBuilder::new()
            .schema(ActionSchema::new("a", "A", "").field(FieldDescriptor::text("x", "X")))
            .schema(ActionSchema::new("b", "B", "").extends("a"))
            .build()
            .unwrap(),
    );
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.resolve("b").fields.len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}
