use alqvimia_actions::{
    available_options, effective_values, validate, visible_fields, visible_fields_with,
    ActionRegistry, IssueKind,
};
use serde_json::{json, Map, Value};

fn values(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap_or_default()
}

fn visible_keys(action_type: &str, v: Value) -> Vec<String> {
    let schema = ActionRegistry::builtin().resolve(action_type);
    visible_fields(&schema, &values(v))
        .into_iter()
        .map(|f| f.key.clone())
        .collect()
}

#[test]
fn test_save_as_toggle_controls_path() {
    assert!(!visible_keys("screenshot", json!({"saveAs": false})).contains(&"path".to_string()));
    assert!(visible_keys("screenshot", json!({"saveAs": true})).contains(&"path".to_string()));
    // no value at all behaves like "not equal"
    assert!(!visible_keys("screenshot", json!({})).contains(&"path".to_string()));
}

#[test]
fn test_visible_fields_keep_schema_order() {
    let keys = visible_keys(
        "screenshot",
        json!({"mode": "element", "saveAs": true, "format": "jpeg"}),
    );
    assert_eq!(
        keys,
        vec!["mode", "selector", "saveAs", "path", "format", "quality"]
    );
}

#[test]
fn test_visibility_is_deterministic_for_every_schema() {
    let registry = ActionRegistry::builtin();
    let samples = [
        json!({}),
        json!({"saveAs": true, "auth": "basic", "bodyType": "form"}),
        json!({"operator": "expression", "valueType": "json", "provider": "local"}),
        json!({"saveAs": false, "mode": "element", "direction": "toElement"}),
    ];
    for action_type in registry.action_types() {
        let schema = registry.resolve(action_type);
        for sample in &samples {
            let v = values(sample.clone());
            let first: Vec<_> = visible_fields(&schema, &v).iter().map(|f| f.key.clone()).collect();
            let second: Vec<_> = visible_fields(&schema, &v).iter().map(|f| f.key.clone()).collect();
            assert_eq!(first, second, "{action_type} with {sample}");
        }
    }
}

#[test]
fn test_http_auth_fields() {
    assert_eq!(
        visible_keys("rest_post", json!({"auth": "bearer", "bodyType": "form"}))
            .into_iter()
            .filter(|k| ["username", "password", "token", "body", "formData"].contains(&k.as_str()))
            .collect::<Vec<_>>(),
        vec!["token", "formData"]
    );
}

#[test]
fn test_model_options_depend_on_provider() {
    let schema = ActionRegistry::builtin().resolve("ai_translation");
    let model = schema.field("model").unwrap();

    let claude: Vec<_> = available_options(model, &values(json!({"provider": "claude"})))
        .iter()
        .map(|o| o.value.clone())
        .collect();
    assert_eq!(
        claude,
        vec![json!("claude-3-opus"), json!("claude-3-sonnet"), json!("claude-3-haiku")]
    );
    assert!(available_options(model, &values(json!({"provider": "watson"}))).is_empty());

    let filled = effective_values(&schema, &values(json!({"provider": "gemini"})));
    assert_eq!(filled["model"], "gemini-pro");
    assert_eq!(filled["targetLanguage"], "en");
}

#[test]
fn test_advanced_fields_hidden_by_default_panel() {
    let schema = ActionRegistry::builtin().resolve("type");
    let basic: Vec<_> = visible_fields_with(&schema, &Map::new(), false)
        .iter()
        .map(|f| f.key.as_str())
        .collect();
    assert_eq!(basic, vec!["selector", "text", "clearBefore", "sendEnter"]);
    assert_eq!(schema.advanced_fields().count(), 2);
}

#[test]
fn test_validation_on_open() {
    let schema = ActionRegistry::builtin().resolve("rest_get");
    let issues = validate(
        &schema,
        &values(json!({"url": "", "auth": "oauth", "saveAs": "response"})),
    );
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].key, "url");
    assert_eq!(issues[0].kind, IssueKind::Missing);
    assert_eq!(issues[1].key, "auth");
    assert!(matches!(issues[1].kind, IssueKind::NotAnOption { .. }));
    assert!(issues[1].to_string().contains("oauth"));

    let ok = validate(
        &schema,
        &values(json!({"url": "${baseUrl}/users", "auth": "none", "saveAs": "users"})),
    );
    assert!(ok.is_empty(), "{ok:?}");
}
