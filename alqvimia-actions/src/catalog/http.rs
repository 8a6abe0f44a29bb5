use crate::condition::Condition;
use crate::field::{options, FieldDescriptor as F, FieldKind};
use crate::schema::ActionSchema as S;
use serde_json::json;

fn request_fields() -> Vec<F> {
    vec![
        F::new("url", "URL", FieldKind::Url)
            .required()
            .placeholder("https://api.example.com/resource"),
        F::new("headers", "Headers", FieldKind::KeyValue),
        F::new("queryParams", "Query parameters", FieldKind::KeyValue),
        F::select(
            "auth",
            "Authentication",
            options(&[
                ("none", "None"),
                ("basic", "Basic"),
                ("bearer", "Bearer token"),
                ("apiKey", "API key"),
            ]),
        )
        .default_value("none"),
        F::text("username", "User")
            .required()
            .when(Condition::equals("auth", "basic")),
        F::new("password", "Password", FieldKind::Password)
            .required()
            .encrypted()
            .when(Condition::equals("auth", "basic")),
        F::new("token", "Token", FieldKind::Password)
            .required()
            .encrypted()
            .when(Condition::equals("auth", "bearer")),
        F::text("apiKeyHeader", "Header name")
            .default_value("X-API-Key")
            .when(Condition::equals("auth", "apiKey")),
        F::new("apiKey", "API key", FieldKind::Password)
            .required()
            .encrypted()
            .when(Condition::equals("auth", "apiKey")),
        F::select(
            "responseType",
            "Response type",
            options(&[("json", "JSON"), ("text", "Text"), ("binary", "Binary")]),
        )
        .default_value("json")
        .advanced(),
        F::toggle("followRedirects", "Follow redirects")
            .default_value(true)
            .advanced(),
        F::toggle("failOnStatus", "Fail on 4xx/5xx")
            .default_value(true)
            .advanced(),
        F::variable("saveAs", "Save response as").required(),
        F::variable("statusVariable", "Save status code as").advanced(),
    ]
}

fn body_fields() -> Vec<F> {
    vec![
        F::button_group(
            "bodyType",
            "Body",
            options(&[
                ("json", "JSON"),
                ("form", "Form"),
                ("raw", "Raw"),
                ("none", "None"),
            ]),
        )
        .default_value("json"),
        F::code("body", "Body", "json")
            .rows(8)
            .when(Condition::one_of("bodyType", ["json", "raw"])),
        F::new("formData", "Form fields", FieldKind::KeyValue)
            .when(Condition::equals("bodyType", "form")),
        F::select("contentType", "Content type", Vec::new())
            .options_by(
                "bodyType",
                vec![
                    ("json", options(&[("application/json", "application/json")])),
                    (
                        "form",
                        options(&[
                            (
                                "application/x-www-form-urlencoded",
                                "application/x-www-form-urlencoded",
                            ),
                            ("multipart/form-data", "multipart/form-data"),
                        ]),
                    ),
                    (
                        "raw",
                        options(&[
                            ("text/plain", "text/plain"),
                            ("application/xml", "application/xml"),
                            ("text/csv", "text/csv"),
                        ]),
                    ),
                ],
            )
            .defaults_by(
                "bodyType",
                vec![
                    ("json", json!("application/json")),
                    ("form", json!("application/x-www-form-urlencoded")),
                    ("raw", json!("text/plain")),
                ],
            )
            .when(Condition::not_equals("bodyType", "none"))
            .advanced(),
    ]
}

pub(super) fn schemas() -> Vec<S> {
    vec![
        S::new("rest_get", "GET Request", "fa-download")
            .describe("Sends an HTTP GET and stores the response")
            .fields(request_fields()),
        S::new("rest_post", "POST Request", "fa-upload")
            .describe("Sends an HTTP request with a body")
            .extends("rest_get")
            .fields(body_fields()),
        S::new("rest_put", "PUT Request", "fa-edit").extends("rest_post"),
        S::new("rest_patch", "PATCH Request", "fa-pen").extends("rest_post"),
        S::new("rest_delete", "DELETE Request", "fa-trash")
            .extends("rest_get")
            .field(F::toggle("confirm", "Ask before deleting").default_value(false)),
        S::new("http_get", "GET Request", "fa-download").extends("rest_get"),
        S::new("http_post", "POST Request", "fa-upload").extends("rest_post"),
        S::new("http_put", "PUT Request", "fa-edit").extends("rest_put"),
        S::new("http_delete", "DELETE Request", "fa-trash").extends("rest_delete"),
    ]
}
