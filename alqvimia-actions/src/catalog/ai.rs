use crate::condition::Condition;
use crate::field::{opt, options, FieldDescriptor as F, FieldKind};
use crate::schema::ActionSchema as S;
use serde_json::json;

fn providers() -> F {
    F::select(
        "provider",
        "Provider",
        vec![
            opt("openai", "OpenAI").with_icon("fa-robot"),
            opt("claude", "Claude (Anthropic)").with_icon("fa-brain"),
            opt("gemini", "Google Gemini").with_icon("fab fa-google"),
            opt("local", "Local model").with_icon("fa-server"),
        ],
    )
    .required()
    .default_value("openai")
}

fn models() -> F {
    F::select("model", "Model", Vec::new())
        .required()
        .options_by(
            "provider",
            vec![
                (
                    "openai",
                    options(&[
                        ("gpt-4-turbo", "GPT-4 Turbo"),
                        ("gpt-4", "GPT-4"),
                        ("gpt-3.5-turbo", "GPT-3.5 Turbo"),
                    ]),
                ),
                (
                    "claude",
                    options(&[
                        ("claude-3-opus", "Claude 3 Opus"),
                        ("claude-3-sonnet", "Claude 3 Sonnet"),
                        ("claude-3-haiku", "Claude 3 Haiku"),
                    ]),
                ),
                (
                    "gemini",
                    options(&[("gemini-pro", "Gemini Pro"), ("gemini-ultra", "Gemini Ultra")]),
                ),
                (
                    "local",
                    options(&[
                        ("llama-3", "Llama 3"),
                        ("mistral", "Mistral"),
                        ("custom", "Custom"),
                    ]),
                ),
            ],
        )
        .defaults_by(
            "provider",
            vec![
                ("openai", json!("gpt-4-turbo")),
                ("claude", json!("claude-3-sonnet")),
                ("gemini", json!("gemini-pro")),
                ("local", json!("llama-3")),
            ],
        )
        .help("Model used for the request")
}

pub(super) fn schemas() -> Vec<S> {
    vec![
        // abstract base shared by every AI action
        S::new("ai_base", "AI", "fa-brain").fields([
            providers(),
            models(),
            F::text("customModel", "Model name")
                .required()
                .when(Condition::equals("model", "custom")),
            F::new("input", "Input", FieldKind::TextareaWithVariable)
                .required()
                .rows(5)
                .placeholder("Text or variable to process..."),
            F::slider("temperature", "Temperature", 0.0, 2.0)
                .step(0.1)
                .default_value(0.7)
                .advanced(),
            F::number("maxTokens", "Max tokens")
                .range(100.0, 32000.0)
                .default_value(2000)
                .advanced(),
            F::textarea("customPrompt", "Custom prompt").rows(6).advanced(),
            F::variable("outputVariable", "Save result as").default_value("ai_result"),
        ]),
        S::new("ai_text_generation", "Generate Text", "fa-robot")
            .extends("ai_base")
            .field(
                F::select(
                    "tone",
                    "Tone",
                    options(&[
                        ("neutral", "Neutral"),
                        ("formal", "Formal"),
                        ("friendly", "Friendly"),
                    ]),
                )
                .default_value("neutral"),
            ),
        S::new("ai_sentiment", "Sentiment Analysis", "fa-smile")
            .extends("ai_base")
            .field(F::toggle("includeScore", "Include score").default_value(true)),
        S::new("ai_classification", "Classification", "fa-tags")
            .extends("ai_base")
            .fields([
                F::new("labels", "Labels", FieldKind::Tags).required(),
                F::toggle("multiLabel", "Allow several labels").default_value(false),
            ]),
        S::new("ai_translation", "Translation", "fa-language")
            .extends("ai_base")
            .fields([
                F::select(
                    "sourceLanguage",
                    "From",
                    options(&[
                        ("auto", "Detect"),
                        ("es", "Spanish"),
                        ("en", "English"),
                        ("pt", "Portuguese"),
                        ("fr", "French"),
                    ]),
                )
                .default_value("auto"),
                F::select(
                    "targetLanguage",
                    "To",
                    options(&[
                        ("en", "English"),
                        ("es", "Spanish"),
                        ("pt", "Portuguese"),
                        ("fr", "French"),
                    ]),
                )
                .required()
                .default_value("en"),
            ]),
        S::new("ai_chat", "AI Chat", "fa-robot")
            .extends("ai_base")
            .fields([
                F::textarea("systemPrompt", "System prompt").rows(4),
                F::new("history", "History", FieldKind::VariableSelect)
                    .allowed_types(&["array"])
                    .advanced(),
            ]),
        S::new("ai_analyze", "Analyze Document", "fa-search-plus")
            .extends("ai_base")
            .fields([
                F::file("document", "Document", ".pdf,.docx,.txt,.png,.jpg").required(),
                F::multi_select(
                    "extract",
                    "Extract",
                    options(&[
                        ("summary", "Summary"),
                        ("entities", "Entities"),
                        ("tables", "Tables"),
                        ("keyValues", "Key/value pairs"),
                    ]),
                )
                .default_value(json!(["summary"])),
                F::select(
                    "outputFormat",
                    "Output",
                    options(&[("json", "JSON"), ("text", "Text")]),
                )
                .default_value("json")
                .advanced(),
            ]),
    ]
}
