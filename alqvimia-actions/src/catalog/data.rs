use crate::condition::Condition;
use crate::field::{options, FieldDescriptor as F, FieldKind};
use crate::schema::ActionSchema as S;

fn source_text() -> F {
    F::new("input", "Text", FieldKind::TextWithVariable).required()
}

fn result() -> F {
    F::variable("saveAs", "Save result as").required()
}

pub(super) fn schemas() -> Vec<S> {
    vec![
        S::new("set_variable", "Set Variable", "fa-code").fields([
            F::text("name", "Variable").required(),
            F::select(
                "valueType",
                "Type",
                options(&[
                    ("string", "Text"),
                    ("number", "Number"),
                    ("boolean", "Boolean"),
                    ("json", "JSON"),
                    ("expression", "Expression"),
                ]),
            )
            .default_value("string"),
            F::new("value", "Value", FieldKind::TextWithVariable)
                .when(Condition::one_of("valueType", ["string", "number"])),
            F::toggle("boolValue", "Value")
                .default_value(false)
                .when(Condition::equals("valueType", "boolean")),
            F::code("jsonValue", "Value", "json")
                .rows(6)
                .when(Condition::equals("valueType", "json")),
            F::new("expression", "Expression", FieldKind::Expression)
                .required()
                .when(Condition::equals("valueType", "expression")),
        ]),
        S::new("get_variable", "Get Variable", "fa-code").fields([
            F::new("name", "Variable", FieldKind::VariableSelect).required(),
            result(),
        ]),
        S::new("increment_variable", "Increment", "fa-plus").fields([
            F::new("name", "Variable", FieldKind::VariableSelect)
                .required()
                .allowed_types(&["number"]),
            F::number("step", "By").default_value(1),
        ]),
        S::new("decrement_variable", "Decrement", "fa-minus").extends("increment_variable"),
        S::new("string_concat", "Concatenate", "fa-link").fields([
            F::new("parts", "Parts", FieldKind::Tags).required(),
            F::text("separator", "Separator").default_value(""),
            result(),
        ]),
        S::new("string_split", "Split", "fa-cut").fields([
            source_text(),
            F::text("separator", "Separator").required().default_value(","),
            F::toggle("removeEmpty", "Drop empty parts").default_value(true),
            result(),
        ]),
        S::new("string_replace", "Replace", "fa-exchange-alt").fields([
            source_text(),
            F::text("find", "Find").required(),
            F::text("replace", "Replace with"),
            F::toggle("useRegex", "Regular expression").default_value(false),
            F::toggle("replaceAll", "Replace all").default_value(true),
            result(),
        ]),
        S::new("string_trim", "Trim", "fa-text-width").fields([
            source_text(),
            F::button_group(
                "side",
                "Trim",
                options(&[("both", "Both"), ("start", "Start"), ("end", "End")]),
            )
            .default_value("both"),
            result(),
        ]),
        S::new("string_substring", "Substring", "fa-text-width").fields([
            source_text(),
            F::number("start", "Start").required().default_value(0),
            F::number("length", "Length"),
            result(),
        ]),
        S::new("regex_match", "Regex Match", "fa-asterisk").fields([
            source_text(),
            F::code("pattern", "Pattern", "regex").required(),
            F::multi_select(
                "flags",
                "Flags",
                options(&[("i", "Ignore case"), ("m", "Multiline"), ("g", "All matches")]),
            ),
            F::number("group", "Group").default_value(0).range(0.0, 99.0).advanced(),
            result(),
        ]),
        S::new("datetime_now", "Current Date/Time", "fa-clock").fields([
            F::text("format", "Format").default_value("yyyy-MM-dd HH:mm:ss"),
            result(),
        ]),
        S::new("datetime_format", "Format Date", "fa-calendar-alt").fields([
            F::new("date", "Date", FieldKind::TextWithVariable).required(),
            F::text("format", "Format").required().default_value("dd/MM/yyyy"),
            result(),
        ]),
        S::new("datetime_add", "Add to Date", "fa-calendar-plus").fields([
            F::new("date", "Date", FieldKind::TextWithVariable).required(),
            F::number("amount", "Amount").required(),
            F::select(
                "unit",
                "Unit",
                options(&[
                    ("seconds", "Seconds"),
                    ("minutes", "Minutes"),
                    ("hours", "Hours"),
                    ("days", "Days"),
                    ("months", "Months"),
                ]),
            )
            .default_value("days"),
            result(),
        ]),
        S::new("json_parse", "Parse JSON", "fa-code").fields([source_text(), result()]),
        S::new("json_stringify", "To JSON", "fa-code").fields([
            F::new("input", "Value", FieldKind::VariableSelect).required(),
            F::toggle("pretty", "Indent").default_value(false),
            result(),
        ]),
        S::new("json_get_value", "Get JSON Value", "fa-search").fields([
            F::new("input", "JSON", FieldKind::VariableSelect).required(),
            F::text("path", "Path").required().placeholder("data.items[0].id"),
            result(),
        ]),
    ]
}
