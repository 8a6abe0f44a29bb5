use crate::condition::Condition;
use crate::field::{options, FieldDescriptor as F, FieldKind};
use crate::schema::ActionSchema as S;

fn comparison() -> Vec<F> {
    vec![
        F::new("left", "Value", FieldKind::TextWithVariable).required(),
        F::select(
            "operator",
            "Operator",
            options(&[
                ("==", "equals"),
                ("!=", "does not equal"),
                (">", "greater than"),
                ("<", "less than"),
                ("contains", "contains"),
                ("isEmpty", "is empty"),
                ("expression", "custom expression"),
            ]),
        )
        .default_value("=="),
        F::new("right", "Compare with", FieldKind::TextWithVariable)
            .when(Condition::none_of("operator", ["isEmpty", "expression"])),
        F::new("expression", "Expression", FieldKind::Expression)
            .required()
            .when(Condition::equals("operator", "expression")),
    ]
}

fn log_fields() -> Vec<F> {
    vec![
        F::new("message", "Message", FieldKind::TextareaWithVariable)
            .required()
            .rows(3),
        F::toggle("includeTimestamp", "Add timestamp")
            .default_value(true)
            .advanced(),
    ]
}

pub(super) fn schemas() -> Vec<S> {
    vec![
        S::new("if_condition", "If", "fa-question")
            .container()
            .fields(comparison()),
        S::new("else", "Else", "fa-code-branch").container(),
        S::new("while_loop", "While", "fa-spinner")
            .container()
            .fields(comparison())
            .field(
                F::number("maxIterations", "Stop after")
                    .default_value(1000)
                    .range(1.0, 1_000_000.0)
                    .advanced(),
            ),
        S::new("for_loop", "For Loop", "fa-redo").container().fields([
            F::number("start", "From").default_value(0),
            F::number("end", "To").required(),
            F::number("step", "Step").default_value(1),
            F::variable("indexVariable", "Counter variable").default_value("i"),
        ]),
        S::new("for_each", "For Each", "fa-redo").container().fields([
            F::new("collection", "Collection", FieldKind::VariableSelect)
                .required()
                .allowed_types(&["array", "dataTable", "object"]),
            F::variable("itemVariable", "Item variable").default_value("item"),
            F::variable("indexVariable", "Index variable").advanced(),
        ]),
        S::new("break", "Break Loop", "fa-stop"),
        S::new("try_catch", "Try/Catch", "fa-shield-alt").container().fields([
            F::variable("errorVariable", "Save error as").default_value("error"),
            F::toggle("rethrow", "Re-raise after handling").default_value(false),
        ]),
        S::new("wait", "Wait", "fa-clock").fields([
            F::number("duration", "Duration")
                .required()
                .default_value(1)
                .range(0.0, 86_400.0),
            F::button_group(
                "unit",
                "Unit",
                options(&[("ms", "ms"), ("s", "s"), ("min", "min")]),
            )
            .default_value("s"),
        ]),
        S::new("message_box", "Message Box", "fa-info-circle").fields([
            F::text("title", "Title").default_value("Alqvimia"),
            F::new("message", "Message", FieldKind::TextareaWithVariable).required(),
            F::select(
                "buttons",
                "Buttons",
                options(&[
                    ("ok", "OK"),
                    ("okCancel", "OK / Cancel"),
                    ("yesNo", "Yes / No"),
                ]),
            )
            .default_value("ok"),
            F::variable("saveAs", "Save answer as")
                .when(Condition::not_equals("buttons", "ok")),
        ]),
        S::new("input_dialog", "Input Dialog", "fa-edit").fields([
            F::text("title", "Title").default_value("Alqvimia"),
            F::text("prompt", "Prompt").required(),
            F::text("defaultValue", "Default"),
            F::toggle("masked", "Hide input").default_value(false),
            F::variable("saveAs", "Save input as").required(),
        ]),
        S::new("log_info", "Log Info", "fa-info").fields(log_fields()),
        S::new("log_warning", "Log Warning", "fa-exclamation-triangle").extends("log_info"),
        S::new("log_error", "Log Error", "fa-times-circle").extends("log_info"),
    ]
}
