use crate::condition::Condition;
use crate::field::{options, FieldDescriptor as F, FieldKind};
use crate::schema::ActionSchema as S;
use serde_json::json;

pub(super) const PALETTE: &[&str] = &[
    "excel_open",
    "excel_read",
    "excel_write",
    "excel_get_cell",
    "excel_set_cell",
    "excel_get_range",
    "excel_set_range",
    "excel_get_last_row",
    "excel_insert_row",
    "excel_delete_row",
    "excel_format_cells",
    "excel_add_formula",
    "excel_filter_data",
    "excel_sort_data",
    "excel_find_replace",
    "excel_add_sheet",
    "excel_delete_sheet",
    "excel_rename_sheet",
    "excel_save",
    "excel_run_macro",
    "excel_close",
];

fn workbook() -> F {
    F::new("workbook", "Workbook", FieldKind::VariableSelect)
        .required()
        .allowed_types(&["excel"])
}

fn result(key: &str) -> F {
    F::variable(key, "Save result as").required()
}

pub(super) fn schemas() -> Vec<S> {
    vec![
        // abstract bases
        S::new("excel_workbook", "Excel Workbook", "fa-file-excel").field(workbook()),
        S::new("excel_sheet", "Excel Sheet", "fa-file-excel")
            .extends("excel_workbook")
            .field(F::text("sheet", "Sheet").default_value("Sheet1")),
        S::new("excel_open", "Open Excel", "fa-file-excel")
            .describe("Opens a workbook and exposes it as a variable")
            .fields([
                F::file("filePath", "File", ".xlsx,.xls,.xlsm,.csv").required(),
                F::toggle("createIfMissing", "Create if missing").default_value(false),
                F::toggle("visible", "Show Excel").default_value(false),
                F::toggle("readOnly", "Read only").default_value(false),
                F::new("password", "Password", FieldKind::Password)
                    .encrypted()
                    .advanced(),
                F::variable("workbookVariable", "Save workbook as").required(),
            ]),
        S::new("excel_read", "Read Excel", "fa-file-excel")
            .extends("excel_sheet")
            .fields([
                F::text("range", "Range").placeholder("A1:D20"),
                F::toggle("hasHeaders", "First row is header").default_value(true),
                F::button_group(
                    "readAs",
                    "Read as",
                    options(&[("table", "Table"), ("values", "Values"), ("formulas", "Formulas")]),
                )
                .default_value("table")
                .advanced(),
                result("saveAs"),
            ]),
        S::new("excel_write", "Write Excel", "fa-file-edit")
            .extends("excel_sheet")
            .fields([
                F::text("startCell", "Start cell").default_value("A1"),
                F::new("data", "Data", FieldKind::VariableSelect)
                    .required()
                    .allowed_types(&["dataTable", "array"]),
                F::toggle("writeHeaders", "Write header row").default_value(true),
                F::toggle("append", "Append after last row").default_value(false),
            ]),
        S::new("excel_get_cell", "Read Cell", "fa-table")
            .extends("excel_sheet")
            .fields([F::text("cell", "Cell").required().placeholder("B2"), result("saveAs")]),
        S::new("excel_set_cell", "Write Cell", "fa-edit")
            .extends("excel_sheet")
            .fields([
                F::text("cell", "Cell").required().placeholder("B2"),
                F::new("value", "Value", FieldKind::TextWithVariable).required(),
            ]),
        S::new("excel_get_range", "Read Range", "fa-th")
            .extends("excel_sheet")
            .fields([F::text("range", "Range").required().placeholder("A1:D20"), result("saveAs")]),
        S::new("excel_set_range", "Write Range", "fa-th-large")
            .extends("excel_sheet")
            .fields([
                F::text("range", "Range").required(),
                F::new("data", "Data", FieldKind::VariableSelect)
                    .required()
                    .allowed_types(&["dataTable", "array"]),
            ]),
        S::new("excel_get_last_row", "Last Row", "fa-arrow-down")
            .extends("excel_sheet")
            .fields([
                F::text("column", "Column").placeholder("A"),
                result("saveAs"),
            ]),
        S::new("excel_insert_row", "Insert Row", "fa-plus")
            .extends("excel_sheet")
            .fields([
                F::number("row", "Row").required().range(1.0, 1_048_576.0),
                F::number("count", "Rows").default_value(1).range(1.0, 10_000.0),
            ]),
        S::new("excel_delete_row", "Delete Row", "fa-minus")
            .extends("excel_insert_row"),
        S::new("excel_format_cells", "Format Cells", "fa-paint-brush")
            .extends("excel_sheet")
            .fields([
                F::text("range", "Range").required(),
                F::select(
                    "formatType",
                    "Format",
                    options(&[
                        ("number", "Number"),
                        ("currency", "Currency"),
                        ("date", "Date"),
                        ("percent", "Percent"),
                        ("text", "Text"),
                    ]),
                )
                .default_value("number"),
                F::select("formatPattern", "Pattern", Vec::new())
                    .options_by(
                        "formatType",
                        vec![
                            ("number", options(&[("0", "0"), ("0.00", "0.00"), ("#,##0", "#,##0")])),
                            ("currency", options(&[("$#,##0.00", "$#,##0.00"), ("€#,##0.00", "€#,##0.00")])),
                            ("date", options(&[("dd/mm/yyyy", "dd/mm/yyyy"), ("yyyy-mm-dd", "yyyy-mm-dd")])),
                            ("percent", options(&[("0%", "0%"), ("0.00%", "0.00%")])),
                        ],
                    )
                    .defaults_by(
                        "formatType",
                        vec![
                            ("number", json!("0.00")),
                            ("currency", json!("$#,##0.00")),
                            ("date", json!("dd/mm/yyyy")),
                            ("percent", json!("0%")),
                        ],
                    )
                    .when(Condition::not_equals("formatType", "text")),
                F::toggle("bold", "Bold").default_value(false).advanced(),
                F::text("fillColor", "Fill colour").advanced(),
            ]),
        S::new("excel_add_formula", "Add Formula", "fa-calculator")
            .extends("excel_sheet")
            .fields([
                F::text("cell", "Cell").required(),
                F::new("formula", "Formula", FieldKind::Expression)
                    .required()
                    .placeholder("=SUM(A1:A10)"),
            ]),
        S::new("excel_filter_data", "Filter Data", "fa-filter")
            .extends("excel_sheet")
            .fields([
                F::text("range", "Range").required(),
                F::text("column", "Column").required(),
                F::select(
                    "operator",
                    "Operator",
                    options(&[
                        ("equals", "Equals"),
                        ("contains", "Contains"),
                        ("greaterThan", "Greater than"),
                        ("lessThan", "Less than"),
                    ]),
                )
                .default_value("equals"),
                F::new("criteria", "Value", FieldKind::TextWithVariable).required(),
            ]),
        S::new("excel_sort_data", "Sort Data", "fa-sort-alpha-down")
            .extends("excel_sheet")
            .fields([
                F::text("range", "Range").required(),
                F::text("column", "Sort by column").required(),
                F::button_group(
                    "order",
                    "Order",
                    options(&[("asc", "Ascending"), ("desc", "Descending")]),
                )
                .default_value("asc"),
            ]),
        S::new("excel_find_replace", "Find/Replace", "fa-search")
            .extends("excel_sheet")
            .fields([
                F::new("find", "Find", FieldKind::TextWithVariable).required(),
                F::new("replace", "Replace with", FieldKind::TextWithVariable),
                F::toggle("matchCase", "Match case").default_value(false).advanced(),
                F::toggle("wholeCell", "Whole cell").default_value(false).advanced(),
            ]),
        S::new("excel_add_sheet", "Add Sheet", "fa-plus-square")
            .extends("excel_workbook")
            .field(F::text("sheetName", "Sheet name").required()),
        S::new("excel_delete_sheet", "Delete Sheet", "fa-minus-square")
            .extends("excel_sheet"),
        S::new("excel_rename_sheet", "Rename Sheet", "fa-i-cursor")
            .extends("excel_sheet")
            .field(F::text("newName", "New name").required()),
        S::new("excel_save", "Save Excel", "fa-save")
            .extends("excel_workbook")
            .fields([
                F::toggle("saveAsCopy", "Save as a new file").default_value(false),
                F::file("path", "File", ".xlsx,.xls,.csv")
                    .required()
                    .when(Condition::equals("saveAsCopy", true)),
                F::select(
                    "format",
                    "Format",
                    options(&[("xlsx", "Excel"), ("csv", "CSV"), ("pdf", "PDF")]),
                )
                .default_value("xlsx")
                .when(Condition::equals("saveAsCopy", true)),
                F::select(
                    "delimiter",
                    "Delimiter",
                    options(&[(",", "Comma"), (";", "Semicolon"), ("\t", "Tab")]),
                )
                .default_value(",")
                .when(Condition::equals("format", "csv")),
            ]),
        S::new("excel_run_macro", "Run Macro", "fa-code")
            .extends("excel_workbook")
            .fields([
                F::text("macroName", "Macro").required(),
                F::new("arguments", "Arguments", FieldKind::Tags),
                F::variable("saveAs", "Save result as"),
            ]),
        S::new("excel_close", "Close Excel", "fa-times-circle")
            .extends("excel_workbook")
            .field(F::toggle("save", "Save changes").default_value(true)),
    ]
}
