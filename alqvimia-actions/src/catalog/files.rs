use crate::condition::Condition;
use crate::field::{options, FieldDescriptor as F, FieldKind};
use crate::schema::ActionSchema as S;

fn encoding() -> F {
    F::select(
        "encoding",
        "Encoding",
        options(&[("utf-8", "UTF-8"), ("latin1", "Latin-1"), ("utf-16le", "UTF-16 LE")]),
    )
    .default_value("utf-8")
    .advanced()
}

pub(super) fn schemas() -> Vec<S> {
    vec![
        S::new("file_read", "Read File", "fa-file-alt").fields([
            F::file("path", "File", "").required(),
            encoding(),
            F::variable("saveAs", "Save content as").required(),
        ]),
        S::new("file_write", "Write File", "fa-file-signature").fields([
            F::file("path", "File", "").required(),
            F::new("content", "Content", FieldKind::TextareaWithVariable)
                .required()
                .rows(6),
            F::button_group(
                "mode",
                "If the file exists",
                options(&[("overwrite", "Overwrite"), ("append", "Append")]),
            )
            .default_value("overwrite"),
            encoding(),
        ]),
        S::new("file_copy", "Copy File", "fa-copy").fields([
            F::file("source", "From", "").required(),
            F::new("destination", "To", FieldKind::FolderWithVariable).required(),
            F::toggle("overwrite", "Overwrite").default_value(false),
        ]),
        S::new("file_move", "Move File", "fa-file-export").extends("file_copy"),
        S::new("file_delete", "Delete File", "fa-trash-alt").fields([
            F::file("path", "File", "").required(),
            F::toggle("ignoreMissing", "Ignore if missing").default_value(true),
        ]),
        S::new("file_exists", "File Exists", "fa-question-circle").fields([
            F::file("path", "File", "").required(),
            F::variable("saveAs", "Save result as").required(),
        ]),
        S::new("folder_create", "Create Folder", "fa-folder-plus").fields([
            F::new("path", "Folder", FieldKind::FolderWithVariable).required(),
            F::toggle("recursive", "Create parents").default_value(true),
        ]),
        S::new("folder_list", "List Folder", "fa-folder-open").fields([
            F::new("path", "Folder", FieldKind::FolderWithVariable).required(),
            F::text("pattern", "Pattern").default_value("*"),
            F::toggle("recursive", "Include subfolders").default_value(false),
            F::variable("saveAs", "Save list as").required(),
        ]),
        S::new("pdf_read", "Read PDF", "fa-file-pdf").fields([
            F::file("path", "File", ".pdf").required(),
            F::button_group(
                "pages",
                "Pages",
                options(&[("all", "All"), ("range", "Range")]),
            )
            .default_value("all"),
            F::text("pageRange", "Range")
                .required()
                .placeholder("1-3,5")
                .when(Condition::equals("pages", "range")),
            F::toggle("useOcr", "OCR scanned pages").default_value(false).advanced(),
            F::variable("saveAs", "Save text as").required(),
        ]),
        S::new("pdf_create", "Create PDF", "fa-file-pdf").fields([
            F::file("path", "File", ".pdf").required(),
            F::button_group(
                "source",
                "From",
                options(&[("text", "Text"), ("html", "HTML"), ("file", "File")]),
            )
            .default_value("text"),
            F::new("content", "Content", FieldKind::TextareaWithVariable)
                .required()
                .when(Condition::one_of("source", ["text", "html"])),
            F::file("sourceFile", "Source file", ".docx,.html,.txt")
                .required()
                .when(Condition::equals("source", "file")),
            F::select(
                "pageSize",
                "Page size",
                options(&[("A4", "A4"), ("Letter", "Letter"), ("Legal", "Legal")]),
            )
            .default_value("A4")
            .advanced(),
        ]),
    ]
}
