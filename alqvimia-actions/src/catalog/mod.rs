//! The built-in action catalog.
//!
//! Each submodule contributes the schemas of one area of the palette. Abstract
//! base schemas (`excel_workbook`, `ai_base`, ...) are registered too so that
//! their children can extend them, but they are not listed in any category.

mod ai;
mod common;
mod data;
mod desktop;
mod excel;
mod files;
mod flow;
mod http;
mod web;

use crate::registry::{Category, RegistryBuilder};

pub use common::common_fields;

/// Registry builder preloaded with every built-in schema and category.
pub fn builder() -> RegistryBuilder {
    RegistryBuilder::new()
        .schemas(web::schemas())
        .schemas(http::schemas())
        .schemas(excel::schemas())
        .schemas(files::schemas())
        .schemas(desktop::schemas())
        .schemas(data::schemas())
        .schemas(flow::schemas())
        .schemas(ai::schemas())
        .common_fields(common_fields())
        .category(Category::new(
            "web-browser",
            "Web Browser",
            "fa-globe",
            &[
                "open_browser",
                "navigate",
                "click",
                "type",
                "select",
                "extract",
                "screenshot",
                "scroll",
                "close_browser",
            ],
        ))
        .category(Category::new(
            "http-requests",
            "HTTP Requests",
            "fa-server",
            &[
                "rest_get",
                "rest_post",
                "rest_put",
                "rest_patch",
                "rest_delete",
                "http_get",
                "http_post",
                "http_put",
                "http_delete",
            ],
        ))
        .category(Category::new("excel", "Excel", "fa-file-excel", excel::PALETTE))
        .category(Category::new(
            "files",
            "Files",
            "fa-folder",
            &[
                "file_read",
                "file_write",
                "file_copy",
                "file_move",
                "file_delete",
                "file_exists",
                "folder_create",
                "folder_list",
                "pdf_read",
                "pdf_create",
            ],
        ))
        .category(Category::new(
            "powershell-cmd",
            "PowerShell/CMD",
            "fa-terminal",
            &["powershell_run", "cmd_run", "run_application", "kill_process"],
        ))
        .category(Category::new(
            "windows",
            "Window Management",
            "fa-window-maximize",
            &[
                "window_get_active",
                "window_find",
                "window_focus",
                "window_minimize",
                "window_maximize",
                "window_restore",
                "window_close",
                "window_resize",
                "window_move",
                "window_screenshot",
            ],
        ))
        .category(Category::new(
            "mouse-keyboard",
            "Mouse & Keyboard",
            "fa-keyboard",
            &["mouse_click", "mouse_move", "keyboard_type", "keyboard_hotkey"],
        ))
        .category(Category::new(
            "clipboard",
            "Clipboard",
            "fa-clipboard",
            &["clipboard_copy", "clipboard_paste", "clipboard_get"],
        ))
        .category(Category::new(
            "variables",
            "Variables",
            "fa-code",
            &[
                "set_variable",
                "get_variable",
                "increment_variable",
                "decrement_variable",
            ],
        ))
        .category(Category::new(
            "strings",
            "Text/Strings",
            "fa-font",
            &[
                "string_concat",
                "string_split",
                "string_replace",
                "string_trim",
                "string_substring",
                "regex_match",
            ],
        ))
        .category(Category::new(
            "datetime",
            "Date & Time",
            "fa-calendar-alt",
            &["datetime_now", "datetime_format", "datetime_add"],
        ))
        .category(Category::new(
            "json",
            "JSON",
            "fa-code",
            &["json_parse", "json_stringify", "json_get_value"],
        ))
        .category(Category::new(
            "loop",
            "Loops",
            "fa-sync",
            &["for_loop", "for_each", "while_loop", "break"],
        ))
        .category(Category::new(
            "condition",
            "Conditions",
            "fa-code-branch",
            &["if_condition", "else", "try_catch"],
        ))
        .category(Category::new(
            "wait",
            "Waits",
            "fa-clock",
            &["wait", "wait_element", "wait_page_load"],
        ))
        .category(Category::new(
            "message-box",
            "Messages",
            "fa-comment",
            &["message_box", "input_dialog"],
        ))
        .category(Category::new(
            "logging",
            "Logging",
            "fa-file-alt",
            &["log_info", "log_warning", "log_error"],
        ))
        .category(Category::new(
            "ai",
            "Artificial Intelligence",
            "fa-brain",
            &[
                "ai_text_generation",
                "ai_sentiment",
                "ai_classification",
                "ai_translation",
                "ai_chat",
                "ai_analyze",
            ],
        ))
}
