use crate::condition::Condition;
use crate::field::{options, FieldDescriptor as F, FieldKind};
use crate::schema::ActionSchema as S;

fn target_window() -> F {
    F::new("window", "Window", FieldKind::WindowWithVariable).required()
}

pub(super) fn schemas() -> Vec<S> {
    vec![
        // Binding step a recording session puts first.
        S::new("window", "Target Window", "fa-window-maximize")
            .describe("Binds the workflow to a window")
            .fields([
                F::toggle("activate", "Bring to front").default_value(true),
                F::toggle("maximize", "Maximize").default_value(false),
                F::toggle("minimize", "Minimize").default_value(false),
                F::toggle("restore", "Restore").default_value(false),
                F::toggle("close", "Close").default_value(false),
                F::toggle("waitForReady", "Wait until ready").default_value(true),
                F::number("timeout", "Timeout")
                    .default_value(15000)
                    .range(0.0, 600_000.0)
                    .unit("ms"),
                F::toggle("resizeWindow", "Resize").default_value(false),
                F::number("width", "Width")
                    .range(100.0, 10_000.0)
                    .when(Condition::equals("resizeWindow", true)),
                F::number("height", "Height")
                    .range(100.0, 10_000.0)
                    .when(Condition::equals("resizeWindow", true)),
            ]),
        S::new("window_get_active", "Active Window", "fa-window-maximize")
            .field(F::variable("saveAs", "Save window as").required()),
        S::new("window_find", "Find Window", "fa-search").fields([
            F::button_group(
                "findBy",
                "Find by",
                options(&[("title", "Title"), ("process", "Process"), ("class", "Class")]),
            )
            .default_value("title"),
            F::new("query", "Search", FieldKind::TextWithVariable).required(),
            F::toggle("exactMatch", "Exact match").default_value(false),
            F::variable("saveAs", "Save window as").required(),
        ]),
        S::new("window_focus", "Focus Window", "fa-window-restore").field(target_window()),
        S::new("window_minimize", "Minimize", "fa-window-minimize").extends("window_focus"),
        S::new("window_maximize", "Maximize", "fa-window-maximize").extends("window_focus"),
        S::new("window_restore", "Restore", "fa-window-restore").extends("window_focus"),
        S::new("window_close", "Close Window", "fa-times")
            .extends("window_focus")
            .field(F::toggle("force", "Force").default_value(false).advanced()),
        S::new("window_resize", "Resize Window", "fa-expand-arrows-alt")
            .extends("window_focus")
            .fields([
                F::number("width", "Width").required().range(100.0, 10_000.0),
                F::number("height", "Height").required().range(100.0, 10_000.0),
            ]),
        S::new("window_move", "Move Window", "fa-arrows-alt")
            .extends("window_focus")
            .fields([
                F::number("x", "X").required(),
                F::number("y", "Y").required(),
            ]),
        S::new("window_screenshot", "Capture Window", "fa-camera")
            .extends("window_focus")
            .fields([
                F::file("path", "File", ".png"),
                F::variable("saveAs", "Save image as"),
            ]),
        S::new("mouse_click", "Mouse Click", "fa-mouse-pointer").fields([
            F::number("x", "X").required(),
            F::number("y", "Y").required(),
            F::button_group(
                "button",
                "Button",
                options(&[("left", "Left"), ("right", "Right"), ("middle", "Middle")]),
            )
            .default_value("left"),
            F::toggle("double", "Double click").default_value(false),
        ]),
        S::new("mouse_move", "Move Mouse", "fa-arrows-alt").fields([
            F::number("x", "X").required(),
            F::number("y", "Y").required(),
            F::slider("duration", "Duration", 0.0, 5000.0)
                .step(50.0)
                .unit("ms")
                .default_value(0)
                .advanced(),
        ]),
        S::new("keyboard_type", "Type Keys", "fa-keyboard").fields([
            F::new("text", "Text", FieldKind::TextWithVariable).required(),
            F::slider("typingDelay", "Delay per key", 0.0, 500.0)
                .step(10.0)
                .unit("ms")
                .default_value(0)
                .advanced(),
        ]),
        S::new("keyboard_hotkey", "Hotkey", "fa-keyboard").fields([
            F::multi_select(
                "modifiers",
                "Modifiers",
                options(&[("ctrl", "Ctrl"), ("alt", "Alt"), ("shift", "Shift"), ("win", "Win")]),
            ),
            F::text("key", "Key").required().placeholder("C"),
        ]),
        S::new("clipboard_copy", "Copy", "fa-copy")
            .field(F::new("text", "Text", FieldKind::TextareaWithVariable).required()),
        S::new("clipboard_paste", "Paste", "fa-paste")
            .field(F::selector("selector", "Into element")),
        S::new("clipboard_get", "Get Clipboard", "fa-clipboard-list")
            .field(F::variable("saveAs", "Save content as").required()),
        S::new("powershell_run", "Run PowerShell", "fa-terminal").fields([
            F::code("script", "Script", "powershell").required().rows(10),
            F::toggle("runAsAdmin", "Run as administrator")
                .default_value(false)
                .advanced(),
            F::variable("saveAs", "Save output as"),
        ]),
        S::new("cmd_run", "Run CMD", "fa-terminal").fields([
            F::code("command", "Command", "batch").required().rows(4),
            F::new("workingDirectory", "Working folder", FieldKind::FolderWithVariable).advanced(),
            F::variable("saveAs", "Save output as"),
        ]),
        S::new("run_application", "Run Application", "fa-play").fields([
            F::file("path", "Program", ".exe,.bat,.cmd,.lnk").required(),
            F::new("arguments", "Arguments", FieldKind::Tags),
            F::toggle("waitForExit", "Wait for exit").default_value(false),
            F::variable("saveAs", "Save window as")
                .when(Condition::not_equals("waitForExit", true)),
        ]),
        S::new("kill_process", "Kill Process", "fa-times")
            .field(F::text("processName", "Process").required().placeholder("notepad.exe")),
    ]
}
