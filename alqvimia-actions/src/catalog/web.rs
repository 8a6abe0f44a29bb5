use crate::condition::Condition;
use crate::field::{options, FieldDescriptor as F, FieldKind};
use crate::schema::ActionSchema as S;

pub(super) fn schemas() -> Vec<S> {
    vec![
        S::new("open_browser", "Open Browser", "fa-window-restore")
            .describe("Launches a browser session")
            .fields([
                F::select(
                    "browser",
                    "Browser",
                    options(&[("chrome", "Chrome"), ("edge", "Edge"), ("firefox", "Firefox")]),
                )
                .default_value("chrome")
                .required(),
                F::new("url", "Start URL", FieldKind::Url).placeholder("https://"),
                F::toggle("maximize", "Maximize window").default_value(true),
                F::toggle("incognito", "Private mode").default_value(false),
                F::toggle("headless", "Headless").default_value(false).advanced(),
                F::new("userDataDir", "Profile folder", FieldKind::FolderWithVariable).advanced(),
                F::variable("browserVariable", "Save browser as"),
            ]),
        S::new("navigate", "Navigate to URL", "fa-link").fields([
            F::new("url", "URL", FieldKind::Url).required().placeholder("https://"),
            F::select(
                "waitUntil",
                "Wait until",
                options(&[
                    ("load", "Page loaded"),
                    ("domcontentloaded", "DOM ready"),
                    ("networkidle", "Network idle"),
                ]),
            )
            .default_value("load")
            .advanced(),
        ]),
        S::new("click", "Click", "fa-mouse-pointer")
            .describe("Clicks an element")
            .fields([
                F::selector("selector", "Element").required(),
                F::button_group(
                    "button",
                    "Button",
                    options(&[("left", "Left"), ("right", "Right"), ("middle", "Middle")]),
                )
                .default_value("left"),
                F::number("clickCount", "Clicks")
                    .default_value(1)
                    .range(1.0, 3.0),
                F::toggle("scrollIntoView", "Scroll into view")
                    .default_value(true)
                    .advanced(),
                F::toggle("force", "Force click")
                    .default_value(false)
                    .advanced()
                    .help("Skips the visibility and enabled checks"),
            ]),
        S::new("doubleClick", "Double Click", "fa-mouse-pointer")
            .extends("click")
            .field(F::number("clickCount", "Clicks").default_value(2).range(2.0, 2.0)),
        S::new("right", "Right Click", "fa-mouse-pointer")
            .extends("click")
            .field(
                F::button_group("button", "Button", options(&[("right", "Right")]))
                    .default_value("right"),
            ),
        S::new("type", "Type Text", "fa-keyboard")
            .describe("Types text into an input")
            .fields([
                F::selector("selector", "Element").required(),
                F::new("text", "Text", FieldKind::TextWithVariable).required(),
                F::toggle("clearBefore", "Clear before typing").default_value(true),
                F::toggle("sendEnter", "Press Enter after").default_value(false),
                F::slider("typingDelay", "Delay per key", 0.0, 500.0)
                    .step(10.0)
                    .unit("ms")
                    .default_value(0)
                    .advanced(),
                F::toggle("sensitive", "Hide value in logs")
                    .default_value(false)
                    .advanced(),
            ]),
        S::new("input", "Input Text", "fa-i-cursor").extends("type"),
        S::new("select", "Select Option", "fa-list")
            .describe("Picks an entry of a dropdown")
            .fields([
                F::selector("selector", "Element").required(),
                F::button_group(
                    "selectBy",
                    "Select by",
                    options(&[("value", "Value"), ("text", "Text"), ("index", "Index")]),
                )
                .default_value("value"),
                F::new("selectValue", "Option", FieldKind::TextWithVariable).required(),
            ]),
        S::new("extract", "Extract Text", "fa-file-export").fields([
            F::selector("selector", "Element").required(),
            F::select(
                "extractType",
                "Extract",
                options(&[
                    ("text", "Text"),
                    ("html", "HTML"),
                    ("value", "Value"),
                    ("attribute", "Attribute"),
                ]),
            )
            .default_value("text"),
            F::text("attribute", "Attribute name")
                .required()
                .when(Condition::equals("extractType", "attribute")),
            F::toggle("trim", "Trim whitespace").default_value(true).advanced(),
            F::variable("saveTo", "Save to").required(),
        ]),
        S::new("screenshot", "Screenshot", "fa-camera").fields([
            F::button_group(
                "mode",
                "Capture",
                options(&[
                    ("viewport", "Viewport"),
                    ("fullPage", "Full page"),
                    ("element", "Element"),
                ]),
            )
            .default_value("viewport"),
            F::selector("selector", "Element")
                .required()
                .when(Condition::equals("mode", "element")),
            F::toggle("saveAs", "Save to file").default_value(false),
            F::file("path", "File", ".png,.jpg")
                .required()
                .when(Condition::equals("saveAs", true)),
            F::select(
                "format",
                "Format",
                options(&[("png", "PNG"), ("jpeg", "JPEG")]),
            )
            .default_value("png")
            .when(Condition::equals("saveAs", true)),
            F::slider("quality", "Quality", 1.0, 100.0)
                .default_value(90)
                .unit("%")
                .when(Condition::equals("format", "jpeg")),
            F::variable("imageVariable", "Save image as")
                .when(Condition::not_equals("saveAs", true)),
        ]),
        S::new("scroll", "Scroll", "fa-arrows-alt-v").fields([
            F::button_group(
                "direction",
                "Direction",
                options(&[
                    ("down", "Down"),
                    ("up", "Up"),
                    ("toElement", "To element"),
                    ("bottom", "Bottom"),
                    ("top", "Top"),
                ]),
            )
            .default_value("down"),
            F::number("amount", "Pixels")
                .default_value(500)
                .range(1.0, 100000.0)
                .when(Condition::one_of("direction", ["down", "up"])),
            F::selector("selector", "Element")
                .required()
                .when(Condition::equals("direction", "toElement")),
            F::toggle("smooth", "Smooth").default_value(false).advanced(),
        ]),
        S::new("close_browser", "Close Browser", "fa-window-close").fields([
            F::new("browserVariable", "Browser", FieldKind::VariableSelect)
                .allowed_types(&["browser"]),
            F::toggle("closeAll", "Close every window").default_value(false),
        ]),
        S::new("wait_element", "Wait for Element", "fa-eye").fields([
            F::selector("selector", "Element").required(),
            F::select(
                "state",
                "Until the element is",
                options(&[
                    ("visible", "Visible"),
                    ("hidden", "Hidden"),
                    ("attached", "Present"),
                    ("detached", "Removed"),
                ]),
            )
            .default_value("visible"),
            F::number("waitTimeout", "Give up after")
                .default_value(30)
                .range(1.0, 600.0)
                .unit("s"),
        ]),
        S::new("wait_page_load", "Wait for Page Load", "fa-spinner").field(
            F::select(
                "waitUntil",
                "Wait until",
                options(&[
                    ("load", "Page loaded"),
                    ("domcontentloaded", "DOM ready"),
                    ("networkidle", "Network idle"),
                ]),
            )
            .default_value("load"),
        ),
    ]
}
