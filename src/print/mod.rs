use leptos::logging::{error, warn};
use leptos_dom::helpers::set_timeout;
use std::time::Duration;
use wasm_bindgen::{JsCast, JsValue};

pub(crate) const PRINT_AREA_ID: &str = "print-area";

/// Time the popup gets to apply its styles before `print()`.
const PRINT_DELAY_MS: u64 = 500;

const PRINT_MEDIA_CSS: &str = "@media print {\n\
  body { margin: 0; padding: 0; }\n\
  .print-area {\n\
    width: 210mm !important;\n\
    height: 297mm !important;\n\
    margin: 0 auto !important;\n\
    transform: none !important;\n\
  }\n\
}";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PrintError {
    MissingArea,
    PopupBlocked,
    Browser(String),
}

impl std::fmt::Display for PrintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrintError::MissingArea => write!(f, "nothing to print: #{PRINT_AREA_ID} not found"),
            PrintError::PopupBlocked => write!(f, "print window was blocked"),
            PrintError::Browser(msg) => write!(f, "print failed: {msg}"),
        }
    }
}

impl From<JsValue> for PrintError {
    fn from(v: JsValue) -> Self {
        PrintError::Browser(v.as_string().unwrap_or_else(|| format!("{v:?}")))
    }
}

/// Standalone document that reproduces the print area with the page's styles.
pub(crate) fn build_print_document(styles: &str, area_html: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>Print Content</title>\n<style>\n{styles}\n{PRINT_MEDIA_CSS}\n</style>\n</head>\n<body>\n{area_html}\n</body>\n</html>\n"
    )
}

/// CSS text of every stylesheet the page may read; cross-origin sheets are skipped.
fn collect_styles(document: &web_sys::Document) -> String {
    let sheets = document.style_sheets();
    let mut out = String::new();

    for i in 0..sheets.length() {
        let Some(sheet) = sheets.item(i) else {
            continue;
        };
        let Ok(sheet) = sheet.dyn_into::<web_sys::CssStyleSheet>() else {
            continue;
        };
        let rules = match sheet.css_rules() {
            Ok(rules) => rules,
            Err(e) => {
                warn!("skipping unreadable stylesheet: {e:?}");
                continue;
            }
        };
        for j in 0..rules.length() {
            if let Some(rule) = rules.item(j) {
                out.push_str(&rule.css_text());
            }
        }
    }

    out
}

/// Opens a popup with the element `area_id` and prints it.
pub(crate) fn print_area(area_id: &str) -> Result<(), PrintError> {
    let window = web_sys::window().ok_or_else(|| PrintError::Browser("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| PrintError::Browser("no document".into()))?;
    let area = document
        .get_element_by_id(area_id)
        .ok_or(PrintError::MissingArea)?;

    let popup = window
        .open_with_url_and_target("", "_blank")?
        .ok_or(PrintError::PopupBlocked)?;

    let html = build_print_document(&collect_styles(&document), &area.outer_html());
    let popup_doc = popup
        .document()
        .ok_or_else(|| PrintError::Browser("print window has no document".into()))?
        .dyn_into::<web_sys::HtmlDocument>()
        .map_err(|_| PrintError::Browser("print window document is not HTML".into()))?;
    popup_doc.write_1(&html)?;
    popup_doc.close()?;

    set_timeout(
        move || {
            if let Err(e) = popup.print() {
                error!("print() failed: {e:?}");
            }
            let _ = popup.close();
        },
        Duration::from_millis(PRINT_DELAY_MS),
    );

    Ok(())
}

/// `print_area` for click handlers: failures are logged, never raised.
pub(crate) fn handle_print() {
    if let Err(e) = print_area(PRINT_AREA_ID) {
        error!("{e}");
    }
}
