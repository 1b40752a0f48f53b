//! HTML emphasis used by the annotation templates.

const BOLD_START: &str = "<b>";
const BOLD_END: &str = "</b>";
const ITALIC_START: &str = "<em>";
const ITALIC_END: &str = "</em>";

/// Wraps `text` in bold tags.
pub fn bold(text: impl AsRef<str>) -> String {
    format!("{BOLD_START}{}{BOLD_END}", text.as_ref())
}

/// Wraps `text` in italic tags.
pub fn italics(text: impl AsRef<str>) -> String {
    format!("{ITALIC_START}{}{ITALIC_END}", text.as_ref())
}

/// Bolds every item and joins them with `", "`.
pub fn bold_list<S: AsRef<str>>(items: &[S]) -> String {
    items.iter().map(bold).collect::<Vec<_>>().join(", ")
}
