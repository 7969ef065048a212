use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

fn checkbox_regex() -> &'static Regex {
    static CHECKBOX_REGEX: OnceLock<Regex> = OnceLock::new();
    CHECKBOX_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^([ \t]*)(\[[xX _-]\][ \t].*)$").expect("Invalid checkbox regex")
    })
}

/// Rewrite bare checkbox lines as task list items.
///
/// People paste `[x] done` / `[ ] todo` lines without a list marker, which
/// CommonMark reads as plain paragraphs. Each such line gets a `- ` inserted
/// after its indentation; nothing else in the text changes.
///
/// ```rust
/// use paste_router_engine::paste::normalize;
///
/// assert_eq!(normalize("[x] buy milk\n[ ] call mom"), "- [x] buy milk\n- [ ] call mom");
/// ```
pub fn normalize(text: &str) -> String {
    let mut text = Cow::Borrowed(text);

    while checkbox_regex().is_match(&text) {
        let rewritten = checkbox_regex().replace_all(&text, "${1}- ${2}").into_owned();
        text = Cow::Owned(rewritten);
    }

    text.into_owned()
}
