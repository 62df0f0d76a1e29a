//! Marker strings shared with the external annotation tool.
//!
//! These have to match what that tool emits byte for byte, including the
//! misspelled "MODFICATIONS".

use std::sync::LazyLock;

use regex::Regex;

pub const NOTE_TYPE_MODIFICATION_STRING: &str = "ANKIHUB MODFICATIONS";

pub const HTML_SNIPPET_BEGIN: &str = "<!-- BEGIN ANKIHUB MODFICATIONS -->";
pub const HTML_SNIPPET_END: &str = "<!-- END ANKIHUB MODFICATIONS -->";
pub const CSS_SNIPPET_BEGIN: &str = "/* BEGIN ANKIHUB MODFICATIONS */";
pub const CSS_SNIPPET_END: &str = "/* END ANKIHUB MODFICATIONS */";

pub const HTML_END_COMMENT: &str = "<!--\n\
ANKIHUB_END\n\
Text below this comment will not be modified by AnkiHub or AnKing add-ons.\n\
Do not edit or remove this comment if you want to protect the content below.\n\
-->";

pub const CSS_END_COMMENT: &str = "/*\n\
ANKIHUB_END\n\
Text below this comment will not be modified by AnkiHub or AnKing add-ons.\n\
Do not edit or remove this comment if you want to protect the content below.\n\
*/";

/// Name of the externally owned identifier field that always stays last.
pub const SENTINEL_FIELD_NAME: &str = "ankihub_id";

pub static HTML_SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}[\w\W]*{}",
        regex::escape(HTML_SNIPPET_BEGIN),
        regex::escape(HTML_SNIPPET_END)
    ))
    .expect("snippet pattern is valid")
});

pub static CSS_SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}[\w\W]*{}",
        regex::escape(CSS_SNIPPET_BEGIN),
        regex::escape(CSS_SNIPPET_END)
    ))
    .expect("snippet pattern is valid")
});

// The tag body varies between tool releases, only `ANKIHUB_END` is stable.
pub static HTML_END_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--\s*ANKIHUB_END[\w\W]*?-->(?P<text_to_migrate>[\w\W]*)")
        .expect("end comment pattern is valid")
});

pub static CSS_END_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\*\s*ANKIHUB_END[\w\W]*?\*/(?P<text_to_migrate>[\w\W]*)")
        .expect("end comment pattern is valid")
});

pub static TEMPLATE_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<!-- version ([\w\d]+) -->\n").expect("version pattern is valid")
});

/// `{base}-XXXXX`, the name the host gives a notetype copied on import.
pub fn notetype_copy_pattern(base_name: &str) -> String {
    format!(r"^{}-[a-zA-Z0-9]{{5}}", regex::escape(base_name))
}

/// `{base} (deck / user)`, the name of a fork installed by the annotation tool.
pub fn imported_fork_pattern(base_name: &str) -> String {
    format!(r"^{} \(.+ / .+\)", regex::escape(base_name))
}
