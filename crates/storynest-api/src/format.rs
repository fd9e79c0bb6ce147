//! Text shaping for article content: paragraph wrapping on the way in,
//! tag stripping and excerpts on the way out.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

pub const ELLIPSIS: &str = "...";

/// Wraps each blank-line-separated block of `raw` in `<p>` tags.
///
/// Blocks are trimmed and empty ones dropped, so `"A\n\nB\n\n\nC"` yields
/// three paragraphs and whitespace-only input yields an empty string.
pub fn paragraphs(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n");
    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| format!("<p>{}</p>", block))
        .collect()
}

/// Removes every `<...>` span.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// Plain-text preview: tags stripped, cut to `max_len` characters, with
/// [`ELLIPSIS`] appended only when something was cut.
pub fn excerpt(content: &str, max_len: usize) -> String {
    let plain = strip_tags(content);
    match plain.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}{}", &plain[..cut], ELLIPSIS),
        None => plain,
    }
}

/// Turns stored markup back into the text an author edits: paragraph
/// boundaries become blank lines, remaining tags are dropped.
pub fn editable_text(html: &str) -> String {
    let spaced = html.replace("</p>", "</p>\n\n");
    strip_tags(&spaced).trim().to_string()
}
