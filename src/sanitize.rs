//! Text sanitation for XML-bound strings.
//!
//! Everything rendered into the feed passes through here first. Two distinct
//! hazards are handled:
//!
//! - Control characters that are illegal in XML 1.0 and crash strict feed
//!   readers. Tab, newline and carriage return are legal and preserved.
//! - Literal CDATA delimiters inside text that will itself be wrapped in a
//!   CDATA section. Plain payloads (title, summary) have both delimiters
//!   stripped; body HTML keeps its markup and only the terminator is
//!   neutralized so it cannot close the enclosing section early.
//!
//! All functions are pure and total.

/// Characters in `U+0000–U+0008`, `U+000B–U+000C` and `U+000E–U+001F`.
fn is_banned_control(c: char) -> bool {
    matches!(c,
        '\u{0000}'..='\u{0008}' | '\u{000B}' | '\u{000C}' | '\u{000E}'..='\u{001F}')
}

/// Remove control characters that would make the output invalid XML.
///
/// Tab (`U+0009`), newline (`U+000A`) and carriage return (`U+000D`) lie
/// outside the removed ranges and pass through unchanged. Idempotent.
pub fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !is_banned_control(*c)).collect()
}

/// Delete literal CDATA delimiters from text embedded as a plain CDATA payload.
pub fn strip_cdata_delimiters(text: &str) -> String {
    text.replace("<![CDATA[", "").replace("]]>", "")
}

/// Neutralize the CDATA terminator in text embedded as raw markup.
///
/// Used for body HTML, where stripping would mangle legitimate content; the
/// replacement renders as `]]>` once the CDATA section is decoded.
pub fn escape_cdata_close(text: &str) -> String {
    text.replace("]]>", "]]&gt;")
}
