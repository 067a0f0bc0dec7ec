/// Escape `&`, `<`, `>`, `"` and `'` for embedding into HTML text or
/// attribute values. Single pass, so already-escaped input is escaped again.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape, then turn each newline into a `<br/>` marker.
pub fn escape_multiline(raw: &str) -> String {
    escape_html(raw).replace('\n', "<br/>")
}
