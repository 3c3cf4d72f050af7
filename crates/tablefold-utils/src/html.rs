//! HTML helpers: escaping, whitespace normalisation and a small markup builder.

use once_cell::sync::Lazy;
use regex::Regex;

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Escape special characters in HTML text content.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape special characters in HTML attribute values.
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Collapse runs of whitespace (including non-breaking spaces) and trim.
pub fn normalize_whitespace(s: &str) -> String {
    let s = s.replace('\u{a0}', " ");
    WS_RE.replace_all(&s, " ").trim().to_string()
}

/// Incremental HTML fragment builder.
///
/// Attribute values and text are escaped; `raw_element` inserts markup verbatim.
pub struct HtmlBuilder {
    content: String,
    open: Vec<&'static str>,
}

impl HtmlBuilder {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            open: Vec::new(),
        }
    }

    pub fn open_tag(&mut self, name: &'static str, attrs: &[(&str, &str)]) -> &mut Self {
        self.start_tag(name, attrs);
        self.open.push(name);
        self
    }

    /// Close the most recently opened tag.
    pub fn close_tag(&mut self) -> &mut Self {
        if let Some(name) = self.open.pop() {
            self.content.push_str("</");
            self.content.push_str(name);
            self.content.push('>');
        }
        self
    }

    pub fn text_element(&mut self, name: &'static str, text: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.start_tag(name, attrs);
        self.content.push_str(&escape_text(text));
        self.end_tag(name);
        self
    }

    pub fn raw_element(&mut self, name: &'static str, html: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.start_tag(name, attrs);
        self.content.push_str(html);
        self.end_tag(name);
        self
    }

    /// Close every open tag and return the markup.
    pub fn build(mut self) -> String {
        while !self.open.is_empty() {
            self.close_tag();
        }
        self.content
    }

    fn start_tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.content.push('<');
        self.content.push_str(name);
        for (key, value) in attrs {
            self.content.push(' ');
            self.content.push_str(key);
            self.content.push_str("=\"");
            self.content.push_str(&escape_attr(value));
            self.content.push('"');
        }
        self.content.push('>');
    }

    fn end_tag(&mut self, name: &str) {
        self.content.push_str("</");
        self.content.push_str(name);
        self.content.push('>');
    }
}

impl Default for HtmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}
