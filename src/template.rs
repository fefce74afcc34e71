//! `{param}` URL templates: rendering, segment encoding and wildcard matching.

use regex::Regex;

/// Placeholder names in template order, e.g. `["entity_id"]`.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find(['{', '}']) {
            Some(end) if after.as_bytes()[end] == b'}' => {
                names.push(&after[..end]);
                rest = &after[end + 1..];
            }
            Some(end) => rest = &after[end..],
            None => break,
        }
    }
    names
}

/// Substitute every placeholder using `lookup`; fails on the first
/// placeholder `lookup` cannot fill.
pub fn render<F>(template: &str, mut lookup: F) -> Result<String, String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    for name in placeholders(template) {
        let marker = format!("{{{}}}", name);
        let Some(pos) = rest.find(&marker) else {
            continue;
        };
        let value = lookup(name).ok_or_else(|| format!("missing value for placeholder {{{}}}", name))?;
        out.push_str(&rest[..pos]);
        out.push_str(&value);
        rest = &rest[pos + marker.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Compiled template where each placeholder matches any text.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    regex: Regex,
}

impl TemplateMatcher {
    pub fn new(template: &str) -> Result<Self, regex::Error> {
        let mut pattern = String::from("^");
        let mut rest = template;
        for name in placeholders(template) {
            let marker = format!("{{{}}}", name);
            if let Some(pos) = rest.find(&marker) {
                pattern.push_str(&regex::escape(&rest[..pos]));
                pattern.push_str("(.*)");
                rest = &rest[pos + marker.len()..];
            }
        }
        pattern.push_str(&regex::escape(rest));
        pattern.push('$');
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    /// Whether substituting some values for the placeholders yields `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

/// Percent-encode `value` for use as a single path segment, so `/`, `?`
/// and `#` inside an argument stay part of the segment.
pub fn encode_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
