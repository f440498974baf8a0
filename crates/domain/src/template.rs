// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Message template rendering.
//!
//! Templates use `{{field}}` placeholders resolved against a
//! recipient's field map plus the implicit field `phone`. Rendering is
//! total: a well-formed placeholder with no matching field renders as
//! the empty string, and text that merely looks like a placeholder
//! (unclosed braces, non-identifier content) passes through verbatim.

use crate::types::RecipientFields;

/// Resolves a placeholder name against the recipient's data.
///
/// Explicit fields win; `phone` falls back to the recipient's canonical
/// number when no column of that name was ingested.
fn resolve<'a>(name: &str, phone: &'a str, fields: &'a RecipientFields) -> &'a str {
    if let Some(value) = fields.get(name) {
        return value;
    }
    if name == "phone" {
        return phone;
    }
    ""
}

/// Returns the placeholder name and consumed length at the head of
/// `rest` (the text following an opening `{{`), or `None` when the
/// text is not a well-formed placeholder.
fn parse_placeholder(rest: &str) -> Option<(&str, usize)> {
    let end: usize = rest.find("}}")?;
    let name: &str = &rest[..end];
    if name.is_empty() {
        return None;
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((name, end + 2))
}

/// Renders a message template for one recipient.
///
/// Placeholder names match fields exactly and case-sensitively. A
/// placeholder that resolves to no field renders as the empty string;
/// rendering never fails.
///
/// # Arguments
///
/// * `template` - The message template with `{{field}}` placeholders
/// * `phone` - The recipient's canonical phone, the implicit `phone` field
/// * `fields` - The recipient's field map
#[must_use]
pub fn render(template: &str, phone: &str, fields: &RecipientFields) -> String {
    let mut out: String = String::with_capacity(template.len());
    let mut rest: &str = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after: &str = &rest[start + 2..];
        match parse_placeholder(after) {
            Some((name, consumed)) => {
                out.push_str(resolve(name, phone, fields));
                rest = &after[consumed..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Returns the distinct placeholder names in a template, in first-seen
/// order.
#[must_use]
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest: &str = template;

    while let Some(start) = rest.find("{{") {
        let after: &str = &rest[start + 2..];
        match parse_placeholder(after) {
            Some((name, consumed)) => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                rest = &after[consumed..];
            }
            None => {
                rest = after;
            }
        }
    }

    names
}
