// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Advisory template checks run before a batch is created.

use wa_blast_domain::placeholders;

/// Warns about template placeholders that no ingested column can fill.
///
/// Placeholder matching at render time is exact and case-sensitive, so
/// a case mismatch against a column name is reported here too. The
/// implicit `phone` placeholder is always fillable. Warnings never
/// block batch creation; an unmatched placeholder renders as the empty
/// string.
///
/// # Arguments
///
/// * `template` - The message template
/// * `field_names` - The non-phone column names from the ingested source
#[must_use]
pub fn template_warnings(template: &str, field_names: &[String]) -> Vec<String> {
    placeholders(template)
        .into_iter()
        .filter(|name| name != "phone" && !field_names.iter().any(|field| field == name))
        .map(|name| {
            format!("Template placeholder '{{{{{name}}}}}' does not match any ingested column")
        })
        .collect()
}
