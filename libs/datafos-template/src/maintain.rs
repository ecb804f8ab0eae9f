//! Template upkeep: save-time validation and edits that follow field changes.

use datafos_fields::FieldDefinition;
use regex::{NoExpand, Regex, RegexBuilder};

use crate::kind::TemplateKind;

fn value_token_pattern(name: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"\[\[{}\]\]", regex::escape(name)))
        .case_insensitive(true)
        .build()
}

/// Names of fields whose `[[name]]` token occurs more than once.
///
/// Repeated tokens still render; this only feeds save-time notifications.
pub fn duplicate_tokens(template: &str, fields: &[FieldDefinition]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| match value_token_pattern(&field.name) {
            Ok(pattern) => pattern.find_iter(template).count() > 1,
            Err(e) => {
                tracing::warn!(field = %field.name, error = %e, "Skipping duplicate check for field");
                false
            }
        })
        .map(|field| field.name.clone())
        .collect()
}

/// Rewrite every token form of `old_name`, or remove them when `new_name` is `None`.
pub fn rename_field_tokens(template: &str, old_name: &str, new_name: Option<&str>) -> String {
    let pattern = RegexBuilder::new(&format!(
        r"\[\[{}(#id|#name|#description)?\]\]",
        regex::escape(old_name)
    ))
    .case_insensitive(true)
    .build();
    let pattern = match pattern {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::warn!(field = old_name, error = %e, "Cannot rewrite field tokens");
            return template.to_string();
        }
    };
    match new_name {
        Some(new_name) => pattern
            .replace_all(template, |caps: &regex::Captures<'_>| {
                let part = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
                format!("[[{}{}]]", new_name, part.unwrap_or_default())
            })
            .into_owned(),
        None => pattern.replace_all(template, NoExpand("")).into_owned(),
    }
}

/// Append a labelled block for a new field unless the template already
/// places it or lists other fields automatically.
///
/// Returns `None` when the template is left as it is.
pub fn append_field_tokens(template: &str, field_name: &str) -> Option<String> {
    if template.trim().is_empty()
        || template.contains(&format!("[[{}]]", field_name))
        || template.contains("##otherfields##")
    {
        return None;
    }
    Some(format!(
        "{}<div class=\"added_field\"><div class=\"fieldname\">[[{name}#name]]</div><div class=\"fieldcontent\">[[{name}]]</div></div>",
        template,
        name = field_name
    ))
}

/// Default template of a kind; empty when the form has no fields.
pub fn default_template(kind: TemplateKind, fields: &[FieldDefinition]) -> String {
    if fields.is_empty() {
        return String::new();
    }
    let rows: String = fields
        .iter()
        .map(|f| {
            format!(
                "<div class=\"row\"><div class=\"fieldname\">[[{name}#name]]</div><div class=\"fieldcontent\">[[{name}]]</div></div>\n",
                name = f.name
            )
        })
        .collect();
    match kind {
        TemplateKind::List => format!("<div class=\"defaulttemplate-listentry\">\n{}##tags##\n</div>\n", rows),
        TemplateKind::Single => format!(
            "<div class=\"defaulttemplate-single\">\n{}##tags##\n<div class=\"entryinfo\">##user## ##timeadded##</div>\n</div>\n",
            rows
        ),
        TemplateKind::AdvancedSearch => format!(
            "<div class=\"defaulttemplate-asearch\">\n<div class=\"row\"><div class=\"fieldname\">First name</div><div class=\"fieldcontent\">##firstname##</div></div>\n\
             <div class=\"row\"><div class=\"fieldname\">Last name</div><div class=\"fieldcontent\">##lastname##</div></div>\n{}##tags##\n</div>\n",
            rows
        ),
        TemplateKind::AddEntry => format!("<div class=\"defaulttemplate-addentry\">\n{}##tags##\n</div>\n", rows),
        TemplateKind::Rss => format!("<div class=\"defaulttemplate-rss\">\n{}</div>\n", rows),
    }
}
