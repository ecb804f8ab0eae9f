//! Search-form and entry rendering.

use std::collections::HashMap;

use chrono::DateTime;
use datafos_fields::{
    field_adapter, CriteriaMap, CriterionKey, EditInput, FieldDefinition, Record, RecordContent,
    RenderContext, SearchCriterion, SubmittedValue, UserSummary,
};

use crate::token::{placed_field_ids, FieldPart, GlobalToken, Segment, Token, Tokenizer};

/// Inputs of an advanced-search form render.
#[derive(Debug, Clone, Copy)]
pub struct SearchView<'a> {
    pub fields: &'a [FieldDefinition],
    pub criteria: &'a CriteriaMap,
    /// Distinct stored `content` values per field id.
    pub used_values: &'a HashMap<i64, Vec<String>>,
    /// Tag names offered by `##tags##`.
    pub available_tags: &'a [String],
}

/// Inputs of a single entry render.
#[derive(Debug, Clone, Copy)]
pub struct EntryView<'a> {
    pub fields: &'a [FieldDefinition],
    /// `None` for a blank add form.
    pub record: Option<&'a Record>,
    pub owner: Option<&'a UserSummary>,
    pub contents: &'a [RecordContent],
    pub tags: &'a [String],
}

impl<'a> EntryView<'a> {
    fn content_for(&self, field_id: i64) -> Option<&'a RecordContent> {
        self.contents.iter().find(|c| c.field_id == field_id)
    }
}

/// How entry fields are rendered.
#[derive(Debug, Clone, Copy)]
pub enum EntryMode<'a> {
    Browse,
    /// Fabricated example content instead of stored content.
    Preview,
    /// Edit controls, pre-filled with a submitted draft when present.
    Edit {
        submitted: &'a HashMap<i64, SubmittedValue>,
    },
}

fn escape(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

fn format_time(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.format("%-d %B %Y, %H:%M").to_string())
        .unwrap_or_default()
}

fn field_part(field: &FieldDefinition, part: FieldPart) -> Option<String> {
    match part {
        FieldPart::Id => Some(field.id.to_string()),
        FieldPart::Name => Some(escape(&field.name)),
        FieldPart::Description => Some(escape(&field.description)),
        FieldPart::Value => None,
    }
}

fn other_fields_block<F>(
    fields: &[FieldDefinition],
    placed: &[i64],
    mut value: F,
) -> datafos_fields::Result<String>
where
    F: FnMut(&FieldDefinition) -> datafos_fields::Result<String>,
{
    let mut out = String::new();
    for field in fields.iter().filter(|f| !placed.contains(&f.id)) {
        out.push_str(&format!(
            "<div class=\"otherfield\"><div class=\"fieldname\">{}</div><div class=\"fieldcontent\">{}</div></div>",
            escape(&field.name),
            value(field)?
        ));
    }
    Ok(out)
}

fn text_control(name: &str, value: &str) -> String {
    format!(
        "<input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{}\" class=\"form-control\" />",
        html_escape::encode_quoted_attribute(value),
        name = name
    )
}

/// Render an advanced-search template.
///
/// Never fails: tokens that cannot be rendered are left as written.
pub fn render_search_template(template: &str, view: &SearchView<'_>, ctx: &RenderContext<'_>) -> String {
    let tokenizer = match Tokenizer::new(view.fields) {
        Ok(tokenizer) => tokenizer,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build template token pattern; rendering template verbatim");
            return template.to_string();
        }
    };
    let segments = tokenizer.segments(template);
    let placed = placed_field_ids(&segments);

    let control = |field: &FieldDefinition| -> String {
        let used = view
            .used_values
            .get(&field.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        field_adapter(field).render_for_search(field, ctx, view.criteria.field_value(field.id), used)
    };

    let mut out = String::with_capacity(template.len());
    for segment in &segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Token(Token::Field { field, part }, _) => match field_part(field, *part) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&control(*field)),
            },
            Segment::Token(Token::Global(global), raw) => match global {
                GlobalToken::OtherFields => {
                    let block = other_fields_block(view.fields, &placed, |f| Ok(control(f)));
                    out.push_str(&block.unwrap_or_default());
                }
                GlobalToken::FirstName => {
                    let current = match view.criteria.get(CriterionKey::FirstName) {
                        Some(SearchCriterion::FirstName(v)) => v.as_str(),
                        _ => "",
                    };
                    out.push_str(&text_control("u_fn", current));
                }
                GlobalToken::LastName => {
                    let current = match view.criteria.get(CriterionKey::LastName) {
                        Some(SearchCriterion::LastName(v)) => v.as_str(),
                        _ => "",
                    };
                    out.push_str(&text_control("u_ln", current));
                }
                GlobalToken::Tags => out.push_str(&tag_selector(view)),
                _ => out.push_str(raw),
            },
        }
    }
    out
}

fn tag_selector(view: &SearchView<'_>) -> String {
    if view.available_tags.is_empty() {
        return String::new();
    }
    let selected: &[String] = match view.criteria.get(CriterionKey::Tags) {
        Some(SearchCriterion::Tags(tags)) => tags,
        _ => &[],
    };
    let mut out = String::from(
        "<select id=\"u_tags\" name=\"u_tags[]\" multiple=\"multiple\" class=\"form-control\">",
    );
    for tag in view.available_tags {
        let mark = if selected.iter().any(|s| s.eq_ignore_ascii_case(tag)) {
            " selected=\"selected\""
        } else {
            ""
        };
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            html_escape::encode_quoted_attribute(tag),
            mark,
            escape(tag)
        ));
    }
    out.push_str("</select>");
    out
}

/// Render one entry (list row, single view, add/edit form or preview).
///
/// Only edit mode can fail, and only for fields of an unknown type.
pub fn render_entry_template(
    template: &str,
    view: &EntryView<'_>,
    mode: EntryMode<'_>,
    ctx: &RenderContext<'_>,
) -> datafos_fields::Result<String> {
    let tokenizer = match Tokenizer::new(view.fields) {
        Ok(tokenizer) => tokenizer,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build template token pattern; rendering template verbatim");
            return Ok(template.to_string());
        }
    };
    let segments = tokenizer.segments(template);
    let placed = placed_field_ids(&segments);
    let record_id = view.record.map(|r| r.id).unwrap_or(0);

    let render_field = |field: &FieldDefinition| -> datafos_fields::Result<String> {
        let adapter = field_adapter(field);
        match mode {
            EntryMode::Browse => Ok(adapter.render_browse(field, ctx, view.content_for(field.id))),
            EntryMode::Preview => {
                let preview = adapter.preview_content(field, record_id);
                if adapter.supports_preview() {
                    Ok(adapter.render_browse(field, ctx, Some(&preview)))
                } else {
                    // Placeholder markup is already escaped.
                    Ok(preview.content.unwrap_or_default())
                }
            }
            EntryMode::Edit { submitted } => adapter.render_for_edit(
                field,
                ctx,
                EditInput::from_parts(view.content_for(field.id), submitted.get(&field.id)),
            ),
        }
    };

    let mut out = String::with_capacity(template.len());
    for segment in &segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Token(Token::Field { field, part }, _) => match field_part(field, *part) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&render_field(*field)?),
            },
            Segment::Token(Token::Global(global), raw) => {
                let value = match global {
                    GlobalToken::OtherFields => other_fields_block(view.fields, &placed, &render_field)?,
                    GlobalToken::Tags => entry_tags(view.tags),
                    GlobalToken::FirstName => view.owner.map(|u| escape(&u.firstname)).unwrap_or_default(),
                    GlobalToken::LastName => view.owner.map(|u| escape(&u.lastname)).unwrap_or_default(),
                    GlobalToken::User => view.owner.map(|u| escape(&u.fullname())).unwrap_or_default(),
                    GlobalToken::Id => view.record.map(|r| r.id.to_string()).unwrap_or_default(),
                    GlobalToken::TimeAdded => view.record.map(|r| format_time(r.created_at)).unwrap_or_default(),
                    GlobalToken::TimeModified => {
                        view.record.map(|r| format_time(r.modified_at)).unwrap_or_default()
                    }
                    GlobalToken::ApprovalStatus => match view.record {
                        Some(record) if !record.approved => {
                            "<span class=\"approval\">Pending approval</span>".to_string()
                        }
                        _ => String::new(),
                    },
                };
                // A blank add form has no record-level values to show.
                if view.record.is_none()
                    && matches!(
                        global,
                        GlobalToken::Id | GlobalToken::TimeAdded | GlobalToken::TimeModified
                    )
                {
                    out.push_str(raw);
                } else {
                    out.push_str(&value);
                }
            }
        }
    }
    Ok(out)
}

fn entry_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let items: Vec<String> = tags.iter().map(|t| format!("<li>{}</li>", escape(t))).collect();
    format!("<ul class=\"tag_list\">{}</ul>", items.join(""))
}
