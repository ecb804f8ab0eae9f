use std::collections::HashSet;

use super::{
    choice::validate_options, edit_label, escape_attr, escape_text, search_label, trim_plain,
    EditInput, FieldAdapter,
};
use crate::criteria::{strip_tags, RequestParams, SearchValue};
use crate::error::Result;
use crate::labels::RenderContext;
use crate::model::{
    FieldDefinition, FieldType, RecordContent, SubmittedValue, EMPTY_SELECTION_SENTINEL,
    MULTI_VALUE_SEPARATOR,
};
use crate::sql::{escape_like_pattern, join_clauses, push_text, BindValue};

/// Several options from the `param1` list, stored `##`-joined:
/// `checkbox` or `multimenu`.
#[derive(Debug)]
pub struct MultiChoiceAdapter {
    menu: bool,
}

impl MultiChoiceAdapter {
    pub const fn checkbox() -> Self {
        Self { menu: false }
    }

    pub const fn multimenu() -> Self {
        Self { menu: true }
    }
}

/// Split stored content into its options.
pub fn split_selection(content: &str) -> Vec<&str> {
    content
        .split(MULTI_VALUE_SEPARATOR)
        .filter(|v| !v.is_empty())
        .collect()
}

/// Join the submitted options that are still configured, in submission order.
pub fn join_selection<'a>(
    options: &[String],
    submitted: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let kept: Vec<&str> = submitted
        .into_iter()
        .filter(|v| options.iter().any(|o| o == v))
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join(MULTI_VALUE_SEPARATOR))
    }
}

fn selected_values(input: &EditInput<'_>) -> Vec<String> {
    match input {
        EditInput::Empty => Vec::new(),
        EditInput::Stored(content) => split_selection(content.content_str())
            .into_iter()
            .map(str::to_string)
            .collect(),
        EditInput::Submitted(value) => value.values().into_iter().map(str::to_string).collect(),
    }
}

impl FieldAdapter for MultiChoiceAdapter {
    fn kind(&self) -> Option<FieldType> {
        Some(if self.menu {
            FieldType::Multimenu
        } else {
            FieldType::Checkbox
        })
    }

    fn render_for_edit(
        &self,
        field: &FieldDefinition,
        ctx: &RenderContext<'_>,
        input: EditInput<'_>,
    ) -> Result<String> {
        let selected = selected_values(&input);
        let mut out = edit_label(field);
        // Hidden sentinel so an empty selection is still submitted.
        out.push_str(&format!(
            "<input name=\"field_{id}[{key}]\" type=\"hidden\" value=\"{key}\" />",
            id = field.id,
            key = EMPTY_SELECTION_SENTINEL
        ));
        if self.menu {
            out.push_str(&format!(
                "<select id=\"field_{id}\" name=\"field_{id}[]\" multiple=\"multiple\" class=\"form-control\">",
                id = field.id
            ));
            for option in field.options() {
                let mark = if selected.contains(&option) { " selected=\"selected\"" } else { "" };
                out.push_str(&format!(
                    "<option value=\"{}\"{}>{}</option>",
                    escape_attr(&option),
                    mark,
                    escape_text(&ctx.label(field, &option))
                ));
            }
            out.push_str("</select>");
        } else {
            out.push_str(&format!("<fieldset id=\"field_{}\" class=\"checkboxgroup\">", field.id));
            for (i, option) in field.options().iter().enumerate() {
                let mark = if selected.contains(option) { " checked=\"checked\"" } else { "" };
                out.push_str(&format!(
                    "<input type=\"checkbox\" id=\"field_{id}_{i}\" name=\"field_{id}[]\" value=\"{}\"{} />\
                     <label for=\"field_{id}_{i}\">{}</label><br />",
                    escape_attr(option),
                    mark,
                    escape_text(&ctx.label(field, option)),
                    id = field.id,
                    i = i,
                ));
            }
            out.push_str("</fieldset>");
        }
        Ok(out)
    }

    fn render_browse(
        &self,
        field: &FieldDefinition,
        ctx: &RenderContext<'_>,
        content: Option<&RecordContent>,
    ) -> String {
        let Some(stored) = content.and_then(|c| c.content.as_deref()) else {
            return String::new();
        };
        let options = field.options();
        let mut out = String::new();
        for value in split_selection(stored) {
            // Values no longer configured are skipped.
            if !options.iter().any(|o| o == value) {
                continue;
            }
            out.push_str(&escape_text(&ctx.label(field, value)));
            out.push_str("<br />\n");
        }
        out
    }

    fn render_for_search(
        &self,
        field: &FieldDefinition,
        ctx: &RenderContext<'_>,
        current: Option<&SearchValue>,
        used_values: &[String],
    ) -> String {
        let (selected, all_required) = match current {
            Some(SearchValue::Selection {
                selected,
                all_required,
            }) => (selected.as_slice(), *all_required),
            _ => (&[][..], false),
        };
        let used: HashSet<&str> = used_values
            .iter()
            .flat_map(|content| split_selection(content))
            .collect();

        let mut choices = String::new();
        for option in field.options() {
            if !used.contains(option.as_str()) {
                continue;
            }
            let mark = if selected.contains(&option) { " selected=\"selected\"" } else { "" };
            choices.push_str(&format!(
                "<option value=\"{}\"{}>{}</option>",
                escape_attr(&option),
                mark,
                escape_text(&ctx.label(field, &option))
            ));
        }
        if choices.is_empty() {
            return String::new();
        }

        let mut out = search_label(field);
        out.push_str(&format!(
            "<select id=\"f_{id}\" name=\"f_{id}[]\" multiple=\"multiple\" class=\"form-control\">",
            id = field.id
        ));
        out.push_str(&choices);
        out.push_str("</select>");
        out.push_str(&format!(
            "<input type=\"checkbox\" id=\"f_{id}_allreq\" name=\"f_{id}_allreq\" value=\"1\" class=\"mr-1\"{} />\
             <label for=\"f_{id}_allreq\">All selected required</label>",
            if all_required { " checked=\"checked\"" } else { "" },
            id = field.id
        ));
        out
    }

    fn parse_search_input(
        &self,
        field: &FieldDefinition,
        request: &RequestParams,
        defaults: Option<&SearchValue>,
    ) -> Option<SearchValue> {
        let name = format!("f_{}", field.id);
        let allreq_name = format!("f_{}_allreq", field.id);
        let (default_selected, default_all_required) = match defaults {
            Some(SearchValue::Selection {
                selected,
                all_required,
            }) if !selected.is_empty() => (selected.clone(), *all_required),
            _ => (Vec::new(), false),
        };

        let selected: Vec<String> = if request.contains(&name) {
            request
                .all(&name)
                .iter()
                .map(|v| strip_tags(v).trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        } else {
            default_selected
        };
        let all_required = request.flag(&allreq_name).unwrap_or(default_all_required);

        if selected.is_empty() {
            return None;
        }
        Some(SearchValue::Selection {
            selected,
            all_required,
        })
    }

    fn generate_sql(
        &self,
        field: &FieldDefinition,
        alias: &str,
        value: &SearchValue,
        bind_params: &mut Vec<BindValue>,
    ) -> Option<String> {
        let SearchValue::Selection {
            selected,
            all_required,
        } = value
        else {
            return None;
        };

        let mut conditions = Vec::with_capacity(selected.len());
        for sel in selected {
            let like = escape_like_pattern(sel);
            let exact = push_text(bind_params, sel.clone());
            let head = push_text(bind_params, format!("{}{}%", like, MULTI_VALUE_SEPARATOR));
            let tail = push_text(bind_params, format!("%{}{}", MULTI_VALUE_SEPARATOR, like));
            let middle = push_text(
                bind_params,
                format!("%{sep}{}{sep}%", like, sep = MULTI_VALUE_SEPARATOR),
            );
            conditions.push(format!(
                "({a}.fieldid = {id} AND ({a}.content = ${exact} \
                 OR {a}.content LIKE ${head} ESCAPE '\\' \
                 OR {a}.content LIKE ${tail} ESCAPE '\\' \
                 OR {a}.content LIKE ${middle} ESCAPE '\\'))",
                a = alias,
                id = field.id,
                exact = exact,
                head = head,
                tail = tail,
                middle = middle,
            ));
        }
        join_clauses(conditions, if *all_required { "AND" } else { "OR" })
    }

    fn format_stored_content(
        &self,
        field: &FieldDefinition,
        submitted: &SubmittedValue,
    ) -> Option<String> {
        join_selection(&field.options(), submitted.values())
    }

    fn is_value_present(&self, submitted: &SubmittedValue) -> bool {
        submitted.values().iter().any(|v| !v.is_empty())
    }

    fn plain_text(&self, content: &RecordContent) -> String {
        trim_plain(&split_selection(content.content_str()).join(" "))
    }

    fn supports_preview(&self) -> bool {
        true
    }

    fn preview_content(&self, field: &FieldDefinition, record_id: i64) -> RecordContent {
        let options = field.options();
        if options.is_empty() {
            return RecordContent::new(field.id, record_id, None);
        }
        let n = options.len() as i64;
        let mut value = options[record_id.rem_euclid(n) as usize].clone();
        if self.menu {
            value.push_str(MULTI_VALUE_SEPARATOR);
            value.push_str(&options[(record_id + 1).rem_euclid(n) as usize]);
        }
        RecordContent::new(field.id, record_id, Some(value))
    }

    fn validate_config(&self, field: &FieldDefinition) -> Result<()> {
        validate_options(field)
    }

    fn needs_used_values(&self) -> bool {
        true
    }
}
