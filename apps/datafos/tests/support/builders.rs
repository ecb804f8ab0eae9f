use std::collections::HashMap;

use datafos_fields::{FieldDefinition, RequestParams, SubmittedValue};

/// Builder for field definitions
pub struct FieldBuilder {
    field: FieldDefinition,
}

impl FieldBuilder {
    pub fn new(form_id: i64, field_type: &str, name: &str) -> Self {
        Self {
            field: FieldDefinition::new(form_id, field_type, name),
        }
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.field.set_param(1, options.join("\n"));
        self
    }

    pub fn param(mut self, n: usize, value: impl Into<String>) -> Self {
        self.field.set_param(n, value);
        self
    }

    pub fn required(mut self) -> Self {
        self.field.required = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.field.description = description.into();
        self
    }

    pub fn build(self) -> FieldDefinition {
        self.field
    }
}

/// Builder for add/edit form submissions
#[derive(Default)]
pub struct SubmissionBuilder {
    values: HashMap<i64, SubmittedValue>,
}

impl SubmissionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, field_id: i64, value: impl Into<String>) -> Self {
        self.values.insert(field_id, SubmittedValue::Single(value.into()));
        self
    }

    pub fn selection(mut self, field_id: i64, values: &[&str]) -> Self {
        self.values
            .insert(field_id, SubmittedValue::multiple(values.iter().copied()));
        self
    }

    pub fn build(self) -> HashMap<i64, SubmittedValue> {
        self.values
    }
}

/// Builder for search request parameters
#[derive(Default)]
pub struct SearchParamsBuilder {
    pairs: Vec<(String, String)>,
}

impl SearchParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    pub fn field(self, field_id: i64, value: &str) -> Self {
        self.param(format!("f_{}", field_id), value)
    }

    pub fn selection(mut self, field_id: i64, values: &[&str], all_required: bool) -> Self {
        for value in values {
            self = self.param(format!("f_{}[]", field_id), *value);
        }
        if all_required {
            self = self.param(format!("f_{}_allreq", field_id), "1");
        }
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        for tag in tags {
            self = self.param("u_tags[]", *tag);
        }
        self
    }

    pub fn sort(self, sort: i64, order: &str) -> Self {
        self.param("sort", sort.to_string()).param("order", order)
    }

    pub fn page(self, page: u32, per_page: u32) -> Self {
        self.param("page", page.to_string())
            .param("perpage", per_page.to_string())
    }

    pub fn build(self) -> RequestParams {
        RequestParams::from_pairs(self.pairs)
    }
}
