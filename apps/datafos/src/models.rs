//! Application-level models that sit above the field crate's data model.

use datafos_fields::{Record, UserSummary};
use datafos_template::TemplateKind;
use serde::{Deserialize, Serialize};

/// One database activity: its settings and its five templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub id: i64,
    pub name: String,
    /// New entries need approval before others can see them.
    pub approval: bool,
    pub list_template: String,
    pub single_template: String,
    pub asearch_template: String,
    pub add_template: String,
    pub rss_template: String,
}

impl Form {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn template(&self, kind: TemplateKind) -> &str {
        match kind {
            TemplateKind::List => &self.list_template,
            TemplateKind::Single => &self.single_template,
            TemplateKind::AdvancedSearch => &self.asearch_template,
            TemplateKind::AddEntry => &self.add_template,
            TemplateKind::Rss => &self.rss_template,
        }
    }

    pub fn set_template(&mut self, kind: TemplateKind, template: impl Into<String>) {
        let slot = match kind {
            TemplateKind::List => &mut self.list_template,
            TemplateKind::Single => &mut self.single_template,
            TemplateKind::AdvancedSearch => &mut self.asearch_template,
            TemplateKind::AddEntry => &mut self.add_template,
            TemplateKind::Rss => &mut self.rss_template,
        };
        *slot = template.into();
    }
}

/// A record as returned by the presentation query, with its owner when the
/// owning user still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    pub record: Record,
    pub owner: Option<UserSummary>,
}

/// Which records the caller may see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Every record, approved or not.
    #[default]
    All,
    /// Approved records plus the given user's own.
    ApprovedOrOwnedBy(i64),
}

/// Baseline visibility filter applied before any search criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub group_id: Option<i64>,
    pub visibility: Visibility,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn visible_to(mut self, user_id: i64) -> Self {
        self.visibility = Visibility::ApprovedOrOwnedBy(user_id);
        self
    }
}
