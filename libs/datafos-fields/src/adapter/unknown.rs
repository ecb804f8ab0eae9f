use super::{EditInput, FieldAdapter};
use crate::error::{Error, Result};
use crate::labels::RenderContext;
use crate::model::{FieldDefinition, FieldType, RecordContent};

/// Stands in for any type tag this build does not know.
///
/// Stored content of such fields degrades to empty output; only editing
/// (form design) reports the problem.
#[derive(Debug)]
pub struct UnknownAdapter;

impl FieldAdapter for UnknownAdapter {
    fn kind(&self) -> Option<FieldType> {
        None
    }

    fn render_for_edit(
        &self,
        field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        _input: EditInput<'_>,
    ) -> Result<String> {
        Err(Error::UnknownFieldType {
            name: field.name.clone(),
            field_type: field.field_type.clone(),
        })
    }

    fn render_browse(
        &self,
        _field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        _content: Option<&RecordContent>,
    ) -> String {
        String::new()
    }

    fn format_stored_content(
        &self,
        _field: &FieldDefinition,
        _submitted: &crate::model::SubmittedValue,
    ) -> Option<String> {
        None
    }

    fn is_value_present(&self, _submitted: &crate::model::SubmittedValue) -> bool {
        false
    }

    fn validate_config(&self, field: &FieldDefinition) -> Result<()> {
        Err(Error::UnknownFieldType {
            name: field.name.clone(),
            field_type: field.field_type.clone(),
        })
    }
}
