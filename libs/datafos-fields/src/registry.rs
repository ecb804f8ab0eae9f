//! Static adapter registry.

use crate::adapter::{
    DateAdapter, FieldAdapter, FileAdapter, LatLongAdapter, MultiChoiceAdapter, NumberAdapter,
    SingleChoiceAdapter, TextAdapter, UnknownAdapter, UrlAdapter,
};
use crate::model::{FieldDefinition, FieldType};

static TEXT: TextAdapter = TextAdapter::single_line();
static TEXTAREA: TextAdapter = TextAdapter::multi_line();
static CHECKBOX: MultiChoiceAdapter = MultiChoiceAdapter::checkbox();
static MULTIMENU: MultiChoiceAdapter = MultiChoiceAdapter::multimenu();
static MENU: SingleChoiceAdapter = SingleChoiceAdapter::menu();
static RADIOBUTTON: SingleChoiceAdapter = SingleChoiceAdapter::radio();
static FILE: FileAdapter = FileAdapter::file();
static PICTURE: FileAdapter = FileAdapter::picture();

/// Adapter for a known field type.
pub fn adapter_for(kind: FieldType) -> &'static dyn FieldAdapter {
    match kind {
        FieldType::Text => &TEXT,
        FieldType::Textarea => &TEXTAREA,
        FieldType::Checkbox => &CHECKBOX,
        FieldType::Multimenu => &MULTIMENU,
        FieldType::Date => &DateAdapter,
        FieldType::Latlong => &LatLongAdapter,
        FieldType::Menu => &MENU,
        FieldType::Number => &NumberAdapter,
        FieldType::Picture => &PICTURE,
        FieldType::Radiobutton => &RADIOBUTTON,
        FieldType::Url => &UrlAdapter,
        FieldType::File => &FILE,
    }
}

/// Resolve a stored type tag; unknown tags get the [`UnknownAdapter`].
pub fn resolve_adapter(tag: &str) -> &'static dyn FieldAdapter {
    match FieldType::from_tag(tag) {
        Some(kind) => adapter_for(kind),
        None => {
            tracing::debug!(field_type = tag, "Unknown field type, using fallback adapter");
            &UnknownAdapter
        }
    }
}

/// Adapter of a field definition.
pub fn field_adapter(field: &FieldDefinition) -> &'static dyn FieldAdapter {
    resolve_adapter(&field.field_type)
}
