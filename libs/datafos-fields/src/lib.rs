//! Field definitions, search criteria and field type adapters for datafos.
//!
//! Everything here is synchronous and free of storage concerns: adapters
//! produce markup and SQL fragments, callers execute them.
//!
//! ```
//! use datafos_fields::{resolve_adapter, FieldDefinition, SearchValue};
//!
//! let mut field = FieldDefinition::new(1, "checkbox", "Colours").with_param(1, "Red\nBlue");
//! field.id = 3;
//! let value = SearchValue::Selection { selected: vec!["Red".into()], all_required: false };
//! let fragment = datafos_fields::generate_search_sql(resolve_adapter("checkbox"), &field, "c3", &value);
//! assert_eq!(fragment.params.len(), 4);
//! ```

pub mod adapter;
pub mod criteria;
pub mod error;
pub mod labels;
pub mod model;
pub mod registry;
pub mod sql;

pub use adapter::latlong::{kml_document, Placemark};
pub use adapter::{generate_search_sql, EditInput, FieldAdapter};
pub use criteria::{
    strip_tags, CriteriaMap, CriterionKey, RequestParams, SearchCriterion, SearchValue,
};
pub use error::{Error, Result};
pub use labels::{OptionLabels, RenderContext};
pub use model::{
    FieldDefinition, FieldType, Record, RecordContent, SubmittedValue, UserSummary,
    EMPTY_SELECTION_SENTINEL, MULTI_VALUE_SEPARATOR, PARAM_SLOTS,
};
pub use registry::{adapter_for, field_adapter, resolve_adapter};
pub use sql::{escape_like_pattern, push_id_list, push_int, push_text, BindValue, SqlFragment};
