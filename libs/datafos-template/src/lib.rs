//! Template rendering for datafos forms.
//!
//! Templates are HTML strings with `[[field]]`, `[[field#id]]`,
//! `[[field#name]]`, `[[field#description]]` and `##global##` tokens.
//! Rendering is a pure function of the template, the field list and the
//! content being shown; nothing is cached between calls.

pub mod kind;
pub mod maintain;
pub mod render;
pub mod token;

pub use kind::TemplateKind;
pub use maintain::{append_field_tokens, default_template, duplicate_tokens, rename_field_tokens};
pub use render::{render_entry_template, render_search_template, EntryMode, EntryView, SearchView};
pub use token::{FieldPart, GlobalToken, Segment, Token, Tokenizer};
