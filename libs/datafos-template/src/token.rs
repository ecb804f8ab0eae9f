//! Template tokenizer.
//!
//! One case-insensitive regex is built per field list. Field names are
//! regex-escaped and each gets its own capture group, so a match tells
//! which field it names without a second lookup by string.

use datafos_fields::FieldDefinition;
use regex::{Captures, Regex};

/// Which view of a field a `[[name...]]` token asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPart {
    /// `[[name]]`: the rendered control or value.
    Value,
    /// `[[name#id]]`
    Id,
    /// `[[name#name]]`
    Name,
    /// `[[name#description]]`
    Description,
}

/// `##...##` tokens understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalToken {
    OtherFields,
    FirstName,
    LastName,
    Tags,
    Id,
    User,
    TimeAdded,
    TimeModified,
    ApprovalStatus,
}

impl GlobalToken {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "otherfields" => Some(Self::OtherFields),
            "firstname" => Some(Self::FirstName),
            "lastname" => Some(Self::LastName),
            "tags" => Some(Self::Tags),
            "id" => Some(Self::Id),
            "user" => Some(Self::User),
            "timeadded" => Some(Self::TimeAdded),
            "timemodified" => Some(Self::TimeModified),
            "approvalstatus" => Some(Self::ApprovalStatus),
            _ => None,
        }
    }
}

const GLOBALS: &str =
    "otherfields|firstname|lastname|tags|id|user|timeadded|timemodified|approvalstatus";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'f> {
    Field {
        field: &'f FieldDefinition,
        part: FieldPart,
    },
    Global(GlobalToken),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t, 'f> {
    Literal(&'t str),
    /// A recognised token and the template text it was read from.
    Token(Token<'f>, &'t str),
}

/// Compiled token pattern for one field list.
#[derive(Debug)]
pub struct Tokenizer<'f> {
    fields: &'f [FieldDefinition],
    regex: Regex,
}

impl<'f> Tokenizer<'f> {
    pub fn new(fields: &'f [FieldDefinition]) -> Result<Self, regex::Error> {
        let mut pattern = String::from("(?i)");
        let alternatives: Vec<String> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.name.is_empty())
            .map(|(i, f)| format!("(?P<f{}>{})", i, regex::escape(&f.name)))
            .collect();
        if !alternatives.is_empty() {
            pattern.push_str(&format!(
                r"\[\[(?:{})(?:#(?P<part>id|name|description))?\]\]|",
                alternatives.join("|")
            ));
        }
        pattern.push_str(&format!("##(?P<global>{})##", GLOBALS));
        Ok(Self {
            fields,
            regex: Regex::new(&pattern)?,
        })
    }

    fn token(&self, caps: &Captures<'_>) -> Option<Token<'f>> {
        if let Some(global) = caps.name("global") {
            return GlobalToken::from_name(global.as_str()).map(Token::Global);
        }
        let index = (0..self.fields.len()).find(|i| caps.name(&format!("f{}", i)).is_some())?;
        let part = match caps
            .name("part")
            .map(|m| m.as_str().to_ascii_lowercase())
            .as_deref()
        {
            Some("id") => FieldPart::Id,
            Some("name") => FieldPart::Name,
            Some("description") => FieldPart::Description,
            _ => FieldPart::Value,
        };
        Some(Token::Field {
            field: &self.fields[index],
            part,
        })
    }

    /// Split a template into literal text and recognised tokens.
    ///
    /// Anything not recognised, including unbalanced brackets and tokens of
    /// fields not in the list, stays literal.
    pub fn segments<'t>(&self, template: &'t str) -> Vec<Segment<'t, 'f>> {
        let mut out = Vec::new();
        let mut last = 0;
        for caps in self.regex.captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let Some(token) = self.token(&caps) else {
                continue;
            };
            if whole.start() > last {
                out.push(Segment::Literal(&template[last..whole.start()]));
            }
            out.push(Segment::Token(token, whole.as_str()));
            last = whole.end();
        }
        if last < template.len() {
            out.push(Segment::Literal(&template[last..]));
        }
        out
    }
}

/// Ids of fields whose `[[name]]` value token occurs in the segments.
pub fn placed_field_ids(segments: &[Segment<'_, '_>]) -> Vec<i64> {
    segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::Token(
                Token::Field {
                    field,
                    part: FieldPart::Value,
                },
                _,
            ) => Some(field.id),
            _ => None,
        })
        .collect()
}
