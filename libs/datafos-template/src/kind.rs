use std::fmt;
use std::str::FromStr;

/// The templates a form carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    List,
    Single,
    AdvancedSearch,
    AddEntry,
    Rss,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 5] = [
        Self::List,
        Self::Single,
        Self::AdvancedSearch,
        Self::AddEntry,
        Self::Rss,
    ];

    /// Templates that receive a new field's tokens when it is created.
    pub const APPEND_TARGETS: [TemplateKind; 3] = [Self::Single, Self::AddEntry, Self::Rss];

    /// Column name of the template on the form.
    pub fn column(&self) -> &'static str {
        match self {
            Self::List => "listtemplate",
            Self::Single => "singletemplate",
            Self::AdvancedSearch => "asearchtemplate",
            Self::AddEntry => "addtemplate",
            Self::Rss => "rsstemplate",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" | "listtemplate" => Ok(Self::List),
            "single" | "singletemplate" => Ok(Self::Single),
            "asearch" | "search" | "asearchtemplate" => Ok(Self::AdvancedSearch),
            "add" | "addtemplate" => Ok(Self::AddEntry),
            "rss" | "rsstemplate" => Ok(Self::Rss),
            other => Err(format!("unknown template kind: {}", other)),
        }
    }
}
