use super::Element;

/// The selector subset the page features need: a bare tag, `.class`, `#id`
/// or `[attr="value"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    Class(String),
    Id(String),
    Attr { name: String, value: String },
}

impl Selector {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(class) = raw.strip_prefix('.') {
            return Selector::Class(class.to_string());
        }
        if let Some(id) = raw.strip_prefix('#') {
            return Selector::Id(id.to_string());
        }
        if let Some(inner) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let (name, value) = inner.split_once('=').unwrap_or((inner, ""));
            return Selector::Attr {
                name: name.trim().to_string(),
                value: value.trim().trim_matches(|c| c == '"' || c == '\'').to_string(),
            };
        }
        Selector::Tag(raw.to_ascii_lowercase())
    }

    /// Parses a comma separated group such as `main, [role="main"], article`.
    pub fn parse_group(raw: &str) -> Vec<Self> {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Selector::parse)
            .collect()
    }

    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Selector::Tag(tag) => element.tag.eq_ignore_ascii_case(tag),
            Selector::Class(class) => element.has_class(class),
            Selector::Id(id) => element.id.as_deref() == Some(id.as_str()),
            Selector::Attr { name, value } => {
                element.attrs.get(name).map(String::as_str) == Some(value.as_str())
            }
        }
    }
}
