//! Which children become items.

use std::fmt;

use regex::Regex;
use serde::de::{Error as _, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dom::{DomTree, NodeId};

use super::config::ConfigError;

/// Filter deciding which child elements are items.
///
/// Tag names are compared lowercase. Non-element nodes are never items.
///
/// When deserialized, an array of strings becomes [`Tags`](Self::Tags), a
/// string becomes [`Pattern`](Self::Pattern), and any other value (object,
/// number, null) allows every element.
#[derive(Clone)]
pub enum AllowedChildren {
    /// Only these tag names.
    Tags(Vec<String>),
    /// Tag names matching this pattern.
    Pattern(Regex),
    /// Every element.
    Any,
}

impl Default for AllowedChildren {
    /// Custom element names, i.e. tags containing a hyphen.
    fn default() -> Self {
        Regex::new("-").map(Self::Pattern).unwrap_or(Self::Any)
    }
}

impl AllowedChildren {
    /// Allow exactly these tag names.
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Tags(
            tags.into_iter()
                .map(|t| t.as_ref().to_ascii_lowercase())
                .collect(),
        )
    }

    /// Allow tag names matching `pattern`.
    pub fn pattern(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    /// Whether `node` passes the filter.
    pub fn allows(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(tag) = tree.tag_name(node) else {
            return false;
        };
        match self {
            Self::Tags(tags) => tags.iter().any(|t| t == tag),
            Self::Pattern(pattern) => pattern.is_match(tag),
            Self::Any => true,
        }
    }
}

impl PartialEq for AllowedChildren {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Tags(a), Self::Tags(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            (Self::Any, Self::Any) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for AllowedChildren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tags(tags) => f.debug_tuple("Tags").field(tags).finish(),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.as_str()).finish(),
            Self::Any => f.write_str("Any"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Tags(Vec<String>),
    Pattern(String),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for AllowedChildren {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Tags(tags) => Self::tags(tags),
            Repr::Pattern(pattern) => Self::Pattern(Regex::new(&pattern).map_err(D::Error::custom)?),
            Repr::Other(_) => Self::Any,
        })
    }
}

impl Serialize for AllowedChildren {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Tags(tags) => tags.serialize(serializer),
            Self::Pattern(pattern) => serializer.serialize_str(pattern.as_str()),
            Self::Any => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_children() -> (DomTree, Vec<NodeId>) {
        let mut tree = DomTree::new();
        let nodes = vec![
            tree.create_element("test-item"),
            tree.create_element("BEST-ITEM"),
            tree.create_element("hooli-phone"),
            tree.create_text("text"),
            tree.create_element("div"),
        ];
        (tree, nodes)
    }

    fn allowed(filter: &AllowedChildren) -> Vec<usize> {
        let (tree, nodes) = mixed_children();
        nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| filter.allows(&tree, **n))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_default_allows_custom_elements() {
        assert_eq!(allowed(&AllowedChildren::default()), vec![0, 1, 2]);
    }

    #[test]
    fn test_tags_are_case_insensitive() {
        let filter = AllowedChildren::tags(["Test-Item", "best-item"]);
        assert_eq!(allowed(&filter), vec![0, 1]);
    }

    #[test]
    fn test_pattern() {
        let filter = AllowedChildren::pattern("item").unwrap();
        assert_eq!(allowed(&filter), vec![0, 1]);
        assert!(AllowedChildren::pattern("(").is_err());
    }

    #[test]
    fn test_any_still_rejects_text() {
        assert_eq!(allowed(&AllowedChildren::Any), vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_deserialize_shapes() {
        let parse = |json: &str| serde_json::from_str::<AllowedChildren>(json).unwrap();
        assert_eq!(parse(r#"["test-item"]"#), AllowedChildren::tags(["test-item"]));
        assert_eq!(parse(r#""item""#), AllowedChildren::pattern("item").unwrap());
        assert_eq!(parse("{}"), AllowedChildren::Any);
        assert_eq!(parse("1"), AllowedChildren::Any);
        assert_eq!(parse("null"), AllowedChildren::Any);
        assert_eq!(parse("[1, 2]"), AllowedChildren::Any);
        assert!(serde_json::from_str::<AllowedChildren>(r#""(""#).is_err());
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&AllowedChildren::tags(["a-b"])).unwrap();
        assert_eq!(json, r#"["a-b"]"#);
        let json = serde_json::to_string(&AllowedChildren::Any).unwrap();
        assert_eq!(json, "null");
    }
}
