//! Items and the derived selection values.

use crate::dom::{EventDetail, NodeId};

use super::codec::{self, IndexList};

/// A child element recognized as selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
    node: NodeId,
    item_index: usize,
}

impl Item {
    pub(crate) fn new(node: NodeId, item_index: usize) -> Self {
        Self { node, item_index }
    }

    /// The element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Ordinal assigned at the last reconciliation. Also mirrored as the
    /// `data-item-index` attribute.
    pub fn item_index(&self) -> usize {
        self.item_index
    }
}

/// The currently selected item: one (or none) in single mode, a list in
/// multi mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedItem {
    Single(Option<NodeId>),
    Multi(Vec<NodeId>),
}

impl Default for SelectedItem {
    fn default() -> Self {
        SelectedItem::Single(None)
    }
}

impl SelectedItem {
    /// No item selected.
    pub fn is_empty(&self) -> bool {
        match self {
            SelectedItem::Single(node) => node.is_none(),
            SelectedItem::Multi(nodes) => nodes.is_empty(),
        }
    }

    /// The selected node in single mode.
    pub fn single(&self) -> Option<NodeId> {
        match self {
            SelectedItem::Single(node) => *node,
            SelectedItem::Multi(_) => None,
        }
    }

    /// All selected nodes, in item order.
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            SelectedItem::Single(node) => node.iter().copied().collect(),
            SelectedItem::Multi(nodes) => nodes.clone(),
        }
    }

    /// Rebuild from the payload of a `select` event.
    pub fn from_detail(detail: &EventDetail) -> Self {
        match detail {
            EventDetail::Node(node) => SelectedItem::Single(Some(*node)),
            EventDetail::Nodes(nodes) => SelectedItem::Multi(nodes.clone()),
            _ => SelectedItem::Single(None),
        }
    }
}

impl From<SelectedItem> for EventDetail {
    fn from(item: SelectedItem) -> Self {
        match item {
            SelectedItem::Single(Some(node)) => EventDetail::Node(node),
            SelectedItem::Single(None) => EventDetail::None,
            SelectedItem::Multi(nodes) => EventDetail::Nodes(nodes),
        }
    }
}

/// Position of the selected item(s) in the current item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedIndex {
    /// `None` when nothing is selected.
    Single(Option<usize>),
    Multi(Vec<usize>),
}

impl Default for SelectedIndex {
    fn default() -> Self {
        SelectedIndex::Single(None)
    }
}

impl SelectedIndex {
    pub fn single(&self) -> Option<usize> {
        match self {
            SelectedIndex::Single(index) => *index,
            SelectedIndex::Multi(_) => None,
        }
    }

    /// Whether this is the single index `index`, where `-1` means none.
    pub(crate) fn is_single(&self, index: i64) -> bool {
        match self {
            SelectedIndex::Single(Some(current)) => i64::try_from(*current).is_ok_and(|c| c == index),
            SelectedIndex::Single(None) => index == -1,
            SelectedIndex::Multi(_) => false,
        }
    }
}

impl From<&SelectedIndex> for IndexList {
    fn from(index: &SelectedIndex) -> Self {
        let to_i64 = |i: usize| i64::try_from(i).unwrap_or(i64::MAX);
        match index {
            SelectedIndex::Single(Some(i)) => IndexList::One(to_i64(*i)),
            SelectedIndex::Single(None) => IndexList::One(-1),
            SelectedIndex::Multi(indices) => IndexList::Many(indices.iter().copied().map(to_i64).collect()),
        }
    }
}

/// The `value` attribute of the selected item(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedValue {
    Single(Option<String>),
    Multi(Vec<Option<String>>),
}

impl Default for SelectedValue {
    fn default() -> Self {
        SelectedValue::Single(None)
    }
}

/// An index given as a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexArg {
    Number(i64),
    Text(String),
}

impl IndexArg {
    /// The integer this argument denotes. Strings are read like
    /// `parseInt`: leading digits count, trailing junk is ignored.
    pub fn to_index(&self) -> Option<i64> {
        match self {
            IndexArg::Number(n) => Some(*n),
            IndexArg::Text(text) => codec::parse_int(text).ok(),
        }
    }
}

impl From<i64> for IndexArg {
    fn from(n: i64) -> Self {
        IndexArg::Number(n)
    }
}

impl From<i32> for IndexArg {
    fn from(n: i32) -> Self {
        IndexArg::Number(n.into())
    }
}

impl From<usize> for IndexArg {
    fn from(n: usize) -> Self {
        IndexArg::Number(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<&str> for IndexArg {
    fn from(text: &str) -> Self {
        IndexArg::Text(text.to_string())
    }
}

impl From<String> for IndexArg {
    fn from(text: String) -> Self {
        IndexArg::Text(text)
    }
}

/// Index after `current`, wrapping from the last item to the first. With
/// nothing current the first item is next.
pub(crate) fn next_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    })
}

/// Index before `current`, wrapping from the first item to the last. With
/// nothing current the last item is previous.
pub(crate) fn previous_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i > 0 => (i - 1).min(len - 1),
        _ => len - 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_around() {
        assert_eq!(next_index(Some(2), 3), Some(0));
        assert_eq!(next_index(Some(0), 3), Some(1));
        assert_eq!(next_index(None, 3), Some(0));
        assert_eq!(previous_index(Some(0), 3), Some(2));
        assert_eq!(previous_index(Some(2), 3), Some(1));
        assert_eq!(previous_index(None, 3), Some(2));
        assert_eq!(next_index(None, 0), None);
        assert_eq!(previous_index(Some(1), 0), None);
    }

    #[test]
    fn test_stale_index_is_clamped() {
        // The list shrank since the index was computed.
        assert_eq!(previous_index(Some(7), 3), Some(2));
        assert_eq!(next_index(Some(7), 3), Some(0));
    }

    #[test]
    fn test_index_arg_parsing() {
        assert_eq!(IndexArg::from(3usize).to_index(), Some(3));
        assert_eq!(IndexArg::from("  2px").to_index(), Some(2));
        assert_eq!(IndexArg::from("-1").to_index(), Some(-1));
        assert_eq!(IndexArg::from("two").to_index(), None);
    }

    #[test]
    fn test_selected_index_is_single() {
        assert!(SelectedIndex::Single(None).is_single(-1));
        assert!(SelectedIndex::Single(Some(2)).is_single(2));
        assert!(!SelectedIndex::Single(Some(2)).is_single(1));
        assert!(!SelectedIndex::Multi(vec![1]).is_single(1));
    }

    #[test]
    fn test_selected_item_detail() {
        let empty = SelectedItem::Multi(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(EventDetail::from(SelectedItem::Single(None)), EventDetail::None);
        assert_eq!(
            SelectedItem::from_detail(&EventDetail::Nodes(Vec::new())),
            SelectedItem::Multi(Vec::new())
        );
    }
}
