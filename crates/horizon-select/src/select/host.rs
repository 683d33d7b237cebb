//! Observable properties and the changed-properties diff.
//!
//! Every property a [`SelectController`](super::SelectController) exposes
//! is named by a [`SelectProperty`]. A change request records the value the
//! property had before; the next update cycle compares it with the current
//! value and reports the properties that really changed.

use horizon_select_core::PropertyMeta;

use crate::dom::NodeId;

use super::codec::IndexList;
use super::item::{SelectedIndex, SelectedItem, SelectedValue};

/// The observable properties of a selectable collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectProperty {
    Items,
    Multi,
    AttributeForSelected,
    SelectedIndex,
    SelectedItem,
    Value,
    FocusedIndex,
    FocusedItem,
}

impl SelectProperty {
    /// Every property, in declaration order.
    pub const ALL: [SelectProperty; 8] = [
        SelectProperty::Items,
        SelectProperty::Multi,
        SelectProperty::AttributeForSelected,
        SelectProperty::SelectedIndex,
        SelectProperty::SelectedItem,
        SelectProperty::Value,
        SelectProperty::FocusedIndex,
        SelectProperty::FocusedItem,
    ];

    pub fn meta(self) -> PropertyMeta {
        match self {
            SelectProperty::Items => PropertyMeta::new("items", None, true),
            SelectProperty::Multi => PropertyMeta::new("multi", Some("multi"), false),
            SelectProperty::AttributeForSelected => {
                PropertyMeta::new("attribute_for_selected", Some("attribute-for-selected"), false)
            }
            SelectProperty::SelectedIndex => PropertyMeta::new("selected_index", Some("selected-index"), false),
            SelectProperty::SelectedItem => PropertyMeta::new("selected_item", None, true),
            SelectProperty::Value => PropertyMeta::new("value", None, true),
            SelectProperty::FocusedIndex => PropertyMeta::new("focused_index", None, true),
            SelectProperty::FocusedItem => PropertyMeta::new("focused_item", None, true),
        }
    }

    pub fn name(self) -> &'static str {
        self.meta().name
    }

    /// Look up a property by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Look up the property reflecting an attribute.
    pub fn from_attribute(attribute: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.meta().attribute == Some(attribute))
    }

    /// Kind of value the property holds, for error messages.
    pub(crate) fn value_kind(self) -> &'static str {
        match self {
            SelectProperty::Items => "nodes",
            SelectProperty::Multi => "bool",
            SelectProperty::AttributeForSelected => "text",
            SelectProperty::SelectedIndex => "selected index",
            SelectProperty::SelectedItem => "selected item",
            SelectProperty::Value => "value",
            SelectProperty::FocusedIndex => "focused index",
            SelectProperty::FocusedItem => "focused item",
        }
    }
}

/// A property value, as reported in change notifications or passed to
/// [`SelectController::set_property`](super::SelectController::set_property).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Bool(bool),
    Text(String),
    Nodes(Vec<NodeId>),
    SelectedItem(SelectedItem),
    SelectedIndex(SelectedIndex),
    Value(SelectedValue),
    FocusedItem(Option<NodeId>),
    FocusedIndex(Option<usize>),
    /// Indices to select, as parsed from the `selected-index` attribute.
    Indices(IndexList),
}

impl PropertyValue {
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Text(_) => "text",
            PropertyValue::Nodes(_) => "nodes",
            PropertyValue::SelectedItem(_) => "selected item",
            PropertyValue::SelectedIndex(_) => "selected index",
            PropertyValue::Value(_) => "value",
            PropertyValue::FocusedItem(_) => "focused item",
            PropertyValue::FocusedIndex(_) => "focused index",
            PropertyValue::Indices(_) => "indices",
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<IndexList> for PropertyValue {
    fn from(value: IndexList) -> Self {
        PropertyValue::Indices(value)
    }
}

impl From<SelectedItem> for PropertyValue {
    fn from(value: SelectedItem) -> Self {
        PropertyValue::SelectedItem(value)
    }
}

impl From<SelectedIndex> for PropertyValue {
    fn from(value: SelectedIndex) -> Self {
        PropertyValue::SelectedIndex(value)
    }
}

impl From<SelectedValue> for PropertyValue {
    fn from(value: SelectedValue) -> Self {
        PropertyValue::Value(value)
    }
}

/// One reported property change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub property: SelectProperty,
    pub old: PropertyValue,
    pub new: PropertyValue,
}

/// Properties changed since the last update, each with its value before the
/// first change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedProperties {
    entries: Vec<(SelectProperty, PropertyValue)>,
}

impl ChangedProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `old` for `property` unless it is already recorded.
    pub fn record(&mut self, property: SelectProperty, old: PropertyValue) {
        if !self.has(property) {
            self.entries.push((property, old));
        }
    }

    pub fn has(&self, property: SelectProperty) -> bool {
        self.entries.iter().any(|(p, _)| *p == property)
    }

    /// The value `property` had before it changed.
    pub fn get(&self, property: SelectProperty) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Changed properties in the order they were first recorded.
    pub fn iter(&self) -> impl Iterator<Item = (SelectProperty, &PropertyValue)> {
        self.entries.iter().map(|(p, v)| (*p, v))
    }
}

impl IntoIterator for ChangedProperties {
    type Item = (SelectProperty, PropertyValue);
    type IntoIter = std::vec::IntoIter<(SelectProperty, PropertyValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
