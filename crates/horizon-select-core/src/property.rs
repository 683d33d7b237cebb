//! Change-detecting values and property metadata.
//!
//! [`Property`] stores a value behind a lock and tells the caller whether a
//! write changed it, so owners only notify on real changes.
//! [`PropertyMeta`] describes an observable property: its name, the
//! attribute that reflects it, and whether assignments are ignored.
//!
//! ```
//! use horizon_select_core::property::Property;
//!
//! let multi = Property::new(false);
//! assert_eq!(multi.replace(true), Some(false));
//! assert_eq!(multi.replace(true), None);
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value with change detection. `Send + Sync` when `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// A clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Store `value`. Returns whether it differed from the old value.
    pub fn set(&self, value: T) -> bool {
        self.replace(value).is_some()
    }

    /// Store `value`, handing back the old value when it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        (*current != value).then(|| std::mem::replace(&mut *current, value))
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.get()).finish()
    }
}

/// Describes one observable property of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyMeta {
    pub name: &'static str,
    /// Attribute reflecting the property, if any.
    pub attribute: Option<&'static str>,
    /// Assignments are accepted and ignored.
    pub read_only: bool,
}

impl PropertyMeta {
    pub const fn new(name: &'static str, attribute: Option<&'static str>, read_only: bool) -> Self {
        Self {
            name,
            attribute,
            read_only,
        }
    }
}

/// Errors assigning a property dynamically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("no property named '{name}'")]
    NotFound { name: String },

    #[error("cannot assign {got} to '{name}' (expects {expected})")]
    TypeMismatch {
        name: &'static str,
        expected: &'static str,
        got: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reports_change() {
        let index = Property::new(Some(1_usize));
        assert!(!index.set(Some(1)));
        assert!(index.set(None));
        assert_eq!(index.get(), None);
    }

    #[test]
    fn test_replace_returns_old_value() {
        let marker = Property::new("selected".to_string());
        assert_eq!(marker.replace("selected".to_string()), None);
        assert_eq!(marker.replace("checked".to_string()).as_deref(), Some("selected"));
        assert_eq!(marker.get(), "checked");
    }

    #[test]
    fn test_get_clones_collections() {
        let items = Property::new(vec!["a", "b", "c"]);
        let mut copy = items.get();
        copy.pop();
        assert_eq!(items.get().len(), 3);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Property::new(false);
        let copy = original.clone();
        copy.set(true);
        assert!(!original.get());
    }

    #[test]
    fn test_error_messages() {
        let err = PropertyError::NotFound { name: "bogus".into() };
        assert_eq!(err.to_string(), "no property named 'bogus'");
        let err = PropertyError::TypeMismatch {
            name: "multi",
            expected: "bool",
            got: "text",
        };
        assert_eq!(err.to_string(), "cannot assign text to 'multi' (expects bool)");
    }
}
