//! Crate-level error type.

use horizon_select_core::PropertyError;

use crate::dom::DomError;
use crate::select::{CodecError, ConfigError};

/// Result type alias for fallible selection operations.
pub type Result<T> = std::result::Result<T, SelectError>;

/// Any error raised by this crate.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Property(#[from] PropertyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomTree;
    use crate::select::{IndexList, SelectConfig};

    fn append_to_text(tree: &mut DomTree) -> Result<()> {
        let text = tree.create_text("leaf");
        let child = tree.create_element("x-item");
        tree.append_child(text, child)?;
        Ok(())
    }

    #[test]
    fn test_errors_convert_with_question_mark() {
        let mut tree = DomTree::new();
        assert!(matches!(append_to_text(&mut tree), Err(SelectError::Dom(DomError::HierarchyRequest { .. }))));

        let codec: Result<IndexList> = "x".parse::<IndexList>().map_err(SelectError::from);
        assert!(matches!(codec, Err(SelectError::Codec(CodecError::NotAnInteger(_)))));

        let config = SelectConfig::from_json_str("[").map_err(SelectError::from);
        assert!(matches!(config, Err(SelectError::Config(ConfigError::Json(_)))));
    }

    #[test]
    fn test_display_is_transparent() {
        let err = SelectError::from(PropertyError::NotFound { name: "bogus".into() });
        assert_eq!(err.to_string(), PropertyError::NotFound { name: "bogus".into() }.to_string());
    }
}
