//! Logging facilities for Horizon Select.
//!
//! Horizon Select uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_select::select=debug")
//!     .init();
//! ```
//!
//! Conditions that the selection layer absorbs (unparseable indices,
//! out-of-range targets, default-prevented keys) are reported at `debug`
//! or `trace` level under the targets below and are otherwise silent.

/// Names of the spans opened around reconciliation work.
pub mod span_names {
    /// Item reconciliation span.
    pub const RECONCILE: &str = "horizon_select::reconcile";
    /// Mutation batch processing span.
    pub const MUTATED: &str = "horizon_select::mutated";
    /// Host update cycle span.
    pub const FLUSH: &str = "horizon_select::flush";
}

/// `tracing` targets, one per subsystem.
pub mod targets {
    /// Everything in the core crate.
    pub const CORE: &str = "horizon_select_core";
    /// Signal connection and emission.
    pub const SIGNAL: &str = "horizon_select_core::signal";
    /// Element tree target.
    pub const DOM: &str = "horizon_select::dom";
    /// Event dispatch helper target.
    pub const FIRE: &str = "horizon_select::fire";
    /// Selection controller target.
    pub const SELECT: &str = "horizon_select::select";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_are_namespaced() {
        for target in [targets::DOM, targets::FIRE, targets::SELECT] {
            assert!(target.starts_with("horizon_select::"), "{target} is not namespaced");
        }
        assert!(targets::SIGNAL.starts_with(targets::CORE));
    }
}
