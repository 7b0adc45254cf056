//! Tab and session state.
//!
//! Tracks which files are open, which one is active, and the panel
//! proportions, independently of the workspace store's own persistence.
//! Tabs reference files by id so they survive renames; anything that no
//! longer resolves is pruned on load.

pub mod layout;
pub mod tabs;

pub use layout::LayoutMetrics;
pub use tabs::{SessionState, Tab};
