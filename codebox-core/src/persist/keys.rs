//! Fixed keys the engine persists under. Every consumer owns exactly one
//! key (tabs split their active id out so it can change without rewriting
//! the whole list).

/// Entire workspace tree as one `{ "root": ... }` JSON document.
pub const WORKSPACE: &str = "workspace";

/// Ordered list of open tabs.
pub const TABS: &str = "tabs";

/// Id of the active tab, if any.
pub const ACTIVE_TAB: &str = "active_tab";

/// Panel proportions.
pub const LAYOUT: &str = "layout";

/// Last execution output per file path.
pub const OUTPUTS: &str = "outputs";
