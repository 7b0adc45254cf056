use serde::{Deserialize, Serialize};

/// Explorer panel bounds, in percent of viewport width. Dragging below the
/// collapse threshold snaps the panel shut.
pub const EXPLORER_MIN_PCT: f32 = 10.0;
pub const EXPLORER_MAX_PCT: f32 = 40.0;
pub const EXPLORER_COLLAPSE_BELOW_PCT: f32 = 5.0;

/// Editor panel bounds, in percent of viewport height; the terminal panel
/// takes the rest.
pub const EDITOR_MIN_PCT: f32 = 30.0;
pub const EDITOR_MAX_PCT: f32 = 90.0;

/// Panel proportions, persisted as percentages of the viewport so they
/// carry across window-size changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetrics {
    pub explorer_width_pct: f32,
    pub editor_height_pct: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            explorer_width_pct: 18.0,
            editor_height_pct: 65.0,
        }
    }
}

impl LayoutMetrics {
    /// Applies an explorer drag: out-of-range values clamp, and anything
    /// below the collapse threshold snaps the panel to zero.
    pub fn set_explorer_width(&mut self, pct: f32) {
        if pct < EXPLORER_COLLAPSE_BELOW_PCT {
            self.explorer_width_pct = 0.0;
            return;
        }
        self.explorer_width_pct = pct.clamp(EXPLORER_MIN_PCT, EXPLORER_MAX_PCT);
    }

    pub fn set_editor_height(&mut self, pct: f32) {
        self.editor_height_pct = pct.clamp(EDITOR_MIN_PCT, EDITOR_MAX_PCT);
    }

    pub fn explorer_collapsed(&self) -> bool {
        self.explorer_width_pct == 0.0
    }

    /// Re-applies the setters to persisted values, so out-of-range data
    /// from an older session (or a corrupt write) cannot leak through.
    pub fn sanitized(mut self) -> Self {
        let explorer = self.explorer_width_pct;
        let editor = self.editor_height_pct;
        self.set_explorer_width(explorer);
        self.set_editor_height(editor);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drags_clamp_to_bounds() {
        let mut layout = LayoutMetrics::default();
        layout.set_explorer_width(99.0);
        assert_eq!(layout.explorer_width_pct, EXPLORER_MAX_PCT);

        layout.set_explorer_width(7.0);
        assert_eq!(layout.explorer_width_pct, EXPLORER_MIN_PCT);

        layout.set_editor_height(5.0);
        assert_eq!(layout.editor_height_pct, EDITOR_MIN_PCT);
        layout.set_editor_height(100.0);
        assert_eq!(layout.editor_height_pct, EDITOR_MAX_PCT);
    }

    #[test]
    fn dragging_far_enough_collapses_the_explorer() {
        let mut layout = LayoutMetrics::default();
        layout.set_explorer_width(2.0);
        assert!(layout.explorer_collapsed());

        // dragging back out re-opens at the minimum
        layout.set_explorer_width(12.0);
        assert!(!layout.explorer_collapsed());
        assert_eq!(layout.explorer_width_pct, 12.0);
    }

    #[test]
    fn persisted_shape_is_camel_case() {
        let json = serde_json::to_string(&LayoutMetrics::default()).unwrap();
        assert!(json.contains("explorerWidthPct"));
        assert!(json.contains("editorHeightPct"));
    }

    #[test]
    fn sanitize_repairs_out_of_range_values() {
        let layout = LayoutMetrics {
            explorer_width_pct: 80.0,
            editor_height_pct: -3.0,
        }
        .sanitized();
        assert_eq!(layout.explorer_width_pct, EXPLORER_MAX_PCT);
        assert_eq!(layout.editor_height_pct, EDITOR_MIN_PCT);
    }
}
