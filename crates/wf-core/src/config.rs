//! Canvas tunables.
//!
//! All values are in canvas units unless noted otherwise. The host can
//! override any subset by passing JSON; missing fields keep their defaults.

use crate::error::CanvasError;
use crate::geometry::Grid;
use serde::{Deserialize, Serialize};

/// Configuration for the interaction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Horizontal grid unit used for snapping. Default: **5**.
    pub grid_size_x: f64,
    /// Vertical grid unit used for snapping. Default: **5**.
    pub grid_size_y: f64,
    /// Width/height of a node's visual box. Default: **32**.
    pub node_size: f64,
    /// Extra distance that turns a nearby node into a replacement candidate.
    /// Default: **150**.
    pub replace_distance: f64,
    /// Upper bound (inclusive) of annotation width and height. Default: **6000**.
    pub max_annotation_size: f64,
    /// Minimum move that counts as a drag for bendpoints. Default: **1**.
    pub bendpoint_move_threshold: f64,
    /// Screen-pixel distance from the viewport edge that starts edge panning.
    pub edge_pan_margin: f64,
    /// Base edge-pan nudge per frame, divided by the zoom factor. Default: **5**.
    pub edge_pan_step: f64,
    /// Maximum time between two pointer-downs of a double click. Default: **200**.
    pub double_click_window_ms: f64,
    /// Allowed client-coordinate distance for a double click; 0 means exact.
    pub double_click_epsilon: f64,
    pub tooltip_show_delay_ms: f64,
    pub tooltip_hide_delay_ms: f64,
    /// Size of an annotation resize handle box.
    pub transform_handle_size: f64,
    /// Screen pixels the camera moves per arrow key press.
    pub keyboard_pan_step: f64,
    /// Stroke width of the invisible connection hover hit areas.
    pub connection_hover_width: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size_x: 5.0,
            grid_size_y: 5.0,
            node_size: 32.0,
            replace_distance: 150.0,
            max_annotation_size: 6000.0,
            bendpoint_move_threshold: 1.0,
            edge_pan_margin: 40.0,
            edge_pan_step: 5.0,
            double_click_window_ms: 200.0,
            double_click_epsilon: 0.0,
            tooltip_show_delay_ms: 750.0,
            tooltip_hide_delay_ms: 550.0,
            transform_handle_size: 6.0,
            keyboard_pan_step: 50.0,
            connection_hover_width: 10.0,
        }
    }
}

impl CanvasConfig {
    /// Parse and validate a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CanvasError::decode("canvas config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CanvasError> {
        let positive = [
            ("gridSizeX", self.grid_size_x),
            ("gridSizeY", self.grid_size_y),
            ("nodeSize", self.node_size),
            ("maxAnnotationSize", self.max_annotation_size),
            ("bendpointMoveThreshold", self.bendpoint_move_threshold),
            ("doubleClickWindowMs", self.double_click_window_ms),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CanvasError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        let non_negative = [
            ("replaceDistance", self.replace_distance),
            ("edgePanMargin", self.edge_pan_margin),
            ("edgePanStep", self.edge_pan_step),
            ("doubleClickEpsilon", self.double_click_epsilon),
            ("tooltipShowDelayMs", self.tooltip_show_delay_ms),
            ("tooltipHideDelayMs", self.tooltip_hide_delay_ms),
            ("transformHandleSize", self.transform_handle_size),
            ("keyboardPanStep", self.keyboard_pan_step),
            ("connectionHoverWidth", self.connection_hover_width),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CanvasError::InvalidConfig(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_size_x, self.grid_size_y)
    }

    /// Cell size of the collision spatial hash.
    pub fn collision_cell_size(&self) -> f64 {
        self.node_size + self.replace_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CanvasConfig::from_json(r#"{"gridSizeX": 10, "replaceDistance": 80}"#)
            .expect("valid config");
        assert_eq!(config.grid_size_x, 10.0);
        assert_eq!(config.grid_size_y, 5.0);
        assert_eq!(config.replace_distance, 80.0);
        assert_eq!(config.collision_cell_size(), 112.0);
    }

    #[test]
    fn rejects_zero_grid() {
        let err = CanvasConfig::from_json(r#"{"gridSizeY": 0}"#).unwrap_err();
        assert!(matches!(err, CanvasError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = CanvasConfig::from_json("{nope").unwrap_err();
        assert!(matches!(err, CanvasError::Decode { .. }));
    }
}
