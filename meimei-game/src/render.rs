//! Contract between the guess controller and whatever draws the map.
//!
//! Implementors own all presentation: shapes, overlays, images and hit
//! targets. The controller treats every drawing call as fire-and-forget.
use serde::{Deserialize, Serialize};

use crate::catalog::Location;
use crate::geometry::{Point, ViewTransform};

/// Tagged controls the controller reacts to while an overlay is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlTag {
    /// Continue button on the feedback message box.
    Continue,
    /// Continue button under the travel path replay.
    TravelPathContinue,
}

/// Opaque identifier of a node in the collaborator's scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Raw pointer input as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Pointer position in display space, if the host could supply one.
    pub position: Option<Point>,
    /// Scene node the pointer landed on, if any.
    pub node: Option<NodeId>,
}

impl PointerEvent {
    #[must_use]
    pub const fn at(position: Point) -> Self {
        Self {
            position: Some(position),
            node: None,
        }
    }

    #[must_use]
    pub const fn on_node(position: Point, node: NodeId) -> Self {
        Self {
            position: Some(position),
            node: Some(node),
        }
    }

    /// Event without pointer coordinates (e.g. synthetic).
    #[must_use]
    pub const fn without_position() -> Self {
        Self {
            position: None,
            node: None,
        }
    }
}

/// Drawing capabilities consumed by the guess controller.
pub trait RenderCollaborator {
    fn draw_correct_marker(&mut self, display: Point);

    fn draw_incorrect_marker(&mut self, display: Point);

    /// Show a dismissible message carrying a continue control.
    fn show_feedback(&mut self, text: &str, is_correct_guess: bool);

    fn clear_markers(&mut self);

    fn clear_feedback(&mut self);

    /// Draw a connected, numbered path through `points` (display space, in
    /// order) together with its continue control.
    fn show_travel_path(&mut self, points: &[Point]);

    fn hide_travel_path(&mut self);

    fn update_hint_display(&mut self, hint: &str, city: &str, country: &str);

    fn update_days_travelled(&mut self, _days: u32) {}

    fn show_target_indicator(&mut self, _location: &Location) {}

    fn hide_target_indicator(&mut self) {}

    /// Resolve which tagged control, if any, an event landed on.
    fn hit_test(&self, event: &PointerEvent) -> Option<ControlTag>;

    /// Current zoom/pan of the map.
    fn view_transform(&self) -> ViewTransform {
        ViewTransform::identity()
    }

    fn to_display_space(&self, native: Point) -> Point {
        self.view_transform().to_display(native)
    }

    fn to_native_space(&self, display: Point) -> Point {
        self.view_transform().to_native(display)
    }
}
