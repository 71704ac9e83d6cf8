use std::collections::HashMap;

use meimei_game::{
    ControlTag, Location, NodeId, Point, PointerEvent, RenderCollaborator, ViewTransform,
};
use serde::Serialize;

/// Every drawing request the controller made, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    CorrectMarker { at: Point },
    IncorrectMarker { at: Point },
    Feedback { text: String, correct: bool },
    ClearMarkers,
    ClearFeedback,
    TravelPath { points: Vec<Point> },
    HideTravelPath,
    Hint { hint: String, city: String, country: String },
    Days { days: u32 },
    ShowTarget { city: String },
    HideTarget,
}

#[derive(Debug, Clone, Copy)]
struct SceneNode {
    parent: Option<NodeId>,
    tag: Option<ControlTag>,
}

/// A continue button with a text label stacked on top of it.
#[derive(Debug, Clone, Copy)]
struct Button {
    frame: NodeId,
    label: NodeId,
}

/// Render collaborator without a screen: keeps a tiny scene graph for
/// hit-testing and a log of every command for assertions.
#[derive(Debug, Default)]
pub struct HeadlessView {
    transform: ViewTransform,
    nodes: HashMap<NodeId, SceneNode>,
    next_id: u64,
    feedback_button: Option<Button>,
    path_button: Option<Button>,
    commands: Vec<RenderCommand>,
}

impl HeadlessView {
    #[must_use]
    pub fn new(transform: ViewTransform) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn into_commands(self) -> Vec<RenderCommand> {
        self.commands
    }

    /// Node a player would click to continue past the feedback box.
    #[must_use]
    pub fn feedback_control(&self) -> Option<NodeId> {
        self.feedback_button.map(|button| button.label)
    }

    /// Node a player would click to continue past the travel path.
    #[must_use]
    pub fn travel_path_control(&self) -> Option<NodeId> {
        self.path_button.map(|button| button.label)
    }

    fn spawn(&mut self, parent: Option<NodeId>, tag: Option<ControlTag>) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(id, SceneNode { parent, tag });
        id
    }

    fn spawn_button(&mut self, tag: ControlTag) -> Button {
        let frame = self.spawn(None, Some(tag));
        let label = self.spawn(Some(frame), None);
        Button { frame, label }
    }

    fn despawn_button(&mut self, button: Option<Button>) {
        if let Some(button) = button {
            self.nodes.remove(&button.label);
            self.nodes.remove(&button.frame);
        }
    }
}

impl RenderCollaborator for HeadlessView {
    fn draw_correct_marker(&mut self, display: Point) {
        self.commands.push(RenderCommand::CorrectMarker { at: display });
    }

    fn draw_incorrect_marker(&mut self, display: Point) {
        self.commands
            .push(RenderCommand::IncorrectMarker { at: display });
    }

    fn show_feedback(&mut self, text: &str, is_correct_guess: bool) {
        let previous = self.feedback_button.take();
        self.despawn_button(previous);
        self.feedback_button = Some(self.spawn_button(ControlTag::Continue));
        self.commands.push(RenderCommand::Feedback {
            text: text.to_string(),
            correct: is_correct_guess,
        });
    }

    fn clear_markers(&mut self) {
        self.commands.push(RenderCommand::ClearMarkers);
    }

    fn clear_feedback(&mut self) {
        let button = self.feedback_button.take();
        self.despawn_button(button);
        self.commands.push(RenderCommand::ClearFeedback);
    }

    fn show_travel_path(&mut self, points: &[Point]) {
        let previous = self.path_button.take();
        self.despawn_button(previous);
        self.path_button = Some(self.spawn_button(ControlTag::TravelPathContinue));
        self.commands.push(RenderCommand::TravelPath {
            points: points.to_vec(),
        });
    }

    fn hide_travel_path(&mut self) {
        let button = self.path_button.take();
        self.despawn_button(button);
        self.commands.push(RenderCommand::HideTravelPath);
    }

    fn update_hint_display(&mut self, hint: &str, city: &str, country: &str) {
        self.commands.push(RenderCommand::Hint {
            hint: hint.to_string(),
            city: city.to_string(),
            country: country.to_string(),
        });
    }

    fn update_days_travelled(&mut self, days: u32) {
        self.commands.push(RenderCommand::Days { days });
    }

    fn show_target_indicator(&mut self, location: &Location) {
        self.commands.push(RenderCommand::ShowTarget {
            city: location.city.clone(),
        });
    }

    fn hide_target_indicator(&mut self) {
        self.commands.push(RenderCommand::HideTarget);
    }

    fn hit_test(&self, event: &PointerEvent) -> Option<ControlTag> {
        let mut current = event.node;
        while let Some(id) = current {
            let node = self.nodes.get(&id)?;
            if node.tag.is_some() {
                return node.tag;
            }
            current = node.parent;
        }
        None
    }

    fn view_transform(&self) -> ViewTransform {
        self.transform
    }
}
