//! Guess controller: sequences guess, feedback, advance and travel-path replay.
//!
//! All transitions run synchronously inside [`GuessController::handle_pointer`]
//! (or [`GuessController::press_continue`]). Feedback and the travel path are
//! modal: while either is open, map clicks are never judged as guesses.
use serde::{Deserialize, Serialize};

use crate::catalog::Location;
use crate::constants::{
    MSG_CORRECT_BELONGS, MSG_CORRECT_PREFIX, MSG_INCORRECT_PREFIX, MSG_INCORRECT_SUFFIX,
};
use crate::geometry::Point;
use crate::model::{GuessModel, GuessPhase};
use crate::render::{ControlTag, PointerEvent, RenderCollaborator};
use crate::result::{JourneySummary, RankConfig, journey_summary};

/// Why an input produced no transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// The event carried no usable pointer position.
    NoPointer,
    /// An overlay is open and the input did not hit its continue control.
    OutsideControl,
    /// A control was hit while map clicks were expected.
    StaleControl,
    /// The journey is over.
    Finished,
}

/// Result of feeding one input to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputOutcome {
    Ignored { reason: IgnoreReason },
    /// A map click was judged; `native` is the click in map space.
    Judged { native: Point, correct: bool },
    /// The feedback box was closed.
    FeedbackDismissed { was_correct: bool },
    /// The travel path replay was closed.
    TravelPathClosed,
}

impl InputOutcome {
    const fn ignored(reason: IgnoreReason) -> Self {
        Self::Ignored { reason }
    }

    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }
}

/// Payload delivered to location-found subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFound {
    pub index: usize,
    pub location: Location,
    /// Days credited for this location.
    pub days_for_location: u32,
    pub guesses_for_location: u32,
}

type LocationFoundListener = Box<dyn FnMut(&LocationFound)>;
type CompleteListener = Box<dyn FnMut(&JourneySummary)>;

/// Drives a [`GuessModel`] from raw input and renders through `V`.
pub struct GuessController<V: RenderCollaborator> {
    model: GuessModel,
    view: V,
    rank_cfg: RankConfig,
    location_found: Vec<LocationFoundListener>,
    complete: Vec<CompleteListener>,
}

impl<V: RenderCollaborator> std::fmt::Debug for GuessController<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuessController")
            .field("model", &self.model)
            .field("rank_cfg", &self.rank_cfg)
            .field("location_found", &self.location_found.len())
            .field("complete", &self.complete.len())
            .finish_non_exhaustive()
    }
}

impl<V: RenderCollaborator> GuessController<V> {
    /// Bind a model to a view and draw the first location's hint.
    #[must_use]
    pub fn new(model: GuessModel, view: V) -> Self {
        Self::with_rank_config(model, view, RankConfig::default_config())
    }

    #[must_use]
    pub fn with_rank_config(model: GuessModel, view: V, rank_cfg: RankConfig) -> Self {
        let mut controller = Self {
            model,
            view,
            rank_cfg,
            location_found: Vec::new(),
            complete: Vec::new(),
        };
        controller.present_current_location();
        controller
            .view
            .update_days_travelled(controller.model.days_travelled());
        controller
    }

    /// Subscribe to correct guesses. Called once per found location, before
    /// the location index advances.
    pub fn on_location_found(&mut self, callback: impl FnMut(&LocationFound) + 'static) {
        self.location_found.push(Box::new(callback));
    }

    /// Subscribe to journey completion.
    pub fn on_complete(&mut self, callback: impl FnMut(&JourneySummary) + 'static) {
        self.complete.push(Box::new(callback));
    }

    #[must_use]
    pub const fn model(&self) -> &GuessModel {
        &self.model
    }

    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view, e.g. to change zoom/pan between inputs.
    pub const fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[must_use]
    pub const fn phase(&self) -> GuessPhase {
        self.model.phase()
    }

    #[must_use]
    pub fn summary(&self) -> JourneySummary {
        journey_summary(&self.model, &self.rank_cfg)
    }

    /// Consume the controller, returning model and view.
    #[must_use]
    pub fn into_parts(self) -> (GuessModel, V) {
        (self.model, self.view)
    }

    /// Feed one pointer event through the state machine.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> InputOutcome {
        let outcome = match self.model.phase() {
            GuessPhase::Complete => InputOutcome::ignored(IgnoreReason::Finished),
            GuessPhase::ShowingTravelPath => match self.view.hit_test(event) {
                Some(ControlTag::TravelPathContinue) => self.close_travel_path(),
                _ => InputOutcome::ignored(IgnoreReason::OutsideControl),
            },
            GuessPhase::ShowingFeedback => match self.view.hit_test(event) {
                Some(ControlTag::Continue) => self.dismiss_feedback(),
                _ => InputOutcome::ignored(IgnoreReason::OutsideControl),
            },
            GuessPhase::AwaitingGuess => self.handle_map_click(event),
        };
        if let InputOutcome::Ignored { reason } = outcome {
            log::trace!("ignored input in {:?}: {reason:?}", self.model.phase());
        }
        outcome
    }

    /// Activate whichever continue control is currently showing, for hosts
    /// with keyboard or button input instead of pointer hit-testing.
    pub fn press_continue(&mut self) -> InputOutcome {
        match self.model.phase() {
            GuessPhase::ShowingFeedback => self.dismiss_feedback(),
            GuessPhase::ShowingTravelPath => self.close_travel_path(),
            GuessPhase::AwaitingGuess => InputOutcome::ignored(IgnoreReason::OutsideControl),
            GuessPhase::Complete => InputOutcome::ignored(IgnoreReason::Finished),
        }
    }

    fn handle_map_click(&mut self, event: &PointerEvent) -> InputOutcome {
        let Some(display) = event.position else {
            return InputOutcome::ignored(IgnoreReason::NoPointer);
        };
        if self.view.hit_test(event).is_some() {
            return InputOutcome::ignored(IgnoreReason::StaleControl);
        }
        let native = self.view.to_native_space(display);
        if !display.is_finite() || !native.is_finite() {
            log::warn!("discarding click with unusable coordinates {display:?} -> {native:?}");
            return InputOutcome::ignored(IgnoreReason::NoPointer);
        }
        self.judge(display, native)
    }

    fn judge(&mut self, display: Point, native: Point) -> InputOutcome {
        let correct = self.model.is_click_correct(native);
        self.model.record_click(native, correct);

        let text = self
            .model
            .current_location()
            .map(|location| feedback_text(location, correct))
            .unwrap_or_default();

        self.view.clear_markers();
        if correct {
            self.view.draw_correct_marker(display);
        } else {
            self.view.draw_incorrect_marker(display);
        }
        self.view.show_feedback(&text, correct);
        self.view.update_days_travelled(self.model.days_travelled());
        self.model.set_phase(GuessPhase::ShowingFeedback);

        log::debug!(
            "guess at {native:?} judged {} for location {} (days {}, counter {})",
            if correct { "correct" } else { "incorrect" },
            self.model.current_location_index(),
            self.model.days_travelled(),
            self.model.day_counter()
        );
        InputOutcome::Judged { native, correct }
    }

    fn dismiss_feedback(&mut self) -> InputOutcome {
        self.view.clear_feedback();
        let was_correct = self.model.last_click_was_correct();
        if !was_correct {
            self.model.set_phase(GuessPhase::AwaitingGuess);
            log::debug!(
                "feedback dismissed; retrying location {}",
                self.model.current_location_index()
            );
            return InputOutcome::FeedbackDismissed { was_correct };
        }

        self.notify_location_found();
        self.model.advance_to_next();
        self.view.clear_markers();
        self.view.hide_target_indicator();
        if let Some(next) = self.model.current_location() {
            self.view
                .update_hint_display(&next.hint, &next.city, &next.country);
        }

        // The guess just judged correct is on the path, so it is never empty.
        // Completion after the last location happens when the path closes.
        debug_assert!(self.model.has_correct_clicks());
        let path: Vec<Point> = self
            .model
            .correct_click_points()
            .map(|point| self.view.to_display_space(point))
            .collect();
        self.view.show_travel_path(&path);
        self.model.set_phase(GuessPhase::ShowingTravelPath);
        log::debug!("showing travel path through {} stops", path.len());
        InputOutcome::FeedbackDismissed { was_correct }
    }

    fn close_travel_path(&mut self) -> InputOutcome {
        self.view.hide_travel_path();
        if self.model.current_location().is_some() {
            self.present_current_location();
            self.model.set_phase(GuessPhase::AwaitingGuess);
            log::debug!(
                "travel path closed; now guessing location {}",
                self.model.current_location_index()
            );
        } else {
            self.finish();
        }
        InputOutcome::TravelPathClosed
    }

    fn present_current_location(&mut self) {
        if let Some(location) = self.model.current_location() {
            self.view
                .update_hint_display(&location.hint, &location.city, &location.country);
            self.view.show_target_indicator(location);
        }
    }

    fn notify_location_found(&mut self) {
        let Some(location) = self.model.current_location() else {
            return;
        };
        let found = LocationFound {
            index: self.model.current_location_index(),
            location: location.clone(),
            days_for_location: self.model.last_credit().unwrap_or_default(),
            guesses_for_location: self.model.guesses_at_location(),
        };
        log::debug!("location {} found: {}", found.index, found.location.city);
        for listener in &mut self.location_found {
            listener(&found);
        }
    }

    fn finish(&mut self) {
        self.model.set_phase(GuessPhase::Complete);
        let summary = journey_summary(&self.model, &self.rank_cfg);
        log::debug!(
            "journey complete in {} days (rank {})",
            summary.days_travelled,
            summary.rank
        );
        for listener in &mut self.complete {
            listener(&summary);
        }
    }
}

/// Message shown after a guess at `location`.
#[must_use]
pub fn feedback_text(location: &Location, correct: bool) -> String {
    if correct {
        format!(
            "{MSG_CORRECT_PREFIX}{}{MSG_CORRECT_BELONGS}{}, {}!",
            location.hint, location.city, location.country
        )
    } else {
        format!("{MSG_INCORRECT_PREFIX}{}{MSG_INCORRECT_SUFFIX}", location.hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LocationCatalog;
    use crate::geometry::ViewTransform;
    use crate::render::NodeId;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Correct(Point),
        Incorrect(Point),
        Feedback(String, bool),
        ClearMarkers,
        ClearFeedback,
        Path(Vec<Point>),
        HidePath,
        Hint(String),
        Days(u32),
        ShowTarget(String),
        HideTarget,
    }

    #[derive(Debug, Default)]
    struct ScriptedView {
        calls: Vec<Call>,
        transform: ViewTransform,
    }

    const FEEDBACK_BUTTON: NodeId = NodeId(1);
    const PATH_BUTTON: NodeId = NodeId(2);

    impl RenderCollaborator for ScriptedView {
        fn draw_correct_marker(&mut self, display: Point) {
            self.calls.push(Call::Correct(display));
        }
        fn draw_incorrect_marker(&mut self, display: Point) {
            self.calls.push(Call::Incorrect(display));
        }
        fn show_feedback(&mut self, text: &str, is_correct_guess: bool) {
            self.calls
                .push(Call::Feedback(text.to_string(), is_correct_guess));
        }
        fn clear_markers(&mut self) {
            self.calls.push(Call::ClearMarkers);
        }
        fn clear_feedback(&mut self) {
            self.calls.push(Call::ClearFeedback);
        }
        fn show_travel_path(&mut self, points: &[Point]) {
            self.calls.push(Call::Path(points.to_vec()));
        }
        fn hide_travel_path(&mut self) {
            self.calls.push(Call::HidePath);
        }
        fn update_hint_display(&mut self, hint: &str, _city: &str, _country: &str) {
            self.calls.push(Call::Hint(hint.to_string()));
        }
        fn update_days_travelled(&mut self, days: u32) {
            self.calls.push(Call::Days(days));
        }
        fn show_target_indicator(&mut self, location: &Location) {
            self.calls.push(Call::ShowTarget(location.city.clone()));
        }
        fn hide_target_indicator(&mut self) {
            self.calls.push(Call::HideTarget);
        }
        fn hit_test(&self, event: &PointerEvent) -> Option<ControlTag> {
            match event.node {
                Some(FEEDBACK_BUTTON) => Some(ControlTag::Continue),
                Some(PATH_BUTTON) => Some(ControlTag::TravelPathContinue),
                _ => None,
            }
        }
        fn view_transform(&self) -> ViewTransform {
            self.transform
        }
    }

    fn controller(count: usize) -> GuessController<ScriptedView> {
        let locations = (0..count)
            .map(|i| {
                let step = f64::from(u32::try_from(i).unwrap());
                Location::new(
                    Point::new(300.0 + 200.0 * step, 400.0),
                    30.0,
                    format!("hint {i}"),
                    format!("City {i}"),
                    format!("Country {i}"),
                )
            })
            .collect();
        let model = GuessModel::new(LocationCatalog::new(locations).unwrap());
        GuessController::new(model, ScriptedView::default())
    }

    fn click(x: f64, y: f64) -> PointerEvent {
        PointerEvent::at(Point::new(x, y))
    }

    fn feedback_continue() -> PointerEvent {
        PointerEvent::on_node(Point::new(0.0, 0.0), FEEDBACK_BUTTON)
    }

    fn path_continue() -> PointerEvent {
        PointerEvent::on_node(Point::new(0.0, 0.0), PATH_BUTTON)
    }

    #[test]
    fn construction_presents_first_location() {
        let ctrl = controller(2);
        assert_eq!(ctrl.phase(), GuessPhase::AwaitingGuess);
        assert_eq!(
            ctrl.view().calls,
            vec![
                Call::Hint("hint 0".into()),
                Call::ShowTarget("City 0".into()),
                Call::Days(0)
            ]
        );
    }

    #[test]
    fn correct_guess_shows_star_and_postcard_text() {
        let mut ctrl = controller(2);
        let outcome = ctrl.handle_pointer(&click(310.0, 410.0));
        assert_eq!(
            outcome,
            InputOutcome::Judged {
                native: Point::new(310.0, 410.0),
                correct: true
            }
        );
        assert_eq!(ctrl.phase(), GuessPhase::ShowingFeedback);
        assert_eq!(ctrl.model().days_travelled(), 1);
        assert!(
            ctrl.view()
                .calls
                .contains(&Call::Correct(Point::new(310.0, 410.0)))
        );
        assert!(ctrl.view().calls.contains(&Call::Feedback(
            "You clicked on the correct city! This postcard of hint 0 belongs to: City 0, Country 0!"
                .into(),
            true
        )));
    }

    #[test]
    fn incorrect_guess_returns_to_same_location() {
        let mut ctrl = controller(2);
        let outcome = ctrl.handle_pointer(&click(400.0, 400.0));
        assert!(matches!(
            outcome,
            InputOutcome::Judged { correct: false, .. }
        ));
        assert!(ctrl.view().calls.contains(&Call::Feedback(
            "Oh no! Your next location is hint 0. Good luck!".into(),
            false
        )));
        assert_eq!(ctrl.model().day_counter(), 2);

        let outcome = ctrl.handle_pointer(&feedback_continue());
        assert_eq!(
            outcome,
            InputOutcome::FeedbackDismissed { was_correct: false }
        );
        assert_eq!(ctrl.phase(), GuessPhase::AwaitingGuess);
        assert_eq!(ctrl.model().current_location_index(), 0);
    }

    #[test]
    fn map_clicks_during_feedback_are_not_guesses() {
        let mut ctrl = controller(2);
        ctrl.handle_pointer(&click(400.0, 400.0));
        let history = ctrl.model().click_history().len();

        let outcome = ctrl.handle_pointer(&click(300.0, 400.0));
        assert_eq!(
            outcome,
            InputOutcome::Ignored {
                reason: IgnoreReason::OutsideControl
            }
        );
        assert_eq!(ctrl.model().click_history().len(), history);
        assert_eq!(ctrl.phase(), GuessPhase::ShowingFeedback);

        let outcome = ctrl.handle_pointer(&path_continue());
        assert!(outcome.is_ignored());
    }

    #[test]
    fn correct_dismissal_replays_path_then_resumes() {
        let mut ctrl = controller(2);
        let found = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&found);
        ctrl.on_location_found(move |event| sink.borrow_mut().push(event.clone()));

        ctrl.handle_pointer(&click(100.0, 100.0));
        ctrl.handle_pointer(&feedback_continue());
        ctrl.handle_pointer(&click(305.0, 400.0));
        ctrl.handle_pointer(&feedback_continue());

        assert_eq!(ctrl.phase(), GuessPhase::ShowingTravelPath);
        assert_eq!(ctrl.model().current_location_index(), 1);
        {
            let found = found.borrow();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].index, 0);
            assert_eq!(found[0].location.city, "City 0");
            assert_eq!(found[0].days_for_location, 2);
            assert_eq!(found[0].guesses_for_location, 2);
        }
        assert!(
            ctrl.view()
                .calls
                .contains(&Call::Path(vec![Point::new(305.0, 400.0)]))
        );

        let before = ctrl.model().snapshot();
        let outcome = ctrl.handle_pointer(&click(500.0, 400.0));
        assert!(outcome.is_ignored());
        assert_eq!(ctrl.model().snapshot(), before);
        assert!(ctrl.handle_pointer(&feedback_continue()).is_ignored());

        let outcome = ctrl.handle_pointer(&path_continue());
        assert_eq!(outcome, InputOutcome::TravelPathClosed);
        assert_eq!(ctrl.phase(), GuessPhase::AwaitingGuess);
        assert_eq!(
            ctrl.view().calls.last(),
            Some(&Call::ShowTarget("City 1".into()))
        );
    }

    #[test]
    fn last_location_completes_after_path() {
        let mut ctrl = controller(2);
        let summaries = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&summaries);
        ctrl.on_complete(move |summary| sink.borrow_mut().push(summary.clone()));

        for x in [300.0, 500.0] {
            ctrl.handle_pointer(&click(x, 400.0));
            ctrl.handle_pointer(&feedback_continue());
            assert_eq!(ctrl.phase(), GuessPhase::ShowingTravelPath);
            ctrl.handle_pointer(&path_continue());
        }

        assert_eq!(ctrl.phase(), GuessPhase::Complete);
        assert_eq!(ctrl.model().current_location_index(), 2);
        assert_eq!(summaries.borrow().len(), 1);
        assert_eq!(summaries.borrow()[0].days_travelled, 2);

        let outcome = ctrl.handle_pointer(&click(300.0, 400.0));
        assert_eq!(
            outcome,
            InputOutcome::Ignored {
                reason: IgnoreReason::Finished
            }
        );
        assert_eq!(ctrl.model().click_history().len(), 2);
        assert!(ctrl.press_continue().is_ignored());
    }

    #[test]
    fn single_location_shows_path_before_completing() {
        let mut ctrl = controller(1);
        let completions = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&completions);
        ctrl.on_complete(move |_| *sink.borrow_mut() += 1);

        ctrl.handle_pointer(&click(300.0, 400.0));
        let outcome = ctrl.handle_pointer(&feedback_continue());
        assert_eq!(
            outcome,
            InputOutcome::FeedbackDismissed { was_correct: true }
        );
        assert_eq!(ctrl.phase(), GuessPhase::ShowingTravelPath);
        assert_eq!(ctrl.model().current_location_index(), 1);
        assert_eq!(*completions.borrow(), 0);
        assert!(
            ctrl.view()
                .calls
                .contains(&Call::Path(vec![Point::new(300.0, 400.0)]))
        );

        assert_eq!(
            ctrl.handle_pointer(&path_continue()),
            InputOutcome::TravelPathClosed
        );
        assert_eq!(ctrl.phase(), GuessPhase::Complete);
        assert_eq!(*completions.borrow(), 1);
    }

    #[test]
    fn clicks_are_unscaled_before_judging() {
        let mut ctrl = controller(1);
        ctrl.view_mut().transform = ViewTransform::new(0.5, 10.0, 20.0);

        // Target (300, 400) is drawn at (160, 220) on screen.
        let outcome = ctrl.handle_pointer(&click(160.0, 220.0));
        assert_eq!(
            outcome,
            InputOutcome::Judged {
                native: Point::new(300.0, 400.0),
                correct: true
            }
        );

        ctrl.press_continue();
        assert!(
            ctrl.view()
                .calls
                .contains(&Call::Path(vec![Point::new(160.0, 220.0)]))
        );
    }

    #[test]
    fn display_space_distance_would_misjudge() {
        let mut ctrl = controller(1);
        ctrl.view_mut().transform = ViewTransform::new(2.0, 0.0, 0.0);
        // (300, 400) on screen is (150, 200) on the map: far from the target.
        let outcome = ctrl.handle_pointer(&click(300.0, 400.0));
        assert!(matches!(
            outcome,
            InputOutcome::Judged { correct: false, .. }
        ));
    }

    #[test]
    fn missing_pointer_is_a_silent_no_op() {
        let mut ctrl = controller(1);
        let outcome = ctrl.handle_pointer(&PointerEvent::without_position());
        assert_eq!(
            outcome,
            InputOutcome::Ignored {
                reason: IgnoreReason::NoPointer
            }
        );
        assert!(ctrl.model().click_history().is_empty());

        let outcome = ctrl.handle_pointer(&click(f64::NAN, 1.0));
        assert!(outcome.is_ignored());
        assert!(ctrl.model().click_history().is_empty());
    }

    #[test]
    fn stale_control_click_is_not_a_guess() {
        let mut ctrl = controller(1);
        let outcome = ctrl.handle_pointer(&PointerEvent::on_node(
            Point::new(300.0, 400.0),
            FEEDBACK_BUTTON,
        ));
        assert_eq!(
            outcome,
            InputOutcome::Ignored {
                reason: IgnoreReason::StaleControl
            }
        );
    }

    #[test]
    fn press_continue_matches_pointer_flow() {
        let mut ctrl = controller(1);
        assert!(ctrl.press_continue().is_ignored());
        ctrl.handle_pointer(&click(300.0, 400.0));
        assert_eq!(
            ctrl.press_continue(),
            InputOutcome::FeedbackDismissed { was_correct: true }
        );
        assert_eq!(ctrl.press_continue(), InputOutcome::TravelPathClosed);
        assert_eq!(ctrl.phase(), GuessPhase::Complete);
    }
}
