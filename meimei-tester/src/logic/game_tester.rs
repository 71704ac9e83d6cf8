use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use meimei_game::{
    GameEngine, GuessPhase, InputOutcome, JourneySummary, LocationFound, Point, PointerEvent,
    RenderCollaborator, SessionSnapshot, ViewTransform,
};
use serde::Serialize;

use crate::logic::assets::TesterAssets;
use crate::logic::headless::{HeadlessView, RenderCommand};
use crate::logic::policy::GameplayStrategy;

/// Upper bound on pointer events fed into one journey.
pub const DEFAULT_MAX_INPUTS: usize = 2_000;

/// Declarative description of one automated journey.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub max_inputs: usize,
    pub transform: ViewTransform,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            max_inputs: DEFAULT_MAX_INPUTS,
            transform: ViewTransform::identity(),
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_transform(mut self, transform: ViewTransform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Complete record of a simulated journey.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub transform: ViewTransform,
    pub completed: bool,
    /// Summary delivered to the completion subscriber, or the running totals
    /// if the journey never finished.
    pub journey: JourneySummary,
    pub completions_fired: usize,
    pub found: Vec<LocationFound>,
    pub inputs: usize,
    pub ignored_inputs: usize,
    /// Map clicks made while an overlay was up.
    pub overlay_pokes: usize,
    /// Overlay pokes the controller judged as guesses. Always a bug.
    pub overlay_pokes_judged: usize,
    pub snapshot: SessionSnapshot,
    /// Every phase the controller passed through, without repeats.
    pub phase_trace: Vec<GuessPhase>,
    pub commands: Vec<RenderCommand>,
    /// Invariant breaches noticed while feeding input.
    pub violations: Vec<String>,
}

impl SimulationSummary {
    /// Points of the last travel path drawn, in display space.
    #[must_use]
    pub fn last_travel_path(&self) -> Option<&[Point]> {
        self.commands.iter().rev().find_map(|command| match command {
            RenderCommand::TravelPath { points } => Some(points.as_slice()),
            _ => None,
        })
    }
}

#[derive(Default)]
struct Subscriptions {
    found: Vec<LocationFound>,
    completions: Vec<JourneySummary>,
}

/// Headless deterministic runner for the guessing core.
#[derive(Debug, Clone)]
pub struct GameTester {
    verbose: bool,
    engine: GameEngine<TesterAssets>,
}

impl GameTester {
    #[must_use]
    pub const fn new(assets: TesterAssets, verbose: bool) -> Self {
        Self {
            verbose,
            engine: GameEngine::new(assets),
        }
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Play one journey under `plan`, with every random choice drawn from `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the journey cannot be started.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let mut controller = self
            .engine
            .start_journey(HeadlessView::new(plan.transform))?;
        let events = Rc::new(RefCell::new(Subscriptions::default()));
        {
            let events = Rc::clone(&events);
            controller.on_location_found(move |found| events.borrow_mut().found.push(found.clone()));
        }
        {
            let events = Rc::clone(&events);
            controller
                .on_complete(move |summary| events.borrow_mut().completions.push(summary.clone()));
        }

        let mut policy = plan.strategy.create_policy(seed);
        let mut inputs = 0;
        let mut ignored_inputs = 0;
        let mut overlay_pokes = 0;
        let mut overlay_pokes_judged = 0;
        let mut violations = Vec::new();
        let mut phase_trace = vec![controller.phase()];

        while controller.phase() != GuessPhase::Complete && inputs < plan.max_inputs {
            let phase = controller.phase();
            let index_before = controller.model().current_location_index();
            let history_before = controller.model().click_history().len();

            let overlay_up = matches!(
                phase,
                GuessPhase::ShowingFeedback | GuessPhase::ShowingTravelPath
            );
            let poking = overlay_up && policy.pokes_overlays();
            let event = if poking {
                overlay_pokes += 1;
                let stray = controller
                    .model()
                    .current_location()
                    .map_or(Point::new(0.0, 0.0), |location| location.target);
                PointerEvent::at(controller.view().to_display_space(stray))
            } else {
                match phase {
                    GuessPhase::AwaitingGuess => {
                        let Some(location) = controller.model().current_location().cloned() else {
                            violations.push(format!(
                                "awaiting a guess with no current location (index {index_before})"
                            ));
                            break;
                        };
                        let guesses = controller.model().guesses_at_location();
                        let native = policy.aim(&location, guesses);
                        PointerEvent::at(controller.view().to_display_space(native))
                    }
                    GuessPhase::ShowingFeedback => {
                        continue_event(controller.view().feedback_control())
                    }
                    GuessPhase::ShowingTravelPath => {
                        continue_event(controller.view().travel_path_control())
                    }
                    GuessPhase::Complete => break,
                }
            };

            let outcome = controller.handle_pointer(&event);
            inputs += 1;

            let model = controller.model();
            if model.message_box_visible() && model.travel_path_visible() {
                violations.push(format!("input {inputs}: feedback and travel path both visible"));
            }
            match outcome {
                InputOutcome::Ignored { .. } => {
                    ignored_inputs += 1;
                    if model.click_history().len() != history_before {
                        violations.push(format!("input {inputs}: ignored input changed history"));
                    }
                }
                InputOutcome::Judged { .. } => {
                    if poking {
                        overlay_pokes_judged += 1;
                    }
                    if model.click_history().len() != history_before + 1 {
                        violations.push(format!("input {inputs}: judged click not recorded"));
                    }
                }
                InputOutcome::FeedbackDismissed { was_correct: true } => {
                    if model.current_location_index() != index_before + 1 {
                        violations.push(format!(
                            "input {inputs}: correct guess did not advance from {index_before}"
                        ));
                    }
                }
                InputOutcome::FeedbackDismissed { was_correct: false }
                | InputOutcome::TravelPathClosed => {}
            }
            if !matches!(outcome, InputOutcome::FeedbackDismissed { was_correct: true })
                && model.current_location_index() != index_before
            {
                violations.push(format!("input {inputs}: location advanced on {outcome:?}"));
            }
            if phase_trace.last() != Some(&model.phase()) {
                phase_trace.push(model.phase());
            }
        }

        let completed = controller.phase() == GuessPhase::Complete;
        let running = controller.summary();
        let snapshot = controller.model().snapshot();
        let (_, view) = controller.into_parts();
        let Subscriptions {
            found,
            completions,
        } = std::mem::take(&mut *events.borrow_mut());

        if self.verbose {
            log::info!(
                "seed {seed} {} -> completed:{completed} days:{} inputs:{inputs}",
                policy.name(),
                running.days_travelled
            );
        }

        Ok(SimulationSummary {
            seed,
            strategy: plan.strategy,
            transform: plan.transform,
            completed,
            completions_fired: completions.len(),
            journey: completions.into_iter().next().unwrap_or(running),
            found,
            inputs,
            ignored_inputs,
            overlay_pokes,
            overlay_pokes_judged,
            snapshot,
            phase_trace,
            commands: view.into_commands(),
            violations,
        })
    }
}

fn continue_event(control: Option<meimei_game::NodeId>) -> PointerEvent {
    control.map_or_else(PointerEvent::without_position, |node| {
        PointerEvent::on_node(Point::new(0.0, 0.0), node)
    })
}
