use anyhow::{Result, ensure};
use meimei_game::{Rank, ViewTransform};

use crate::logic::game_tester::{SimulationPlan, SimulationSummary};
use crate::logic::policy::{GameplayStrategy, WANDERER_MISSES};
use crate::logic::tester::TestScenario;

/// Zoom and pan used by the `zoomed-view` scenario.
const ZOOMED_SCALE: f64 = 0.64;
const ZOOMED_OFFSET: (f64, f64) = (12.0, -30.0);
const PATH_TOLERANCE: f64 = 1e-6;

const SCENARIOS: &[(&str, &str)] = &[
    ("smoke", "Sloppy play finishes and every found location fires once, in order"),
    ("perfect-run", "Every first guess lands; one day per location and the best rank"),
    ("sloppy-run", "Seeded misses; days equal locations plus wrong guesses"),
    ("wanderer-run", "Fixed misses per location; exact day and rank totals"),
    ("overlay-guard", "Map clicks behind feedback and travel path are ignored"),
    ("zoomed-view", "Clicks on a zoomed, panned map are judged in map space"),
];

/// Key and description of every scenario, in run order.
#[must_use]
pub fn list_scenarios() -> Vec<(String, String)> {
    SCENARIOS
        .iter()
        .map(|(key, description)| ((*key).to_string(), (*description).to_string()))
        .collect()
}

/// Keys `all` expands to.
#[must_use]
pub fn all_scenario_keys() -> Vec<String> {
    SCENARIOS.iter().map(|(key, _)| (*key).to_string()).collect()
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let plan = match name {
        "smoke" => SimulationPlan::new(GameplayStrategy::Sloppy)
            .with_expectation(completed)
            .with_expectation(found_in_order),
        "perfect-run" => SimulationPlan::new(GameplayStrategy::Perfect)
            .with_expectation(completed)
            .with_expectation(perfect_totals),
        "sloppy-run" => SimulationPlan::new(GameplayStrategy::Sloppy)
            .with_expectation(completed)
            .with_expectation(days_match_guesses)
            .with_expectation(path_matches_history),
        "wanderer-run" => SimulationPlan::new(GameplayStrategy::Wanderer)
            .with_expectation(completed)
            .with_expectation(wanderer_totals),
        "overlay-guard" => SimulationPlan::new(GameplayStrategy::Restless)
            .with_expectation(completed)
            .with_expectation(overlays_block_map),
        "zoomed-view" => SimulationPlan::new(GameplayStrategy::Perfect)
            .with_transform(ViewTransform::new(
                ZOOMED_SCALE,
                ZOOMED_OFFSET.0,
                ZOOMED_OFFSET.1,
            ))
            .with_expectation(completed)
            .with_expectation(perfect_totals)
            .with_expectation(path_matches_history),
        _ => return None,
    };
    Some(TestScenario::simulation(name, plan))
}

fn completed(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.completed,
        "journey stopped after {} inputs",
        summary.inputs
    );
    ensure!(
        summary.completions_fired == 1,
        "completion fired {} times",
        summary.completions_fired
    );
    ensure!(
        summary.journey.locations_found == summary.journey.location_count,
        "found {} of {} locations",
        summary.journey.locations_found,
        summary.journey.location_count
    );
    Ok(())
}

fn found_in_order(summary: &SimulationSummary) -> Result<()> {
    let indices: Vec<usize> = summary.found.iter().map(|found| found.index).collect();
    let expected: Vec<usize> = (0..summary.journey.location_count).collect();
    ensure!(
        indices == expected,
        "locations found out of order: {indices:?}"
    );
    let credited: u32 = summary.found.iter().map(|found| found.days_for_location).sum();
    ensure!(
        credited == summary.journey.days_travelled,
        "per-location credit {credited} != days travelled {}",
        summary.journey.days_travelled
    );
    Ok(())
}

fn perfect_totals(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.journey.incorrect_guesses == 0,
        "{} wrong guesses",
        summary.journey.incorrect_guesses
    );
    let count = u32::try_from(summary.journey.location_count)?;
    ensure!(
        summary.journey.days_travelled == count,
        "expected {count} days, got {}",
        summary.journey.days_travelled
    );
    if count <= 10 {
        ensure!(
            summary.journey.rank == Rank::A,
            "expected rank A, got {}",
            summary.journey.rank
        );
    }
    Ok(())
}

fn days_match_guesses(summary: &SimulationSummary) -> Result<()> {
    let journey = &summary.journey;
    let expected = journey.location_count + journey.incorrect_guesses;
    ensure!(
        usize::try_from(journey.days_travelled)? == expected,
        "days travelled {} != locations {} + wrong guesses {}",
        journey.days_travelled,
        journey.location_count,
        journey.incorrect_guesses
    );
    ensure!(
        journey.total_guesses == summary.snapshot.click_history.len(),
        "total guesses {} != history length {}",
        journey.total_guesses,
        summary.snapshot.click_history.len()
    );
    Ok(())
}

fn wanderer_totals(summary: &SimulationSummary) -> Result<()> {
    let journey = &summary.journey;
    let per_location = usize::try_from(WANDERER_MISSES)?;
    ensure!(
        journey.incorrect_guesses == journey.location_count * per_location,
        "expected {} wrong guesses, got {}",
        journey.location_count * per_location,
        journey.incorrect_guesses
    );
    ensure!(
        usize::try_from(journey.days_travelled)? == journey.location_count * (per_location + 1),
        "unexpected day total {}",
        journey.days_travelled
    );
    ensure!(
        summary
            .found
            .iter()
            .all(|found| found.guesses_for_location == WANDERER_MISSES + 1),
        "a location took an unexpected number of guesses"
    );
    Ok(())
}

fn overlays_block_map(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.overlay_pokes > 0, "player never poked an overlay");
    ensure!(
        summary.overlay_pokes_judged == 0,
        "{} overlay clicks were judged as guesses",
        summary.overlay_pokes_judged
    );
    ensure!(
        summary.ignored_inputs >= summary.overlay_pokes,
        "only {} of {} overlay clicks were ignored",
        summary.ignored_inputs,
        summary.overlay_pokes
    );
    Ok(())
}

fn path_matches_history(summary: &SimulationSummary) -> Result<()> {
    let Some(drawn) = summary.last_travel_path() else {
        anyhow::bail!("no travel path was drawn");
    };
    let expected: Vec<_> = summary
        .snapshot
        .click_history
        .iter()
        .filter(|record| record.was_correct)
        .map(|record| summary.transform.to_display(record.point))
        .collect();
    ensure!(
        drawn.len() == expected.len(),
        "path has {} points, expected {}",
        drawn.len(),
        expected.len()
    );
    for (index, (got, want)) in drawn.iter().zip(&expected).enumerate() {
        ensure!(
            got.distance_to(*want) < PATH_TOLERANCE,
            "path point {index} drawn at {got:?}, expected {want:?}"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::assets::TesterAssets;
    use crate::logic::game_tester::GameTester;
    use crate::logic::headless::HeadlessView;
    use meimei_game::RenderCollaborator;

    fn tester() -> GameTester {
        GameTester::new(TesterAssets::load_default().unwrap(), false)
    }

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, _) in list_scenarios() {
            let scenario = get_scenario(&key).unwrap();
            assert_eq!(scenario.name, key);
            assert!(!scenario.plan.expectations.is_empty());
        }
        assert!(get_scenario("no-such-scenario").is_none());
        assert_eq!(all_scenario_keys().len(), list_scenarios().len());
    }

    #[test]
    fn every_scenario_passes_on_a_few_seeds() {
        let tester = tester();
        for key in all_scenario_keys() {
            let scenario = get_scenario(&key).unwrap();
            for seed in [1, 1337, 0xDEAD_BEEF] {
                let summary = tester.run_plan(&scenario.plan, seed).unwrap();
                assert!(summary.violations.is_empty(), "{key}: {:?}", summary.violations);
                for expectation in &scenario.plan.expectations {
                    if let Err(err) = expectation.evaluate(&summary) {
                        panic!("{key} seed {seed}: {err}");
                    }
                }
            }
        }
    }

    #[test]
    fn zoomed_scenario_draws_in_display_space() {
        let scenario = get_scenario("zoomed-view").unwrap();
        let summary = tester().run_plan(&scenario.plan, 3).unwrap();
        let first_native = summary.snapshot.click_history[0].point;
        let view = HeadlessView::new(summary.transform);
        let expected = view.to_display_space(first_native);
        let drawn = summary.last_travel_path().unwrap()[0];
        assert!(drawn.distance_to(expected) < PATH_TOLERANCE);
        assert!(drawn.distance_to(first_native) > 1.0);
    }
}
