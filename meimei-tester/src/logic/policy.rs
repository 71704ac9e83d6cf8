use std::f64::consts::TAU;
use std::fmt;

use meimei_game::{Location, Point};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// How far past the tolerance ring a deliberate miss lands.
const MISS_MARGIN: f64 = 12.0;
/// Wrong guesses the wanderer makes at every location.
pub const WANDERER_MISSES: u32 = 2;

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Native-space point to click for `location`, given how many guesses
    /// have already been made there.
    fn aim(&mut self, location: &Location, guesses_so_far: u32) -> Point;

    /// Whether to click the bare map while an overlay is up.
    fn pokes_overlays(&mut self) -> bool {
        false
    }
}

/// Built-in player strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameplayStrategy {
    Perfect,
    Sloppy,
    Wanderer,
    Restless,
}

impl GameplayStrategy {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GameplayStrategy::Perfect => "Perfect",
            GameplayStrategy::Sloppy => "Sloppy",
            GameplayStrategy::Wanderer => "Wanderer",
            GameplayStrategy::Restless => "Restless",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        match self {
            GameplayStrategy::Perfect => Box::new(PerfectPolicy),
            GameplayStrategy::Sloppy => Box::new(SloppyPolicy::new(seed)),
            GameplayStrategy::Wanderer => Box::new(WandererPolicy),
            GameplayStrategy::Restless => Box::new(RestlessPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct PerfectPolicy;
struct WandererPolicy;

struct SloppyPolicy {
    rng: ChaCha20Rng,
    miss_chance: f64,
}

impl SloppyPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            miss_chance: 0.4,
        }
    }
}

struct RestlessPolicy {
    rng: ChaCha20Rng,
    poke_chance: f64,
}

impl RestlessPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            poke_chance: 0.5,
        }
    }
}

impl PlayerPolicy for PerfectPolicy {
    fn name(&self) -> &'static str {
        "Perfect"
    }

    fn aim(&mut self, location: &Location, _guesses_so_far: u32) -> Point {
        location.target
    }
}

impl PlayerPolicy for SloppyPolicy {
    fn name(&self) -> &'static str {
        "Sloppy"
    }

    fn aim(&mut self, location: &Location, _guesses_so_far: u32) -> Point {
        let angle = self.rng.gen_range(0.0..TAU);
        let radius = if self.rng.gen_bool(self.miss_chance) {
            location.tolerance + MISS_MARGIN + self.rng.gen_range(0.0..150.0)
        } else {
            location.tolerance * self.rng.gen_range(0.0..0.9)
        };
        offset(location.target, angle, radius)
    }
}

impl PlayerPolicy for WandererPolicy {
    fn name(&self) -> &'static str {
        "Wanderer"
    }

    fn aim(&mut self, location: &Location, guesses_so_far: u32) -> Point {
        if guesses_so_far < WANDERER_MISSES {
            let radius = location.tolerance * 3.0 + MISS_MARGIN;
            offset(location.target, f64::from(guesses_so_far), radius)
        } else {
            location.target
        }
    }
}

impl PlayerPolicy for RestlessPolicy {
    fn name(&self) -> &'static str {
        "Restless"
    }

    fn aim(&mut self, location: &Location, _guesses_so_far: u32) -> Point {
        let angle = self.rng.gen_range(0.0..TAU);
        offset(location.target, angle, location.tolerance * 0.5)
    }

    fn pokes_overlays(&mut self) -> bool {
        self.rng.gen_bool(self.poke_chance)
    }
}

fn offset(origin: Point, angle: f64, radius: f64) -> Point {
    Point::new(
        radius.mul_add(angle.cos(), origin.x),
        radius.mul_add(angle.sin(), origin.y),
    )
}
