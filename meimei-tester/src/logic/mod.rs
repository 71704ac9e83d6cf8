pub mod assets;
pub mod game_tester;
pub mod headless;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use assets::TesterAssets;
pub use game_tester::GameTester;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
