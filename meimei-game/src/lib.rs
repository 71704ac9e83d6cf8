//! Mei Mei's Journey game engine
//!
//! Platform-agnostic location-guessing logic: the player clicks where they
//! think a named place is, the click is judged against a tolerance radius,
//! days travelled accumulate, and correct guesses are replayed as a travel
//! path. Rendering is delegated to a [`RenderCollaborator`].

pub mod catalog;
pub mod constants;
pub mod controller;
pub mod geometry;
pub mod model;
pub mod render;
pub mod result;

// Re-export commonly used types
pub use catalog::{CatalogError, Location, LocationCatalog};
pub use controller::{GuessController, IgnoreReason, InputOutcome, LocationFound, feedback_text};
pub use geometry::{Point, ViewTransform};
pub use model::{ClickRecord, GuessModel, GuessPhase, SessionSnapshot};
pub use render::{ControlTag, NodeId, PointerEvent, RenderCollaborator};
pub use result::{JourneySummary, Rank, RankBand, RankConfig, RankConfigError, journey_summary};

/// Trait for abstracting where location data comes from.
/// Platform-specific implementations should provide this
pub trait LocationSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the ordered location catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    fn load_catalog(&self) -> Result<LocationCatalog, Self::Error>;

    /// Load the rank bands used for the completion summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the rank configuration cannot be loaded.
    fn load_rank_config(&self) -> Result<RankConfig, Self::Error> {
        Ok(RankConfig::default_config())
    }
}

/// Location source backed by the data bundled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledLocations;

impl LocationSource for BundledLocations {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<LocationCatalog, Self::Error> {
        LocationCatalog::load_from_static()
    }
}

/// Entry point for hosts: builds a fresh model and controller per journey.
#[derive(Debug, Clone)]
pub struct GameEngine<L>
where
    L: LocationSource,
{
    source: L,
}

impl<L> GameEngine<L>
where
    L: LocationSource,
{
    /// Create a new game engine with the provided location source
    pub const fn new(source: L) -> Self {
        Self { source }
    }

    /// Build a fresh model for a new journey.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn create_model(&self) -> Result<GuessModel, L::Error> {
        self.source.load_catalog().map(GuessModel::new)
    }

    /// Start a journey rendered through `view`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or rank configuration cannot be loaded.
    pub fn start_journey<V>(&self, view: V) -> Result<GuessController<V>, L::Error>
    where
        V: RenderCollaborator,
    {
        let model = self.create_model()?;
        let rank_cfg = self.source.load_rank_config()?;
        log::debug!("starting journey over {} locations", model.location_count());
        Ok(GuessController::with_rank_config(model, view, rank_cfg))
    }
}
