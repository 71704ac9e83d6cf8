use std::fs;
use std::path::{Path, PathBuf};

use meimei_game::{CatalogError, LocationCatalog, LocationSource, RankConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid location catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Immutable data every simulated journey starts from.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    catalog: LocationCatalog,
    rank_config: RankConfig,
}

impl TesterAssets {
    /// Load the catalog bundled with the game crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled catalog fails validation.
    pub fn load_default() -> Result<Self, AssetError> {
        Ok(Self {
            catalog: LocationCatalog::load_from_static()?,
            rank_config: RankConfig::load_from_static(),
        })
    }

    /// Load a replacement catalog from a JSON file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn load_from_file(path: &Path) -> Result<Self, AssetError> {
        let json = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = LocationCatalog::from_json(&json)?;
        log::info!(
            "loaded {} locations from {}",
            catalog.len(),
            path.display()
        );
        Ok(Self {
            catalog,
            rank_config: RankConfig::load_from_static(),
        })
    }

    /// Bundled catalog unless `path` names an override.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected catalog cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self, AssetError> {
        path.map_or_else(Self::load_default, Self::load_from_file)
    }

    #[must_use]
    pub fn location_count(&self) -> usize {
        self.catalog.len()
    }
}

impl LocationSource for TesterAssets {
    type Error = AssetError;

    fn load_catalog(&self) -> Result<LocationCatalog, Self::Error> {
        Ok(self.catalog.clone())
    }

    fn load_rank_config(&self) -> Result<RankConfig, Self::Error> {
        Ok(self.rank_config.clone())
    }
}
