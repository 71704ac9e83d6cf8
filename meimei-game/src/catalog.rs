//! Ordered location catalog with a forward-only cursor.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_TOLERANCE;
use crate::geometry::Point;

const DEFAULT_LOCATION_DATA: &str = include_str!("../data/locations.json");

/// A place the player must find on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Target point in native (source image) coordinates.
    #[serde(flatten)]
    pub target: Point,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    pub hint: String,
    pub city: String,
    pub country: String,
}

const fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Location {
    #[must_use]
    pub fn new(
        target: Point,
        tolerance: f64,
        hint: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            target,
            tolerance,
            hint: hint.into(),
            city: city.into(),
            country: country.into(),
        }
    }

    /// Inclusive tolerance check against a native-space point.
    #[must_use]
    pub fn accepts(&self, point: Point) -> bool {
        point.distance_to(self.target) <= self.tolerance
    }
}

/// Errors raised when location data violates catalog invariants.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("location catalog is empty")]
    Empty,
    #[error("location {index} ({city}) has a non-finite target")]
    NonFiniteTarget { index: usize, city: String },
    #[error("location {index} ({city}) tolerance must be finite and non-negative (got {tolerance})")]
    InvalidTolerance {
        index: usize,
        city: String,
        tolerance: f64,
    },
    #[error("failed to parse location data: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    locations: Vec<Location>,
}

/// Ordered, immutable sequence of locations plus the index of the current one.
///
/// The cursor may sit one past the last location, which means the catalog is
/// exhausted and [`LocationCatalog::current`] returns `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationCatalog {
    locations: Vec<Location>,
    cursor: usize,
}

impl LocationCatalog {
    /// Build a catalog from pre-parsed locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or any location has a non-finite
    /// target or an invalid tolerance.
    pub fn new(locations: Vec<Location>) -> Result<Self, CatalogError> {
        if locations.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (index, location) in locations.iter().enumerate() {
            if !location.target.is_finite() {
                return Err(CatalogError::NonFiniteTarget {
                    index,
                    city: location.city.clone(),
                });
            }
            if !location.tolerance.is_finite() || location.tolerance < 0.0 {
                return Err(CatalogError::InvalidTolerance {
                    index,
                    city: location.city.clone(),
                    tolerance: location.tolerance,
                });
            }
        }
        Ok(Self {
            locations,
            cursor: 0,
        })
    }

    /// Load a catalog from a JSON document of the form `{"locations": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the locations are invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.locations)
    }

    /// Load the catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled data fails validation.
    pub fn load_from_static() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_LOCATION_DATA)
    }

    #[must_use]
    pub fn current(&self) -> Option<&Location> {
        self.locations.get(self.cursor)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.locations.len()
    }

    /// Move the cursor forward by one and return the new current location.
    /// Once exhausted the cursor stays put and `None` is returned.
    pub fn advance(&mut self) -> Option<&Location> {
        if self.cursor < self.locations.len() {
            self.cursor += 1;
        }
        self.current()
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.locations.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }
}
