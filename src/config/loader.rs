//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading tariff
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{DiscountsFile, RateTable, SurchargesFile, TariffFile, TariffMetadata};

/// Loads and provides access to a tariff's rate table.
///
/// # Directory Structure
///
/// ```text
/// config/standard/
/// ├── tariff.yaml      # Metadata, base rates, VAT, discount cap
/// ├── surcharges.yaml  # Night, weekend, holiday, airport, per-unit, booking fees
/// └── discounts.yaml   # Round trip, frequent rider, promo codes and their limits
/// ```
///
/// # Example
///
/// ```no_run
/// use fare_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/standard").unwrap();
/// println!("Loaded tariff: {}", loader.tariff().name);
/// println!("Start fare: {}", loader.rates().base.start_fare);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rates: RateTable,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML or misses a field (`ConfigParseError`)
    /// - The assembled rate table breaks an invariant (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let tariff = Self::load_yaml::<TariffFile>(&path.join("tariff.yaml"))?;
        let surcharges = Self::load_yaml::<SurchargesFile>(&path.join("surcharges.yaml"))?;
        let discounts = Self::load_yaml::<DiscountsFile>(&path.join("discounts.yaml"))?;

        let rates = RateTable::from_parts(tariff, surcharges, discounts)?;
        debug!(
            tariff = %rates.metadata.code,
            version = %rates.metadata.version,
            promo_codes = rates.discount_rates.promo_codes.len(),
            "Rate table loaded"
        );

        Ok(Self { rates })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded rate table.
    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Returns the tariff metadata.
    pub fn tariff(&self) -> &TariffMetadata {
        &self.rates.metadata
    }

    /// Consumes the loader, returning the rate table.
    pub fn into_rates(self) -> RateTable {
        self.rates
    }
}
