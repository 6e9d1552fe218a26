//! TOML tables file
//!
//! ```toml
//! version = "2024.1"
//! waiting_rate_per_minute = 5
//!
//! [ambulance_tax]
//! class = "FIVE"
//! intra_jurisdiction = true
//!
//! [base_rates]
//! default_rate = 500
//! [base_rates.rates.BASIC_LIFE_SUPPORT]
//! STANDARD = 750
//!
//! [distance_rates]
//! default_rate = 20
//! [distance_rates.rates.BASIC_LIFE_SUPPORT]
//! URBAN = 20
//!
//! [time_of_day_factors]
//! NIGHT = 1.25
//!
//! [equipment_prices]
//! OXYGEN = 200
//!
//! [staff_prices]
//! DOCTOR = 1500
//!
//! [coverage_fractions]
//! STANDARD = 0.80
//! ```
//!
//! Keys are wire names. A key this build does not recognise is rejected at
//! load time, never silently priced as a default.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::pricing::{
    AdjustmentResolver, AmbulanceTax, CatalogKey, CoverageResolver, PricingTables, RateTable,
    TablesError, TaxClass, UnitPriceTable,
};

#[derive(Debug, Error)]
pub enum TablesFileError {
    #[error("Failed to read tables file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse tables file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid tables in {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: TablesError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TablesFile {
    pub version: String,
    pub waiting_rate_per_minute: Decimal,
    pub ambulance_tax: AmbulanceTaxSection,
    pub base_rates: RateSection,
    pub distance_rates: RateSection,
    #[serde(default)]
    pub time_of_day_factors: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub equipment_prices: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub staff_prices: BTreeMap<String, Decimal>,
    pub coverage_fractions: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmbulanceTaxSection {
    pub class: String,
    #[serde(default = "default_true")]
    pub intra_jurisdiction: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateSection {
    pub default_rate: Decimal,
    #[serde(default)]
    pub rates: BTreeMap<String, BTreeMap<String, Decimal>>,
}

fn default_true() -> bool {
    true
}

impl TablesFile {
    /// Read, parse and validate a tables file.
    pub fn load(path: &Path) -> Result<PricingTables, TablesFileError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| TablesFileError::Io {
            path: display.clone(),
            source,
        })?;
        let file: TablesFile =
            toml::from_str(&content).map_err(|source| TablesFileError::Parse {
                path: display.clone(),
                source,
            })?;
        PricingTables::try_from(file).map_err(|source| TablesFileError::Invalid {
            path: display,
            source,
        })
    }
}

impl TryFrom<TablesFile> for PricingTables {
    type Error = TablesError;

    fn try_from(file: TablesFile) -> Result<Self, Self::Error> {
        let class = parse_key::<TaxClass>("ambulance_tax", &file.ambulance_tax.class)?;

        let mut time_of_day = AdjustmentResolver::new();
        for (key, factor) in &file.time_of_day_factors {
            time_of_day.insert(parse_key("time_of_day_factors", key)?, *factor);
        }

        let mut coverage = CoverageResolver::new();
        for (key, fraction) in &file.coverage_fractions {
            coverage.insert(parse_key("coverage_fractions", key)?, *fraction);
        }

        let tables = PricingTables {
            version: file.version,
            base_rates: rate_table("base_rates", &file.base_rates)?,
            distance_rates: rate_table("distance_rates", &file.distance_rates)?,
            time_of_day,
            waiting_rate_per_minute: file.waiting_rate_per_minute,
            equipment_prices: price_table("equipment_prices", &file.equipment_prices)?,
            staff_prices: price_table("staff_prices", &file.staff_prices)?,
            coverage,
            ambulance_tax: AmbulanceTax {
                class,
                intra_jurisdiction: file.ambulance_tax.intra_jurisdiction,
            },
        };
        tables.validate()?;
        Ok(tables)
    }
}

impl From<&PricingTables> for TablesFile {
    fn from(tables: &PricingTables) -> Self {
        Self {
            version: tables.version.clone(),
            waiting_rate_per_minute: tables.waiting_rate_per_minute,
            ambulance_tax: AmbulanceTaxSection {
                class: tables.ambulance_tax.class.to_string(),
                intra_jurisdiction: tables.ambulance_tax.intra_jurisdiction,
            },
            base_rates: rate_section(&tables.base_rates),
            distance_rates: rate_section(&tables.distance_rates),
            time_of_day_factors: named(tables.time_of_day.entries()),
            equipment_prices: named(tables.equipment_prices.entries()),
            staff_prices: named(tables.staff_prices.entries()),
            coverage_fractions: named(tables.coverage.entries()),
        }
    }
}

fn parse_key<K: CatalogKey>(table: &'static str, key: &str) -> Result<K, TablesError> {
    let parsed = K::from_wire(key);
    if parsed.is_recognised() {
        Ok(parsed)
    } else {
        Err(TablesError::UnknownKey {
            table,
            key: key.to_string(),
        })
    }
}

fn rate_table<C: CatalogKey, T: CatalogKey>(
    table: &'static str,
    section: &RateSection,
) -> Result<RateTable<C, T>, TablesError> {
    let mut rates = RateTable::new(section.default_rate);
    for (category, tiers) in &section.rates {
        let category = parse_key::<C>(table, category)?;
        for (tier, rate) in tiers {
            rates.insert(category, parse_key::<T>(table, tier)?, *rate);
        }
    }
    Ok(rates)
}

fn price_table<K: CatalogKey>(
    table: &'static str,
    prices: &BTreeMap<String, Decimal>,
) -> Result<UnitPriceTable<K>, TablesError> {
    let mut out = UnitPriceTable::new();
    for (key, price) in prices {
        out.insert(parse_key::<K>(table, key)?, *price);
    }
    Ok(out)
}

fn rate_section<C: CatalogKey, T: CatalogKey>(table: &RateTable<C, T>) -> RateSection {
    let mut rates: BTreeMap<String, BTreeMap<String, Decimal>> = BTreeMap::new();
    for (category, tier, rate) in table.entries() {
        rates
            .entry(category.to_string())
            .or_default()
            .insert(tier.to_string(), rate);
    }
    RateSection {
        default_rate: table.default_rate(),
        rates,
    }
}

fn named<K: CatalogKey>(entries: impl Iterator<Item = (K, Decimal)>) -> BTreeMap<String, Decimal> {
    entries.map(|(key, value)| (key.to_string(), value)).collect()
}
