//! Time catalog: minutes each garment type costs in design and on the shop floor
//!
//! The catalog is shop configuration. It is handed to the estimator through
//! [`CatalogProvider`] at estimate time and never baked into it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::EngineError;
use super::garment::GarmentType;

/// Per-unit production minutes, one field per shop-floor step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProductionMinutes {
    pub print: f64,
    pub cut: f64,
    pub press: f64,
    pub control: f64,
    /// Slack for reprints, jams and the like
    pub contingency: f64,
}

impl ProductionMinutes {
    pub fn new(print: f64, cut: f64, press: f64, control: f64, contingency: f64) -> Self {
        Self {
            print,
            cut,
            press,
            control,
            contingency,
        }
    }

    /// Total minutes to produce one unit
    pub fn per_unit(&self) -> f64 {
        self.print + self.cut + self.press + self.control + self.contingency
    }

    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Print => self.print,
            Component::Cut => self.cut,
            Component::Press => self.press,
            Component::Control => self.control,
            Component::Contingency => self.contingency,
        }
    }

    pub fn set(&mut self, component: Component, minutes: f64) {
        let slot = match component {
            Component::Print => &mut self.print,
            Component::Cut => &mut self.cut,
            Component::Press => &mut self.press,
            Component::Control => &mut self.control,
            Component::Contingency => &mut self.contingency,
        };
        *slot = minutes;
    }

    fn values(&self) -> [f64; 5] {
        [self.print, self.cut, self.press, self.control, self.contingency]
    }
}

/// Catalog entry for one garment type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CatalogEntry {
    /// Reference design minutes for this garment (informational)
    pub design: f64,
    pub production: ProductionMinutes,
}

impl CatalogEntry {
    pub fn new(design: f64, production: ProductionMinutes) -> Self {
        Self { design, production }
    }
}

/// A catalog field that can be edited from settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Print,
    Cut,
    Press,
    Control,
    Contingency,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Print => "print",
            Component::Cut => "cut",
            Component::Press => "press",
            Component::Control => "control",
            Component::Contingency => "contingency",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Component {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "print" => Ok(Component::Print),
            "cut" => Ok(Component::Cut),
            "press" => Ok(Component::Press),
            "control" => Ok(Component::Control),
            "contingency" => Ok(Component::Contingency),
            other => Err(format!(
                "unknown catalog component '{}' (expected print, cut, press, control or contingency)",
                other
            )),
        }
    }
}

/// Source of catalog entries for the estimator
pub trait CatalogProvider {
    /// Returns the entry for a garment type, or `None` if the shop has not configured it
    fn lookup(&self, garment: GarmentType) -> Option<CatalogEntry>;
}

/// Catalog keyed by garment name, as stored in `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeCatalog(BTreeMap<String, CatalogEntry>);

impl TimeCatalog {
    /// Creates an empty catalog
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, garment: GarmentType, entry: CatalogEntry) {
        self.0.insert(garment.as_str().to_string(), entry);
    }

    pub fn remove(&mut self, garment: GarmentType) -> Option<CatalogEntry> {
        self.0.remove(garment.as_str())
    }

    /// Mutable access to an entry, creating a zeroed one if missing
    pub fn entry_mut(&mut self, garment: GarmentType) -> &mut CatalogEntry {
        self.0.entry(garment.as_str().to_string()).or_default()
    }

    /// Iterates entries in garment-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks that every key names a known garment and no minute value is negative
    pub fn validate(&self) -> Result<(), EngineError> {
        for (key, entry) in &self.0 {
            key.parse::<GarmentType>()?;

            if let Some(bad) = std::iter::once(entry.design)
                .chain(entry.production.values())
                .find(|m| !m.is_finite() || *m < 0.0)
            {
                return Err(EngineError::InvalidDuration(bad));
            }
        }
        Ok(())
    }
}

impl Default for TimeCatalog {
    /// The shop's reference timings
    fn default() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(
            GarmentType::Polo,
            CatalogEntry::new(6.0, ProductionMinutes::new(8.0, 1.0, 2.5, 1.0, 1.25)),
        );
        catalog.insert(
            GarmentType::PoloLongSleeve,
            CatalogEntry::new(0.0, ProductionMinutes::new(10.0, 1.0, 3.0, 1.0, 1.5)),
        );
        catalog.insert(
            GarmentType::Short,
            CatalogEntry::new(0.0, ProductionMinutes::new(6.5, 1.0, 2.0, 1.0, 1.05)),
        );
        catalog.insert(
            GarmentType::SkirtShort,
            CatalogEntry::new(0.0, ProductionMinutes::new(8.0, 1.0, 2.5, 1.0, 1.25)),
        );
        catalog.insert(
            GarmentType::ShortsPant,
            CatalogEntry::new(0.0, ProductionMinutes::new(7.0, 1.0, 2.0, 1.0, 1.1)),
        );
        catalog
    }
}

impl CatalogProvider for TimeCatalog {
    fn lookup(&self, garment: GarmentType) -> Option<CatalogEntry> {
        self.0.get(garment.as_str()).copied()
    }
}
