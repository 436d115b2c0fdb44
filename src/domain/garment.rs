//! Garment types and order line items

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::EngineError;

/// The fixed set of garments the shop produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GarmentType {
    Polo,
    PoloLongSleeve,
    Short,
    SkirtShort,
    ShortsPant,
}

impl GarmentType {
    pub const ALL: [GarmentType; 5] = [
        GarmentType::Polo,
        GarmentType::PoloLongSleeve,
        GarmentType::Short,
        GarmentType::SkirtShort,
        GarmentType::ShortsPant,
    ];

    /// Key used in config files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            GarmentType::Polo => "polo",
            GarmentType::PoloLongSleeve => "polo-long-sleeve",
            GarmentType::Short => "short",
            GarmentType::SkirtShort => "skirt-short",
            GarmentType::ShortsPant => "shorts-pant",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            GarmentType::Polo => "Polo",
            GarmentType::PoloLongSleeve => "Long-sleeve polo",
            GarmentType::Short => "Short",
            GarmentType::SkirtShort => "Skirt short",
            GarmentType::ShortsPant => "Shorts pant",
        }
    }
}

impl fmt::Display for GarmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for GarmentType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        GarmentType::ALL
            .into_iter()
            .find(|g| g.as_str() == key)
            .ok_or_else(|| EngineError::UnknownGarmentType(s.trim().to_string()))
    }
}

/// One line of an order: a garment type and how many units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub garment: GarmentType,
    pub quantity: u32,
}

impl OrderItem {
    pub fn new(garment: GarmentType, quantity: u32) -> Self {
        Self { garment, quantity }
    }

    /// Fails with `InvalidQuantity` when fewer than one unit is ordered
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.quantity < 1 {
            return Err(EngineError::InvalidQuantity {
                garment: self.garment,
                quantity: self.quantity,
            });
        }
        Ok(())
    }
}

impl fmt::Display for OrderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.quantity, self.garment.label())
    }
}

/// Parses `GARMENT[:QUANTITY]`, e.g. `polo:2` or `short` (one unit)
impl FromStr for OrderItem {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (garment, quantity) = match s.split_once(':') {
            Some((g, q)) => {
                let quantity = q
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| EngineError::InvalidItem(s.to_string()))?;
                (g, quantity)
            }
            None => (s, 1),
        };

        if garment.trim().is_empty() {
            return Err(EngineError::InvalidItem(s.to_string()));
        }

        Ok(Self {
            garment: garment.parse()?,
            quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garment_names_roundtrip() {
        for garment in GarmentType::ALL {
            assert_eq!(garment.as_str().parse::<GarmentType>().unwrap(), garment);
        }
    }

    #[test]
    fn garment_parse_is_lenient_on_case_and_underscores() {
        assert_eq!("POLO".parse::<GarmentType>().unwrap(), GarmentType::Polo);
        assert_eq!(
            "polo_long_sleeve".parse::<GarmentType>().unwrap(),
            GarmentType::PoloLongSleeve
        );
    }

    #[test]
    fn unknown_garment_is_rejected() {
        assert_eq!(
            "hoodie".parse::<GarmentType>(),
            Err(EngineError::UnknownGarmentType("hoodie".to_string()))
        );
    }

    #[test]
    fn garment_serializes_kebab_case() {
        let json = serde_json::to_string(&GarmentType::SkirtShort).unwrap();
        assert_eq!(json, "\"skirt-short\"");
    }

    #[test]
    fn item_parse_with_and_without_quantity() {
        assert_eq!(
            "polo:2".parse::<OrderItem>().unwrap(),
            OrderItem::new(GarmentType::Polo, 2)
        );
        assert_eq!(
            "short".parse::<OrderItem>().unwrap(),
            OrderItem::new(GarmentType::Short, 1)
        );
    }

    #[test]
    fn item_parse_rejects_bad_quantity() {
        assert!(matches!(
            "polo:two".parse::<OrderItem>(),
            Err(EngineError::InvalidItem(_))
        ));
        assert!(matches!(
            ":3".parse::<OrderItem>(),
            Err(EngineError::InvalidItem(_))
        ));
    }

    #[test]
    fn zero_quantity_fails_validation() {
        let item: OrderItem = "polo:0".parse().unwrap();
        assert_eq!(
            item.validate(),
            Err(EngineError::InvalidQuantity {
                garment: GarmentType::Polo,
                quantity: 0
            })
        );
    }
}
