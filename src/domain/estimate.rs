//! Order time estimation
//!
//! Turns an item list plus the designer's hour estimate into minute totals.
//! Pure: the catalog is passed in, nothing is cached between calls.

use serde::{Deserialize, Serialize};

use super::catalog::CatalogProvider;
use super::error::EngineError;
use super::garment::OrderItem;

/// Minute totals for an order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub design_minutes: f64,
    pub production_minutes: f64,
    pub total_minutes: f64,
}

/// Estimator bound to a catalog source
pub struct OrderTimeEstimator<'a, C: CatalogProvider + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: CatalogProvider + ?Sized> OrderTimeEstimator<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Computes design, production and total minutes
    ///
    /// Fails on the first item whose garment is missing from the catalog
    /// (`UnknownGarmentType`) or whose quantity is below one (`InvalidQuantity`).
    pub fn estimate(&self, items: &[OrderItem], design_hours: f64) -> Result<Estimate, EngineError> {
        if !design_hours.is_finite() || design_hours < 0.0 {
            return Err(EngineError::InvalidDesignHours(design_hours));
        }

        let mut production_minutes = 0.0;
        for item in items {
            item.validate()?;
            let entry = self
                .catalog
                .lookup(item.garment)
                .ok_or_else(|| EngineError::UnknownGarmentType(item.garment.to_string()))?;
            production_minutes += entry.production.per_unit() * f64::from(item.quantity);
        }

        let design_minutes = design_hours * 60.0;

        Ok(Estimate {
            design_minutes,
            production_minutes,
            total_minutes: design_minutes + production_minutes,
        })
    }
}

/// Formats a minute count as `Xh Ym`, rounding to the nearest whole minute
pub fn format_minutes(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as u64;
    format!("{}h {}m", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{CatalogEntry, ProductionMinutes, TimeCatalog};
    use crate::domain::garment::GarmentType;
    use proptest::prelude::*;

    fn polo_only() -> TimeCatalog {
        let mut catalog = TimeCatalog::empty();
        catalog.insert(
            GarmentType::Polo,
            CatalogEntry::new(0.0, ProductionMinutes::new(8.0, 1.0, 2.5, 1.0, 1.25)),
        );
        catalog
    }

    #[test]
    fn two_polos_half_hour_design() {
        let catalog = polo_only();
        let estimate = OrderTimeEstimator::new(&catalog)
            .estimate(&[OrderItem::new(GarmentType::Polo, 2)], 0.5)
            .unwrap();

        assert_eq!(estimate.design_minutes, 30.0);
        assert_eq!(estimate.production_minutes, 27.5);
        assert_eq!(estimate.total_minutes, 57.5);
    }

    #[test]
    fn mixed_items_sum_per_line() {
        let catalog = TimeCatalog::default();
        let items = [
            OrderItem::new(GarmentType::Polo, 1),
            OrderItem::new(GarmentType::ShortsPant, 2),
        ];
        let estimate = OrderTimeEstimator::new(&catalog).estimate(&items, 0.0).unwrap();

        // 13.75 + 2 * 12.1
        assert!((estimate.production_minutes - 37.95).abs() < 1e-9);
        assert_eq!(estimate.design_minutes, 0.0);
    }

    #[test]
    fn missing_catalog_entry_is_unknown_garment() {
        let catalog = polo_only();
        let result = OrderTimeEstimator::new(&catalog)
            .estimate(&[OrderItem::new(GarmentType::Short, 1)], 1.0);

        assert_eq!(
            result,
            Err(EngineError::UnknownGarmentType("short".to_string()))
        );
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let catalog = polo_only();
        let result = OrderTimeEstimator::new(&catalog)
            .estimate(&[OrderItem::new(GarmentType::Polo, 0)], 1.0);

        assert!(matches!(result, Err(EngineError::InvalidQuantity { .. })));
    }

    #[test]
    fn negative_design_hours_are_rejected() {
        let catalog = polo_only();
        let result = OrderTimeEstimator::new(&catalog).estimate(&[], -0.5);

        assert_eq!(result, Err(EngineError::InvalidDesignHours(-0.5)));
    }

    #[test]
    fn catalog_is_read_at_estimate_time() {
        let mut catalog = polo_only();
        let items = [OrderItem::new(GarmentType::Polo, 1)];

        let before = OrderTimeEstimator::new(&catalog).estimate(&items, 0.0).unwrap();
        catalog
            .entry_mut(GarmentType::Polo)
            .production
            .set(crate::domain::catalog::Component::Print, 10.0);
        let after = OrderTimeEstimator::new(&catalog).estimate(&items, 0.0).unwrap();

        assert_eq!(before.total_minutes, 13.75);
        assert_eq!(after.total_minutes, 15.75);
    }

    #[test]
    fn format_minutes_rounds() {
        assert_eq!(format_minutes(57.5), "0h 58m");
        assert_eq!(format_minutes(125.0), "2h 5m");
        assert_eq!(format_minutes(0.0), "0h 0m");
    }

    fn arb_item() -> impl Strategy<Value = OrderItem> {
        (0usize..GarmentType::ALL.len(), 1u32..500)
            .prop_map(|(g, q)| OrderItem::new(GarmentType::ALL[g], q))
    }

    proptest! {
        #[test]
        fn total_is_design_plus_production(
            items in prop::collection::vec(arb_item(), 0..8),
            hours in 0.0f64..40.0,
        ) {
            let catalog = TimeCatalog::default();
            let estimate = OrderTimeEstimator::new(&catalog).estimate(&items, hours).unwrap();

            prop_assert_eq!(
                estimate.total_minutes,
                estimate.design_minutes + estimate.production_minutes
            );
            prop_assert!(estimate.production_minutes >= 0.0);
        }
    }
}
