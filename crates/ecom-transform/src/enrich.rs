//! Derived product and line-item fields.

use std::fmt;

use ecom_model::round2;
use serde::{Deserialize, Serialize};

/// Profit margin as a percentage of price, rounded to two decimals.
///
/// Absent when either input is absent or the price is not positive.
///
/// ```
/// use ecom_transform::profit_margin;
///
/// assert_eq!(profit_margin(Some(100.0), Some(60.0)), Some(40.0));
/// assert_eq!(profit_margin(Some(0.0), Some(60.0)), None);
/// ```
pub fn profit_margin(price: Option<f64>, cost: Option<f64>) -> Option<f64> {
    let (price, cost) = (price?, cost?);
    if price <= 0.0 {
        return None;
    }
    Some(round2((price - cost) / price * 100.0))
}

/// Line total recomputed from its parts, rounded to two decimals.
///
/// A missing discount counts as no discount. A missing quantity or unit
/// price leaves the total absent.
pub fn line_total(
    quantity: Option<i64>,
    unit_price: Option<f64>,
    discount_percentage: Option<f64>,
) -> Option<f64> {
    let quantity = quantity? as f64;
    let unit_price = unit_price?;
    let discount = discount_percentage.unwrap_or(0.0);
    Some(round2(quantity * unit_price * (1.0 - discount / 100.0)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceCategory {
    Budget,
    #[serde(rename = "Mid-range")]
    MidRange,
    Premium,
}

impl PriceCategory {
    /// Classify a price against [`PRICE_TIERS`]; absent price stays absent.
    pub fn classify(price: Option<f64>) -> Option<Self> {
        let price = price?;
        PRICE_TIERS
            .iter()
            .find(|tier| tier.upper_bound.is_none_or(|bound| price < bound))
            .map(|tier| tier.category)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Budget => "Budget",
            Self::MidRange => "Mid-range",
            Self::Premium => "Premium",
        }
    }
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the price threshold table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTier {
    pub category: PriceCategory,
    /// Exclusive upper bound; `None` for the open-ended top tier.
    pub upper_bound: Option<f64>,
}

/// The only price threshold table. Production products and the warehouse
/// `dim_products.price_range` column are both derived from it.
pub const PRICE_TIERS: [PriceTier; 3] = [
    PriceTier {
        category: PriceCategory::Budget,
        upper_bound: Some(50.0),
    },
    PriceTier {
        category: PriceCategory::MidRange,
        upper_bound: Some(200.0),
    },
    PriceTier {
        category: PriceCategory::Premium,
        upper_bound: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_requires_both_inputs() {
        assert_eq!(profit_margin(None, Some(10.0)), None);
        assert_eq!(profit_margin(Some(10.0), None), None);
        assert_eq!(profit_margin(Some(-5.0), Some(1.0)), None);
        assert_eq!(profit_margin(Some(80.0), Some(60.0)), Some(25.0));
        assert_eq!(profit_margin(Some(3.0), Some(1.0)), Some(66.67));
    }

    #[test]
    fn line_total_applies_discount() {
        assert_eq!(line_total(Some(3), Some(10.0), Some(10.0)), Some(27.0));
        assert_eq!(line_total(Some(2), Some(19.99), None), Some(39.98));
        assert_eq!(line_total(Some(1), None, Some(5.0)), None);
        assert_eq!(line_total(None, Some(5.0), Some(5.0)), None);
    }

    #[test]
    fn price_tiers_are_ordered_boundaries() {
        assert_eq!(PriceCategory::classify(Some(0.0)), Some(PriceCategory::Budget));
        assert_eq!(PriceCategory::classify(Some(49.99)), Some(PriceCategory::Budget));
        assert_eq!(PriceCategory::classify(Some(50.0)), Some(PriceCategory::MidRange));
        assert_eq!(PriceCategory::classify(Some(199.99)), Some(PriceCategory::MidRange));
        assert_eq!(PriceCategory::classify(Some(200.0)), Some(PriceCategory::Premium));
        assert_eq!(PriceCategory::classify(None), None);
    }
}
