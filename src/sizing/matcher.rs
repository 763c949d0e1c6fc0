//! Size-based product matching
//!
//! A product is wearable when it is available and at least one of its size
//! fields lies within the per-unit tolerance of the measurement. A check is
//! skipped when either side lacks the field.

use serde::Serialize;

use super::units::{Listing, SizeFields};

/// Diameter tolerance in millimeters
pub const DIAMETER_TOLERANCE_MM: f64 = 2.0;
/// Circumference tolerance in millimeters
pub const CIRCUMFERENCE_TOLERANCE_MM: f64 = 5.0;
/// EU size tolerance in size units
pub const EU_SIZE_TOLERANCE: f64 = 1.0;
/// US size tolerance in size units
pub const US_SIZE_TOLERANCE: f64 = 0.5;

/// Absorbs binary float noise so that a difference of exactly the
/// tolerance (e.g. 7.6 - 7.1) is still inside it
const FLOAT_SLACK: f64 = 1e-9;

/// One proximity check of the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCheck {
    Diameter,
    Circumference,
    SizeEu,
    SizeUs,
}

impl SizeCheck {
    /// All checks, in priority order
    pub const ALL: [SizeCheck; 4] = [
        SizeCheck::Diameter,
        SizeCheck::Circumference,
        SizeCheck::SizeEu,
        SizeCheck::SizeUs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeCheck::Diameter => "diameter",
            SizeCheck::Circumference => "circumference",
            SizeCheck::SizeEu => "size_eu",
            SizeCheck::SizeUs => "size_us",
        }
    }

    pub fn tolerance(&self) -> f64 {
        match self {
            SizeCheck::Diameter => DIAMETER_TOLERANCE_MM,
            SizeCheck::Circumference => CIRCUMFERENCE_TOLERANCE_MM,
            SizeCheck::SizeEu => EU_SIZE_TOLERANCE,
            SizeCheck::SizeUs => US_SIZE_TOLERANCE,
        }
    }

    fn field<T: SizeFields + ?Sized>(&self, value: &T) -> Option<f64> {
        match self {
            SizeCheck::Diameter => value.diameter_mm(),
            SizeCheck::Circumference => value.circumference_mm(),
            SizeCheck::SizeEu => value.size_eu(),
            SizeCheck::SizeUs => value.size_us(),
        }
    }

    /// Absolute difference between the two sides, if both carry the field
    pub fn difference<M, P>(&self, measurement: &M, product: &P) -> Option<f64>
    where
        M: SizeFields + ?Sized,
        P: SizeFields + ?Sized,
    {
        match (self.field(measurement), self.field(product)) {
            (Some(a), Some(b)) => Some((a - b).abs()),
            _ => None,
        }
    }

    /// Whether this check passes; absent fields never pass
    pub fn passes<M, P>(&self, measurement: &M, product: &P) -> bool
    where
        M: SizeFields + ?Sized,
        P: SizeFields + ?Sized,
    {
        self.difference(measurement, product)
            .map(|diff| diff <= self.tolerance() + FLOAT_SLACK)
            .unwrap_or(false)
    }
}

/// Checks that pass between a measurement and a product, ignoring
/// availability
pub fn matching_checks<M, P>(measurement: &M, product: &P) -> Vec<SizeCheck>
where
    M: SizeFields + ?Sized,
    P: SizeFields + ?Sized,
{
    SizeCheck::ALL
        .iter()
        .copied()
        .filter(|check| check.passes(measurement, product))
        .collect()
}

/// Whether a product is a wearable match for the measurement
pub fn is_match<M, P>(measurement: &M, product: &P) -> bool
where
    M: SizeFields + ?Sized,
    P: Listing + ?Sized,
{
    product.is_available()
        && SizeCheck::ALL
            .iter()
            .any(|check| check.passes(measurement, product))
}

/// Filter a catalog down to wearable products, preserving catalog order
pub fn match_products<'a, M, P>(measurement: &M, products: &'a [P]) -> Vec<&'a P>
where
    M: SizeFields + ?Sized,
    P: Listing,
{
    products
        .iter()
        .filter(|product| is_match(measurement, *product))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::converter::from_diameter;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Item {
        id: u32,
        available: bool,
        diameter_mm: Option<f64>,
        circumference_mm: Option<f64>,
        size_eu: Option<f64>,
        size_us: Option<f64>,
    }

    impl SizeFields for Item {
        fn diameter_mm(&self) -> Option<f64> {
            self.diameter_mm
        }
        fn circumference_mm(&self) -> Option<f64> {
            self.circumference_mm
        }
        fn size_eu(&self) -> Option<f64> {
            self.size_eu
        }
        fn size_us(&self) -> Option<f64> {
            self.size_us
        }
    }

    impl Listing for Item {
        fn is_available(&self) -> bool {
            self.available
        }
    }

    fn item(id: u32) -> Item {
        Item { id, available: true, ..Default::default() }
    }

    #[test]
    fn test_diameter_within_tolerance() {
        let measurement = Item {
            diameter_mm: Some(18.0),
            size_eu: Some(18.0),
            ..item(0)
        };
        let product = Item { diameter_mm: Some(19.5), ..item(1) };
        assert!(is_match(&measurement, &product));
        assert_eq!(matching_checks(&measurement, &product), vec![SizeCheck::Diameter]);
    }

    #[test]
    fn test_us_size_outside_tolerance() {
        let measurement = Item { size_us: Some(7.1), ..item(0) };
        let product = Item { size_us: Some(7.8), ..item(1) };
        assert!(!is_match(&measurement, &product));
    }

    #[test]
    fn test_tolerance_edges_are_inclusive() {
        let measurement = from_diameter(18.0).unwrap();
        let on_edge = Item { size_us: Some(7.6), ..item(1) };
        assert!(is_match(&measurement, &on_edge));

        let diameter_edge = Item { diameter_mm: Some(20.0), ..item(2) };
        assert!(is_match(&measurement, &diameter_edge));

        let circumference_edge = Item { circumference_mm: Some(61.55), ..item(3) };
        assert!(is_match(&measurement, &circumference_edge));

        let past_edge = Item { diameter_mm: Some(20.01), ..item(4) };
        assert!(!is_match(&measurement, &past_edge));
    }

    #[test]
    fn test_unavailable_never_matches() {
        let measurement = from_diameter(18.0).unwrap();
        let product = Item {
            available: false,
            diameter_mm: Some(18.0),
            circumference_mm: Some(56.55),
            size_eu: Some(18.0),
            size_us: Some(7.1),
            ..item(1)
        };
        assert!(!is_match(&measurement, &product));
        assert_eq!(matching_checks(&measurement, &product).len(), 4);
    }

    #[test]
    fn test_single_check_is_enough() {
        let measurement = from_diameter(18.0).unwrap();
        // Diameter off by 10 mm but EU size within 1
        let product = Item {
            diameter_mm: Some(28.0),
            size_eu: Some(18.8),
            ..item(1)
        };
        assert!(is_match(&measurement, &product));
        assert_eq!(matching_checks(&measurement, &product), vec![SizeCheck::SizeEu]);
    }

    #[test]
    fn test_product_without_sizes_is_excluded() {
        let measurement = from_diameter(18.0).unwrap();
        assert!(!is_match(&measurement, &item(1)));
    }

    #[test]
    fn test_match_products_preserves_order() {
        let measurement = from_diameter(18.0).unwrap();
        let catalog = vec![
            Item { size_eu: Some(18.5), ..item(1) },
            Item { size_eu: Some(25.0), ..item(2) },
            Item { available: false, size_eu: Some(18.0), ..item(3) },
            Item { circumference_mm: Some(58.0), ..item(4) },
            Item { diameter_mm: Some(17.0), ..item(5) },
        ];
        let ids: Vec<u32> = match_products(&measurement, &catalog)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1, 4, 5]);
    }

    #[test]
    fn test_empty_catalog() {
        let measurement = from_diameter(18.0).unwrap();
        let catalog: Vec<Item> = Vec::new();
        assert!(match_products(&measurement, &catalog).is_empty());
    }

    #[test]
    fn test_partial_measurement() {
        // Stored measurement with only a circumference
        let measurement = Item { circumference_mm: Some(56.55), ..item(0) };
        let by_diameter = Item { diameter_mm: Some(18.0), ..item(1) };
        let by_circumference = Item { circumference_mm: Some(60.0), ..item(2) };
        assert!(!is_match(&measurement, &by_diameter));
        assert!(is_match(&measurement, &by_circumference));
    }
}
