//! Property-based tests for the sizing engine and matcher.
//!
//! - Round trip: from_circumference(π × d) reproduces from_diameter(d)
//! - Identity: from_eu_size(d) == from_diameter(d)
//! - Monotonicity in the diameter
//! - Calibration pixel scale cancels out
//! - Matcher never returns unavailable listings and accepts any single check

use std::f64::consts::PI;

use proptest::prelude::*;
use ringfit::sizing::{
    from_calibration, from_circumference, from_diameter, from_eu_size, from_us_size,
    match_products, CalibrationSample, InvalidReason, Listing, Measurement, SizeFields,
    SizingError,
};

const MM_TOLERANCE: f64 = 0.01 + 1e-9;
const SIZE_TOLERANCE: f64 = 0.1 + 1e-9;

fn assert_close(a: &Measurement, b: &Measurement) {
    assert!((a.diameter_mm - b.diameter_mm).abs() <= MM_TOLERANCE, "{:?} vs {:?}", a, b);
    assert!((a.circumference_mm - b.circumference_mm).abs() <= MM_TOLERANCE, "{:?} vs {:?}", a, b);
    assert!((a.size_eu - b.size_eu).abs() <= SIZE_TOLERANCE, "{:?} vs {:?}", a, b);
    assert!((a.size_us - b.size_us).abs() <= SIZE_TOLERANCE, "{:?} vs {:?}", a, b);
}

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn diameter_strategy() -> impl Strategy<Value = f64> {
    1.0f64..200.0
}

fn radius_strategy() -> impl Strategy<Value = f64> {
    1.0f64..1000.0
}

/// Large enough that the ring never rounds away to a zero size
fn ring_radius_strategy() -> impl Strategy<Value = f64> {
    50.0f64..1000.0
}

#[derive(Debug, Clone)]
struct Listed {
    available: bool,
    diameter_mm: Option<f64>,
    circumference_mm: Option<f64>,
    size_eu: Option<f64>,
    size_us: Option<f64>,
}

impl SizeFields for Listed {
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

impl Listing for Listed {
    fn is_available(&self) -> bool {
        self.available
    }
}

fn listed_strategy() -> impl Strategy<Value = Listed> {
    (
        any::<bool>(),
        proptest::option::of(5.0f64..80.0),
        proptest::option::of(15.0f64..250.0),
        proptest::option::of(5.0f64..80.0),
        proptest::option::of(1.0f64..30.0),
    )
        .prop_map(|(available, diameter_mm, circumference_mm, size_eu, size_us)| Listed {
            available,
            diameter_mm,
            circumference_mm,
            size_eu,
            size_us,
        })
}

// =============================================================================
// CONVERSION PROPERTY TESTS
// =============================================================================

mod conversion_properties {
    use super::*;

    proptest! {
        /// Converting the exact circumference lands on the same measurement
        #[test]
        fn circumference_round_trip(d in diameter_strategy()) {
            let direct = from_diameter(d).unwrap();
            let via_circumference = from_circumference(PI * d).unwrap();
            assert_close(&direct, &via_circumference);
        }

        /// The EU size goes through the same formula path as the diameter
        #[test]
        fn eu_size_is_identity(d in diameter_strategy()) {
            prop_assert_eq!(from_eu_size(d).unwrap(), from_diameter(d).unwrap());
        }

        /// Larger diameters never produce smaller sizes
        #[test]
        fn diameter_is_monotonic(d in diameter_strategy(), step in 0.0f64..50.0) {
            let small = from_diameter(d).unwrap();
            let large = from_diameter(d + step).unwrap();
            prop_assert!(large.diameter_mm >= small.diameter_mm);
            prop_assert!(large.circumference_mm >= small.circumference_mm);
            prop_assert!(large.size_eu >= small.size_eu);
            prop_assert!(large.size_us >= small.size_us);
        }

        /// Half a millimeter is enough to move every rounded field
        #[test]
        fn diameter_is_strictly_monotonic_past_rounding(
            d in diameter_strategy(),
            step in 0.5f64..50.0,
        ) {
            let small = from_diameter(d).unwrap();
            let large = from_diameter(d + step).unwrap();
            prop_assert!(large.diameter_mm > small.diameter_mm);
            prop_assert!(large.circumference_mm > small.circumference_mm);
            prop_assert!(large.size_eu > small.size_eu);
            prop_assert!(large.size_us > small.size_us);
        }

        /// Scaling both pixel radii by the same factor changes nothing
        #[test]
        fn calibration_is_scale_invariant(
            ring in ring_radius_strategy(),
            reference in radius_strategy(),
            coin in 10.0f64..40.0,
            scale in 0.1f64..10.0,
        ) {
            let base = from_calibration(
                &CalibrationSample::new(ring, reference).with_reference_diameter(coin),
            );
            let scaled = from_calibration(
                &CalibrationSample::new(ring * scale, reference * scale)
                    .with_reference_diameter(coin),
            );
            match (base, scaled) {
                (Ok(a), Ok(b)) => assert_close(&a, &b),
                (a, b) => prop_assert!(false, "unexpected results {:?} / {:?}", a, b),
            }
        }

        /// Every engine output satisfies the consistency invariant
        #[test]
        fn outputs_are_consistent(d in diameter_strategy(), us in 1.0f64..30.0) {
            prop_assert!(from_diameter(d).unwrap().is_consistent());
            prop_assert!(from_circumference(d * PI).unwrap().is_consistent());
            prop_assert!(from_us_size(us).unwrap().is_consistent());
        }

        /// Non-positive input is always rejected
        #[test]
        fn non_positive_input_is_rejected(v in -1000.0f64..=0.0) {
            prop_assert!(from_diameter(v).is_err());
            prop_assert!(from_circumference(v).is_err());
            prop_assert!(from_us_size(v).is_err());
            prop_assert!(from_eu_size(v).is_err());
        }
    }

    #[test]
    fn boundary_cases_fail_with_invalid_input() {
        let results = [
            from_diameter(0.0),
            from_diameter(-5.0),
            from_circumference(0.0),
            from_us_size(0.0),
            from_eu_size(0.0),
            from_calibration(&CalibrationSample::new(100.0, 0.0)),
        ];
        for result in results {
            assert!(matches!(result, Err(SizingError::InvalidInput { .. })));
        }

        let err = from_calibration(&CalibrationSample::new(100.0, 0.0)).unwrap_err();
        assert_eq!(err.reason(), InvalidReason::ZeroReferenceRadius);
        assert!(err.to_string().contains("reference radius cannot be zero"));
    }

    #[test]
    fn calibration_scenario() {
        let m = from_calibration(&CalibrationSample::new(100.0, 50.0)).unwrap();
        assert_eq!(m, from_diameter(48.0).unwrap());
    }
}

// =============================================================================
// MATCHER PROPERTY TESTS
// =============================================================================

mod matcher_properties {
    use super::*;

    proptest! {
        /// Unavailable listings are never returned, however close they are
        #[test]
        fn unavailable_never_matches(
            d in 5.0f64..80.0,
            listings in proptest::collection::vec(listed_strategy(), 0..20),
        ) {
            let measurement = from_diameter(d).unwrap();
            for listed in match_products(&measurement, listings.as_slice()) {
                prop_assert!(listed.available);
            }

            let twin = Listed {
                available: false,
                diameter_mm: Some(measurement.diameter_mm),
                circumference_mm: Some(measurement.circumference_mm),
                size_eu: Some(measurement.size_eu),
                size_us: Some(measurement.size_us),
            };
            prop_assert!(match_products(&measurement, &[twin]).is_empty());
        }

        /// Matches come back in catalog order
        #[test]
        fn catalog_order_is_preserved(
            d in 5.0f64..80.0,
            listings in proptest::collection::vec(listed_strategy(), 0..20),
        ) {
            let measurement = from_diameter(d).unwrap();
            let matched = match_products(&measurement, listings.as_slice());
            let positions: Vec<usize> = matched
                .iter()
                .map(|m| listings.iter().position(|l| std::ptr::eq(l, *m)).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }

        /// A single passing check is enough
        #[test]
        fn one_check_is_enough(d in 5.0f64..80.0, off in -1.0f64..=1.0) {
            let measurement = from_diameter(d).unwrap();
            let listed = Listed {
                available: true,
                diameter_mm: Some(measurement.diameter_mm + 10.0),
                circumference_mm: None,
                size_eu: Some(measurement.size_eu + off),
                size_us: None,
            };
            prop_assert_eq!(match_products(&measurement, &[listed]).len(), 1);
        }
    }

    #[test]
    fn us_size_just_outside_tolerance() {
        struct UsOnly(f64);
        impl SizeFields for UsOnly {
            fn diameter_mm(&self) -> Option<f64> {
                None
            }
            fn circumference_mm(&self) -> Option<f64> {
                None
            }
            fn size_eu(&self) -> Option<f64> {
                None
            }
            fn size_us(&self) -> Option<f64> {
                Some(self.0)
            }
        }

        let listed = Listed {
            available: true,
            diameter_mm: None,
            circumference_mm: None,
            size_eu: None,
            size_us: Some(7.8),
        };
        assert!(match_products(&UsOnly(7.1), &[listed.clone()]).is_empty());
        assert_eq!(match_products(&UsOnly(7.4), &[listed]).len(), 1);
    }
}
