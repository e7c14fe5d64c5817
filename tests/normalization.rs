use layerfilter::engine::normalize::{linear_rescale, normalize, truncate};
use layerfilter::{FilterError, Normalization, RawField, RawRange};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_field(rng: &mut StdRng, len: usize, lo: f32, hi: f32) -> RawField {
    let data = (0..len).map(|_| rng.random_range(lo..hi)).collect();
    RawField::new(data, 1, len).unwrap()
}

#[test]
fn rescale_stays_within_bounds_and_hits_both_ends() {
    let mut rng = StdRng::seed_from_u64(1);
    for (out_min, out_max) in [(0u8, 255u8), (10, 20), (0, 1), (100, 255), (7, 7)] {
        let field = random_field(&mut rng, 500, -3000.0, 5000.0);
        let bytes = linear_rescale(field.as_slice(), field.range(), out_min, out_max).unwrap();
        assert!(bytes.iter().all(|&b| (out_min..=out_max).contains(&b)));
        assert!(bytes.contains(&out_min));
        assert!(bytes.contains(&out_max));
    }
}

#[test]
fn truncation_is_rounded_modulo() {
    let mut rng = StdRng::seed_from_u64(2);
    let field = random_field(&mut rng, 1000, -10_000.0, 10_000.0);
    let bytes = truncate(field.as_slice(), 255).unwrap();
    for (&raw, &byte) in field.as_slice().iter().zip(&bytes) {
        let expected = (raw as f64).round_ties_even().rem_euclid(255.0) as u8;
        assert_eq!(byte, expected);
        assert!(byte < 255);
    }
}

#[test]
fn truncation_applies_when_rescale_not_requested() {
    let field = RawField::new(vec![-300.0, 0.0, 600.0, 510.0], 2, 2).unwrap();
    let (bytes, mode) = normalize(&field, false, 0, 255).unwrap();
    assert_eq!(mode, Normalization::Truncate);
    assert_eq!(bytes, vec![210, 0, 90, 0]);
}

#[test]
fn rescale_requires_overflow() {
    let inside = RawRange {
        min: 0.0,
        max: 255.0,
    };
    assert_eq!(Normalization::select(true, inside), Normalization::Truncate);
    let below = RawRange {
        min: -0.5,
        max: 10.0,
    };
    assert_eq!(Normalization::select(true, below), Normalization::Rescale);
    let above = RawRange {
        min: 0.0,
        max: 255.5,
    };
    assert_eq!(Normalization::select(true, above), Normalization::Rescale);
    assert_eq!(Normalization::select(false, above), Normalization::Truncate);
}

#[test]
fn constant_overflowing_field_is_a_domain_error() {
    let field = RawField::new(vec![400.0; 6], 2, 3).unwrap();
    let err = normalize(&field, true, 0, 255).unwrap_err();
    assert_eq!(err, FilterError::DegenerateRange { value: 400.0 });

    // Truncation still works for the same field.
    let (bytes, _) = normalize(&field, false, 0, 255).unwrap();
    assert!(bytes.iter().all(|&b| b == 145));
}

#[test]
fn raw_field_rejects_wrong_length() {
    let err = RawField::new(vec![0.0; 3], 2, 2).unwrap_err();
    assert_eq!(err, FilterError::BufferSizeMismatch { needed: 4, got: 3 });
}
