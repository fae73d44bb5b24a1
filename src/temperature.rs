//! Functions to compute temperature from raw sensor values.
//!
//! Two camera families, two formulas. DJI radiometric JPEGs
//! decode to linear temperature codes in tenths of a degree,
//! so conversion is a fixed division. FLIR-based sensors
//! (Boson, Lepton, Tau) store raw counts that go through the
//! inverse Planck calibration, with per-image constants read
//! from metadata. The Planck direction pair is ported from
//! the [Thermimage R library] and its [python
//! port][read_thermal.py].
//!
//! Every function here is pure: same raw value and constants,
//! same answer.
//!
//! [read_thermal.py]: //github.com/Nervengift/read_thermal.py/blob/master/flir_image_extractor.py
//! [Thermimage R library]: //github.com/gtatters/Thermimage/blob/master/R/raw2temp.R

use crate::calibration::PlanckConstants;
use crate::error::ConversionDomainError;

pub(crate) const CELSIUS_OFFSET: f64 = 273.15;

/// Convert a DJI raw temperature code to celsius.
///
/// The vendor SDK emits codes in `1/scale` degrees (scale is
/// 10.0 for every supported aircraft). Downstream
/// verification compares against vendor-tool readings, so no
/// rounding happens here.
#[inline]
pub fn dji_raw_to_temp(raw: f64, scale: f64) -> f64 {
    raw / scale
}

/// Convert a FLIR raw sensor count to celsius.
///
/// `temp = B / ln(R1 / (R2 * (raw + O)) + F) - 273.15`
///
/// Fails when `raw + O` is zero or the logarithm argument is
/// non-positive; both occur on invalid edge pixels and are
/// skipped by the caller.
pub fn planck_raw_to_temp(
    planck: &PlanckConstants,
    raw: f64,
) -> Result<f64, ConversionDomainError> {
    let denominator = planck.r2 * (raw + planck.o);
    if denominator == 0. {
        return Err(ConversionDomainError::ZeroDenominator { raw });
    }

    let arg = planck.r1 / denominator + planck.f;
    if arg <= 0. {
        return Err(ConversionDomainError::NonPositiveLog { raw, arg });
    }

    Ok(planck.b / arg.ln() - CELSIUS_OFFSET)
}

/// Inverse of [`planck_raw_to_temp`].
///
/// `raw = R1 / (R2 * (exp(B / (temp + 273.15)) - F)) - O`
///
/// Handy for synthesizing raw counts that convert to a known
/// temperature.
pub fn planck_temp_to_raw(planck: &PlanckConstants, temp: f64) -> f64 {
    planck.r1 / (planck.r2 * ((planck.b / (temp + CELSIUS_OFFSET)).exp() - planck.f)) - planck.o
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planck(r1: f64, r2: f64, b: f64, f: f64, o: f64) -> PlanckConstants {
        PlanckConstants { r1, r2, b, f, o }
    }

    #[test]
    fn dji_codes_are_tenths() {
        for raw in [-400i32, 0, 1, 200, 205, 215, 4500, 65535].iter() {
            let raw = *raw as f64;
            assert_eq!(dji_raw_to_temp(raw, 10.0), raw / 10.0);
        }
    }

    #[test]
    fn planck_matches_direct_evaluation() {
        let p = planck(16000., 0.04, 1400., 1., 0.);
        let raw = 1000.;

        let expected = p.b / (p.r1 / (p.r2 * (raw + p.o)) + p.f).ln() - 273.15;
        let got = planck_raw_to_temp(&p, raw).unwrap();
        assert!(
            ((got - expected) / expected).abs() < 1e-9,
            "got {}, expected {}",
            got,
            expected
        );
    }

    #[test]
    fn planck_over_a_raw_sweep() {
        let p = planck(21106.77, 0.012545258, 1501., 1., 40.);
        for raw in (1000..30000).step_by(977) {
            let raw = raw as f64;
            let expected = p.b / (p.r1 / (p.r2 * (raw + p.o)) + p.f).ln() - 273.15;
            let got = planck_raw_to_temp(&p, raw).unwrap();
            assert!((got - expected).abs() <= 1e-9 * expected.abs().max(1.));
        }
    }

    #[test]
    fn zero_denominator_is_a_domain_error() {
        let p = planck(16000., 0.04, 1400., 1., 0.);
        assert_eq!(
            planck_raw_to_temp(&p, 0.),
            Err(ConversionDomainError::ZeroDenominator { raw: 0. })
        );

        let p = planck(16000., 0.04, 1400., 1., -512.);
        assert_eq!(
            planck_raw_to_temp(&p, 512.),
            Err(ConversionDomainError::ZeroDenominator { raw: 512. })
        );
    }

    #[test]
    fn non_positive_log_argument_is_a_domain_error() {
        // r1 negative drives the argument below zero for
        // every in-range raw value.
        let p = planck(-16000., 0.04, 1400., 0.5, 0.);
        match planck_raw_to_temp(&p, 1000.) {
            Err(ConversionDomainError::NonPositiveLog { raw, arg }) => {
                assert_eq!(raw, 1000.);
                assert!(arg <= 0.);
            }
            other => panic!("expected NonPositiveLog, got {:?}", other),
        }
    }

    #[test]
    fn temp_to_raw_inverts_raw_to_temp() {
        let p = planck(21106.77, 0.012545258, 1501., 1., 40.);
        let raw = planck_temp_to_raw(&p, 35.);
        let temp = planck_raw_to_temp(&p, raw).unwrap();
        assert!((temp - 35.).abs() < 1e-9);
    }
}
