//! Per-image calibration parameters.
//!
//! A [`CalibrationModel`] is built once per input image by a
//! decoder ([`exiftool`][crate::exiftool] for FLIR sensors,
//! [`dji`][crate::dji] for the vendor SDK), validated once,
//! and then shared read-only across every pixel conversion
//! of the run.

use serde_derive::*;

use crate::error::{ConversionDomainError, Error, Result};
use crate::temperature::{dji_raw_to_temp, planck_raw_to_temp};

/// DJI temperature codes are tenths of a degree on every
/// supported aircraft.
pub const DJI_SCALE: f64 = 10.0;

/// Planck radiation constants from FLIR camera calibration.
///
/// Read from the image metadata; named after the ExifTool
/// tags they come from (PlanckR1, PlanckR2, ...).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PlanckConstants {
    pub r1: f64,
    pub r2: f64,
    pub b: f64,
    pub f: f64,
    pub o: f64,
}

/// Ambient shot parameters carried through to the summary
/// record. Reporting only: none of these feed the conversion
/// formula.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Environment {
    pub distance: Option<f64>,
    pub humidity: Option<f64>,
    pub emissivity: Option<f64>,
    pub reflection: Option<f64>,
}

/// Conversion parameters for one image, discriminated by
/// camera family.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum CalibrationModel {
    Dji {
        scale: f64,
        #[serde(default)]
        environment: Environment,
    },
    Flir {
        planck: PlanckConstants,
        #[serde(default)]
        environment: Environment,
    },
}

impl CalibrationModel {
    /// DJI model with the fixed vendor scale.
    pub fn dji(environment: Environment) -> Self {
        CalibrationModel::Dji {
            scale: DJI_SCALE,
            environment,
        }
    }

    pub fn flir(planck: PlanckConstants, environment: Environment) -> Self {
        CalibrationModel::Flir {
            planck,
            environment,
        }
    }

    pub fn environment(&self) -> &Environment {
        match self {
            CalibrationModel::Dji { environment, .. } => environment,
            CalibrationModel::Flir { environment, .. } => environment,
        }
    }

    /// Check the constants before any pixel is converted, so
    /// a bad image calibration is caught before partial
    /// output is written.
    ///
    /// For FLIR the formula is probed at raw value zero: a
    /// computable logarithm argument that comes out
    /// non-positive fails validation. A probe denominator of
    /// exactly zero is inconclusive here; that case surfaces
    /// per pixel as [`ConversionDomainError`] instead.
    pub fn validate(&self) -> Result<()> {
        match self {
            CalibrationModel::Dji { scale, .. } => {
                if !scale.is_finite() {
                    return Err(Error::invalid_calibration(format!(
                        "DJI scale is not a number: {}",
                        scale
                    )));
                }
                if *scale <= 0. {
                    return Err(Error::invalid_calibration(format!(
                        "DJI scale must be positive, got {}",
                        scale
                    )));
                }
            }
            CalibrationModel::Flir { planck, .. } => {
                for (name, val) in [
                    ("PlanckR1", planck.r1),
                    ("PlanckR2", planck.r2),
                    ("PlanckB", planck.b),
                    ("PlanckF", planck.f),
                    ("PlanckO", planck.o),
                ]
                .iter()
                {
                    if !val.is_finite() {
                        return Err(Error::invalid_calibration(format!(
                            "{} is not a number: {}",
                            name, val
                        )));
                    }
                }
                if planck.r2 == 0. {
                    return Err(Error::invalid_calibration(
                        "PlanckR2 is zero: denominator vanishes for every raw value",
                    ));
                }

                let probe_denominator = planck.r2 * planck.o;
                if probe_denominator != 0. {
                    let arg = planck.r1 / probe_denominator + planck.f;
                    if arg <= 0. {
                        return Err(Error::invalid_calibration(format!(
                            "log argument {} at the zero raw-value probe is not positive",
                            arg
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Convert one raw sensor value to celsius.
    ///
    /// Referentially transparent: no caching, no state, the
    /// same input always maps to the same output.
    pub fn convert(&self, raw: f64) -> Result<f64, ConversionDomainError> {
        match self {
            CalibrationModel::Dji { scale, .. } => Ok(dji_raw_to_temp(raw, *scale)),
            CalibrationModel::Flir { planck, .. } => planck_raw_to_temp(planck, raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flir(r1: f64, r2: f64, b: f64, f: f64, o: f64) -> CalibrationModel {
        CalibrationModel::flir(PlanckConstants { r1, r2, b, f, o }, Environment::default())
    }

    #[test]
    fn dji_default_scale_validates() {
        let model = CalibrationModel::dji(Environment::default());
        model.validate().unwrap();
        assert_eq!(model.convert(215.).unwrap(), 21.5);
    }

    #[test]
    fn dji_rejects_degenerate_scale() {
        for scale in [0., -10., f64::NAN].iter() {
            let model = CalibrationModel::Dji {
                scale: *scale,
                environment: Environment::default(),
            };
            assert!(matches!(
                model.validate(),
                Err(Error::InvalidCalibration { .. })
            ));
        }
    }

    #[test]
    fn flir_constants_validate() {
        flir(16000., 0.04, 1400., 1., 0.).validate().unwrap();
        flir(21106.77, 0.012545258, 1501., 1., 40.)
            .validate()
            .unwrap();
    }

    #[test]
    fn flir_rejects_non_numeric_constants() {
        assert!(flir(f64::NAN, 0.04, 1400., 1., 0.).validate().is_err());
        assert!(flir(16000., 0.04, f64::INFINITY, 1., 0.).validate().is_err());
    }

    #[test]
    fn flir_rejects_zero_r2() {
        match flir(16000., 0., 1400., 1., 0.).validate() {
            Err(Error::InvalidCalibration { reason }) => {
                assert!(reason.contains("PlanckR2"))
            }
            other => panic!("expected InvalidCalibration, got {:?}", other),
        }
    }

    #[test]
    fn flir_rejects_non_positive_probe_argument() {
        // Probe at raw = 0: 16000 / (0.04 * -400) + 1 < 0.
        assert!(flir(16000., 0.04, 1400., 1., -400.).validate().is_err());
    }

    #[test]
    fn flir_zero_offset_probe_is_inconclusive() {
        // o = 0 makes the probe denominator vanish; that is
        // the per-pixel skip case, not a calibration fault.
        flir(16000., 0.04, 1400., 1., 0.).validate().unwrap();
    }
}
