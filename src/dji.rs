//! DJI radiometric JPEG decoding via the vendor SDK.
//!
//! The R-JPEG container is proprietary; decoding is
//! delegated wholesale to [`dji-thermal-sys`]. This module
//! is a safe wrapper around the DIRP handle: create from
//! bytes, read dimensions and measurement parameters, and
//! pull the raw 16-bit temperature codes (tenths of a
//! degree) that [`CalibrationModel::Dji`] divides down to
//! celsius.
//!
//! [`dji-thermal-sys`]: //crates.io/crates/dji-thermal-sys
//! [`CalibrationModel::Dji`]: crate::calibration::CalibrationModel

use std::{
    convert::TryFrom,
    mem::{size_of, MaybeUninit},
    path::Path,
};

use ndarray::Array2;

use dji_thermal_sys::*;

use crate::calibration::{CalibrationModel, Environment};
use crate::error::{Error, Result};
use crate::grid::RawPixelGrid;

pub use dji_thermal_sys::dirp_measurement_params_t as MeasurementParams;

#[derive(Debug)]
pub struct RJpeg {
    handle: DIRP_HANDLE,
}

unsafe impl Send for RJpeg {}

impl RJpeg {
    pub fn try_from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::try_from_bytes(data)
    }

    pub fn try_from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let size = bytes.len() as i32;
        let mut handle = MaybeUninit::uninit();
        let ret = unsafe { dirp_create_from_rjpeg(bytes.as_ptr(), size, handle.as_mut_ptr()) };
        if ret != 0 {
            return Err(Error::decode(format!(
                "not a DJI radiometric JPEG (dirp status {})",
                ret
            )));
        }

        Ok(RJpeg {
            handle: unsafe { handle.assume_init() },
        })
    }

    pub fn dimensions(&self) -> Result<(i32, i32)> {
        let mut resolution = MaybeUninit::uninit();
        let ret = unsafe { dirp_get_rjpeg_resolution(self.handle, resolution.as_mut_ptr()) };
        if ret != 0 {
            return Err(Error::decode(format!(
                "could not read rjpeg dimensions (dirp status {})",
                ret
            )));
        }

        let resolution = unsafe { resolution.assume_init() };
        Ok((resolution.width, resolution.height))
    }

    pub fn measurement_params(&self) -> Result<MeasurementParams> {
        let mut params = MaybeUninit::uninit();
        let ret = unsafe { dirp_get_measurement_params(self.handle, params.as_mut_ptr()) };
        if ret != 0 {
            return Err(Error::decode(format!(
                "could not read measurement params (dirp status {})",
                ret
            )));
        }

        Ok(unsafe { params.assume_init() })
    }

    /// Raw temperature codes, tenths of a degree, as emitted
    /// by `dirp_measure`.
    pub fn raw_codes(&self) -> Result<Array2<f64>> {
        let (width, height) = self.dimensions()?;
        let num_values = width * height;

        let mut values: Vec<i16> = Vec::with_capacity(num_values as usize);
        let ret = unsafe {
            dirp_measure(
                self.handle,
                values.as_mut_ptr(),
                num_values * size_of::<i16>() as i32,
            )
        };
        if ret != 0 {
            return Err(Error::decode(format!(
                "could not measure rjpeg temperatures (dirp status {})",
                ret
            )));
        }
        unsafe {
            values.set_len(num_values as usize);
        }

        let values = values.into_iter().map(|v| v as f64).collect();
        Array2::from_shape_vec((height as usize, width as usize), values)
            .map_err(|e| Error::decode(format!("rjpeg raw grid shape: {}", e)))
    }

    /// Ambient shot parameters, for summary reporting only.
    pub fn environment(&self) -> Result<Environment> {
        let params = self.measurement_params()?;
        Ok(Environment {
            distance: Some(params.distance as f64),
            humidity: Some(params.humidity as f64),
            emissivity: Some(params.emissivity as f64),
            reflection: Some(params.reflection as f64),
        })
    }

    /// The pair the conversion core consumes.
    pub fn thermal(&self) -> Result<(RawPixelGrid, CalibrationModel)> {
        let grid = RawPixelGrid::from_array(self.raw_codes()?);
        let calibration = CalibrationModel::dji(self.environment()?);
        Ok((grid, calibration))
    }
}

impl Drop for RJpeg {
    fn drop(&mut self) {
        unsafe {
            dirp_destroy(self.handle);
        }
    }
}

impl TryFrom<Vec<u8>> for RJpeg {
    type Error = Error;

    fn try_from(value: Vec<u8>) -> Result<Self> {
        RJpeg::try_from_bytes(value)
    }
}
