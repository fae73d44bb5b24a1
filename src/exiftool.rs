//! FLIR metadata extraction via [ExifTool].
//!
//! Tag-structure parsing is ExifTool's job, not ours: this
//! module consumes the JSON produced by `exiftool -b -j`
//! (either run directly on an image, or pre-extracted and
//! passed in), pulls out the Planck calibration constants
//! and ambient parameters, and decodes the embedded
//! `RawThermalImage` TIFF into a [`RawPixelGrid`].
//!
//! Covers Skydio X10, Autel EVO II Dual, Yuneec H520E,
//! Parrot Anafi Thermal and anything else carrying a FLIR
//! core (Boson, Lepton, Tau). DJI aircraft encode their
//! radiometric data differently; see [`dji`][crate::dji].
//!
//! [ExifTool]: //exiftool.org

use std::io::Cursor;
use std::path::Path;
use std::process::Command;

use image::{ColorType, ImageDecoder};
use ndarray::Array2;
use serde_derive::*;

use crate::calibration::{CalibrationModel, Environment, PlanckConstants};
use crate::error::{Error, Result};
use crate::grid::RawPixelGrid;

/// One image's worth of `exiftool -b -j` output.
///
/// Every field is optional at the parsing stage; which tags
/// are actually required is decided in [`into_thermal`],
/// so a single missing tag is reported by name instead of as
/// a generic JSON error.
///
/// [`into_thermal`]: FlirExiftoolJson::into_thermal
#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct FlirExiftoolJson {
    planck_r1: Option<f64>,
    planck_r2: Option<f64>,
    planck_b: Option<f64>,
    planck_f: Option<f64>,
    planck_o: Option<f64>,

    #[serde(default, deserialize_with = "serde_helpers::opt_float_with_suffix")]
    object_distance: Option<f64>,
    #[serde(default, deserialize_with = "serde_helpers::opt_float_with_suffix")]
    relative_humidity: Option<f64>,
    #[serde(default, deserialize_with = "serde_helpers::opt_float_with_suffix")]
    emissivity: Option<f64>,
    #[serde(default, deserialize_with = "serde_helpers::opt_float_with_suffix")]
    reflected_apparent_temperature: Option<f64>,

    #[serde(default, deserialize_with = "serde_helpers::opt_base64_bytes")]
    raw_thermal_image: Option<Vec<u8>>,
    raw_thermal_image_type: Option<String>,
}

impl FlirExiftoolJson {
    /// Resolve the parsed tags into the pair the conversion
    /// core consumes.
    pub fn into_thermal(self) -> Result<(RawPixelGrid, CalibrationModel)> {
        let planck = PlanckConstants {
            r1: require(self.planck_r1, "PlanckR1")?,
            r2: require(self.planck_r2, "PlanckR2")?,
            b: require(self.planck_b, "PlanckB")?,
            f: require(self.planck_f, "PlanckF")?,
            o: require(self.planck_o, "PlanckO")?,
        };
        let environment = Environment {
            distance: self.object_distance,
            humidity: self.relative_humidity,
            emissivity: self.emissivity,
            reflection: self.reflected_apparent_temperature,
        };

        let ty = self
            .raw_thermal_image_type
            .as_deref()
            .unwrap_or("TIFF");
        if ty != "TIFF" {
            return Err(Error::decode(format!(
                "unsupported raw thermal image type: {}",
                ty
            )));
        }
        let bytes = self.raw_thermal_image.ok_or(Error::MetadataMissing {
            tag: "RawThermalImage",
        })?;
        let grid = decode_raw_tiff(&bytes)?;

        Ok((grid, CalibrationModel::flir(planck, environment)))
    }
}

fn require(value: Option<f64>, tag: &'static str) -> Result<f64> {
    value.ok_or(Error::MetadataMissing { tag })
}

/// Decode the embedded raw sensor TIFF (8 or 16 bit
/// grayscale) into a grid of counts.
fn decode_raw_tiff(bytes: &[u8]) -> Result<RawPixelGrid> {
    use image::tiff::TiffDecoder;

    let decoder = TiffDecoder::new(Cursor::new(bytes))
        .map_err(|e| Error::decode(format!("raw thermal TIFF: {}", e)))?;
    let (width, height) = decoder.dimensions();
    let width = width as usize;
    let height = height as usize;

    use zerocopy::{AsBytes, FromBytes};
    fn image_as_float<'a, T, R>(decoder: R) -> Result<Vec<f64>>
    where
        f64: From<T>,
        T: AsBytes + FromBytes,
        R: ImageDecoder<'a>,
    {
        let (width, height) = decoder.dimensions();
        let num_pixels = (width * height) as usize;
        let mut image: Vec<T> = Vec::with_capacity(num_pixels);
        unsafe {
            image.set_len(num_pixels);
        }
        decoder
            .read_image(image.as_bytes_mut())
            .map_err(|e| Error::decode(format!("raw thermal TIFF data: {}", e)))?;
        Ok(image.into_iter().map(|v| v.into()).collect())
    }

    let values = match decoder.color_type() {
        ColorType::L8 => image_as_float::<u8, _>(decoder)?,
        ColorType::L16 => image_as_float::<u16, _>(decoder)?,
        other => {
            return Err(Error::decode(format!(
                "unsupported raw thermal color type: {:?}",
                other
            )))
        }
    };

    let values = Array2::from_shape_vec((height, width), values)
        .map_err(|e| Error::decode(format!("raw thermal TIFF shape: {}", e)))?;
    Ok(RawPixelGrid::from_array(values))
}

/// Run ExifTool on an image and parse its JSON output.
///
/// Requires `exiftool` on PATH; the `-b` flag inlines binary
/// tags (the raw thermal image) as base64.
pub fn extract_from_path(path: &Path) -> Result<(RawPixelGrid, CalibrationModel)> {
    let output = Command::new("exiftool").arg("-b").arg("-j").arg(path).output()?;
    if !output.status.success() {
        return Err(Error::decode(format!(
            "exiftool exited with {} for {}",
            output.status,
            path.display()
        )));
    }

    let mut images = parse_exiftool_json(&output.stdout)?;
    let image = images.pop().ok_or_else(|| {
        Error::decode(format!("exiftool returned no entries for {}", path.display()))
    })?;
    image.into_thermal()
}

/// Parse `exiftool -b -j` output: a JSON array with one
/// entry per image.
pub fn parse_exiftool_json(bytes: &[u8]) -> Result<Vec<FlirExiftoolJson>> {
    serde_json::from_slice(bytes).map_err(|e| Error::decode(format!("exiftool JSON: {}", e)))
}

mod serde_helpers {
    use lazy_static::lazy_static;
    use regex::Regex;
    use serde::*;
    use serde_derive::*;

    /// ExifTool renders some numeric tags with a unit suffix
    /// ("25.00 m", "50.0 %", "22.0 C") and others as plain
    /// numbers, depending on the camera vendor.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeSuffixed {
        Number(f64),
        Text(String),
    }

    pub fn opt_float_with_suffix<'de, D>(de: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"^-?\d+(\.\d+)?").unwrap();
        }

        use serde::de::Error;
        let val = match <Option<MaybeSuffixed> as Deserialize>::deserialize(de)? {
            None => None,
            Some(MaybeSuffixed::Number(n)) => Some(n),
            Some(MaybeSuffixed::Text(s)) => {
                let matched = RE
                    .find(&s)
                    .ok_or_else(|| Error::custom("unexpected format: must begin with float"))?;
                Some(matched.as_str().parse().map_err(Error::custom)?)
            }
        };
        Ok(val)
    }

    pub fn opt_base64_bytes<'de, D>(de: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let str_rep = match <Option<String> as Deserialize>::deserialize(de)? {
            None => return Ok(None),
            Some(s) => s,
        };

        let encoded = str_rep.strip_prefix("base64:").ok_or_else(|| {
            Error::custom("unexpected format: must begin with `base64:`")
        })?;
        let bytes = base64::decode(encoded).map_err(Error::custom)?;
        Ok(Some(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn tiff_base64(width: u32, height: u32, values: &[u16]) -> String {
        use image::tiff::TiffEncoder;

        let mut bytes = Vec::with_capacity(2 * values.len());
        for v in values.iter() {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        let mut tiff = Vec::new();
        TiffEncoder::new(Cursor::new(&mut tiff))
            .encode(&bytes, width, height, ColorType::L16)
            .unwrap();
        format!("base64:{}", base64::encode(&tiff))
    }

    fn full_json() -> String {
        format!(
            r#"[{{
                "SourceFile": "thermal.jpg",
                "PlanckR1": 21106.77,
                "PlanckR2": 0.012545258,
                "PlanckB": 1501,
                "PlanckF": 1,
                "PlanckO": -40,
                "ObjectDistance": "25.00 m",
                "RelativeHumidity": "50.0 %",
                "Emissivity": 0.95,
                "ReflectedApparentTemperature": "22.0 C",
                "RawThermalImageType": "TIFF",
                "RawThermalImage": "{}"
            }}]"#,
            tiff_base64(2, 2, &[14000, 14500, 15000, 15500])
        )
    }

    #[test]
    fn parses_tags_with_and_without_suffixes() {
        let mut images = parse_exiftool_json(full_json().as_bytes()).unwrap();
        let (grid, calibration) = images.pop().unwrap().into_thermal().unwrap();

        assert_eq!((grid.width(), grid.height()), (2, 2));
        let raws: Vec<f64> = grid.pixels().map(|(_, _, raw)| raw).collect();
        assert_eq!(raws, vec![14000., 14500., 15000., 15500.]);

        let env = calibration.environment();
        assert_eq!(env.distance, Some(25.0));
        assert_eq!(env.humidity, Some(50.0));
        assert_eq!(env.emissivity, Some(0.95));
        assert_eq!(env.reflection, Some(22.0));
        calibration.validate().unwrap();
    }

    #[test]
    fn missing_planck_tag_is_reported_by_name() {
        let json = r#"[{
            "PlanckR1": 21106.77,
            "PlanckB": 1501,
            "PlanckF": 1,
            "PlanckO": -40
        }]"#;
        let image = parse_exiftool_json(json.as_bytes())
            .unwrap()
            .pop()
            .unwrap();
        match image.into_thermal() {
            Err(Error::MetadataMissing { tag }) => assert_eq!(tag, "PlanckR2"),
            other => panic!("expected MetadataMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_raw_image_is_reported() {
        let json = r#"[{
            "PlanckR1": 21106.77,
            "PlanckR2": 0.012545258,
            "PlanckB": 1501,
            "PlanckF": 1,
            "PlanckO": -40
        }]"#;
        let image = parse_exiftool_json(json.as_bytes())
            .unwrap()
            .pop()
            .unwrap();
        match image.into_thermal() {
            Err(Error::MetadataMissing { tag }) => assert_eq!(tag, "RawThermalImage"),
            other => panic!("expected MetadataMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn non_flir_json_is_a_decode_error() {
        assert!(matches!(
            parse_exiftool_json(b"not json at all"),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn unsupported_raw_type_is_a_decode_error() {
        let json = r#"[{
            "PlanckR1": 1.0,
            "PlanckR2": 1.0,
            "PlanckB": 1.0,
            "PlanckF": 1.0,
            "PlanckO": 0.0,
            "RawThermalImageType": "PNG",
            "RawThermalImage": "base64:AAAA"
        }]"#;
        let image = parse_exiftool_json(json.as_bytes())
            .unwrap()
            .pop()
            .unwrap();
        assert!(matches!(image.into_thermal(), Err(Error::Decode { .. })));
    }
}
