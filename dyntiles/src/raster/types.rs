//! Raster service types and trait

use crate::coord::BoundingBox;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised by a raster service.
///
/// A tool that runs but fails is not reported here; its missing or empty
/// output surfaces when the next step reads it.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The external tool could not be started at all
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Dataset metadata could not be read
    #[error("Could not open raster {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

/// Resampling method names understood by the raster service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resampling {
    #[default]
    Near,
    Bilinear,
    Cubic,
    CubicSpline,
    Lanczos,
    Average,
    Mode,
    Max,
    Min,
    Med,
    Q1,
    Q3,
}

impl Resampling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resampling::Near => "near",
            Resampling::Bilinear => "bilinear",
            Resampling::Cubic => "cubic",
            Resampling::CubicSpline => "cubicspline",
            Resampling::Lanczos => "lanczos",
            Resampling::Average => "average",
            Resampling::Mode => "mode",
            Resampling::Max => "max",
            Resampling::Min => "min",
            Resampling::Med => "med",
            Resampling::Q1 => "q1",
            Resampling::Q3 => "q3",
        }
    }
}

impl fmt::Display for Resampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resampling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "near" | "nearest" => Ok(Resampling::Near),
            "bilinear" => Ok(Resampling::Bilinear),
            "cubic" => Ok(Resampling::Cubic),
            "cubicspline" => Ok(Resampling::CubicSpline),
            "lanczos" => Ok(Resampling::Lanczos),
            "average" => Ok(Resampling::Average),
            "mode" => Ok(Resampling::Mode),
            "max" => Ok(Resampling::Max),
            "min" => Ok(Resampling::Min),
            "med" => Ok(Resampling::Med),
            "q1" => Ok(Resampling::Q1),
            "q3" => Ok(Resampling::Q3),
            other => Err(format!("unknown resampling method '{}'", other)),
        }
    }
}

/// Resample a dataset onto a square geographic tile.
#[derive(Debug, Clone, Copy)]
pub struct WarpRequest<'a> {
    pub source: &'a Path,
    pub bounds: BoundingBox,
    pub size: u32,
    pub resampling: Resampling,
    /// Add an alpha band marking where the source had data
    pub dst_alpha: bool,
}

/// Raster size and affine geotransform of a dataset in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetInfo {
    pub cols: u32,
    pub rows: u32,
    /// GDAL order: origin x, pixel width, row rotation, origin y, column rotation, pixel height
    pub geo_transform: [f64; 6],
}

impl DatasetInfo {
    /// `(ulx, uly, lrx, lry)` of the dataset footprint.
    pub fn corners(&self) -> (f64, f64, f64, f64) {
        let gt = &self.geo_transform;
        let ulx = gt[0];
        let uly = gt[3];
        let lrx = ulx + f64::from(self.cols) * gt[1];
        let lry = uly + f64::from(self.rows) * gt[5];
        (ulx, uly, lrx, lry)
    }
}

/// External raster-processing collaborator.
///
/// Every operation reads and writes files so that implementations can wrap
/// command-line tools. `warp` keeps the source data type, so a warped
/// elevation model may be Int16 or Float32 and is only fed to `coverage` and
/// `color_relief`. Every other output is an 8-bit raster the image decoder
/// can read.
pub trait RasterService: Send + Sync {
    /// Resample `request.source` into exactly `size`×`size` pixels over the bounds.
    fn warp(&self, request: &WarpRequest<'_>, output: &Path) -> Result<(), RasterError>;

    /// Write an 8-bit single-band mask of `input`: non-zero where it has data.
    fn coverage(&self, input: &Path, output: &Path) -> Result<(), RasterError>;

    /// Attach geographic bounds to a plain image.
    fn georeference(
        &self,
        image: &Path,
        bounds: &BoundingBox,
        output: &Path,
    ) -> Result<(), RasterError>;

    /// Map single-band values to RGBA through a color ramp file.
    fn color_relief(&self, input: &Path, ramp: &Path, output: &Path) -> Result<(), RasterError>;

    /// Zero the alpha band of `target` where the vector layer covers it.
    fn burn_mask(&self, vector: &Path, target: &Path) -> Result<(), RasterError>;

    /// Reproject a dataset to geographic coordinates and report its footprint.
    ///
    /// `scratch` is a directory the implementation may use for intermediates.
    fn describe(&self, dataset: &Path, scratch: &Path) -> Result<DatasetInfo, RasterError>;
}
