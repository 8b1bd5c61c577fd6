//! External raster processing.
//!
//! Reprojection, resampling, color ramps and vector burns are delegated to
//! a [`RasterService`]. The production implementation shells out to the
//! GDAL utilities; tests substitute a recording mock.

mod gdal;
mod types;

pub use gdal::{GdalCommandService, GEOGRAPHIC_SRS};
pub use types::{DatasetInfo, RasterError, RasterService, Resampling, WarpRequest};

#[cfg(test)]
pub use types::tests::MockRasterService;
