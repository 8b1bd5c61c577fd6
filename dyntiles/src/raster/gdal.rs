//! Raster service backed by the GDAL command-line utilities.

use super::types::{DatasetInfo, RasterError, RasterService, WarpRequest};
use crate::coord::BoundingBox;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Target reference system for every output: plain WGS84 lat/lon.
pub const GEOGRAPHIC_SRS: &str = "+proj=latlong +datum=WGS84 +no_defs";

/// Drives `gdalwarp`, `gdal_translate`, `gdaldem`, `gdal_rasterize` and `gdalinfo`.
#[derive(Debug, Clone)]
pub struct GdalCommandService {
    /// Directory holding the GDAL binaries; `None` searches `PATH`
    bin_dir: Option<PathBuf>,
}

impl Default for GdalCommandService {
    fn default() -> Self {
        Self::new()
    }
}

impl GdalCommandService {
    pub fn new() -> Self {
        Self { bin_dir: None }
    }

    pub fn with_bin_dir(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: Some(bin_dir.into()),
        }
    }

    fn command(&self, tool: &str) -> Command {
        match &self.bin_dir {
            Some(dir) => Command::new(dir.join(tool)),
            None => Command::new(tool),
        }
    }

    /// Runs a tool to completion.
    ///
    /// Only a failure to start is an error; a non-zero exit is logged and
    /// left for the consumer of the output to discover.
    fn run(&self, tool: &str, args: Vec<OsString>) -> Result<(), RasterError> {
        debug!(tool = tool, args = ?args, "Running raster tool");

        let status = self
            .command(tool)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| RasterError::Spawn {
                tool: tool.to_string(),
                source,
            })?;

        if !status.success() {
            warn!(tool = tool, status = %status, "Raster tool exited unsuccessfully");
        }
        Ok(())
    }

    fn output(&self, tool: &str, args: Vec<OsString>) -> Result<Vec<u8>, RasterError> {
        debug!(tool = tool, args = ?args, "Running raster tool");

        let output = self
            .command(tool)
            .args(&args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| RasterError::Spawn {
                tool: tool.to_string(),
                source,
            })?;

        if !output.status.success() {
            warn!(tool = tool, status = %output.status, "Raster tool exited unsuccessfully");
        }
        Ok(output.stdout)
    }
}

fn args<I, S>(items: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    items.into_iter().map(Into::into).collect()
}

/// `-te xmin ymin xmax ymax`
fn target_extent(bounds: &BoundingBox) -> Vec<OsString> {
    args([
        "-te".to_string(),
        bounds.west.to_string(),
        bounds.south.to_string(),
        bounds.east.to_string(),
        bounds.north.to_string(),
    ])
}

/// `-a_ullr ulx uly lrx lry`
fn assign_corners(bounds: &BoundingBox) -> Vec<OsString> {
    args([
        "-a_ullr".to_string(),
        bounds.west.to_string(),
        bounds.north.to_string(),
        bounds.east.to_string(),
        bounds.south.to_string(),
    ])
}

/// `gdal_translate` arguments that write the mask band of `input` as 8-bit PNG.
///
/// For a warp made with `-dstalpha` the mask band is the alpha band.
fn coverage_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut a = args(["-of", "PNG", "-ot", "Byte", "-b", "mask"]);
    a.push(input.into());
    a.push(output.into());
    a
}

/// Subset of `gdalinfo -json` output.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GdalInfo {
    size: [u32; 2],
    geo_transform: Option<[f64; 6]>,
}

fn parse_gdalinfo(json: &[u8], path: &Path) -> Result<DatasetInfo, RasterError> {
    let unreadable = |reason: String| RasterError::Unreadable {
        path: path.to_path_buf(),
        reason,
    };

    let info: GdalInfo =
        serde_json::from_slice(json).map_err(|e| unreadable(format!("bad gdalinfo output: {}", e)))?;
    let geo_transform = info
        .geo_transform
        .ok_or_else(|| unreadable("dataset has no geotransform".to_string()))?;
    let [cols, rows] = info.size;
    if cols == 0 || rows == 0 {
        return Err(unreadable("dataset is empty".to_string()));
    }

    Ok(DatasetInfo {
        cols,
        rows,
        geo_transform,
    })
}

impl RasterService for GdalCommandService {
    fn warp(&self, request: &WarpRequest<'_>, output: &Path) -> Result<(), RasterError> {
        let mut a = args(["-r", request.resampling.as_str()]);
        if request.dst_alpha {
            a.push("-dstalpha".into());
        }
        a.extend(args(["-ovr", "AUTO", "-overwrite", "-t_srs", GEOGRAPHIC_SRS]));
        a.extend(args([
            "-ts".to_string(),
            request.size.to_string(),
            request.size.to_string(),
        ]));
        a.extend(target_extent(&request.bounds));
        a.push(request.source.into());
        a.push(output.into());
        self.run("gdalwarp", a)
    }

    fn coverage(&self, input: &Path, output: &Path) -> Result<(), RasterError> {
        self.run("gdal_translate", coverage_args(input, output))
    }

    fn georeference(
        &self,
        image: &Path,
        bounds: &BoundingBox,
        output: &Path,
    ) -> Result<(), RasterError> {
        let mut a = args(["-a_srs", GEOGRAPHIC_SRS]);
        a.extend(assign_corners(bounds));
        a.push(image.into());
        a.push(output.into());
        self.run("gdal_translate", a)
    }

    fn color_relief(&self, input: &Path, ramp: &Path, output: &Path) -> Result<(), RasterError> {
        let mut a = args(["color-relief", "-alpha"]);
        a.push(input.into());
        a.push(ramp.into());
        a.push(output.into());
        self.run("gdaldem", a)
    }

    fn burn_mask(&self, vector: &Path, target: &Path) -> Result<(), RasterError> {
        let layer = vector
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_default();
        let mut a = args(["-b", "4", "-burn", "0", "-l"]);
        a.push(layer);
        a.push(vector.into());
        a.push(target.into());
        self.run("gdal_rasterize", a)
    }

    fn describe(&self, dataset: &Path, scratch: &Path) -> Result<DatasetInfo, RasterError> {
        let vrt = scratch.join("footprint.vrt");

        let mut a = args(["-t_srs", GEOGRAPHIC_SRS, "-of", "VRT", "-overwrite"]);
        a.push(dataset.into());
        a.push(vrt.clone().into());
        self.run("gdalwarp", a)?;

        let mut a = args(["-json"]);
        a.push(vrt.into());
        let json = self.output("gdalinfo", a)?;
        parse_gdalinfo(&json, dataset)
    }
}
