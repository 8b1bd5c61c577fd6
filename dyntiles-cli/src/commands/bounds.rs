//! Tile geometry diagnostics.

use clap::Args;
use dyntiles::coord::{quadkey, GlobalMercator, TileAddress, DEFAULT_TILE_SIZE};

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct BoundsArgs {
    /// Tile address as z/x/y (bottom-left row)
    pub tile: String,

    /// Tile edge length in pixels
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_size: u32,
}

pub fn run(args: BoundsArgs) -> Result<(), CliError> {
    let tile: TileAddress = args
        .tile
        .parse()
        .map_err(|e: dyntiles::coord::CoordError| CliError::InvalidTile(e.to_string()))?;
    print!("{}", describe(&GlobalMercator::new(args.tile_size), &tile));
    Ok(())
}

/// Human-readable geometry of one tile.
pub fn describe(mercator: &GlobalMercator, tile: &TileAddress) -> String {
    let (min, max) = mercator.tile_bounds(tile.col, tile.row, tile.zoom);
    let geo = mercator.address_bounds(tile);

    let mut out = String::new();
    out.push_str(&format!("Tile:          {}\n", tile));
    out.push_str(&format!(
        "Meters:        {:.2}, {:.2} -> {:.2}, {:.2}\n",
        min.x, min.y, max.x, max.y
    ));
    out.push_str(&format!(
        "Lat/Lon:       S {:.8}  W {:.8}  N {:.8}  E {:.8}\n",
        geo.south, geo.west, geo.north, geo.east
    ));
    out.push_str(&format!("Top-left row:  {}\n", tile.top_left_row()));
    out.push_str(&format!(
        "Quadkey:       {}\n",
        quadkey(tile.col, tile.row, tile.zoom)
    ));
    out
}
