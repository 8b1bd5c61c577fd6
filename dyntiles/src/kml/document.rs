//! KML link documents.

use crate::coord::{BoundingBox, TileAddress};

/// `Lod` value meaning "no limit".
pub const UNBOUNDED: i32 = -1;

/// Level-of-detail limits for a region, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lod {
    pub min_pixels: i32,
    pub max_pixels: i32,
}

impl Lod {
    pub fn new(min_pixels: i32) -> Self {
        Self {
            min_pixels,
            max_pixels: UNBOUNDED,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(UNBOUNDED)
    }
}

/// Image shown for a concrete tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub bounds: BoundingBox,
    pub lod: Lod,
    pub draw_order: u32,
    /// Unescaped icon URL
    pub icon_href: String,
}

/// Lazy link to a child tile's own document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildLink {
    pub tile: TileAddress,
    pub bounds: BoundingBox,
    pub lod: Lod,
    /// Unescaped document URL
    pub href: String,
}

/// One node of the lazy link tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkDocument {
    /// `None` for the root
    pub tile: Option<TileAddress>,
    pub overlay: Option<Overlay>,
    pub children: Vec<ChildLink>,
}

impl LinkDocument {
    pub fn is_root(&self) -> bool {
        self.tile.is_none()
    }

    pub fn title(&self) -> String {
        match &self.tile {
            Some(tile) => format!("{}.kml", tile),
            None => "Root".to_string(),
        }
    }

    /// Serializes the document as KML 2.2.
    pub fn render(&self) -> String {
        let mut kml = String::with_capacity(1024 + 640 * self.children.len());

        kml.push_str(&format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>{}</name>
    <description></description>
    <Style>
      <ListStyle id="hideChildren">
        <listItemType>checkHideChildren</listItemType>
      </ListStyle>
    </Style>
"#,
            escape_xml(&self.title())
        ));

        if let Some(overlay) = &self.overlay {
            kml.push_str(&format!(
                r#"    <Region>
{}{}    </Region>
    <GroundOverlay>
      <drawOrder>{}</drawOrder>
      <Icon>
        <href>{}</href>
      </Icon>
      <LatLonBox>
{}      </LatLonBox>
    </GroundOverlay>
"#,
                lat_lon_alt_box(&overlay.bounds, 6),
                lod_element(&overlay.lod, 6),
                overlay.draw_order,
                escape_xml(&overlay.icon_href),
                edges(&overlay.bounds, 8),
            ));
        }

        for child in &self.children {
            kml.push_str(&format!(
                r#"    <NetworkLink>
      <name>{}</name>
      <Region>
{}{}      </Region>
      <Link>
        <href>{}</href>
        <viewRefreshMode>onRegion</viewRefreshMode>
        <viewFormat/>
      </Link>
    </NetworkLink>
"#,
                child.tile,
                lat_lon_alt_box(&child.bounds, 8),
                lod_element(&child.lod, 8),
                escape_xml(&child.href),
            ));
        }

        kml.push_str("  </Document>\n</kml>\n");
        kml
    }
}

/// Draw order for a tile's overlay: `2z + 1` in column 0, `2z` elsewhere.
pub fn draw_order(tile: &TileAddress) -> u32 {
    let base = 2 * u32::from(tile.zoom);
    if tile.col == 0 {
        base + 1
    } else {
        base
    }
}

fn edges(bounds: &BoundingBox, indent: usize) -> String {
    let pad = " ".repeat(indent);
    format!(
        "{pad}<north>{:.14}</north>\n{pad}<south>{:.14}</south>\n{pad}<east>{:.14}</east>\n{pad}<west>{:.14}</west>\n",
        bounds.north,
        bounds.south,
        bounds.east,
        bounds.west,
        pad = pad
    )
}

fn lat_lon_alt_box(bounds: &BoundingBox, indent: usize) -> String {
    let pad = " ".repeat(indent);
    format!(
        "{pad}<LatLonAltBox>\n{}{pad}</LatLonAltBox>\n",
        edges(bounds, indent + 2),
        pad = pad
    )
}

fn lod_element(lod: &Lod, indent: usize) -> String {
    let pad = " ".repeat(indent);
    format!(
        "{pad}<Lod>\n{pad}  <minLodPixels>{}</minLodPixels>\n{pad}  <maxLodPixels>{}</maxLodPixels>\n{pad}</Lod>\n",
        lod.min_pixels,
        lod.max_pixels,
        pad = pad
    )
}

/// Escape text for XML.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
