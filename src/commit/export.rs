use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use super::plan::PointRecord;

/// Writes one point-geometry dataset per call.
pub trait PointExporter {
    fn export_points(&self, destination: &Path, records: &[PointRecord]) -> Result<()>;
}

/// GeoJSON FeatureCollection in WGS84 longitude/latitude order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonExporter;

/// OGC name for WGS84 with longitude first (EPSG:4326 axis order swapped).
pub const CRS84: &str = "urn:ogc:def:crs:OGC:1.3:CRS84";

pub fn feature_collection(records: &[PointRecord]) -> Value {
    let features: Vec<Value> = records
        .iter()
        .map(|record| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [record.longitude, record.latitude],
                },
                "properties": record,
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "name": "Img",
        "crs": { "type": "name", "properties": { "name": CRS84 } },
        "features": features,
    })
}

impl PointExporter for GeoJsonExporter {
    fn export_points(&self, destination: &Path, records: &[PointRecord]) -> Result<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let serialized = serde_json::to_string_pretty(&feature_collection(records))?;

        // write a sibling then rename over the destination
        let tmp = destination.with_extension("geojson.tmp");
        fs::write(&tmp, serialized)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, destination)
            .with_context(|| format!("Failed to write {}", destination.display()))
    }
}
