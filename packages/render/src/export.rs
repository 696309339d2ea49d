//! GeoJSON export of per-cell values.

use std::collections::BTreeMap;

use crime_grid_models::Cell;
use geo::{BoundingRect, LineString, MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};

use crate::colormap::Colormap;

/// Polygon outlining `cell`, with `x` = longitude and `y` = latitude.
#[must_use]
pub fn cell_polygon(cell: &Cell) -> Polygon<f64> {
    let ring: Vec<(f64, f64)> = cell
        .points()
        .iter()
        .map(|p| (p.longitude, p.latitude))
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// One feature per cell carrying its `value` and a `color` from `colormap`,
/// normalized by the largest value in `series`.
#[must_use]
pub fn cells_geojson(series: &BTreeMap<Cell, f64>, colormap: Colormap) -> FeatureCollection {
    let max = series.values().copied().fold(0.0, f64::max);

    let polygons: Vec<Polygon<f64>> = series.keys().map(cell_polygon).collect();

    let features = series
        .values()
        .zip(&polygons)
        .map(|(&value, polygon)| {
            let normalized = if max > 0.0 { value / max } else { 0.0 };

            let mut properties = JsonObject::new();
            properties.insert("value".to_owned(), value.into());
            properties.insert("color".to_owned(), colormap.hex(normalized).into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(polygon))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let bbox = MultiPolygon::new(polygons)
        .bounding_rect()
        .map(|rect| vec![rect.min().x, rect.min().y, rect.max().x, rect.max().y]);

    FeatureCollection {
        bbox,
        features,
        foreign_members: None,
    }
}
