//! GeoJSON input and output.
//!
//! Input: polygons are pulled out of any GeoJSON document (a
//! FeatureCollection, a single Feature or a bare Geometry). Only outer rings
//! are read; holes are ignored. Output: hatch lines become LineString
//! features.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue, Value};

use crate::error::{Error, Result};
use crate::geometry::{GeoPoint, GeoPolygon, HatchLine};

/// Parse every Polygon and MultiPolygon outer ring in a GeoJSON document.
///
/// Each polygon of a MultiPolygon becomes its own [`GeoPolygon`] sharing the
/// feature's metadata. Fails with [`Error::NoPolygons`] when the document has
/// none.
pub fn polygons_from_geojson(source: &str) -> Result<Vec<GeoPolygon>> {
    let document: GeoJson = source.parse()?;

    let features = match document {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(g) => vec![Feature {
            bbox: None,
            geometry: Some(g),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let mut polygons = Vec::new();
    for (index, feature) in features.iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            continue;
        };

        let template = polygon_metadata(feature, index);
        let mut rings = Vec::new();
        collect_outer_rings(geometry, &mut rings);

        let multiple = rings.len() > 1;
        for (part, ring) in rings.into_iter().enumerate() {
            let mut polygon = template.clone();
            polygon.outer = ring;
            if multiple {
                polygon.id = polygon.id.map(|id| format!("{id}.{part}"));
            }
            polygons.push(polygon);
        }
    }

    if polygons.is_empty() {
        return Err(Error::NoPolygons);
    }

    log::info!("loaded {} polygon(s) from {} feature(s)", polygons.len(), features.len());
    Ok(polygons)
}

fn collect_outer_rings(geometry: &Geometry, rings: &mut Vec<Vec<GeoPoint>>) {
    match &geometry.value {
        Value::Polygon(polygon) => {
            if let Some(outer) = polygon.first() {
                rings.push(ring_from_positions(outer));
            }
        }
        Value::MultiPolygon(polygons) => {
            for polygon in polygons {
                if let Some(outer) = polygon.first() {
                    rings.push(ring_from_positions(outer));
                }
            }
        }
        Value::GeometryCollection(members) => {
            for member in members {
                collect_outer_rings(member, rings);
            }
        }
        _ => {}
    }
}

/// Positions to vertices, dropping GeoJSON's repeated closing vertex.
fn ring_from_positions(positions: &[Vec<f64>]) -> Vec<GeoPoint> {
    let mut ring: Vec<GeoPoint> = positions
        .iter()
        .filter_map(|pos| match pos.as_slice() {
            [lon, lat] => Some(GeoPoint::new(*lon, *lat)),
            [lon, lat, height, ..] => Some(GeoPoint::with_height(*lon, *lat, *height)),
            _ => {
                log::warn!("skipping malformed position {pos:?}");
                None
            }
        })
        .collect();

    if ring.len() > 1 && ring.first().map(GeoPoint::flatten) == ring.last().map(GeoPoint::flatten) {
        ring.pop();
    }
    ring
}

/// Id, preview color and per-feature parameter overrides.
fn polygon_metadata(feature: &Feature, index: usize) -> GeoPolygon {
    let id = match &feature.id {
        Some(Id::String(s)) => Some(s.clone()),
        Some(Id::Number(n)) => Some(n.to_string()),
        None => feature
            .property("name")
            .and_then(JsonValue::as_str)
            .map(str::to_owned)
            .or_else(|| Some(format!("feature-{index}"))),
    };

    let number = |key: &str| feature.property(key).and_then(JsonValue::as_f64);

    GeoPolygon {
        outer: Vec::new(),
        id,
        stroke_color: feature
            .property("stroke")
            .and_then(JsonValue::as_str)
            .map(str::to_owned),
        step: number("step"),
        bearing: number("bearing"),
        offset: number("offset"),
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// One LineString feature per hatch line, tagged with the source polygon's id.
pub fn lines_to_features(lines: &[HatchLine], polygon_id: Option<&str>) -> Vec<Feature> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let mut properties = JsonObject::new();
            if let Some(id) = polygon_id {
                properties.insert("polygon".to_owned(), JsonValue::from(id));
            }
            properties.insert("index".to_owned(), JsonValue::from(index));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::LineString(vec![
                    vec![line.start.lon, line.start.lat],
                    vec![line.end.lon, line.end.lat],
                ]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect()
}

/// Wrap features in a FeatureCollection document.
pub fn feature_collection(features: Vec<Feature>) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Hatch lines as a GeoJSON FeatureCollection string.
pub fn lines_to_geojson(lines: &[HatchLine]) -> String {
    feature_collection(lines_to_features(lines, None)).to_string()
}

/// Hatch lines as a plain JSON array of `{start, end}` objects.
pub fn lines_to_json(lines: &[HatchLine]) -> Result<String> {
    Ok(serde_json::to_string_pretty(lines)?)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "id": "field-7",
            "properties": { "stroke": "red", "step": 250, "bearing": 45 },
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]],
                    [[0.2, 0.2], [0.4, 0.2], [0.4, 0.4], [0.2, 0.2]]
                ]
            }
        }]
    }"#;

    #[test]
    fn reads_outer_ring_without_closing_vertex() {
        let polygons = polygons_from_geojson(SQUARE).unwrap();
        assert_eq!(polygons.len(), 1);
        let square = &polygons[0];
        assert_eq!(square.len(), 4);
        assert_eq!(square.outer[2], GeoPoint::new(1.0, 1.0));
    }

    #[test]
    fn reads_feature_properties() {
        let square = &polygons_from_geojson(SQUARE).unwrap()[0];
        assert_eq!(square.id.as_deref(), Some("field-7"));
        assert_eq!(square.stroke_color.as_deref(), Some("red"));
        assert_eq!(square.step, Some(250.0));
        assert_eq!(square.bearing, Some(45.0));
        assert_eq!(square.offset, None);
    }

    #[test]
    fn splits_multipolygon_parts() {
        let src = r#"{
            "type": "Feature",
            "properties": { "name": "islands" },
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                    [[[5, 5], [6, 5], [6, 6], [5, 6], [5, 5]]]
                ]
            }
        }"#;
        let polygons = polygons_from_geojson(src).unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].len(), 3);
        assert_eq!(polygons[1].len(), 4);
        assert_eq!(polygons[0].id.as_deref(), Some("islands.0"));
        assert_eq!(polygons[1].id.as_deref(), Some("islands.1"));
    }

    #[test]
    fn accepts_bare_geometry() {
        let src = r#"{"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2, 15.0], [0, 0]]]}"#;
        let polygons = polygons_from_geojson(src).unwrap();
        assert_eq!(polygons[0].id.as_deref(), Some("feature-0"));
        assert_eq!(polygons[0].outer[2].height, Some(15.0));
    }

    #[test]
    fn open_ring_keeps_all_vertices() {
        let src = r#"{"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2]]]}"#;
        assert_eq!(polygons_from_geojson(src).unwrap()[0].len(), 3);
    }

    #[test]
    fn no_polygons_is_an_error() {
        let src = r#"{"type": "Feature", "properties": null, "geometry": {"type": "Point", "coordinates": [1, 2]}}"#;
        assert!(matches!(polygons_from_geojson(src), Err(Error::NoPolygons)));
    }

    #[test]
    fn invalid_document_is_an_error() {
        assert!(matches!(polygons_from_geojson("{not json"), Err(Error::GeoJson(_))));
    }

    #[test]
    fn lines_become_linestrings() {
        let lines = vec![
            HatchLine::new(GeoPoint::new(0.5, 0.9), GeoPoint::new(0.5, 0.1)),
            HatchLine::new(GeoPoint::new(0.6, 0.9), GeoPoint::new(0.6, 0.1)),
        ];
        let features = lines_to_features(&lines, Some("field-7"));
        assert_eq!(features.len(), 2);
        assert_eq!(features[1].property("polygon").and_then(JsonValue::as_str), Some("field-7"));
        assert_eq!(features[1].property("index").and_then(JsonValue::as_u64), Some(1));

        let text = lines_to_geojson(&lines);
        let parsed: GeoJson = text.parse().unwrap();
        let GeoJson::FeatureCollection(fc) = parsed else {
            panic!("expected a FeatureCollection");
        };
        let Some(Geometry { value: Value::LineString(coords), .. }) = &fc.features[0].geometry else {
            panic!("expected a LineString");
        };
        assert_eq!(coords, &vec![vec![0.5, 0.9], vec![0.5, 0.1]]);
    }

    #[test]
    fn json_output_round_trips() {
        let lines = vec![HatchLine::new(GeoPoint::new(1.0, 2.0), GeoPoint::new(3.0, 4.0))];
        let text = lines_to_json(&lines).unwrap();
        let back: Vec<HatchLine> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, lines);
    }
}
