//! GeoJSON vector layers: the river channel and the styled half-basins.
//!
//! Both documents are pre-computed by the analysis pipeline and served as
//! opaque JSON. The only server-side transformation is the half-basin
//! opacity restyle; everything else passes through untouched so the
//! pipeline stays the single source of truth for geometry and styling.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use flood_common::{DashboardError, DashboardResult};

/// Per-feature discharge statistics carried in the half-basin properties.
///
/// Field names keep the upstream `*_Q` spelling so responses line up with
/// the GeoJSON properties they were extracted from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasinDischargeStats {
    pub name: Option<String>,
    #[serde(rename = "mean_Q")]
    pub mean_q: Option<f64>,
    #[serde(rename = "med_Q")]
    pub med_q: Option<f64>,
    #[serde(rename = "max_Q")]
    pub max_q: Option<f64>,
    #[serde(rename = "min_Q")]
    pub min_q: Option<f64>,
    #[serde(rename = "sum_Q")]
    pub sum_q: Option<f64>,
    #[serde(rename = "std_Q")]
    pub std_q: Option<f64>,
}

/// Load a GeoJSON document from disk.
pub fn load_vector_layer(path: &Path) -> DashboardResult<Value> {
    if !path.exists() {
        return Err(DashboardError::MissingFile(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&contents)?;
    Ok(doc)
}

/// Set `style.fillOpacity` on every styled feature.
///
/// Features without a `style` object are left alone, matching the
/// reference behavior. Returns the number of features restyled.
pub fn apply_basin_opacity(doc: &mut Value, opacity: f64) -> usize {
    let mut restyled = 0;
    if let Some(features) = doc
        .get_mut("features")
        .and_then(|f| f.as_array_mut())
    {
        for feature in features {
            if let Some(style) = feature
                .get_mut("properties")
                .and_then(|p| p.get_mut("style"))
                .and_then(|s| s.as_object_mut())
            {
                style.insert("fillOpacity".to_string(), opacity.into());
                restyled += 1;
            }
        }
    }
    debug!(restyled, opacity, "Applied basin opacity");
    restyled
}

/// Pull the discharge statistics out of every half-basin feature, in
/// document order. Missing values stay `None` rather than skipping the
/// feature.
pub fn extract_basin_stats(doc: &Value) -> Vec<BasinDischargeStats> {
    let features = match doc.get("features").and_then(|f| f.as_array()) {
        Some(features) => features,
        None => return Vec::new(),
    };

    features
        .iter()
        .map(|feature| {
            let props = feature.get("properties");
            let num = |key: &str| props.and_then(|p| p.get(key)).and_then(Value::as_f64);
            BasinDischargeStats {
                name: props
                    .and_then(|p| p.get("Name"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                mean_q: num("mean_Q"),
                med_q: num("med_Q"),
                max_q: num("max_Q"),
                min_q: num("min_Q"),
                sum_q: num("sum_Q"),
                std_q: num("std_Q"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::tables::{SAMPLE_BASINS_GEOJSON, SAMPLE_RIVER_GEOJSON};

    #[test]
    fn test_river_layer_round_trips_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("river.geojson");
        std::fs::write(&path, SAMPLE_RIVER_GEOJSON).unwrap();

        let doc = load_vector_layer(&path).unwrap();
        let expected: Value = serde_json::from_str(SAMPLE_RIVER_GEOJSON).unwrap();
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_missing_vector_file() {
        let err = load_vector_layer(Path::new("/nonexistent/river.geojson")).unwrap_err();
        assert!(matches!(err, DashboardError::MissingFile(_)));
    }

    #[test]
    fn test_opacity_restyle_touches_every_styled_feature() {
        let mut doc: Value = serde_json::from_str(SAMPLE_BASINS_GEOJSON).unwrap();
        let restyled = apply_basin_opacity(&mut doc, 0.4);
        assert_eq!(restyled, 2);

        for feature in doc["features"].as_array().unwrap() {
            let opacity = feature["properties"]["style"]["fillOpacity"]
                .as_f64()
                .unwrap();
            assert!((opacity - 0.4).abs() < 1e-12);
            // the rest of the style is untouched
            assert_eq!(feature["properties"]["style"]["weight"], 1);
        }
    }

    #[test]
    fn test_opacity_restyle_skips_unstyled_features() {
        let mut doc = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"Name": "no style"}, "geometry": null},
                {"type": "Feature", "properties": {"Name": "styled", "style": {"fillOpacity": 0.75}}, "geometry": null}
            ]
        });
        let restyled = apply_basin_opacity(&mut doc, 0.1);
        assert_eq!(restyled, 1);
        assert!(doc["features"][0]["properties"].get("style").is_none());
    }

    #[test]
    fn test_extract_basin_stats() {
        let doc: Value = serde_json::from_str(SAMPLE_BASINS_GEOJSON).unwrap();
        let stats = extract_basin_stats(&doc);
        assert_eq!(stats.len(), 2);

        assert_eq!(stats[0].name.as_deref(), Some("Basin A"));
        assert_eq!(stats[0].mean_q, Some(12.4));
        assert_eq!(stats[0].std_q, Some(5.1));
        assert_eq!(stats[1].name.as_deref(), Some("Basin B"));
        assert_eq!(stats[1].sum_q, Some(1140.0));
    }

    #[test]
    fn test_extract_stats_tolerates_missing_fields() {
        let doc = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"Name": "partial", "mean_Q": 3.5}, "geometry": null}
            ]
        });
        let stats = extract_basin_stats(&doc);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].mean_q, Some(3.5));
        assert_eq!(stats[0].max_q, None);
    }

    #[test]
    fn test_stats_serialize_with_upstream_keys() {
        let stats = BasinDischargeStats {
            name: Some("Basin A".to_string()),
            mean_q: Some(12.4),
            med_q: None,
            max_q: None,
            min_q: None,
            sum_q: None,
            std_q: None,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["mean_Q"], 12.4);
        assert!(json.get("mean_q").is_none());
    }
}
