//! Sample CSV tables matching the dashboard input schema.
//!
//! The coordinates are chosen so that the nearest station for the Dinar
//! Indah incident is Gunungpati at roughly 1347 meters, a distance pinned
//! independently in the geodesy tests.

use std::io;
use std::path::Path;

/// Header and rows for a small flood incident table.
pub const SAMPLE_FLOOD_CSV: &str = "\
date,lat,lon,Name_of_area
01/15/24,-7.0383,110.4366,Dinar Indah
01/15/24,-7.0420,110.4310,Meteseh
02/02/24,-7.0455,110.4405,Rowosari
";

/// Header and rows for a small rainfall observation table.
///
/// The final row has an empty rainfall cell: its station must still appear
/// in the station set while the chart series skips it.
pub const SAMPLE_RAINFALL_CSV: &str = "\
date,Lat_DD,Lon_DD,location_name,rainfall(mm)
01/15/24,-7.05,110.44,Gunungpati,12.5
01/15/24,-7.01,110.40,Simongan,8.0
02/02/24,-7.05,110.44,Gunungpati,30.2
02/02/24,-7.01,110.40,Simongan,22.1
03/01/24,-7.02,110.45,Plamongan,
";

/// Minimal river channel GeoJSON document.
pub const SAMPLE_RIVER_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"name": "Kali Babon"},
      "geometry": {
        "type": "LineString",
        "coordinates": [[110.4366, -7.0383], [110.4646, -7.0768]]
      }
    }
  ]
}"#;

/// Half-basin GeoJSON with pre-computed styles and discharge statistics.
pub const SAMPLE_BASINS_GEOJSON: &str = r##"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {
        "Name": "Basin A",
        "mean_Q": 12.4, "med_Q": 11.9, "max_Q": 40.6, "min_Q": 2.98,
        "sum_Q": 620.0, "std_Q": 5.1,
        "style": {"color": "#2b8cbe", "weight": 1, "fillColor": "#a6bddb", "fillOpacity": 0.75}
      },
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[110.42, -7.05], [110.45, -7.05], [110.45, -7.02], [110.42, -7.02], [110.42, -7.05]]]
      }
    },
    {
      "type": "Feature",
      "properties": {
        "Name": "Basin B",
        "mean_Q": 22.8, "med_Q": 21.3, "max_Q": 38.2, "min_Q": 9.4,
        "sum_Q": 1140.0, "std_Q": 7.7,
        "style": {"color": "#2b8cbe", "weight": 1, "fillColor": "#3690c0", "fillOpacity": 0.75}
      },
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[110.45, -7.05], [110.48, -7.05], [110.48, -7.02], [110.45, -7.02], [110.45, -7.05]]]
      }
    }
  ]
}"##;

/// Write the sample tables and vector layers into `dir` using the default
/// file names the dashboard configuration expects.
pub fn write_sample_tables(dir: &Path) -> io::Result<()> {
    std::fs::write(dir.join("flood_jateng.csv"), SAMPLE_FLOOD_CSV)?;
    std::fs::write(dir.join("rainfall_jateng2.csv"), SAMPLE_RAINFALL_CSV)?;
    std::fs::write(dir.join("babon_channel.geojson"), SAMPLE_RIVER_GEOJSON)?;
    std::fs::write(
        dir.join("Runoff_statistic_styled.geojson"),
        SAMPLE_BASINS_GEOJSON,
    )?;
    Ok(())
}
