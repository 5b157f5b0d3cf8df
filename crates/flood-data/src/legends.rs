//! Static legend and classification tables.
//!
//! These tables come verbatim from the watershed analysis write-up; the
//! class boundaries were fixed when the rasters were produced, so they are
//! compiled in rather than configured. Runoff coefficient classes follow
//! Dhakal (2019).

use chrono::NaiveDate;
use serde::Serialize;

/// Citation for the RPI classification scheme.
pub const RPI_SOURCE: &str = "Dhakal, N. (2019). Development of Guidance for \
Runoff Coefficient Selection and Modified Rational Unit Hydrograph Method \
for Hydrologic Design.";

/// Climate phase a LULC acquisition falls in. The 2023-09-20 scene was
/// captured during the El Niño dry anomaly; every other configured date is
/// a normal (La Niña leaning) year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClimatePhase {
    Normal,
    #[serde(rename = "El Niño")]
    ElNino,
}

impl ClimatePhase {
    pub fn for_lulc_date(date: NaiveDate) -> Self {
        // only the 2023 scene is an El Niño acquisition
        if date == NaiveDate::from_ymd_opt(2023, 9, 20).unwrap() {
            ClimatePhase::ElNino
        } else {
            ClimatePhase::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClimatePhase::Normal => "Normal",
            ClimatePhase::ElNino => "El Niño",
        }
    }
}

/// One slope classification row (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlopeClass {
    pub class: u8,
    pub range_deg: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

/// One land-use/land-cover class row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LulcClass {
    pub class: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

/// One discharge (Q) classification row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DischargeClass {
    pub range_mm: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

/// One runoff potential index classification row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RpiClass {
    pub class: u8,
    pub range: &'static str,
    pub color: &'static str,
    pub potential: &'static str,
    pub description: &'static str,
}

/// Endpoints of the interpolated rainfall color ramp, in millimeters of
/// daily precipitation for the 6 January 2023 event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RainfallGradient {
    pub min_mm: f64,
    pub max_mm: f64,
    pub start_color: &'static str,
    pub end_color: &'static str,
}

const SLOPE_CLASSES: [SlopeClass; 6] = [
    SlopeClass {
        class: 1,
        range_deg: "0–2",
        description: "Flat",
        color: "white",
    },
    SlopeClass {
        class: 2,
        range_deg: ">2–5",
        description: "Gently Undulating",
        color: "honeydew",
    },
    SlopeClass {
        class: 3,
        range_deg: ">5–8",
        description: "Gentle Slope",
        color: "lightgreen",
    },
    SlopeClass {
        class: 4,
        range_deg: ">8–15",
        description: "Moderate Slope",
        color: "mediumseagreen",
    },
    SlopeClass {
        class: 5,
        range_deg: ">15–25",
        description: "Steep",
        color: "seagreen",
    },
    SlopeClass {
        class: 6,
        range_deg: ">25–33",
        description: "Very Steep",
        color: "darkgreen",
    },
];

const LULC_NORMAL: [LulcClass; 7] = [
    LulcClass {
        class: 1,
        name: "Moist Evergreen Forest",
        description: "Dense, year-round green canopy",
        color: "darkgreen",
    },
    LulcClass {
        class: 2,
        name: "Seasonally Moist Forest",
        description: "Forest showing slight canopy lightening",
        color: "seagreen",
    },
    LulcClass {
        class: 3,
        name: "Grassland",
        description: "Herbaceous cover, green and active in wet season",
        color: "lightgreen",
    },
    LulcClass {
        class: 4,
        name: "Agriculture",
        description: "Cultivated area (actively cropped)",
        color: "yellow",
    },
    LulcClass {
        class: 5,
        name: "Bare Soil",
        description: "Exposed mineral surface, no vegetation",
        color: "tan",
    },
    LulcClass {
        class: 6,
        name: "Urban Fabric",
        description: "Built-up settlement area",
        color: "firebrick",
    },
    LulcClass {
        class: 7,
        name: "Road / Pavement",
        description: "Impervious linear surface",
        color: "gray",
    },
];

const LULC_EL_NINO: [LulcClass; 7] = [
    LulcClass {
        class: 1,
        name: "Moist Evergreen Forest",
        description: "Still green, minimal stress",
        color: "darkgreen",
    },
    LulcClass {
        class: 2,
        name: "Seasonally Dry Forest",
        description: "Forest turning brownish or lighter canopy",
        color: "saddlebrown",
    },
    LulcClass {
        class: 3,
        name: "Grassland (Dry)",
        description: "Yellowish herbaceous cover, partly senescent",
        color: "beige",
    },
    LulcClass {
        class: 4,
        name: "Agriculture",
        description: "Actively irrigated or resilient cropland",
        color: "yellow",
    },
    LulcClass {
        class: 5,
        name: "Bare Soil",
        description: "Completely exposed earth",
        color: "tan",
    },
    LulcClass {
        class: 6,
        name: "Urban Fabric",
        description: "Built-up area",
        color: "firebrick",
    },
    LulcClass {
        class: 7,
        name: "Road / Pavement",
        description: "Impervious linear features",
        color: "gray",
    },
];

const DISCHARGE_CLASSES: [DischargeClass; 5] = [
    DischargeClass {
        range_mm: "2.98 – 9.34",
        description: "Very Low",
        color: "#f7fbff",
    },
    DischargeClass {
        range_mm: "9.34 – 12.26",
        description: "Low",
        color: "#d7e6f5",
    },
    DischargeClass {
        range_mm: "12.26 – 17.03",
        description: "Moderate",
        color: "#c8ddf0",
    },
    DischargeClass {
        range_mm: "17.03 – 40.60",
        description: "High",
        color: "#a3cce3",
    },
    DischargeClass {
        range_mm: "> 40.60",
        description: "Very High",
        color: "#08306b",
    },
];

const RPI_CLASSES: [RpiClass; 5] = [
    RpiClass {
        class: 1,
        range: "0.12–0.25",
        color: "aliceblue",
        potential: "Very Low",
        description: "Dominated by dense vegetation or permeable soils. High \
            infiltration capacity; low imperviousness and minimal surface runoff.",
    },
    RpiClass {
        class: 2,
        range: "0.25–0.38",
        color: "lightskyblue",
        potential: "Low",
        description: "Mostly pervious cover such as cropland and grassland with \
            gentle slopes. Moderate infiltration; limited direct runoff.",
    },
    RpiClass {
        class: 3,
        range: "0.38–0.51",
        color: "deepskyblue",
        potential: "Moderate",
        description: "Mixed surfaces or transitional land uses. Balanced \
            infiltration and surface runoff; moderately impervious areas.",
    },
    RpiClass {
        class: 4,
        range: "0.51–0.64",
        color: "royalblue",
        potential: "High",
        description: "Predominantly compacted or semi-impervious surfaces (urban \
            fringe, infrastructure). Reduced infiltration; higher direct runoff response.",
    },
    RpiClass {
        class: 5,
        range: "0.64–0.72",
        color: "navy",
        potential: "Very High",
        description: "Highly impervious or steep terrain (urban core, paved \
            surfaces). Very low infiltration and rapid surface runoff generation.",
    },
];

const RAINFALL_GRADIENT: RainfallGradient = RainfallGradient {
    min_mm: 21.5194,
    max_mm: 64.2044,
    start_color: "lightblue",
    end_color: "darkblue",
};

/// Slope classification, 0 to 33 degrees in six classes.
pub fn slope_classes() -> &'static [SlopeClass] {
    &SLOPE_CLASSES
}

/// LULC classification for the given climate phase.
pub fn lulc_classes(phase: ClimatePhase) -> &'static [LulcClass] {
    match phase {
        ClimatePhase::Normal => &LULC_NORMAL,
        ClimatePhase::ElNino => &LULC_EL_NINO,
    }
}

/// Discharge (Q) classification.
pub fn discharge_classes() -> &'static [DischargeClass] {
    &DISCHARGE_CLASSES
}

/// Runoff potential index classification.
pub fn rpi_classes() -> &'static [RpiClass] {
    &RPI_CLASSES
}

/// Rainfall color ramp endpoints.
pub fn rainfall_gradient() -> RainfallGradient {
    RAINFALL_GRADIENT
}
