use serde::{Deserialize, Serialize};

/// Broad category of a map layer. Only vector layers carry attributes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Vector,
    Raster,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
    Unknown,
    Null,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Polygon => "polygon",
            Self::Unknown => "unknown",
            Self::Null => "null",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "point" => Some(Self::Point),
            "line" => Some(Self::Line),
            "polygon" => Some(Self::Polygon),
            "unknown" => Some(Self::Unknown),
            "null" => Some(Self::Null),
            _ => None,
        }
    }
}

/// Whether ghosted features are currently filtered out of the layer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityState {
    #[default]
    Revealed,
    Hidden,
}

impl VisibilityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revealed => "revealed",
            Self::Hidden => "hidden",
        }
    }
}

/// Summary of a layer stored in a database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerInfo {
    pub name: String,
    pub geometry_kind: GeometryKind,
    pub subset_string: String,
    pub feature_count: i64,
}
