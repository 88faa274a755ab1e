use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const ISS_NORAD_ID: u32 = 25544;

const STARLINK_IDS: [u32; 10] = [
    45074, 45048, 45044, 44961, 44933, 44768, 44748, 44744, 44736, 44723,
];

/// A tracked satellite as exposed by `/api/satellites`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SatelliteDescriptor {
    #[serde(rename = "satid")]
    pub id: u32,
    #[serde(rename = "name")]
    pub display_name: String,
}

impl SatelliteDescriptor {
    pub fn new(id: u32, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

/// Fixed set of satellites, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    satellites: Vec<SatelliteDescriptor>,
}

impl Default for Roster {
    fn default() -> Self {
        let mut satellites = vec![SatelliteDescriptor::new(ISS_NORAD_ID, "ISS (25544)")];
        satellites.extend(
            STARLINK_IDS
                .iter()
                .map(|id| SatelliteDescriptor::new(*id, format!("Starlink {}", id))),
        );
        Self { satellites }
    }
}

impl Roster {
    pub fn new(satellites: Vec<SatelliteDescriptor>) -> Self {
        Self { satellites }
    }

    pub fn satellites(&self) -> &[SatelliteDescriptor] {
        &self.satellites
    }

    pub fn ids(&self) -> Vec<u32> {
        self.satellites.iter().map(|s| s.id).collect()
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    /// Display name for `id`, falling back to the bare id for satellites the
    /// upstream reports but the roster does not know.
    pub fn display_name(&self, id: u32) -> String {
        self.satellites
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.display_name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
