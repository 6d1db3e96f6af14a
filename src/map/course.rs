// Static course definition: checkpoints of the Semi Ventoux race

use serde::{Deserialize, Serialize};

use super::MarkerIcon;
use crate::geo::LatLng;

/// A checkpoint of the course as placed on the map
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckpointPoint {
    pub id: u32,
    pub lat: f64,
    pub lng: f64,
    pub title: String,
    pub popup_content: String,
    /// Column of the results table holding the times at this checkpoint
    pub checkpoint_name: String,
    pub icon: MarkerIcon,
}

impl CheckpointPoint {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Summit finish, used as the default map view center
pub const FINISH: LatLng = LatLng {
    lat: 44.17411920884436,
    lng: 5.278666950029784,
};

/// Checkpoints in running order, finish last
pub fn semi_ventoux() -> Vec<CheckpointPoint> {
    vec![
        CheckpointPoint {
            id: 1,
            lat: 44.115035157289384,
            lng: 5.240221668381498,
            title: "StEsteve".to_string(),
            popup_content: "PC1".to_string(),
            checkpoint_name: "StEsteve".to_string(),
            icon: MarkerIcon::Checkpoint,
        },
        CheckpointPoint {
            id: 2,
            lat: 44.150063522021,
            lng: 5.318259467280956,
            title: "ChReynard".to_string(),
            popup_content: "PC2".to_string(),
            checkpoint_name: "ChReynard".to_string(),
            icon: MarkerIcon::Checkpoint,
        },
        CheckpointPoint {
            id: 3,
            lat: FINISH.lat,
            lng: FINISH.lng,
            title: "Sommet".to_string(),
            popup_content: "Arrivée Semi 21km".to_string(),
            checkpoint_name: "Sommet".to_string(),
            icon: MarkerIcon::Arrival,
        },
    ]
}

/// Positions of the course points in running order
pub fn positions(points: &[CheckpointPoint]) -> Vec<LatLng> {
    points.iter().map(CheckpointPoint::position).collect()
}
