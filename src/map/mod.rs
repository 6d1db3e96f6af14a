// Map surface: owns the markers, popups and route lines shown on the course map

pub mod course;
pub mod svg;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::geo::{LatLng, LatLngBounds};
use crate::route::RoutePolyline;

pub use course::{CheckpointPoint, semi_ventoux};
pub use svg::CourseSvgRenderer;

pub const DEFAULT_ZOOM: u8 = 5;
/// Extra space kept around the markers when fitting the view
pub const FIT_PADDING: f64 = 0.2;

/// Raster tile source drawn under the course
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TileLayer {
    pub url_template: String,
    pub max_zoom: u8,
    /// Shown on the map at all times, as required by the tile provider
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            max_zoom: 19,
            attribution: "© OpenStreetMap contributors".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerIcon {
    /// Finish line
    Arrival,
    /// Intermediate timing point
    Checkpoint,
}

/// Image and placement of a marker icon, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconSpec {
    /// Fragment id the icon is defined under in exported documents
    pub symbol_id: &'static str,
    /// Standalone SVG document of the icon, built into the binary
    pub markup: &'static str,
    pub size: (u32, u32),
    /// Point of the image placed on the marker position
    pub anchor: (i32, i32),
    /// Offset of the popup tip from the anchor
    pub popup_anchor: (i32, i32),
}

impl MarkerIcon {
    pub fn spec(&self) -> IconSpec {
        let (symbol_id, markup) = match self {
            MarkerIcon::Arrival => ("icon-arrival", include_str!("../../assets/arrival.svg")),
            MarkerIcon::Checkpoint => ("icon-point", include_str!("../../assets/point.svg")),
        };
        IconSpec {
            symbol_id,
            markup,
            size: (32, 32),
            anchor: (16, 32),
            popup_anchor: (0, -32),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(usize);

/// Popup bound to a marker; it stays open and reports clicks for its checkpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub content: String,
    pub checkpoint_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub position: LatLng,
    pub title: String,
    pub icon: MarkerIcon,
    pub popup: Popup,
}

impl Marker {
    pub fn checkpoint_name(&self) -> &str {
        &self.popup.checkpoint_name
    }
}

pub struct MapSurface {
    center: LatLng,
    zoom: u8,
    tile_layer: TileLayer,
    markers: Vec<Marker>,
    polylines: Vec<RoutePolyline>,
    view: Option<LatLngBounds>,
}

impl MapSurface {
    pub fn new(center: LatLng, zoom: u8, tile_layer: TileLayer) -> Self {
        Self {
            center,
            zoom: zoom.min(tile_layer.max_zoom),
            tile_layer,
            markers: Vec::new(),
            polylines: Vec::new(),
            view: None,
        }
    }

    /// Place a marker with an open popup for `point`
    pub fn add_marker(&mut self, point: &CheckpointPoint) -> MarkerId {
        let id = MarkerId(self.markers.len());
        self.markers.push(Marker {
            id,
            position: point.position(),
            title: point.title.clone(),
            icon: point.icon,
            popup: Popup {
                content: point.popup_content.clone(),
                checkpoint_name: point.checkpoint_name.clone(),
            },
        });
        id
    }

    pub fn add_polyline(&mut self, polyline: RoutePolyline) {
        self.polylines.push(polyline);
    }

    /// Fit the view to the markers, grown by `padding` times their span.
    /// Leaves the view unchanged when there are no markers.
    pub fn fit_bounds(&mut self, padding: f64) -> Option<LatLngBounds> {
        let bounds =
            LatLngBounds::from_points(self.markers.iter().map(|m| &m.position))?.pad(padding);
        self.center = bounds.center();
        self.view = Some(bounds);
        Some(bounds)
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn tile_layer(&self) -> &TileLayer {
        &self.tile_layer
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn polylines(&self) -> &[RoutePolyline] {
        &self.polylines
    }

    /// Area set by the last `fit_bounds`
    pub fn view_bounds(&self) -> Option<LatLngBounds> {
        self.view
    }

    /// Bounds of everything drawn on the surface
    pub fn content_bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(
            self.markers
                .iter()
                .map(|m| &m.position)
                .chain(self.polylines.iter().flat_map(|p| p.coordinates.iter())),
        )
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.0)
    }

    pub fn checkpoint_for(&self, id: MarkerId) -> Option<&str> {
        self.marker(id).map(Marker::checkpoint_name)
    }

    /// Closest marker within `tolerance` degrees of `position`
    pub fn marker_near(&self, position: LatLng, tolerance: f64) -> Option<&Marker> {
        self.markers
            .iter()
            .map(|m| {
                let distance = ((m.position.lat - position.lat).powi(2)
                    + (m.position.lng - position.lng).powi(2))
                .sqrt();
                (m, distance)
            })
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(m, _)| m)
    }
}

/// Surface with a marker per course point, fitted to them as configured
pub fn course_surface(config: &AppConfig, course: &[CheckpointPoint]) -> MapSurface {
    let mut surface = MapSurface::new(config.center, config.zoom, config.tile_layer.clone());
    for point in course {
        surface.add_marker(point);
    }
    surface.fit_bounds(config.fit_padding);
    surface
}
