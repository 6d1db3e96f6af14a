// Route renderer: draws the course line, following roads when the routing
// service answers and falling back to straight segments otherwise

pub mod osrm;

use std::future::Future;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::NikromeError;
use crate::config::RoutingConfig;
use crate::geo::LatLng;
use crate::map::MapSurface;
use crate::runtime;

pub use osrm::{OSRM_OK, OsrmClient, RouteResponse};

pub const ROUTE_COLOR: &str = "#2C3E50";
pub const ROUTE_WEIGHT: f32 = 4.0;
pub const ROUTE_OPACITY: f32 = 0.7;
/// Dash and gap lengths of the degraded straight-line route
pub const FALLBACK_DASH: [f32; 2] = [10.0, 5.0];

/// A service able to compute a road-following route through ordered waypoints
pub trait RoutingService {
    fn route(
        &self,
        waypoints: &[LatLng],
    ) -> impl Future<Output = Result<RouteResponse, NikromeError>> + Send;
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum RouteKind {
    /// Path returned by the routing service
    RoadFollowing,
    /// Straight segments between the course points
    StraightLine,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PolylineStyle {
    /// CSS hex color, `#RRGGBB`
    pub color: String,
    pub weight: f32,
    pub opacity: f32,
    pub dash_array: Option<[f32; 2]>,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            color: ROUTE_COLOR.to_string(),
            weight: ROUTE_WEIGHT,
            opacity: ROUTE_OPACITY,
            dash_array: None,
        }
    }
}

impl PolylineStyle {
    pub fn dashed() -> Self {
        Self {
            dash_array: Some(FALLBACK_DASH),
            ..Default::default()
        }
    }

    /// Parse `color` into RGB components
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// A drawable course line with its styling
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoutePolyline {
    pub coordinates: Vec<LatLng>,
    pub kind: RouteKind,
    pub style: PolylineStyle,
}

impl RoutePolyline {
    pub fn road_following(coordinates: Vec<LatLng>) -> Self {
        Self {
            coordinates,
            kind: RouteKind::RoadFollowing,
            style: PolylineStyle::default(),
        }
    }

    /// Straight segments through `points`, in order, without interpolation
    pub fn straight_line(points: &[LatLng]) -> Self {
        Self {
            coordinates: points.to_vec(),
            kind: RouteKind::StraightLine,
            style: PolylineStyle::dashed(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.kind == RouteKind::StraightLine
    }
}

/// Resolve the course line through `points`.
///
/// Never fails: transport errors, non-`Ok` payloads and malformed routes are
/// logged and replaced by the straight-line path through `points`.
pub async fn resolve_route<S: RoutingService>(service: &S, points: &[LatLng]) -> RoutePolyline {
    if points.len() < 2 {
        warn!(
            "Need at least two points to request a route, got {}",
            points.len()
        );
        return RoutePolyline::straight_line(points);
    }

    match service.route(points).await {
        Ok(response) => match road_path(response) {
            Ok(path) => {
                info!("Route follows roads with {} coordinates", path.len());
                RoutePolyline::road_following(path)
            }
            Err(e) => {
                error!("Could not get route from routing service: {}", e);
                RoutePolyline::straight_line(points)
            }
        },
        Err(e) => {
            error!("Error fetching route: {}", e);
            RoutePolyline::straight_line(points)
        }
    }
}

/// Resolve the course line and add it to `surface`, returning what was drawn
pub async fn draw_route_along_roads<S: RoutingService>(
    surface: &mut MapSurface,
    service: &S,
    points: &[LatLng],
) -> RouteKind {
    let polyline = resolve_route(service, points).await;
    let kind = polyline.kind;
    surface.add_polyline(polyline);
    kind
}

/// Blocking course lookup against the configured OSRM service, for worker
/// threads and the CLI. Falls back to the straight line like [`resolve_route`].
pub fn lookup_course_route(config: &RoutingConfig, points: &[LatLng]) -> RoutePolyline {
    let resolved = runtime::try_block_on(async {
        let client = OsrmClient::new(config)?;
        Ok::<_, NikromeError>(resolve_route(&client, points).await)
    });

    resolved.unwrap_or_else(|e| {
        error!("Error fetching route: {}", e);
        RoutePolyline::straight_line(points)
    })
}

fn road_path(response: RouteResponse) -> Result<Vec<LatLng>, NikromeError> {
    if response.code != OSRM_OK {
        return Err(NikromeError::RoutingResponseError {
            reason: match response.message {
                Some(message) => format!("{}: {}", response.code, message),
                None => response.code,
            },
        });
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| NikromeError::RoutingResponseError {
            reason: "no routes in payload".to_string(),
        })?;

    if route.geometry.coordinates.len() < 2 {
        return Err(NikromeError::RoutingResponseError {
            reason: format!(
                "route geometry has {} coordinates",
                route.geometry.coordinates.len()
            ),
        });
    }
    if route
        .geometry
        .coordinates
        .iter()
        .flatten()
        .any(|c| !c.is_finite())
    {
        return Err(NikromeError::RoutingResponseError {
            reason: "route geometry has non-finite coordinates".to_string(),
        });
    }

    Ok(route
        .geometry
        .coordinates
        .into_iter()
        .map(LatLng::from_lng_lat)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{MapSurface, TileLayer};
    use crate::runtime::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Routing service answering with a canned result
    struct CannedRouting {
        response: fn() -> Result<RouteResponse, NikromeError>,
        calls: AtomicUsize,
    }

    impl CannedRouting {
        fn new(response: fn() -> Result<RouteResponse, NikromeError>) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl RoutingService for CannedRouting {
        async fn route(&self, _waypoints: &[LatLng]) -> Result<RouteResponse, NikromeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.response)()
        }
    }

    fn course() -> Vec<LatLng> {
        vec![
            LatLng::new(44.115035157289384, 5.240221668381498),
            LatLng::new(44.150063522021, 5.318259467280956),
            LatLng::new(44.17411920884436, 5.278666950029784),
        ]
    }

    #[test]
    fn test_success_swaps_axes() {
        let service = CannedRouting::new(|| Ok(RouteResponse::ok(vec![[5.0, 44.0], [5.1, 44.1]])));

        let polyline = block_on(resolve_route(&service, &course())).unwrap();

        assert_eq!(polyline.kind, RouteKind::RoadFollowing);
        assert_eq!(
            polyline.coordinates,
            vec![LatLng::new(44.0, 5.0), LatLng::new(44.1, 5.1)]
        );
        assert!(polyline.style.dash_array.is_none());
    }

    #[test]
    fn test_transport_failure_falls_back() {
        let service = CannedRouting::new(|| {
            Err(NikromeError::RoutingResponseError {
                reason: "connection refused".to_string(),
            })
        });

        let polyline = block_on(resolve_route(&service, &course())).unwrap();

        assert!(polyline.is_fallback());
        assert_eq!(polyline.coordinates, course());
        assert_eq!(polyline.style.dash_array, Some(FALLBACK_DASH));
    }

    #[test]
    fn test_non_ok_code_falls_back() {
        let service = CannedRouting::new(|| {
            let mut response = RouteResponse::ok(vec![[5.0, 44.0], [5.1, 44.1]]);
            response.code = "NoRoute".to_string();
            Ok(response)
        });

        let polyline = block_on(resolve_route(&service, &course())).unwrap();
        assert!(polyline.is_fallback());
        assert_eq!(polyline.coordinates.len(), course().len());
    }

    #[test]
    fn test_empty_routes_fall_back() {
        let service = CannedRouting::new(|| {
            let mut response = RouteResponse::ok(vec![]);
            response.routes.clear();
            Ok(response)
        });

        let polyline = block_on(resolve_route(&service, &course())).unwrap();
        assert_eq!(polyline.coordinates, course());
    }

    #[test]
    fn test_degenerate_geometry_falls_back() {
        let service = CannedRouting::new(|| Ok(RouteResponse::ok(vec![[5.0, 44.0]])));

        let polyline = block_on(resolve_route(&service, &course())).unwrap();
        assert!(polyline.is_fallback());
    }

    #[test]
    fn test_single_point_skips_service() {
        let service = CannedRouting::new(|| Ok(RouteResponse::ok(vec![[5.0, 44.0], [5.1, 44.1]])));
        let points = vec![LatLng::new(44.0, 5.0)];

        let polyline = block_on(resolve_route(&service, &points)).unwrap();

        assert!(polyline.is_fallback());
        assert_eq!(polyline.coordinates, points);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_draw_adds_exactly_one_polyline() {
        let service = CannedRouting::new(|| {
            Err(NikromeError::RoutingResponseError {
                reason: "timeout".to_string(),
            })
        });
        let mut surface = MapSurface::new(LatLng::new(44.17, 5.27), 5, TileLayer::default());

        let kind = block_on(draw_route_along_roads(&mut surface, &service, &course())).unwrap();

        assert_eq!(kind, RouteKind::StraightLine);
        assert_eq!(surface.polylines().len(), 1);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_style_rgb() {
        assert_eq!(PolylineStyle::default().rgb(), Some((0x2C, 0x3E, 0x50)));

        let style = PolylineStyle {
            color: "blue".to_string(),
            ..Default::default()
        };
        assert_eq!(style.rgb(), None);
    }

    #[test]
    fn test_styles_differ_only_by_dash() {
        let solid = PolylineStyle::default();
        let dashed = PolylineStyle::dashed();

        assert_eq!(
            PolylineStyle {
                dash_array: None,
                ..dashed
            },
            solid
        );
    }
}
