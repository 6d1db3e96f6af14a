// Course route against an unreachable routing service

use nikrome::config::{AppConfig, RoutingConfig};
use nikrome::map::{self, CourseSvgRenderer};
use nikrome::route::{OsrmClient, RouteKind, draw_route_along_roads, lookup_course_route};
use nikrome::runtime::block_on;
use tempfile::TempDir;

fn unreachable_routing() -> RoutingConfig {
    RoutingConfig {
        // nothing listens on port 1
        base_url: "http://127.0.0.1:1".to_string(),
        profile: "driving".to_string(),
        timeout_s: 2,
    }
}

#[test]
fn test_unreachable_service_draws_straight_line() {
    let config = AppConfig {
        routing: unreachable_routing(),
        ..Default::default()
    };
    let course = map::semi_ventoux();
    let mut surface = map::course_surface(&config, &course);
    let client = OsrmClient::new(&config.routing).unwrap();

    let kind = block_on(draw_route_along_roads(
        &mut surface,
        &client,
        &map::course::positions(&course),
    ))
    .unwrap();

    assert_eq!(kind, RouteKind::StraightLine);
    assert_eq!(surface.polylines().len(), 1);
    let polyline = &surface.polylines()[0];
    assert_eq!(polyline.coordinates, map::course::positions(&course));
    assert_eq!(polyline.style.dash_array, Some([10.0, 5.0]));
}

#[test]
fn test_blocking_lookup_falls_back() {
    let points = map::course::positions(&map::semi_ventoux());

    let polyline = lookup_course_route(&unreachable_routing(), &points);

    assert!(polyline.is_fallback());
    assert_eq!(polyline.coordinates, points);
}

#[test]
fn test_fallback_course_exports_to_svg() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("course.svg");
    let config = AppConfig::default();
    let course = map::semi_ventoux();
    let mut surface = map::course_surface(&config, &course);
    surface.add_polyline(lookup_course_route(
        &unreachable_routing(),
        &map::course::positions(&course),
    ));

    CourseSvgRenderer::new().write_svg(&surface, &path).unwrap();

    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.contains("stroke-dasharray"));
    assert_eq!(svg.matches("class=\"marker\"").count(), 3);
}
