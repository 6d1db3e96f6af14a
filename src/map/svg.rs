// SVG export of the course map: route lines, checkpoint markers and popups

use std::path::Path;

use itertools::Itertools;
use log::{debug, info};

use super::{MapSurface, Marker, MarkerIcon};
use crate::NikromeError;
use crate::geo::{LatLng, LatLngBounds};
use crate::route::RoutePolyline;

/// Canvas dimensions (width, height) in pixels
const CANVAS_SIZE: (u32, u32) = (800, 600);
/// Margin around the course as a fraction of the canvas size
const MARGIN: f32 = 0.1;

/// Represents a 2D coordinate point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bounding box for coordinate calculations
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn new() -> Self {
        Self {
            min_x: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            min_y: f32::INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    pub fn update(&mut self, point: Point2D) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Renders a [`MapSurface`] to a standalone SVG document, the course fitted
/// to the canvas with a uniform scale
#[derive(Debug, Default)]
pub struct CourseSvgRenderer;

/// Maps projected course coordinates onto the canvas
struct CanvasTransform {
    bbox: BoundingBox,
    scale: f32,
    offset: (f32, f32),
    canvas_height: f32,
    reference_lat_cos: f64,
}

impl CanvasTransform {
    fn project(reference_lat_cos: f64, position: LatLng) -> Point2D {
        // equirectangular, longitude shrunk by the cosine of the course latitude
        Point2D::new(
            (position.lng * reference_lat_cos) as f32,
            position.lat as f32,
        )
    }

    fn apply(&self, position: LatLng) -> Point2D {
        let projected = Self::project(self.reference_lat_cos, position);
        let x = self.offset.0 + (projected.x - self.bbox.min_x) * self.scale;
        let y = self.offset.1 + (projected.y - self.bbox.min_y) * self.scale;
        // latitude grows northwards, SVG y grows downwards
        Point2D::new(x, self.canvas_height - y)
    }
}

impl CourseSvgRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Generate the SVG document for everything drawn on `surface`
    pub fn render(&self, surface: &MapSurface) -> Result<String, NikromeError> {
        let bounds = surface
            .content_bounds()
            .ok_or_else(|| NikromeError::SvgGenerationError {
                reason: "Cannot generate SVG from an empty map".to_string(),
            })?;
        let transform = self.canvas_transform(&bounds);
        debug!(
            "Rendering {} markers and {} polylines to SVG",
            surface.markers().len(),
            surface.polylines().len()
        );

        let (width, height) = CANVAS_SIZE;
        let mut svg = String::new();

        // SVG header
        svg.push_str(&format!(
            r#"<svg width="{}" height="{}" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <style>
      .route-line {{ fill: none; }}
      .popup {{ font-family: sans-serif; font-size: 12px; text-anchor: middle; }}
      .attribution {{ font-family: sans-serif; font-size: 10px; fill: #555; text-anchor: end; }}
    </style>"#,
            width, height
        ));
        // icons travel inside the document so it renders wherever it is copied
        for icon in surface.markers().iter().map(|m| m.icon).unique() {
            svg.push_str(&icon_symbol(icon));
        }
        svg.push_str("\n  </defs>");

        for polyline in surface.polylines() {
            svg.push_str(&self.polyline_element(polyline, &transform)?);
        }
        for marker in surface.markers() {
            svg.push_str(&self.marker_element(marker, &transform));
        }

        svg.push_str(&format!(
            "\n  <text class=\"attribution\" x=\"{}\" y=\"{}\">{}</text>",
            width.saturating_sub(5),
            height.saturating_sub(5),
            escape_xml(&surface.tile_layer().attribution)
        ));

        // SVG footer
        svg.push_str("\n</svg>");

        info!("Generated course SVG with {} characters", svg.len());
        Ok(svg)
    }

    /// Render `surface` and write the document to `path`
    pub fn write_svg(&self, surface: &MapSurface, path: &Path) -> Result<(), NikromeError> {
        let svg = self.render(surface)?;
        std::fs::write(path, svg).map_err(|e| NikromeError::SvgWriteError { source: e })?;
        info!("Course map written to {}", path.display());
        Ok(())
    }

    fn canvas_transform(&self, bounds: &LatLngBounds) -> CanvasTransform {
        let reference_lat_cos = bounds.center().lat.to_radians().cos();

        let mut bbox = BoundingBox::new();
        bbox.update(CanvasTransform::project(reference_lat_cos, bounds.south_west));
        bbox.update(CanvasTransform::project(reference_lat_cos, bounds.north_east));

        let scale = fit_scale(&bbox);

        // center the course on the canvas
        let (canvas_width, canvas_height) = (CANVAS_SIZE.0 as f32, CANVAS_SIZE.1 as f32);
        let offset = (
            (canvas_width - bbox.width() * scale) / 2.0,
            (canvas_height - bbox.height() * scale) / 2.0,
        );

        CanvasTransform {
            bbox,
            scale,
            offset,
            canvas_height,
            reference_lat_cos,
        }
    }

    fn polyline_element(
        &self,
        polyline: &RoutePolyline,
        transform: &CanvasTransform,
    ) -> Result<String, NikromeError> {
        let Some((first, rest)) = polyline.coordinates.split_first() else {
            return Err(NikromeError::SvgGenerationError {
                reason: "Cannot draw a polyline without coordinates".to_string(),
            });
        };

        let start = transform.apply(*first);
        let mut path = format!("M {:.2},{:.2}", start.x, start.y);
        for position in rest {
            let point = transform.apply(*position);
            path.push_str(&format!(" L {:.2},{:.2}", point.x, point.y));
        }

        let style = &polyline.style;
        let dash = style
            .dash_array
            .map(|[dash, gap]| format!(" stroke-dasharray=\"{}, {}\"", dash, gap))
            .unwrap_or_default();

        Ok(format!(
            "\n  <path class=\"route-line\" d=\"{}\" stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\" stroke-linejoin=\"round\"{} />",
            path,
            escape_xml(&style.color),
            style.weight,
            style.opacity,
            dash
        ))
    }

    fn marker_element(&self, marker: &Marker, transform: &CanvasTransform) -> String {
        let icon = marker.icon.spec();
        let position = transform.apply(marker.position);
        let image_x = position.x - icon.anchor.0 as f32;
        let image_y = position.y - icon.anchor.1 as f32;
        let popup_x = position.x + icon.popup_anchor.0 as f32;
        let popup_y = position.y + icon.popup_anchor.1 as f32 - 4.0;

        format!(
            "\n  <g class=\"marker\" data-checkpoint=\"{}\">\n    <title>{}</title>\n    <use href=\"#{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{}\" height=\"{}\" />\n    <text class=\"popup\" x=\"{:.2}\" y=\"{:.2}\">{}</text>\n  </g>",
            escape_xml(marker.checkpoint_name()),
            escape_xml(&marker.title),
            icon.symbol_id,
            image_x,
            image_y,
            icon.size.0,
            icon.size.1,
            popup_x,
            popup_y,
            escape_xml(&marker.popup.content)
        )
    }
}

/// Uniform pixels per projected degree fitting `bbox` inside the margins
fn fit_scale(bbox: &BoundingBox) -> f32 {
    let usable_width = CANVAS_SIZE.0 as f32 * (1.0 - 2.0 * MARGIN);
    let usable_height = CANVAS_SIZE.1 as f32 * (1.0 - 2.0 * MARGIN);

    // A single point or a perfectly straight course has no extent on one axis
    let width = bbox.width().max(f32::EPSILON);
    let height = bbox.height().max(f32::EPSILON);

    (usable_width / width).min(usable_height / height)
}

/// `<symbol>` wrapping the icon document, referenced by markers through `<use>`
fn icon_symbol(icon: MarkerIcon) -> String {
    let spec = icon.spec();
    format!(
        "\n    <symbol id=\"{}\" viewBox=\"0 0 {} {}\">\n{}\n    </symbol>",
        spec.symbol_id,
        spec.size.0,
        spec.size.1,
        spec.markup.trim()
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{DEFAULT_ZOOM, TileLayer, course};
    use crate::route::RoutePolyline;

    fn course_surface() -> MapSurface {
        let mut surface = MapSurface::new(course::FINISH, DEFAULT_ZOOM, TileLayer::default());
        let points = course::semi_ventoux();
        for point in &points {
            surface.add_marker(point);
        }
        surface.add_polyline(RoutePolyline::straight_line(&course::positions(&points)));
        surface
    }

    #[test]
    fn test_render_course() {
        let svg = CourseSvgRenderer::new().render(&course_surface()).unwrap();

        assert!(svg.contains("<svg width=\"800\" height=\"600\""));
        assert!(svg.contains("class=\"route-line\""));
        assert!(svg.contains("stroke=\"#2C3E50\""));
        assert!(svg.contains("stroke-dasharray=\"10, 5\""));
        assert!(svg.contains("stroke-linejoin=\"round\""));
        assert!(svg.contains("data-checkpoint=\"StEsteve\""));
        assert!(svg.contains("href=\"#icon-arrival\""));
        assert!(svg.contains(">Arrivée Semi 21km</text>"));
        assert!(svg.contains("© OpenStreetMap contributors"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_road_route_is_solid() {
        let mut surface = MapSurface::new(course::FINISH, DEFAULT_ZOOM, TileLayer::default());
        surface.add_polyline(RoutePolyline::road_following(vec![
            LatLng::new(44.0, 5.0),
            LatLng::new(44.1, 5.1),
        ]));

        let svg = CourseSvgRenderer::new().render(&surface).unwrap();
        assert!(!svg.contains("stroke-dasharray"));
    }

    #[test]
    fn test_render_empty_surface() {
        let surface = MapSurface::new(course::FINISH, DEFAULT_ZOOM, TileLayer::default());
        assert!(CourseSvgRenderer::new().render(&surface).is_err());
    }

    #[test]
    fn test_north_is_up() {
        let renderer = CourseSvgRenderer::new();
        let bounds = LatLngBounds {
            south_west: LatLng::new(44.0, 5.0),
            north_east: LatLng::new(44.2, 5.2),
        };
        let transform = renderer.canvas_transform(&bounds);

        let south = transform.apply(LatLng::new(44.0, 5.1));
        let north = transform.apply(LatLng::new(44.2, 5.1));
        assert!(north.y < south.y);

        let west = transform.apply(LatLng::new(44.1, 5.0));
        let east = transform.apply(LatLng::new(44.1, 5.2));
        assert!(west.x < east.x);
    }

    #[test]
    fn test_fit_scale_keeps_aspect_and_margin() {
        let wide = BoundingBox {
            min_x: 0.0,
            max_x: 2.0,
            min_y: 0.0,
            max_y: 1.0,
        };
        // width limited: 800 * 0.8 / 2
        assert_eq!(fit_scale(&wide), 320.0);

        let tall = BoundingBox {
            min_x: 0.0,
            max_x: 1.0,
            min_y: 0.0,
            max_y: 2.0,
        };
        // height limited: 600 * 0.8 / 2
        assert_eq!(fit_scale(&tall), 240.0);
    }

    #[test]
    fn test_course_stays_inside_margins() {
        let bounds = LatLngBounds {
            south_west: LatLng::new(44.0, 5.0),
            north_east: LatLng::new(44.2, 5.2),
        };
        let transform = CourseSvgRenderer::new().canvas_transform(&bounds);

        for corner in [bounds.south_west, bounds.north_east] {
            let point = transform.apply(corner);
            assert!((80.0 - 0.01..=720.0 + 0.01).contains(&point.x));
            assert!((60.0 - 0.01..=540.0 + 0.01).contains(&point.y));
        }
    }

    #[test]
    fn test_icons_are_embedded() {
        let svg = CourseSvgRenderer::new().render(&course_surface()).unwrap();

        assert!(!svg.contains("assets/"));
        assert!(!svg.contains("<image"));
        assert_eq!(svg.matches("<symbol id=\"icon-arrival\"").count(), 1);
        assert_eq!(svg.matches("<symbol id=\"icon-point\"").count(), 1);
        assert_eq!(svg.matches("<use href=\"#icon-point\"").count(), 2);
        assert_eq!(svg.matches("<use href=\"#icon-arrival\"").count(), 1);
        // the pin shape itself is part of the document
        assert!(svg.contains("fill=\"#C0392B\""));
    }

    #[test]
    fn test_unused_icons_are_not_embedded() {
        let mut surface = MapSurface::new(course::FINISH, DEFAULT_ZOOM, TileLayer::default());
        surface.add_polyline(RoutePolyline::road_following(vec![
            LatLng::new(44.0, 5.0),
            LatLng::new(44.1, 5.1),
        ]));

        let svg = CourseSvgRenderer::new().render(&surface).unwrap();
        assert!(!svg.contains("<symbol"));
    }

    #[test]
    fn test_write_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("course.svg");

        CourseSvgRenderer::new()
            .write_svg(&course_surface(), &path)
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<svg"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("A & <B>"), "A &amp; &lt;B&gt;");
    }
}
