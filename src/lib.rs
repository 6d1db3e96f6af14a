// Library interface for nikrome
// This allows integration tests and benches to access internal modules

pub mod checkpoint;
pub mod config;
pub mod errors;
pub mod geo;
pub mod map;
pub mod results;
pub mod route;
pub mod runtime;
pub mod scrape;
pub mod ui;

// Re-export commonly used types
pub use checkpoint::{CheckpointFilter, CheckpointSummary, ModalViewState, filter_checkpoint};
pub use config::{AppConfig, RoutingConfig};
pub use errors::NikromeError;
pub use geo::{LatLng, LatLngBounds};
pub use map::{CheckpointPoint, CourseSvgRenderer, MapSurface, MarkerId, TileLayer};
pub use results::{DatasetSource, RunnerDataset, load_dataset};
pub use route::{
    OsrmClient, RouteKind, RoutePolyline, RoutingService, draw_route_along_roads,
    lookup_course_route, resolve_route,
};
pub use scrape::{ScrapeOutcome, extract_table, scrape_file};
