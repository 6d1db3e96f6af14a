// Error types for nikrome

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum NikromeError {
    // Errors while loading the results dataset
    #[snafu(display("Error reading results file"))]
    DatasetIOError { source: io::Error },
    #[snafu(display("Error parsing results document"))]
    DatasetParseError { source: serde_json::Error },
    #[snafu(display("Error fetching results from {url}"))]
    DatasetFetchError { url: String, source: reqwest::Error },
    #[snafu(display(
        "Results row {row} has {found} cells, expected {expected} to match the headers"
    ))]
    DataIntegrityError {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display("Duplicate column in results headers: {column}"))]
    DuplicateColumn { column: String },
    #[snafu(display("Column not found in results headers: {column}"))]
    MissingColumn { column: String },

    // Errors for the routing service client
    #[snafu(display("Error building routing client"))]
    RoutingClientError { source: reqwest::Error },
    #[snafu(display("Routing request failed"))]
    RoutingRequestError { source: reqwest::Error },
    #[snafu(display("Routing service returned an unusable route: {reason}"))]
    RoutingResponseError { reason: String },

    // Scraper errors
    #[snafu(display("Error reading HTML page"))]
    ScraperIOError { source: io::Error },
    #[snafu(display("Invalid table selector: {reason}"))]
    InvalidSelector { reason: String },
    #[snafu(display("Error writing scraped table"))]
    ScrapeWriteError { source: io::Error },
    #[snafu(display("Error serializing scraped table"))]
    ScrapeSerializeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application config directory"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Map rendering errors
    #[snafu(display("SVG generation failed: {reason}"))]
    SvgGenerationError { reason: String },
    #[snafu(display("Error writing SVG file"))]
    SvgWriteError { source: io::Error },

    // UI errors
    #[snafu(display("Could not start map window: {reason}"))]
    UiError { reason: String },

    // Async runtime errors
    #[snafu(display("Could not start async runtime"))]
    RuntimeError { source: io::Error },
}
