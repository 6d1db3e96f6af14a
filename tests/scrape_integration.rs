// Scraping a saved results page and loading the exported JSON back

use nikrome::filter_checkpoint;
use nikrome::results::{DatasetSource, load_dataset};
use nikrome::runtime::block_on;
use nikrome::scrape::{DEFAULT_TABLE_ID, ScrapeOutcome, scrape_file};
use tempfile::TempDir;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Semi Ventoux</title></head>
<body>
  <table id="table_epreuve_1" class="results">
    <thead>
      <tr><th>Nom</th><th>Temps</th><th>Class/Sx</th><th>Class/Cat</th><th>Vit.</th><th>StEsteve</th></tr>
    </thead>
    <tbody>
      <tr><td>A</td><td>01:00</td><td>12(M)</td><td>3(Cat)</td><td>10</td><td>01:00</td></tr>
      <tr><td>B</td><td>--</td><td>5(F)</td><td>1(Cat)</td><td>--</td><td>--</td></tr>
    </tbody>
  </table>
</body>
</html>"#;

#[test]
fn test_scrape_then_filter() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("page.html");
    let output = dir.path().join("table_epreuve_1_data.json");
    std::fs::write(&input, PAGE).unwrap();

    let outcome = scrape_file(&input, DEFAULT_TABLE_ID, &output).unwrap();
    assert_eq!(outcome, ScrapeOutcome::Exported { rows: 2 });

    let exported = std::fs::read_to_string(&output).unwrap();
    // pretty printed with two-space indentation
    assert!(exported.starts_with("{\n  \"headers\""));

    let dataset = block_on(load_dataset(&DatasetSource::File(output)))
        .unwrap()
        .unwrap();
    let view = filter_checkpoint(&dataset, "StEsteve").unwrap().unwrap();
    assert_eq!(view.title, "StEsteve - 1/2");
    assert_eq!(view.men_rows.len(), 1);
    assert_eq!(view.women_rows.len(), 1);
}

#[test]
fn test_missing_table_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("page.html");
    let output = dir.path().join("out.json");
    std::fs::write(&input, "<html><body><p>No results yet</p></body></html>").unwrap();

    let outcome = scrape_file(&input, DEFAULT_TABLE_ID, &output).unwrap();

    assert_eq!(outcome, ScrapeOutcome::TableNotFound);
    assert!(!output.exists());
}

#[test]
fn test_missing_page_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = scrape_file(
        &dir.path().join("page.html"),
        DEFAULT_TABLE_ID,
        &dir.path().join("out.json"),
    );
    assert!(matches!(
        result,
        Err(nikrome::NikromeError::ScraperIOError { .. })
    ));
}
