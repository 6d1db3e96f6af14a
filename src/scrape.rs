// Extracts the results table of a saved timing page into the JSON dataset format

use std::path::Path;

use log::{info, warn};
use scraper::{ElementRef, Html, Selector};

use crate::NikromeError;
use crate::results::RunnerDataset;

pub const DEFAULT_INPUT: &str = "page.html";
pub const DEFAULT_TABLE_ID: &str = "table_epreuve_1";
pub const DEFAULT_OUTPUT: &str = "table_epreuve_1_data.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Exported { rows: usize },
    TableNotFound,
}

fn selector(selector: &str) -> Result<Selector, NikromeError> {
    Selector::parse(selector).map_err(|e| NikromeError::InvalidSelector {
        reason: format!("{}: {}", selector, e),
    })
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Read the table with id `table_id` out of `html`.
///
/// Headers come from the `th` cells of its `thead`, rows from the `td` cells
/// of each `tbody` row. `Ok(None)` when the page has no such table.
pub fn extract_table(html: &str, table_id: &str) -> Result<Option<RunnerDataset>, NikromeError> {
    let document = Html::parse_document(html);
    let table_selector = selector(&format!("#{}", table_id))?;
    let thead_selector = selector("thead")?;
    let tbody_selector = selector("tbody")?;
    let th_selector = selector("th")?;
    let tr_selector = selector("tr")?;
    let td_selector = selector("td")?;

    let Some(table) = document.select(&table_selector).next() else {
        return Ok(None);
    };

    let headers: Vec<String> = table
        .select(&thead_selector)
        .next()
        .map(|thead| thead.select(&th_selector).map(cell_text).collect())
        .unwrap_or_default();

    let data: Vec<Vec<String>> = table
        .select(&tbody_selector)
        .next()
        .map(|tbody| {
            tbody
                .select(&tr_selector)
                .map(|row| row.select(&td_selector).map(cell_text).collect())
                .collect()
        })
        .unwrap_or_default();

    // Rows are exported as found; the loader rejects them later if they do not line up
    for (index, row) in data.iter().enumerate() {
        if row.len() != headers.len() {
            warn!(
                "Row {} has {} cells for {} headers",
                index,
                row.len(),
                headers.len()
            );
        }
    }

    Ok(Some(RunnerDataset::new(headers, data)))
}

/// Scrape `table_id` from the HTML file at `input` and write it as pretty JSON to `output`
pub fn scrape_file(
    input: &Path,
    table_id: &str,
    output: &Path,
) -> Result<ScrapeOutcome, NikromeError> {
    let html =
        std::fs::read_to_string(input).map_err(|e| NikromeError::ScraperIOError { source: e })?;

    let Some(dataset) = extract_table(&html, table_id)? else {
        info!("Table not found");
        return Ok(ScrapeOutcome::TableNotFound);
    };

    let json = serde_json::to_string_pretty(&dataset)
        .map_err(|e| NikromeError::ScrapeSerializeError { source: e })?;
    std::fs::write(output, json).map_err(|e| NikromeError::ScrapeWriteError { source: e })?;
    info!("Data exported to {}", output.display());

    Ok(ScrapeOutcome::Exported {
        rows: dataset.total_runners(),
    })
}
