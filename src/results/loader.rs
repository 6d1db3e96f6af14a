use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use log::{debug, info};

use super::RunnerDataset;
use crate::NikromeError;

/// Where the results document lives: a local file or an HTTP(S) URL
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            DatasetSource::Url(source.to_string())
        } else {
            DatasetSource::File(PathBuf::from(source))
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::File(path) => write!(f, "{}", path.display()),
            DatasetSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Load and validate the results dataset from its source
pub async fn load_dataset(source: &DatasetSource) -> Result<RunnerDataset, NikromeError> {
    let dataset = match source {
        DatasetSource::File(path) => load_dataset_file(path)?,
        DatasetSource::Url(url) => fetch_dataset(url).await?,
    };
    dataset.validate()?;

    info!(
        "Loaded {}, found {} columns and {} runners",
        source,
        dataset.headers.len(),
        dataset.total_runners()
    );
    Ok(dataset)
}

fn load_dataset_file(path: &PathBuf) -> Result<RunnerDataset, NikromeError> {
    debug!("Reading results from {:?}", path);
    let file = File::open(path).map_err(|e| NikromeError::DatasetIOError { source: e })?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| NikromeError::DatasetParseError { source: e })
}

async fn fetch_dataset(url: &str) -> Result<RunnerDataset, NikromeError> {
    debug!("Fetching results from {}", url);
    let fetch_error = |e| NikromeError::DatasetFetchError {
        url: url.to_string(),
        source: e,
    };

    reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(fetch_error)?
        .json::<RunnerDataset>()
        .await
        .map_err(fetch_error)
}
