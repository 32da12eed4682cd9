//! Trait and types for interacting with an open-data portal.

use anyhow::{Result, anyhow};

/// One downloadable file of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFile {
    pub id: String,
    pub name: String,
}

/// Portal metadata for a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetInfo {
    pub id: String,
    pub name: String,
    pub files: Vec<DatasetFile>,
}

impl DatasetInfo {
    /// Parses the `data` envelope of a dataset-info response, keeping only
    /// the fields we need.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let data = &json["data"];
        let id = data["id"]
            .as_str()
            .or_else(|| data["slug"].as_str())
            .ok_or_else(|| anyhow!("dataset info has no id"))?
            .to_string();
        let name = data["name"].as_str().unwrap_or("").to_string();

        let files = data["files"]
            .as_array()
            .map(|files| {
                files
                    .iter()
                    .filter_map(|f| {
                        let id = f["id"].as_str()?.to_string();
                        let name = f["name"]
                            .as_str()
                            .or_else(|| f["fileName"].as_str())
                            .unwrap_or("")
                            .to_string();
                        Some(DatasetFile { id, name })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { id, name, files })
    }

    /// The first CSV file of the dataset.
    pub fn csv_file(&self) -> Option<&DatasetFile> {
        self.files
            .iter()
            .find(|f| f.name.to_lowercase().ends_with(".csv"))
    }
}

/// Abstraction over a data portal (e.g. avaandmed.eesti.ee).
#[async_trait::async_trait]
pub trait DatasetApi {
    async fn dataset_info(&self, dataset_id: &str) -> Result<DatasetInfo>;

    /// Downloads one file of a dataset as raw bytes.
    async fn fetch_dataset_file(&self, dataset_id: &str, file_id: &str) -> Result<Vec<u8>>;
}
