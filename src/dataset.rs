//! VQA dataset rows loaded from a CSV index plus an image directory

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub image_id: String,
    pub question: String,
    pub ground_truth_answer: String,
    pub image_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "Image")]
    image: String,
    question: String,
    answer: String,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<DatasetRow>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<DatasetRow>) -> Self {
        Self { rows }
    }

    /// Read `Image,question,answer` rows; each image resolves to
    /// `<images_dir>/<Image>.<extension>`.
    pub fn load_csv(csv_path: &Path, images_dir: &Path, extension: &str) -> Result<Self> {
        let file = File::open(csv_path).map_err(|e| BenchError::Dataset {
            message: format!("Dataset CSV file not found at {}: {}", csv_path.display(), e),
        })?;
        let mut rdr = csv::Reader::from_reader(file);

        let mut rows = Vec::new();
        for record in rdr.deserialize() {
            let record: CsvRecord = record?;
            let image_path = images_dir.join(format!("{}.{}", record.image, extension));
            rows.push(DatasetRow {
                image_id: record.image,
                question: record.question,
                ground_truth_answer: record.answer,
                image_path,
            });
        }
        tracing::info!("Loaded dataset from {} with {} rows.", csv_path.display(), rows.len());

        // Spot-check the first image only; decoding failures surface later per row
        if let Some(first) = rows.first()
            && !first.image_path.exists()
        {
            tracing::warn!(
                "Image not found at: {}. Please check the images directory.",
                first.image_path.display()
            );
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Result<&DatasetRow> {
        self.rows.get(index).ok_or(BenchError::OutOfBounds {
            index,
            len: self.rows.len(),
        })
    }

    /// Keep only the first `n` rows
    pub fn truncate(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    /// Text view of one sample
    pub fn describe(&self, index: usize) -> Result<String> {
        let row = self.row(index)?;
        let image_status = if row.image_path.exists() {
            row.image_path.display().to_string()
        } else {
            format!("{} (file not found)", row.image_path.display())
        };
        Ok(format!(
            "--- Sample {} ---\nQuestion: {}\nAnswer: {}\nImage: {}",
            index, row.question, row.ground_truth_answer, image_status
        ))
    }
}
