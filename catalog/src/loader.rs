//! Catalog loading from a row-oriented table.

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Number, Value};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::record::CatalogRecord;

/// The loaded catalog: records in source row order plus the raw source
/// bytes, retained so the content signature is computed over exactly what
/// was read rather than a re-serialized form.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
    title_field: String,
    raw: Vec<u8>,
}

impl Catalog {
    /// Load the catalog at `path`, treating `title_field` as the required
    /// unique title column.
    ///
    /// Fails with [`CatalogError::NotFound`] when the path does not resolve
    /// and [`CatalogError::Malformed`] when the title column is absent, a
    /// title is blank, or a title repeats. No side effects beyond reading.
    pub async fn load(path: impl AsRef<Path>, title_field: &str) -> Result<Self> {
        let path = path.as_ref();
        let raw = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let records = parse_records(&raw, title_field)?;
        info!("loaded {} catalog records from {}", records.len(), path.display());

        Ok(Self {
            records,
            title_field: title_field.to_string(),
            raw,
        })
    }

    /// Records in source row order.
    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The exact bytes read from the catalog source.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The derived text representation of every record, index-aligned with
    /// [`Catalog::records`].
    pub fn embedding_texts(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.embedding_text(&self.title_field))
            .collect()
    }
}

fn parse_records(raw: &[u8], title_field: &str) -> Result<Vec<CatalogRecord>> {
    let mut reader = csv::Reader::from_reader(raw);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let Some(title_column) = headers.iter().position(|h| h == title_field) else {
        return Err(CatalogError::Malformed(format!(
            "title column `{title_field}` not found in header"
        )));
    };

    let mut records = Vec::new();
    let mut seen_titles = HashSet::new();
    for (row, result) in reader.records().enumerate() {
        let csv_row = result?;
        let mut fields = Map::new();
        for (header, value) in headers.iter().zip(csv_row.iter()) {
            fields.insert(header.clone(), parse_scalar(value));
        }

        // The title is always kept as text, even when the cell looks numeric.
        let title = csv_row
            .get(title_column)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if title.is_empty() {
            return Err(CatalogError::Malformed(format!(
                "row {row}: blank title in column `{title_field}`"
            )));
        }
        if !seen_titles.insert(title.clone()) {
            return Err(CatalogError::Malformed(format!(
                "row {row}: duplicate title `{title}`"
            )));
        }
        fields.insert(title_field.to_string(), Value::String(title.clone()));

        debug!("parsed catalog row {row}: {title}");
        records.push(CatalogRecord::new(title, fields));
    }

    Ok(records)
}

/// Parse one cell into a scalar: empty cells become null, numeric text
/// becomes a number, everything else stays a string.
fn parse_scalar(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dataset(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_preserves_row_order() {
        let file = write_dataset("title,genre,release_year\nB,y,2010\nA,x,2000\n");
        let catalog = Catalog::load(file.path(), "title").await.unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.records()[0].title, "B");
        assert_eq!(catalog.records()[1].title, "A");
    }

    #[tokio::test]
    async fn test_load_parses_scalars() {
        let file = write_dataset("title,genre,release_year,profit\nHeat,crime,1995,93.4\n");
        let catalog = Catalog::load(file.path(), "title").await.unwrap();

        let record = &catalog.records()[0];
        assert_eq!(record.get("genre"), Some(&Value::String("crime".into())));
        assert_eq!(record.get("release_year"), Some(&Value::Number(1995.into())));
        assert_eq!(
            record.get("profit").and_then(Value::as_f64),
            Some(93.4)
        );
    }

    #[tokio::test]
    async fn test_load_empty_cell_is_null() {
        let file = write_dataset("title,genre\nHeat,\n");
        let catalog = Catalog::load(file.path(), "title").await.unwrap();

        assert_eq!(catalog.records()[0].get("genre"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let result = Catalog::load("/no/such/dataset.csv", "title").await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_title_column_is_malformed() {
        let file = write_dataset("name,genre\nHeat,crime\n");
        let result = Catalog::load(file.path(), "title").await;
        assert!(matches!(result, Err(CatalogError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_blank_title_is_malformed() {
        let file = write_dataset("title,genre\n  ,crime\n");
        let result = Catalog::load(file.path(), "title").await;
        assert!(matches!(result, Err(CatalogError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_duplicate_title_is_malformed() {
        let file = write_dataset("title,genre\nHeat,crime\nHeat,drama\n");
        let result = Catalog::load(file.path(), "title").await;
        assert!(matches!(result, Err(CatalogError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_embedding_texts_align_with_rows() {
        let file = write_dataset("title,genre\nA,x\nB,y\n");
        let catalog = Catalog::load(file.path(), "title").await.unwrap();

        assert_eq!(
            catalog.embedding_texts(),
            vec!["A. genre: x".to_string(), "B. genre: y".to_string()]
        );
    }
}
