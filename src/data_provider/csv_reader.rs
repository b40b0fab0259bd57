//! CSV 檔案數據提供者
//!
//! 價格檔案欄位：`entity_id,date,return,price,shares_outstanding`。
//! 基本面檔案為寬表：`entity_id,filing_date` 之外的每一欄都是一個指標，
//! 空白儲存格表示該指標缺失。

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::{DataProviderError, DataProviderResult};
use super::loader::RawDataProvider;
use crate::domain_types::{DatasetKind, FundamentalRecord, PriceRecord};

const ENTITY_COLUMN: &str = "entity_id";
const FILING_DATE_COLUMN: &str = "filing_date";

/// CSV 數據提供者
#[derive(Debug, Clone)]
pub struct CsvDataProvider {
    prices_path: PathBuf,
    fundamentals_path: Option<PathBuf>,
}

impl CsvDataProvider {
    /// 創建只有價格數據的提供者
    pub fn new(prices_path: impl Into<PathBuf>) -> Self {
        Self {
            prices_path: prices_path.into(),
            fundamentals_path: None,
        }
    }

    /// 設定基本面檔案
    pub fn with_fundamentals(mut self, path: impl Into<PathBuf>) -> Self {
        self.fundamentals_path = Some(path.into());
        self
    }

    fn open(&self, path: &Path) -> DataProviderResult<csv::Reader<std::fs::File>> {
        if !path.exists() {
            return Err(DataProviderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("檔案不存在: {}", path.display()),
            )));
        }

        Ok(ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .trim(csv::Trim::All)
            .from_path(path)?)
    }

    fn read_prices(&self) -> DataProviderResult<Vec<PriceRecord>> {
        let mut reader = self.open(&self.prices_path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize::<PriceRecord>() {
            rows.push(record?);
        }
        debug!(
            "從 {} 讀取 {} 筆價格記錄",
            self.prices_path.display(),
            rows.len()
        );
        Ok(rows)
    }

    fn read_fundamentals(&self) -> DataProviderResult<Vec<FundamentalRecord>> {
        let Some(path) = &self.fundamentals_path else {
            return Ok(Vec::new());
        };

        let mut reader = self.open(path)?;
        let headers = reader.headers()?.clone();
        let entity_idx = column_index(&headers, ENTITY_COLUMN)?;
        let filing_idx = column_index(&headers, FILING_DATE_COLUMN)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(parse_fundamental(&headers, &record, entity_idx, filing_idx)?);
        }
        debug!("從 {} 讀取 {} 筆基本面記錄", path.display(), rows.len());
        Ok(rows)
    }
}

fn column_index(headers: &StringRecord, name: &str) -> DataProviderResult<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| DataProviderError::MissingColumn(name.to_string()))
}

fn parse_fundamental(
    headers: &StringRecord,
    record: &StringRecord,
    entity_idx: usize,
    filing_idx: usize,
) -> DataProviderResult<FundamentalRecord> {
    let entity_id = record.get(entity_idx).unwrap_or_default();
    let raw_date = record.get(filing_idx).unwrap_or_default();
    let filing_date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
        DataProviderError::InvalidValue {
            column: FILING_DATE_COLUMN.to_string(),
            value: raw_date.to_string(),
            reason: e.to_string(),
        }
    })?;

    let mut row = FundamentalRecord::new(entity_id, filing_date);
    for (idx, (name, cell)) in headers.iter().zip(record.iter()).enumerate() {
        if idx == entity_idx || idx == filing_idx || cell.is_empty() {
            continue;
        }
        let value = cell
            .parse::<f64>()
            .map_err(|e| DataProviderError::InvalidValue {
                column: name.to_string(),
                value: cell.to_string(),
                reason: e.to_string(),
            })?;
        row.metrics.insert(name.to_string(), value);
    }

    Ok(row)
}

impl RawDataProvider for CsvDataProvider {
    fn load_prices(&self, until: NaiveDate) -> DataProviderResult<Vec<PriceRecord>> {
        let mut rows = self.read_prices()?;
        rows.retain(|r| r.date <= until);
        Ok(rows)
    }

    fn load_fundamentals(&self, until: NaiveDate) -> DataProviderResult<Vec<FundamentalRecord>> {
        let mut rows = self.read_fundamentals()?;
        rows.retain(|r| r.filing_date <= until);
        Ok(rows)
    }

    fn latest_date(&self, kind: DatasetKind) -> DataProviderResult<Option<NaiveDate>> {
        Ok(match kind {
            DatasetKind::Prices => self.read_prices()?.iter().map(|r| r.date).max(),
            DatasetKind::Fundamentals => self
                .read_fundamentals()?
                .iter()
                .map(|r| r.filing_date)
                .max(),
        })
    }
}
