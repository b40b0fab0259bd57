use chrono::NaiveDate;

use super::error::DataProviderResult;
use crate::domain_types::{DatasetKind, FundamentalRecord, PriceRecord};

/// 原始數據提供者特性 - 回測引擎的外部協作者
///
/// 實現只需支持按截止日期批量加載；時點過濾由引擎負責。
pub trait RawDataProvider: Send + Sync {
    /// 加載所有 `date <= until` 的價格記錄
    fn load_prices(&self, until: NaiveDate) -> DataProviderResult<Vec<PriceRecord>>;

    /// 加載所有 `filing_date <= until` 的基本面記錄
    fn load_fundamentals(&self, until: NaiveDate) -> DataProviderResult<Vec<FundamentalRecord>>;

    /// 數據集中最後一筆記錄的日期
    fn latest_date(&self, kind: DatasetKind) -> DataProviderResult<Option<NaiveDate>>;
}

/// 內存數據提供者
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataProvider {
    prices: Vec<PriceRecord>,
    fundamentals: Vec<FundamentalRecord>,
}

impl InMemoryDataProvider {
    pub fn new(prices: Vec<PriceRecord>, fundamentals: Vec<FundamentalRecord>) -> Self {
        Self {
            prices,
            fundamentals,
        }
    }

    pub fn with_prices(prices: Vec<PriceRecord>) -> Self {
        Self::new(prices, Vec::new())
    }
}

impl RawDataProvider for InMemoryDataProvider {
    fn load_prices(&self, until: NaiveDate) -> DataProviderResult<Vec<PriceRecord>> {
        Ok(self
            .prices
            .iter()
            .filter(|r| r.date <= until)
            .cloned()
            .collect())
    }

    fn load_fundamentals(&self, until: NaiveDate) -> DataProviderResult<Vec<FundamentalRecord>> {
        Ok(self
            .fundamentals
            .iter()
            .filter(|r| r.filing_date <= until)
            .cloned()
            .collect())
    }

    fn latest_date(&self, kind: DatasetKind) -> DataProviderResult<Option<NaiveDate>> {
        Ok(match kind {
            DatasetKind::Prices => self.prices.iter().map(|r| r.date).max(),
            DatasetKind::Fundamentals => self.fundamentals.iter().map(|r| r.filing_date).max(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_in_memory_provider_bounds() {
        let provider = InMemoryDataProvider::new(
            vec![
                PriceRecord::new("A", day(2), 0.01, 10.0, 1.0),
                PriceRecord::new("A", day(3), 0.01, 10.1, 1.0),
            ],
            vec![FundamentalRecord::new("A", day(1))],
        );

        assert_eq!(provider.load_prices(day(2)).unwrap().len(), 1);
        assert_eq!(provider.load_fundamentals(day(1)).unwrap().len(), 1);
        assert_eq!(
            provider.latest_date(DatasetKind::Prices).unwrap(),
            Some(day(3))
        );
        assert_eq!(
            InMemoryDataProvider::default()
                .latest_date(DatasetKind::Fundamentals)
                .unwrap(),
            None
        );
    }
}
