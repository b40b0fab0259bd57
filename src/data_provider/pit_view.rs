//! 時點數據視圖
//!
//! 兩道防洩漏關卡：價格只返回 `date <= as_of` 的記錄；基本面另外要求
//! `filing_date + filing_lag_days <= as_of`。任何超出快照邊界的查詢都會失敗，
//! 而不是靜默返回截斷的數據。

use chrono::{Duration, NaiveDate};

use super::cache::{FundamentalTable, PriceTable};
use super::error::PitViolationError;
use crate::domain_types::{DatasetKind, FundamentalRecord, PriceRecord};

/// 綁定到已鎖定快照的只讀視圖
#[derive(Debug, Clone, Copy)]
pub struct PitDataView<'a> {
    prices: &'a PriceTable,
    fundamentals: Option<&'a FundamentalTable>,
    filing_lag: Duration,
}

impl<'a> PitDataView<'a> {
    pub fn new(
        prices: &'a PriceTable,
        fundamentals: Option<&'a FundamentalTable>,
        filing_lag_days: i64,
    ) -> Self {
        Self {
            prices,
            fundamentals,
            // 超出可表示範圍的滯後期等同於永不可見
            filing_lag: Duration::try_days(filing_lag_days).unwrap_or(Duration::MAX),
        }
    }

    /// `as_of` 時可見的價格記錄，按 (entity_id, date) 排序
    pub fn prices_as_of(&self, as_of: NaiveDate) -> Result<Vec<PriceRecord>, PitViolationError> {
        check_bound(DatasetKind::Prices, self.prices.date_range_end(), as_of)?;

        Ok(self
            .prices
            .records()
            .iter()
            .filter(|r| r.date <= as_of)
            .cloned()
            .collect())
    }

    /// `as_of` 時已過申報滯後期的基本面記錄
    pub fn fundamentals_as_of(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<FundamentalRecord>, PitViolationError> {
        let table = self
            .fundamentals
            .ok_or(PitViolationError::DatasetNotInSnapshot(DatasetKind::Fundamentals))?;
        check_bound(DatasetKind::Fundamentals, table.date_range_end(), as_of)?;

        Ok(table
            .records()
            .iter()
            .filter(|r| self.is_filing_visible(r.filing_date, as_of))
            .cloned()
            .collect())
    }

    /// 申報日加滯後期不晚於 `as_of` 時可見
    pub fn is_filing_visible(&self, filing_date: NaiveDate, as_of: NaiveDate) -> bool {
        filing_date
            .checked_add_signed(self.filing_lag)
            .map_or(false, |visible_from| visible_from <= as_of)
    }

    pub fn has_fundamentals(&self) -> bool {
        self.fundamentals.is_some()
    }

    pub fn price_table(&self) -> &'a PriceTable {
        self.prices
    }
}

fn check_bound(
    dataset: DatasetKind,
    date_range_end: NaiveDate,
    requested: NaiveDate,
) -> Result<(), PitViolationError> {
    if requested > date_range_end {
        return Err(PitViolationError::BeyondSnapshot {
            dataset,
            requested,
            date_range_end,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn tables() -> (PriceTable, FundamentalTable) {
        let prices = PriceTable::new(
            vec![
                PriceRecord::new("A", date(1, 2), 0.01, 10.0, 1.0),
                PriceRecord::new("A", date(1, 3), 0.01, 10.1, 1.0),
                PriceRecord::new("B", date(1, 3), 0.02, 5.0, 2.0),
                PriceRecord::new("B", date(1, 4), 0.02, 5.1, 2.0),
            ],
            date(1, 4),
        );
        let fundamentals = FundamentalTable::new(
            vec![
                FundamentalRecord::new("A", date(1, 1)).with_metric("book_value", 1.0),
                FundamentalRecord::new("B", date(2, 1)).with_metric("book_value", 2.0),
            ],
            date(4, 30),
        );
        (prices, fundamentals)
    }

    #[test]
    fn test_prices_exclude_future_rows() {
        let (prices, fundamentals) = tables();
        let view = PitDataView::new(&prices, Some(&fundamentals), 90);

        let rows = view.prices_as_of(date(1, 3)).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.date <= date(1, 3)));

        assert!(matches!(
            view.prices_as_of(date(1, 5)),
            Err(PitViolationError::BeyondSnapshot { dataset: DatasetKind::Prices, .. })
        ));
    }

    #[test]
    fn test_fundamentals_respect_filing_lag() {
        let (prices, fundamentals) = tables();
        let view = PitDataView::new(&prices, Some(&fundamentals), 90);

        // 2024-01-01 + 90 天 = 2024-03-31
        assert!(view.fundamentals_as_of(date(3, 30)).unwrap().is_empty());
        let visible = view.fundamentals_as_of(date(3, 31)).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].entity_id, "A");
    }

    #[test]
    fn test_unrepresentable_lag_hides_all_filings() {
        let (prices, fundamentals) = tables();
        let view = PitDataView::new(&prices, Some(&fundamentals), i64::MAX);

        assert!(view.has_fundamentals());
        assert!(view.fundamentals_as_of(date(4, 30)).unwrap().is_empty());
    }

    #[test]
    fn test_missing_fundamentals_dataset() {
        let (prices, _) = tables();
        let view = PitDataView::new(&prices, None, 90);
        assert!(!view.has_fundamentals());
        assert_eq!(
            view.fundamentals_as_of(date(1, 3)),
            Err(PitViolationError::DatasetNotInSnapshot(DatasetKind::Fundamentals))
        );
    }
}
