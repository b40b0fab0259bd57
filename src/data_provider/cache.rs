//! 單次回測持有的原始數據快取
//!
//! 表格在鎖定快照時從提供者加載並按快照邊界截斷，運行結束後即被釋放，
//! 不在不同回測之間共享。

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain_types::{EntityId, FundamentalRecord, PriceRecord};

/// 價格表
#[derive(Debug, Clone)]
pub struct PriceTable {
    /// 按 (entity_id, date) 排序
    records: Vec<PriceRecord>,
    /// 已排序且去重的交易日
    calendar: Vec<NaiveDate>,
    /// 每個實體的有效日收益
    returns: BTreeMap<EntityId, BTreeMap<NaiveDate, f64>>,
    date_range_end: NaiveDate,
}

impl PriceTable {
    /// 以快照邊界建立價格表，邊界之後的記錄會被丟棄
    pub fn new(mut records: Vec<PriceRecord>, date_range_end: NaiveDate) -> Self {
        records.retain(|r| r.date <= date_range_end);
        records.sort_by(PriceRecord::cmp_key);
        records.dedup_by(|a, b| a.entity_id == b.entity_id && a.date == b.date);

        let mut calendar: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        calendar.sort_unstable();
        calendar.dedup();

        let mut returns: BTreeMap<EntityId, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
        for record in &records {
            // 非有限值的收益視為缺失觀測
            if record.ret.is_finite() {
                returns
                    .entry(record.entity_id.clone())
                    .or_default()
                    .insert(record.date, record.ret);
            }
        }

        Self {
            records,
            calendar,
            returns,
            date_range_end,
        }
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn calendar(&self) -> &[NaiveDate] {
        &self.calendar
    }

    pub fn date_range_end(&self) -> NaiveDate {
        self.date_range_end
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 實體在某日的收益觀測
    pub fn return_on(&self, entity_id: &str, date: NaiveDate) -> Option<f64> {
        self.returns.get(entity_id)?.get(&date).copied()
    }

    /// 每個實體的收益序列，按實體排序
    pub fn entity_returns(&self) -> impl Iterator<Item = (&EntityId, &BTreeMap<NaiveDate, f64>)> {
        self.returns.iter()
    }

    /// 某日有收益觀測的實體數
    pub fn universe_size(&self, date: NaiveDate) -> usize {
        self.returns
            .values()
            .filter(|series| series.contains_key(&date))
            .count()
    }

    /// `date` 之後（不含）的交易日
    pub fn dates_after(&self, date: NaiveDate) -> &[NaiveDate] {
        let idx = self.calendar.partition_point(|d| *d <= date);
        &self.calendar[idx..]
    }
}

/// 基本面表
#[derive(Debug, Clone)]
pub struct FundamentalTable {
    /// 按 (entity_id, filing_date) 排序
    records: Vec<FundamentalRecord>,
    date_range_end: NaiveDate,
}

impl FundamentalTable {
    pub fn new(mut records: Vec<FundamentalRecord>, date_range_end: NaiveDate) -> Self {
        records.retain(|r| r.filing_date <= date_range_end);
        records.sort_by(FundamentalRecord::cmp_key);

        Self {
            records,
            date_range_end,
        }
    }

    pub fn records(&self) -> &[FundamentalRecord] {
        &self.records
    }

    pub fn date_range_end(&self) -> NaiveDate {
        self.date_range_end
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_price_table_bounds_and_calendar() {
        let table = PriceTable::new(
            vec![
                PriceRecord::new("B", day(3), 0.02, 1.0, 1.0),
                PriceRecord::new("A", day(2), 0.01, 1.0, 1.0),
                PriceRecord::new("A", day(3), f64::NAN, 1.0, 1.0),
                PriceRecord::new("A", day(5), 0.01, 1.0, 1.0),
                PriceRecord::new("A", day(9), 0.01, 1.0, 1.0),
            ],
            day(5),
        );

        assert_eq!(table.len(), 4);
        assert_eq!(table.calendar(), &[day(2), day(3), day(5)]);
        assert_eq!(table.records()[0].entity_id, "A");
        assert_eq!(table.return_on("A", day(2)), Some(0.01));
        assert_eq!(table.return_on("A", day(3)), None);
        assert_eq!(table.universe_size(day(3)), 1);
        assert_eq!(table.dates_after(day(2)), &[day(3), day(5)]);
        assert!(table.dates_after(day(5)).is_empty());
        assert_eq!(table.dates_after(day(1)).len(), 3);
    }

    #[test]
    fn test_duplicate_rows_are_collapsed() {
        let table = PriceTable::new(
            vec![
                PriceRecord::new("A", day(2), 0.01, 1.0, 1.0),
                PriceRecord::new("A", day(2), 0.01, 1.0, 1.0),
            ],
            day(31),
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_fundamental_table_sorted() {
        let table = FundamentalTable::new(
            vec![
                FundamentalRecord::new("B", day(1)),
                FundamentalRecord::new("A", day(4)),
                FundamentalRecord::new("A", day(2)),
                FundamentalRecord::new("A", day(20)),
            ],
            day(10),
        );

        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[0].filing_date, day(2));
        assert_eq!(table.records()[2].entity_id, "B");
    }
}
