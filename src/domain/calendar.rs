// ==========================================
// 成衣排产系统 - 日历领域模型
// ==========================================
// 职责: 节假日集合、闭区间日期范围
// 约定: 所有比较按自然日，忽略时分秒
// ==========================================

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ==========================================
// Holiday - 非工作日
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

impl Holiday {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            description: None,
        }
    }
}

// ==========================================
// HolidayCalendar - 节假日日历（只读）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_holidays(holidays: &[Holiday]) -> Self {
        Self {
            dates: holidays.iter().map(|h| h.date).collect(),
        }
    }

    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// 是否节假日
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// 是否节假日（带时刻输入，仅取日期部分）
    pub fn is_holiday_at(&self, at: NaiveDateTime) -> bool {
        self.is_holiday(at.date())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ==========================================
// DateRange - 闭区间 [start, end]
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// 从起始日开始、持续 days 天（至少 1 天）
    ///
    /// # 返回
    /// - None: 结束日超出可表示的日期范围
    pub fn from_duration(start: NaiveDate, days: u64) -> Option<Self> {
        let end = start.checked_add_days(Days::new(days.max(1) - 1))?;
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 闭区间相交判定
    pub fn intersects(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} ~ {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn test_is_holiday_ignores_time_of_day() {
        let calendar = HolidayCalendar::from_holidays(&[Holiday::new(d(10))]);
        assert!(calendar.is_holiday(d(10)));
        assert!(!calendar.is_holiday(d(11)));

        let evening = d(10).and_hms_opt(23, 30, 0).unwrap();
        assert!(calendar.is_holiday_at(evening));
    }

    #[test]
    fn test_range_intersection_is_inclusive_and_symmetric() {
        let a = DateRange::new(d(5), d(10));
        let b = DateRange::new(d(10), d(12));
        let c = DateRange::new(d(11), d(12));

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(!c.intersects(&a));
    }

    #[test]
    fn test_from_duration() {
        let r = DateRange::from_duration(d(7), 2).unwrap();
        assert_eq!(r.end, d(8));
        assert_eq!(r.days(), 2);

        // 0 天按 1 天处理
        let r = DateRange::from_duration(d(7), 0).unwrap();
        assert_eq!(r.end, d(7));
    }

    #[test]
    fn test_from_duration_beyond_calendar() {
        assert!(DateRange::from_duration(d(7), 4_000_000_000).is_none());
        assert!(DateRange::from_duration(NaiveDate::MAX, 2).is_none());
        assert_eq!(
            DateRange::from_duration(NaiveDate::MAX, 1).map(|r| r.end),
            Some(NaiveDate::MAX)
        );
    }
}
