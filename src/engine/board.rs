// ==========================================
// 成衣排产系统 - 排产看板视图
// ==========================================
// 职责: 按 (产线 × 日期) 汇总已排产量，检查产能红线
// 约定: 只读快照，输出可序列化视图
// ==========================================

use crate::domain::calendar::{DateRange, HolidayCalendar};
use crate::domain::capacity::{CapacityConstraint, LineDayCapacity};
use crate::domain::line::ProductionLine;
use crate::domain::snapshot::ScheduleSnapshot;
use crate::engine::capacity::{line_day_capacity, orders_for_cell, used_capacity};
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// 单元格内的订单
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellOrder {
    pub order_id: String,
    pub po_number: String,
    pub quantity: u32,
}

/// 看板单元格（一条产线的一天）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardCell {
    pub date: NaiveDate,
    pub holiday: bool,
    pub capacity: u32,
    pub used: u32,
    pub available: u32,
    pub orders: Vec<CellOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardRow {
    pub line_id: String,
    pub line_name: String,
    pub capacity: u32,
    pub cells: Vec<BoardCell>,
}

/// 看板视图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub window: DateRange,
    pub rows: Vec<BoardRow>,
}

impl BoardView {
    pub fn row(&self, line_id: &str) -> Option<&BoardRow> {
        self.rows.iter().find(|r| r.line_id == line_id)
    }

    pub fn cell(&self, line_id: &str, date: NaiveDate) -> Option<&BoardCell> {
        self.row(line_id)?.cells.iter().find(|c| c.date == date)
    }
}

/// 产能红线违规记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityViolation {
    pub line_id: String,
    pub date: NaiveDate,
    pub capacity: u32,
    pub used: u32,
}

impl CapacityViolation {
    pub fn overflow(&self) -> u32 {
        self.used.saturating_sub(self.capacity)
    }
}

// ==========================================
// BoardBuilder
// ==========================================
pub struct BoardBuilder<'a> {
    snapshot: &'a ScheduleSnapshot,
    calendar: HolidayCalendar,
}

impl<'a> BoardBuilder<'a> {
    pub fn new(snapshot: &'a ScheduleSnapshot) -> Self {
        Self {
            snapshot,
            calendar: snapshot.calendar(),
        }
    }

    /// 构建 [start, start + days - 1] 窗口的看板
    pub fn build(&self, start: NaiveDate, days: u32) -> EngineResult<BoardView> {
        if days == 0 {
            return Err(EngineError::InvalidInput("看板窗口天数必须大于 0".to_string()));
        }
        let window = DateRange::from_duration(start, u64::from(days)).ok_or_else(|| {
            EngineError::InvalidInput(format!("看板窗口 {} 天，自 {} 起超出日期范围", days, start))
        })?;
        let rows = self
            .snapshot
            .lines
            .iter()
            .map(|line| self.build_row(line, &window))
            .collect();

        Ok(BoardView { window, rows })
    }

    fn build_row(&self, line: &ProductionLine, window: &DateRange) -> BoardRow {
        let cells = std::iter::successors(Some(window.start), |d| d.succ_opt())
            .take_while(|date| *date <= window.end)
            .map(|date| self.build_cell(line, date))
            .collect();

        BoardRow {
            line_id: line.id.clone(),
            line_name: line.display_name().to_string(),
            capacity: line.capacity,
            cells,
        }
    }

    fn build_cell(&self, line: &ProductionLine, date: NaiveDate) -> BoardCell {
        let cell = line_day_capacity(line, date, &self.snapshot.orders);
        let orders = orders_for_cell(&line.id, date, &self.snapshot.orders)
            .into_iter()
            .map(|o| CellOrder {
                order_id: o.id.clone(),
                po_number: o.po_number.clone(),
                quantity: o.production_on(date),
            })
            .collect();

        BoardCell {
            date,
            holiday: self.calendar.is_holiday(date),
            capacity: cell.capacity,
            used: cell.used,
            available: cell.remaining_capacity(),
            orders,
        }
    }
}

/// 检查全部已排单元格的产能红线
///
/// # 返回
/// 按 (产线, 日期) 排序的超产单元格；为空表示快照满足产能约束
pub fn check_capacity(snapshot: &ScheduleSnapshot) -> Vec<CapacityViolation> {
    let mut cells: BTreeSet<(String, NaiveDate)> = BTreeSet::new();
    for order in snapshot.orders.iter().filter(|o| o.is_scheduled()) {
        if let Some(line_id) = &order.assigned_line_id {
            for (date, qty) in &order.actual_production {
                if *qty > 0 {
                    cells.insert((line_id.clone(), *date));
                }
            }
        }
    }

    let violations: Vec<CapacityViolation> = cells
        .into_iter()
        .filter_map(|(line_id, date)| {
            // 产线缺失时按 0 产能处理
            let capacity = snapshot.find_line(&line_id).map(|l| l.capacity).unwrap_or(0);
            let used = used_capacity(&line_id, date, &snapshot.orders);
            let cell = LineDayCapacity::new(&line_id, date, capacity, used);
            (cell.overflow() > 0).then_some(CapacityViolation {
                line_id,
                date,
                capacity,
                used,
            })
        })
        .collect();

    for v in &violations {
        tracing::warn!(
            "产能超限: 产线 {} 日期 {} 已排 {} / 产能 {}",
            v.line_id,
            v.date,
            v.used,
            v.capacity
        );
    }

    violations
}
