// ==========================================
// 成衣排产系统 - 产线日产能查询
// ==========================================
// 职责: 单元格（产线 × 日期）的订单、已用产能、剩余产能
// 红线: 剩余产能永不为负，排满返回 0
// ==========================================

use crate::domain::capacity::{CapacityConstraint, LineDayCapacity};
use crate::domain::line::ProductionLine;
use crate::domain::order::Order;
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;

/// 单元格内的订单：已排、同产线、当日产量 > 0
pub fn orders_for_cell<'a>(line_id: &str, date: NaiveDate, orders: &'a [Order]) -> Vec<&'a Order> {
    orders
        .iter()
        .filter(|o| o.is_on_line(line_id) && o.production_on(date) > 0)
        .collect()
}

/// 单元格已用产能
pub fn used_capacity(line_id: &str, date: NaiveDate, orders: &[Order]) -> u32 {
    orders_for_cell(line_id, date, orders)
        .iter()
        .map(|o| o.production_on(date))
        .sum()
}

/// 单元格已用产能（排除指定订单，用于订单自身改排）
pub fn used_capacity_excluding(
    line_id: &str,
    date: NaiveDate,
    orders: &[Order],
    exclude_order_id: &str,
) -> u32 {
    orders_for_cell(line_id, date, orders)
        .iter()
        .filter(|o| o.id != exclude_order_id)
        .map(|o| o.production_on(date))
        .sum()
}

/// 单元格产能视图
pub fn line_day_capacity(line: &ProductionLine, date: NaiveDate, orders: &[Order]) -> LineDayCapacity {
    LineDayCapacity::new(&line.id, date, line.capacity, used_capacity(&line.id, date, orders))
}

/// 单元格剩余产能 = max(0, 日产能 - 已用)
///
/// # 错误
/// - 产线不存在: `EngineError::LineNotFound`
pub fn available_capacity(
    line_id: &str,
    date: NaiveDate,
    orders: &[Order],
    lines: &[ProductionLine],
) -> EngineResult<u32> {
    let line = lines
        .iter()
        .find(|l| l.id == line_id)
        .ok_or_else(|| EngineError::LineNotFound(line_id.to_string()))?;
    Ok(line_day_capacity(line, date, orders).remaining_capacity())
}
