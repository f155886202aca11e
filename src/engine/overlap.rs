// ==========================================
// 成衣排产系统 - 重叠检测
// ==========================================
// 职责: 候选订单落位到 (产线, 日期) 时，找出日期区间相交的已排订单
// 约定: 只读查询；工期按产线满产估算，允许偏保守的误报
// ==========================================

use crate::domain::calendar::DateRange;
use crate::domain::line::ProductionLine;
use crate::domain::order::Order;
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;

pub struct OverlapDetector;

impl OverlapDetector {
    pub fn new() -> Self {
        Self
    }

    /// 估算工期（天）= ceil(订单数量 / 产线日产能)，至少 1 天
    pub fn estimate_duration_days(order: &Order, line: &ProductionLine) -> u64 {
        if line.capacity == 0 {
            return 1;
        }
        let days = (order.order_quantity as u64).div_ceil(line.capacity as u64);
        days.max(1)
    }

    /// 候选订单的估算区间 [target, target + 工期 - 1]
    ///
    /// # 错误
    /// - InvalidInput: 估算结束日超出可表示的日期范围
    pub fn estimate_range(
        order: &Order,
        line: &ProductionLine,
        target_date: NaiveDate,
    ) -> EngineResult<DateRange> {
        let days = Self::estimate_duration_days(order, line);
        DateRange::from_duration(target_date, days).ok_or_else(|| {
            EngineError::InvalidInput(format!(
                "订单 {} 估算工期 {} 天，自 {} 起超出日期范围",
                order.po_number, days, target_date
            ))
        })
    }

    /// 查找与候选订单估算区间相交的已排订单
    ///
    /// # 返回
    /// 按原计划开始日升序排列的重叠订单（不含候选订单自身）
    pub fn find_overlaps(
        &self,
        candidate: &Order,
        line_id: &str,
        target_date: NaiveDate,
        orders: &[Order],
        lines: &[ProductionLine],
    ) -> EngineResult<Vec<Order>> {
        let line = lines
            .iter()
            .find(|l| l.id == line_id)
            .ok_or_else(|| EngineError::LineNotFound(line_id.to_string()))?;

        let candidate_range = Self::estimate_range(candidate, line, target_date)?;

        let mut overlapping: Vec<Order> = orders
            .iter()
            .filter(|o| o.id != candidate.id && o.is_on_line(line_id))
            .filter(|o| {
                o.date_range()
                    .map(|range| candidate_range.intersects(&range))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        overlapping.sort_by(|a, b| {
            a.plan_start_date
                .cmp(&b.plan_start_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        tracing::debug!(
            "重叠检测: order_id={}, line_id={}, 估算区间={}, 重叠 {} 单",
            candidate.id,
            line_id,
            candidate_range,
            overlapping.len()
        );

        Ok(overlapping)
    }
}

impl Default for OverlapDetector {
    fn default() -> Self {
        Self::new()
    }
}
