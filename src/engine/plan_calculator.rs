// ==========================================
// 成衣排产系统 - 日产量计划计算引擎
// ==========================================
// 红线: 单元格排产量 + 其他订单排产量 <= 产线日产能
// 红线: 节假日不排产，且不推进爬坡工作日序号
// ==========================================
// 输入: 订单 + 产线 + 起始日 + 排产方法 (+ 爬坡计划 / 首日上限)
// 输出: 连续的 日期 -> 产量 计划
// ==========================================

use crate::config::SchedulingConfig;
use crate::domain::calendar::HolidayCalendar;
use crate::domain::line::ProductionLine;
use crate::domain::order::{DailyPlan, Order};
use crate::domain::rampup::RampUpPlan;
use crate::domain::types::PlanningMethod;
use crate::engine::capacity::used_capacity_excluding;
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

/// 浮点下取整容差（避免 431.9999999 之类的误差）
const FLOOR_EPSILON: f64 = 1e-9;

// ==========================================
// PlanRequest - 计算请求
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct PlanRequest<'a> {
    pub order: &'a Order,
    pub line: &'a ProductionLine,
    pub start_date: NaiveDate,
    pub method: PlanningMethod,
    pub ramp_up: Option<&'a RampUpPlan>,
    /// 首日产能上限（仅作用于起始日，用于补满被其他订单部分占用的当日）
    pub first_day_ceiling: Option<u32>,
}

impl<'a> PlanRequest<'a> {
    /// 产能法请求
    pub fn capacity(order: &'a Order, line: &'a ProductionLine, start_date: NaiveDate) -> Self {
        Self {
            order,
            line,
            start_date,
            method: PlanningMethod::Capacity,
            ramp_up: None,
            first_day_ceiling: None,
        }
    }

    /// 爬坡法请求
    pub fn ramp_up(
        order: &'a Order,
        line: &'a ProductionLine,
        start_date: NaiveDate,
        plan: &'a RampUpPlan,
    ) -> Self {
        Self {
            order,
            line,
            start_date,
            method: PlanningMethod::Rampup,
            ramp_up: Some(plan),
            first_day_ceiling: None,
        }
    }

    pub fn with_first_day_ceiling(mut self, ceiling: Option<u32>) -> Self {
        self.first_day_ceiling = ceiling;
        self
    }
}

// ==========================================
// PlanOutcome - 计算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome {
    pub order_id: String,
    pub line_id: String,
    pub requested_start: NaiveDate,
    pub daily_plan: DailyPlan,
    pub allocated: u32,
    pub requested: u32,
    pub days_iterated: u32,
}

impl PlanOutcome {
    /// 首个排产日
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.daily_plan.keys().next().copied()
    }

    /// 末个排产日（计划中最大的日期键）
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.daily_plan.keys().next_back().copied()
    }

    /// 是否完整排入订单数量
    pub fn is_complete(&self) -> bool {
        self.allocated == self.requested
    }

    pub fn shortfall(&self) -> u32 {
        self.requested.saturating_sub(self.allocated)
    }

    /// 未完整排入时转换为 PlanningExhausted 错误
    pub fn ensure_complete(&self) -> EngineResult<()> {
        if self.is_complete() {
            return Ok(());
        }
        Err(EngineError::PlanningExhausted {
            order_id: self.order_id.clone(),
            start_date: self.requested_start,
            days: self.days_iterated,
            allocated: self.allocated,
            requested: self.requested,
        })
    }
}

// ==========================================
// ProductionPlanCalculator - 日产量计划计算器
// ==========================================
pub struct ProductionPlanCalculator {
    config: SchedulingConfig,
}

impl ProductionPlanCalculator {
    pub fn new(config: SchedulingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// 爬坡法基准日产量 = 班次分钟 / SMV * MO 数
    pub fn base_daily_output(&self, order: &Order) -> f64 {
        if order.smv <= 0.0 {
            return 0.0;
        }
        (self.config.shift_minutes as f64 / order.smv) * order.mo_count as f64
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算订单的日产量计划
    ///
    /// 规则:
    /// 1) 自起始日逐个自然日迭代，节假日跳过
    /// 2) 产能法: 当日 = min(剩余, 剩余产能)
    /// 3) 爬坡法: 当日 = min(剩余, 剩余产能, floor(基准产量 * 效率 / 100))
    /// 4) 首日上限只作用于起始日，实际上限为 min(首日上限, 剩余产能)
    /// 5) 迭代超过 max_plan_days 仍未排完 → 记录错误并返回部分计划
    ///
    /// # 参数
    /// - `request`: 计算请求
    /// - `calendar`: 节假日日历
    /// - `orders`: 当前快照中的订单（与请求订单同 id 的记录不占用产能）
    ///
    /// # 返回
    /// - `Ok(PlanOutcome)`: 计划（可能不完整，调用方须检查 `is_complete`）
    /// - `Err`: 输入非法
    #[instrument(skip(self, request, calendar, orders), fields(
        order_id = %request.order.id,
        line_id = %request.line.id,
        start_date = %request.start_date,
        method = %request.method
    ))]
    pub fn calculate(
        &self,
        request: &PlanRequest<'_>,
        calendar: &HolidayCalendar,
        orders: &[Order],
    ) -> EngineResult<PlanOutcome> {
        let order = request.order;
        let line = request.line;

        order.validate_quantity()?;
        line.validate()?;

        let ramp_up = match request.method {
            PlanningMethod::Capacity => None,
            PlanningMethod::Rampup => {
                let plan = request.ramp_up.ok_or_else(|| {
                    EngineError::InvalidInput(format!(
                        "订单 {} 使用爬坡法但未指定爬坡计划",
                        order.id
                    ))
                })?;
                if !(order.smv.is_finite() && order.smv > 0.0) {
                    return Err(EngineError::InvalidInput(format!(
                        "订单 {} 的 SMV 必须大于 0 (实际 {})",
                        order.id, order.smv
                    )));
                }
                if order.mo_count == 0 {
                    return Err(EngineError::InvalidInput(format!(
                        "订单 {} 的 MO 数必须大于 0",
                        order.id
                    )));
                }
                Some(plan)
            }
        };
        let base_output = self.base_daily_output(order);

        let mut daily_plan = DailyPlan::new();
        let mut remaining = order.order_quantity;
        let mut working_day: u32 = 0;
        let mut days_iterated: u32 = 0;
        let mut date = request.start_date;

        while remaining > 0 && days_iterated < self.config.max_plan_days {
            days_iterated += 1;
            let is_first_day = date == request.start_date;

            if calendar.is_holiday(date) {
                if is_first_day && request.first_day_ceiling.is_some() {
                    tracing::debug!("起始日 {} 为节假日，首日上限不生效", date);
                }
                date = next_day(date)?;
                continue;
            }
            working_day += 1;

            let used = used_capacity_excluding(&line.id, date, orders, &order.id);
            let available = line.capacity.saturating_sub(used);

            let mut ceiling = available;
            if is_first_day {
                if let Some(first_day_ceiling) = request.first_day_ceiling {
                    ceiling = first_day_ceiling.min(available);
                }
            }

            let mut quantity = remaining.min(ceiling);
            if let Some(plan) = ramp_up {
                let efficiency = plan.efficiency_for_day(working_day);
                let ramp_output = (base_output * efficiency / 100.0 + FLOOR_EPSILON).floor();
                // 基准产量溢出为 +inf 时按产能约束
                let ramp_output = if ramp_output > 0.0 {
                    ramp_output.min(u32::MAX as f64) as u32
                } else {
                    0
                };
                quantity = quantity.min(ramp_output);
            }

            if quantity > 0 {
                daily_plan.insert(date, quantity);
                remaining -= quantity;
            }

            date = next_day(date)?;
        }

        let outcome = PlanOutcome {
            order_id: order.id.clone(),
            line_id: line.id.clone(),
            requested_start: request.start_date,
            allocated: order.order_quantity - remaining,
            requested: order.order_quantity,
            daily_plan,
            days_iterated,
        };

        if remaining > 0 {
            tracing::error!(
                "排产计算超出安全上限: order_id={}, line_id={}, 已迭代 {} 天, 已排 {}/{} 件",
                order.id,
                line.id,
                days_iterated,
                outcome.allocated,
                outcome.requested
            );
        } else {
            tracing::debug!(
                "排产计算完成: order_id={}, {} ~ {:?}, 共 {} 个排产日",
                order.id,
                request.start_date,
                outcome.end_date(),
                outcome.daily_plan.len()
            );
        }

        Ok(outcome)
    }
}

impl Default for ProductionPlanCalculator {
    fn default() -> Self {
        Self::new(SchedulingConfig::default())
    }
}

fn next_day(date: NaiveDate) -> EngineResult<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| EngineError::InvalidInput(format!("日期超出范围: {}", date)))
}
