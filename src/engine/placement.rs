// ==========================================
// 成衣排产系统 - 落位决策与级联重排引擎
// ==========================================
// 红线: 有重叠时必须由人工选择落位策略，无默认值
// 红线: 整个级联在执行任何 I/O 之前全部算完，任一步排不完即整体拒绝
// ==========================================
// before: 重叠订单退回待排 → 新订单落位 → 重叠订单按原开始日顺序首尾相接重排
// after:  新订单排在重叠区块最晚完工日之后（先补满当日余量）
// ==========================================

use crate::config::SchedulingConfig;
use crate::domain::calendar::HolidayCalendar;
use crate::domain::line::ProductionLine;
use crate::domain::order::{DailyPlan, Order};
use crate::domain::rampup::RampUpPlan;
use crate::domain::snapshot::ScheduleSnapshot;
use crate::domain::types::{PlacementPolicy, PlanningMethod};
use crate::engine::capacity::{used_capacity, used_capacity_excluding};
use crate::engine::command::ScheduleCommand;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::overlap::OverlapDetector;
use crate::engine::plan_calculator::{PlanRequest, ProductionPlanCalculator};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

// ==========================================
// 请求与结果
// ==========================================

/// 落位请求（来自看板拖放）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub order_id: String,
    pub line_id: String,
    pub target_date: NaiveDate,
    #[serde(default)]
    pub method: PlanningMethod,
    #[serde(default)]
    pub ramp_up_plan_id: Option<String>,
}

impl PlacementRequest {
    pub fn new(order_id: &str, line_id: &str, target_date: NaiveDate) -> Self {
        Self {
            order_id: order_id.to_string(),
            line_id: line_id.to_string(),
            target_date,
            method: PlanningMethod::Capacity,
            ramp_up_plan_id: None,
        }
    }

    pub fn with_ramp_up(mut self, plan_id: &str) -> Self {
        self.method = PlanningMethod::Rampup;
        self.ramp_up_plan_id = Some(plan_id.to_string());
        self
    }
}

/// 单个订单的落位结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedPlacement {
    pub order_id: String,
    pub po_number: String,
    pub line_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_plan: DailyPlan,
    pub first_day_ceiling: Option<u32>,
    /// 计划完工晚于交期
    pub is_late: bool,
}

/// 完整落位方案（含待执行指令）
#[derive(Debug, Clone, Serialize)]
pub struct PlacementPlan {
    pub policy: Option<PlacementPolicy>,
    /// 新订单在前，随后为重排的被挤出订单
    pub placements: Vec<PlannedPlacement>,
    pub evicted_order_ids: Vec<String>,
    pub commands: Vec<ScheduleCommand>,
}

impl PlacementPlan {
    pub fn placement_of(&self, order_id: &str) -> Option<&PlannedPlacement> {
        self.placements.iter().find(|p| p.order_id == order_id)
    }
}

/// 落位决策
#[derive(Debug, Clone)]
pub enum PlacementOutcome {
    /// 已生成方案，可交给执行器
    Planned(PlacementPlan),
    /// 存在重叠，需人工选择 before/after
    PolicyRequired { overlapping: Vec<Order> },
}

// ==========================================
// PlacementResolver - 落位决策器
// ==========================================
pub struct PlacementResolver {
    calculator: ProductionPlanCalculator,
    detector: OverlapDetector,
}

/// 单次计算参数（内部使用）
struct PlanStep<'a> {
    order_id: &'a str,
    start_date: NaiveDate,
    method: PlanningMethod,
    ramp_up: Option<&'a RampUpPlan>,
    first_day_ceiling: Option<u32>,
}

impl PlacementResolver {
    pub fn new(config: SchedulingConfig) -> Self {
        Self {
            calculator: ProductionPlanCalculator::new(config),
            detector: OverlapDetector::new(),
        }
    }

    pub fn calculator(&self) -> &ProductionPlanCalculator {
        &self.calculator
    }

    pub fn detector(&self) -> &OverlapDetector {
        &self.detector
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 生成落位方案
    ///
    /// # 参数
    /// - `snapshot`: 当前快照（只读）
    /// - `request`: 拖放产生的 (订单, 产线, 日期)
    /// - `policy`: 人工选择的策略；无重叠时忽略
    ///
    /// # 返回
    /// - `Ok(Planned)`: 方案及按执行顺序排列的指令
    /// - `Ok(PolicyRequired)`: 有重叠但未选择策略（无副作用）
    /// - `Err`: 输入非法或任一步无法在安全上限内排完
    #[instrument(skip(self, snapshot), fields(
        order_id = %request.order_id,
        line_id = %request.line_id,
        target_date = %request.target_date
    ))]
    pub fn resolve(
        &self,
        snapshot: &ScheduleSnapshot,
        request: &PlacementRequest,
        policy: Option<PlacementPolicy>,
    ) -> EngineResult<PlacementOutcome> {
        let order = snapshot
            .find_order(&request.order_id)
            .ok_or_else(|| EngineError::OrderNotFound(request.order_id.clone()))?;
        let line = snapshot
            .find_line(&request.line_id)
            .ok_or_else(|| EngineError::LineNotFound(request.line_id.clone()))?;
        let ramp_up = self.resolve_ramp_up(snapshot, request)?;

        let overlapping = self.detector.find_overlaps(
            order,
            &line.id,
            request.target_date,
            &snapshot.orders,
            &snapshot.lines,
        )?;

        let calendar = snapshot.calendar();
        let mut board = snapshot.orders.clone();

        let plan = if overlapping.is_empty() {
            self.place_direct(&mut board, &calendar, line, request, ramp_up)?
        } else {
            match policy {
                None => {
                    tracing::info!(
                        "检测到 {} 个重叠订单，等待人工选择落位策略",
                        overlapping.len()
                    );
                    return Ok(PlacementOutcome::PolicyRequired { overlapping });
                }
                Some(PlacementPolicy::Before) => self.place_before(
                    &mut board,
                    &calendar,
                    line,
                    request,
                    ramp_up,
                    &overlapping,
                )?,
                Some(PlacementPolicy::After) => self.place_after(
                    &mut board,
                    &calendar,
                    line,
                    request,
                    ramp_up,
                    &overlapping,
                )?,
            }
        };

        tracing::info!(
            "落位方案生成: policy={}, 落位 {} 单, 退回重排 {} 单, 指令 {} 条",
            plan.policy.map(|p| p.as_str()).unwrap_or("direct"),
            plan.placements.len(),
            plan.evicted_order_ids.len(),
            plan.commands.len()
        );

        Ok(PlacementOutcome::Planned(plan))
    }

    fn resolve_ramp_up<'a>(
        &self,
        snapshot: &'a ScheduleSnapshot,
        request: &PlacementRequest,
    ) -> EngineResult<Option<&'a RampUpPlan>> {
        match request.method {
            PlanningMethod::Capacity => Ok(None),
            PlanningMethod::Rampup => {
                let plan_id = request.ramp_up_plan_id.as_deref().ok_or_else(|| {
                    EngineError::InvalidInput("爬坡法需要指定爬坡计划".to_string())
                })?;
                snapshot
                    .find_ramp_up_plan(plan_id)
                    .map(Some)
                    .ok_or_else(|| EngineError::RampUpPlanNotFound(plan_id.to_string()))
            }
        }
    }

    // ==========================================
    // 策略实现
    // ==========================================

    /// 无重叠：直接按请求落位
    fn place_direct(
        &self,
        board: &mut [Order],
        calendar: &HolidayCalendar,
        line: &ProductionLine,
        request: &PlacementRequest,
        ramp_up: Option<&RampUpPlan>,
    ) -> EngineResult<PlacementPlan> {
        let (placement, command) = self.plan_on_board(
            board,
            calendar,
            line,
            PlanStep {
                order_id: &request.order_id,
                start_date: request.target_date,
                method: request.method,
                ramp_up,
                first_day_ceiling: None,
            },
        )?;

        Ok(PlacementPlan {
            policy: None,
            placements: vec![placement],
            evicted_order_ids: Vec::new(),
            commands: vec![command],
        })
    }

    /// before: 挤出重叠订单并首尾相接重排
    fn place_before(
        &self,
        board: &mut [Order],
        calendar: &HolidayCalendar,
        line: &ProductionLine,
        request: &PlacementRequest,
        ramp_up: Option<&RampUpPlan>,
        overlapping: &[Order],
    ) -> EngineResult<PlacementPlan> {
        let mut commands = Vec::new();
        let mut placements = Vec::new();
        let mut evicted_order_ids = Vec::new();

        // 1. 重叠订单按原开始日升序退回待排
        for evicted in overlapping {
            commands.push(ScheduleCommand::MoveToPending {
                order: evicted.clone(),
            });
            if let Some(entry) = board.iter_mut().find(|o| o.id == evicted.id) {
                entry.clear_plan();
            }
            evicted_order_ids.push(evicted.id.clone());
        }

        // 2. 新订单落位到目标日
        let (new_placement, command) = self.plan_on_board(
            board,
            calendar,
            line,
            PlanStep {
                order_id: &request.order_id,
                start_date: request.target_date,
                method: request.method,
                ramp_up,
                first_day_ceiling: None,
            },
        )?;
        commands.push(command);

        // 3. 首个被挤出订单: 新订单完工日有余量则当日补满，否则次日开始
        let new_end = new_placement.end_date;
        let leftover = line
            .capacity
            .saturating_sub(used_capacity(&line.id, new_end, board));
        let (mut next_start, mut next_ceiling) = if leftover > 0 {
            (new_end, Some(leftover))
        } else {
            (next_day(new_end)?, None)
        };
        placements.push(new_placement);

        // 4. 其余被挤出订单依次接在前一单完工日之后
        for evicted in overlapping {
            let (placement, command) = self.plan_on_board(
                board,
                calendar,
                line,
                PlanStep {
                    order_id: &evicted.id,
                    start_date: next_start,
                    method: PlanningMethod::Capacity,
                    ramp_up: None,
                    first_day_ceiling: next_ceiling,
                },
            )?;
            tracing::debug!(
                "被挤出订单重排: {} → [{} ~ {}]",
                placement.po_number,
                placement.start_date,
                placement.end_date
            );
            next_start = next_day(placement.end_date)?;
            next_ceiling = None;
            commands.push(command);
            placements.push(placement);
        }

        Ok(PlacementPlan {
            policy: Some(PlacementPolicy::Before),
            placements,
            evicted_order_ids,
            commands,
        })
    }

    /// after: 排在重叠区块最晚完工日之后
    fn place_after(
        &self,
        board: &mut [Order],
        calendar: &HolidayCalendar,
        line: &ProductionLine,
        request: &PlacementRequest,
        ramp_up: Option<&RampUpPlan>,
        overlapping: &[Order],
    ) -> EngineResult<PlacementPlan> {
        let latest_end = overlapping
            .iter()
            .filter_map(|o| o.plan_end_date)
            .max()
            .unwrap_or(request.target_date);

        let remaining = line.capacity.saturating_sub(used_capacity_excluding(
            &line.id,
            latest_end,
            board,
            &request.order_id,
        ));

        let (start_date, first_day_ceiling) = if remaining > 0 && !calendar.is_holiday(latest_end) {
            (latest_end, Some(remaining))
        } else {
            (next_day(latest_end)?, None)
        };

        tracing::debug!(
            "after 策略: 最晚完工日={}, 当日余量={}, 新订单起始日={}",
            latest_end,
            remaining,
            start_date
        );

        let (placement, command) = self.plan_on_board(
            board,
            calendar,
            line,
            PlanStep {
                order_id: &request.order_id,
                start_date,
                method: request.method,
                ramp_up,
                first_day_ceiling,
            },
        )?;

        Ok(PlacementPlan {
            policy: Some(PlacementPolicy::After),
            placements: vec![placement],
            evicted_order_ids: Vec::new(),
            commands: vec![command],
        })
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 在工作副本上计算并落位一个订单，使后续步骤看到本步的产能占用
    fn plan_on_board(
        &self,
        board: &mut [Order],
        calendar: &HolidayCalendar,
        line: &ProductionLine,
        step: PlanStep<'_>,
    ) -> EngineResult<(PlannedPlacement, ScheduleCommand)> {
        let index = board
            .iter()
            .position(|o| o.id == step.order_id)
            .ok_or_else(|| EngineError::OrderNotFound(step.order_id.to_string()))?;
        let before = board[index].clone();

        let request = PlanRequest {
            order: &before,
            line,
            start_date: step.start_date,
            method: step.method,
            ramp_up: step.ramp_up,
            first_day_ceiling: step.first_day_ceiling,
        };
        let outcome = self.calculator.calculate(&request, calendar, board)?;
        outcome.ensure_complete()?;

        let (start_date, end_date) = match (outcome.start_date(), outcome.end_date()) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(EngineError::InvalidInput(format!(
                    "订单 {} 未生成任何排产日",
                    before.id
                )))
            }
        };

        board[index].assign_plan(&line.id, start_date, end_date, outcome.daily_plan.clone());

        let placement = PlannedPlacement {
            order_id: before.id.clone(),
            po_number: before.po_number.clone(),
            line_id: line.id.clone(),
            start_date,
            end_date,
            daily_plan: outcome.daily_plan.clone(),
            first_day_ceiling: step.first_day_ceiling,
            is_late: board[index].is_late(),
        };
        let command = ScheduleCommand::ApplySchedule {
            order: before,
            line_id: line.id.clone(),
            start_date,
            end_date,
            daily_plan: outcome.daily_plan,
        };

        Ok((placement, command))
    }
}

impl Default for PlacementResolver {
    fn default() -> Self {
        Self::new(SchedulingConfig::default())
    }
}

fn next_day(date: NaiveDate) -> EngineResult<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| EngineError::InvalidInput(format!("日期超出范围: {}", date)))
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::Holiday;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn scheduled(id: &str, entries: &[(u32, u32)]) -> Order {
        let plan: DailyPlan = entries.iter().map(|(day, q)| (d(*day), *q)).collect();
        let quantity = entries.iter().map(|(_, q)| *q).sum();
        let mut order = Order::new_pending(id, &format!("PO-{}", id), quantity, 1.0, 1).unwrap();
        order.assign_plan("L1", d(entries[0].0), d(entries[entries.len() - 1].0), plan);
        order
    }

    fn snapshot(orders: Vec<Order>) -> ScheduleSnapshot {
        ScheduleSnapshot {
            orders,
            lines: vec![ProductionLine::new("L1", "Line 1", 100).unwrap()],
            holidays: vec![],
            ramp_up_plans: vec![],
        }
    }

    fn planned(outcome: PlacementOutcome) -> PlacementPlan {
        match outcome {
            PlacementOutcome::Planned(plan) => plan,
            PlacementOutcome::PolicyRequired { .. } => panic!("expected a plan"),
        }
    }

    #[test]
    fn test_direct_placement_without_overlap() {
        let pending = Order::new_pending("y", "PO-y", 250, 1.0, 1).unwrap();
        let snap = snapshot(vec![pending]);

        let plan = planned(
            PlacementResolver::default()
                .resolve(&snap, &PlacementRequest::new("y", "L1", d(2)), None)
                .unwrap(),
        );

        assert!(plan.policy.is_none());
        assert_eq!(plan.commands.len(), 1);
        let placement = plan.placement_of("y").unwrap();
        assert_eq!(placement.start_date, d(2));
        assert_eq!(placement.end_date, d(4));
    }

    #[test]
    fn test_overlap_requires_policy() {
        let x = scheduled("x", &[(5, 100), (6, 100), (7, 100)]);
        let y = Order::new_pending("y", "PO-y", 200, 1.0, 1).unwrap();
        let snap = snapshot(vec![x, y]);

        let outcome = PlacementResolver::default()
            .resolve(&snap, &PlacementRequest::new("y", "L1", d(6)), None)
            .unwrap();

        match outcome {
            PlacementOutcome::PolicyRequired { overlapping } => {
                assert_eq!(overlapping.len(), 1);
                assert_eq!(overlapping[0].id, "x");
            }
            PlacementOutcome::Planned(_) => panic!("policy must be chosen"),
        }
    }

    #[test]
    fn test_before_policy_chains_evicted_orders() {
        let x = scheduled("x", &[(5, 100), (6, 100), (7, 100), (8, 100), (9, 100), (10, 100)]);
        let y = Order::new_pending("y", "PO-y", 200, 1.0, 1).unwrap();
        let snap = snapshot(vec![x, y]);

        let plan = planned(
            PlacementResolver::default()
                .resolve(
                    &snap,
                    &PlacementRequest::new("y", "L1", d(7)),
                    Some(PlacementPolicy::Before),
                )
                .unwrap(),
        );

        assert_eq!(plan.evicted_order_ids, vec!["x".to_string()]);
        assert!(matches!(plan.commands[0], ScheduleCommand::MoveToPending { .. }));
        assert_eq!(plan.commands.len(), 3);

        let y = plan.placement_of("y").unwrap();
        assert_eq!((y.start_date, y.end_date), (d(7), d(8)));
        let x = plan.placement_of("x").unwrap();
        assert_eq!((x.start_date, x.end_date), (d(9), d(14)));
        assert_eq!(x.first_day_ceiling, None);
    }

    #[test]
    fn test_before_policy_tops_off_partial_day() {
        let x = scheduled("x", &[(5, 100), (6, 100), (7, 100), (8, 100), (9, 100), (10, 100)]);
        let y = Order::new_pending("y", "PO-y", 150, 1.0, 1).unwrap();
        let snap = snapshot(vec![x, y]);

        let plan = planned(
            PlacementResolver::default()
                .resolve(
                    &snap,
                    &PlacementRequest::new("y", "L1", d(7)),
                    Some(PlacementPolicy::Before),
                )
                .unwrap(),
        );

        let x = plan.placement_of("x").unwrap();
        assert_eq!(x.start_date, d(8));
        assert_eq!(x.first_day_ceiling, Some(50));
        assert_eq!(x.daily_plan.get(&d(8)), Some(&50));
        assert_eq!(x.end_date, d(14));
        assert_eq!(x.daily_plan.get(&d(14)), Some(&50));
    }

    #[test]
    fn test_after_policy_fills_leftover_of_latest_end() {
        let x = scheduled("x", &[(5, 100), (6, 100), (7, 100), (8, 100), (9, 100), (10, 80)]);
        let y = Order::new_pending("y", "PO-y", 120, 1.0, 1).unwrap();
        let snap = snapshot(vec![x, y]);

        let plan = planned(
            PlacementResolver::default()
                .resolve(
                    &snap,
                    &PlacementRequest::new("y", "L1", d(6)),
                    Some(PlacementPolicy::After),
                )
                .unwrap(),
        );

        let y = plan.placement_of("y").unwrap();
        assert_eq!(y.first_day_ceiling, Some(20));
        assert_eq!(y.daily_plan.get(&d(10)), Some(&20));
        assert_eq!(y.daily_plan.get(&d(11)), Some(&100));
        assert_eq!(y.end_date, d(11));
    }

    #[test]
    fn test_after_policy_full_latest_end_starts_next_day() {
        let x = scheduled("x", &[(5, 100), (6, 100)]);
        let y = Order::new_pending("y", "PO-y", 100, 1.0, 1).unwrap();
        let mut snap = snapshot(vec![x, y]);
        snap.holidays.push(Holiday::new(d(7)));

        let plan = planned(
            PlacementResolver::default()
                .resolve(
                    &snap,
                    &PlacementRequest::new("y", "L1", d(5)),
                    Some(PlacementPolicy::After),
                )
                .unwrap(),
        );

        let y = plan.placement_of("y").unwrap();
        assert_eq!(y.first_day_ceiling, None);
        // 6 日已满，7 日节假日
        assert_eq!(y.start_date, d(8));
    }

    #[test]
    fn test_missing_ramp_up_plan_rejected() {
        let y = Order::new_pending("y", "PO-y", 100, 1.0, 1).unwrap();
        let snap = snapshot(vec![y]);
        let request = PlacementRequest::new("y", "L1", d(2)).with_ramp_up("R404");

        let err = PlacementResolver::default()
            .resolve(&snap, &request, None)
            .unwrap_err();
        assert_eq!(err, EngineError::RampUpPlanNotFound("R404".to_string()));
    }

    #[test]
    fn test_exhaustion_rejects_whole_cascade() {
        let config = SchedulingConfig {
            max_plan_days: 2,
            ..SchedulingConfig::default()
        };
        let y = Order::new_pending("y", "PO-y", 500, 1.0, 1).unwrap();
        let snap = snapshot(vec![y]);

        let err = PlacementResolver::new(config)
            .resolve(&snap, &PlacementRequest::new("y", "L1", d(2)), None)
            .unwrap_err();
        assert!(matches!(err, EngineError::PlanningExhausted { .. }));
    }
}
