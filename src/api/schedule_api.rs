// ==========================================
// 成衣排产系统 - 排产 API
// ==========================================
// 职责: 落位、拆单、退回待排、看板查询的统一入口
// 流程: 校验输入 → 引擎生成指令 → 执行器依次落库 → 发布事件
// 红线: 校验与计算失败时不执行任何指令
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::config::SchedulingConfig;
use crate::domain::order::Order;
use crate::domain::snapshot::ScheduleSnapshot;
use crate::domain::types::{PlacementPolicy, PlanningMethod};
use crate::engine::board::{check_capacity, BoardBuilder, BoardView, CapacityViolation};
use crate::engine::command::{ScheduleApplier, ScheduleCommand};
use crate::engine::events::{
    OptionalEventPublisher, ScheduleEvent, ScheduleEventPublisher, ScheduleEventType,
};
use crate::engine::executor::{CascadeExecutor, CascadeReport};
use crate::engine::placement::{PlacementOutcome, PlacementPlan, PlacementRequest, PlacementResolver};
use crate::engine::split::{OrderSplitter, SplitPlan};

/// 落位结果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PlaceOrderResult {
    /// 方案已全部执行
    Applied {
        plan: PlacementPlan,
        report: CascadeReport,
    },
    /// 存在重叠，需要选择 before/after 后重新提交
    PolicyRequired { overlapping: Vec<Order> },
}

/// 拆单结果
#[derive(Debug, Clone, Serialize)]
pub struct SplitOrderResult {
    pub plan: SplitPlan,
    /// 协作方创建的子单（含分配的 id）
    pub sibling: Option<Order>,
    pub report: CascadeReport,
}

// ==========================================
// ScheduleApi - 排产 API
// ==========================================
pub struct ScheduleApi {
    applier: Arc<dyn ScheduleApplier>,
    resolver: PlacementResolver,
    splitter: OrderSplitter,
    executor: CascadeExecutor,
    config: SchedulingConfig,
    event_publisher: OptionalEventPublisher,
}

impl ScheduleApi {
    pub fn new(applier: Arc<dyn ScheduleApplier>, config: SchedulingConfig) -> Self {
        Self {
            applier,
            resolver: PlacementResolver::new(config.clone()),
            splitter: OrderSplitter::new(),
            executor: CascadeExecutor::new(),
            config,
            event_publisher: OptionalEventPublisher::none(),
        }
    }

    pub fn with_event_publisher(mut self, publisher: Arc<dyn ScheduleEventPublisher>) -> Self {
        self.event_publisher = OptionalEventPublisher::with_publisher(publisher);
        self
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    // ==========================================
    // 落位
    // ==========================================

    /// 按配置的默认排产方法构造落位请求
    pub fn default_request(
        &self,
        order_id: &str,
        line_id: &str,
        target_date: NaiveDate,
    ) -> PlacementRequest {
        let request = PlacementRequest::new(order_id, line_id, target_date);
        match (self.config.default_method, &self.config.default_ramp_up_plan_id) {
            (PlanningMethod::Rampup, Some(plan_id)) => request.with_ramp_up(plan_id),
            _ => request,
        }
    }

    /// 只计算落位方案，不执行
    pub fn preview_placement(
        &self,
        snapshot: &ScheduleSnapshot,
        request: &PlacementRequest,
        policy: Option<PlacementPolicy>,
    ) -> ApiResult<PlacementOutcome> {
        self.validate_candidate(snapshot, &request.order_id)?;
        Ok(self.resolver.resolve(snapshot, request, policy)?)
    }

    /// 落位订单（含级联重排）
    ///
    /// # 参数
    /// - `snapshot`: 调用前的排产快照
    /// - `request`: (订单, 产线, 目标日期, 排产方法)
    /// - `policy`: 有重叠时的人工选择；None 且有重叠时返回 `PolicyRequired`
    ///
    /// # 返回
    /// - `Ok(Applied)`: 所有指令执行成功
    /// - `Err(CascadeFailed)`: 中途失败，已执行步骤保留
    #[instrument(skip(self, snapshot), fields(order_id = %request.order_id, line_id = %request.line_id))]
    pub async fn place_order(
        &self,
        snapshot: &ScheduleSnapshot,
        request: &PlacementRequest,
        policy: Option<PlacementPolicy>,
    ) -> ApiResult<PlaceOrderResult> {
        let plan = match self.preview_placement(snapshot, request, policy)? {
            PlacementOutcome::PolicyRequired { overlapping } => {
                return Ok(PlaceOrderResult::PolicyRequired { overlapping });
            }
            PlacementOutcome::Planned(plan) => plan,
        };

        let report = self.run_commands(&request.order_id, &plan.commands).await?;

        let affected: Vec<String> = plan.placements.iter().map(|p| p.order_id.clone()).collect();
        let range = plan
            .placements
            .iter()
            .map(|p| p.start_date)
            .min()
            .zip(plan.placements.iter().map(|p| p.end_date).max());
        self.event_publisher.publish_or_warn(
            ScheduleEvent::new(ScheduleEventType::OrderScheduled, &request.order_id)
                .with_affected_orders(affected)
                .on_line(&request.line_id, range)
                .with_message(report.summary()),
        );

        for late in plan.placements.iter().filter(|p| p.is_late) {
            tracing::warn!("订单 {} 计划完工 {} 晚于交期", late.po_number, late.end_date);
        }

        Ok(PlaceOrderResult::Applied { plan, report })
    }

    // ==========================================
    // 拆单
    // ==========================================

    #[instrument(skip(self, snapshot))]
    pub async fn split_order(
        &self,
        snapshot: &ScheduleSnapshot,
        order_id: &str,
        split_quantity: u32,
    ) -> ApiResult<SplitOrderResult> {
        self.validate_candidate(snapshot, order_id)?;
        let plan = self
            .splitter
            .plan_split(&snapshot.orders, order_id, split_quantity)?;

        let report = self.run_commands(order_id, &plan.commands).await?;
        let sibling = report.created_orders.first().cloned();

        let mut affected = vec![order_id.to_string()];
        if let Some(created) = &sibling {
            affected.push(created.id.clone());
        }
        self.event_publisher.publish_or_warn(
            ScheduleEvent::new(ScheduleEventType::OrderSplit, order_id)
                .with_affected_orders(affected)
                .with_message(format!("{} ({} 件)", plan.sibling.po_number, split_quantity)),
        );

        Ok(SplitOrderResult {
            plan,
            sibling,
            report,
        })
    }

    // ==========================================
    // 退回待排
    // ==========================================

    #[instrument(skip(self, snapshot))]
    pub async fn move_to_pending(
        &self,
        snapshot: &ScheduleSnapshot,
        order_id: &str,
    ) -> ApiResult<CascadeReport> {
        let order = snapshot
            .find_order(order_id)
            .ok_or_else(|| ApiError::NotFound(format!("订单(id={})不存在", order_id)))?;
        if !order.is_scheduled() {
            return Err(ApiError::InvalidInput(format!(
                "订单 {} 未排产，无需退回",
                order.po_number
            )));
        }

        let line_id = order.assigned_line_id.clone();
        let range = order.date_range().map(|r| (r.start, r.end));
        let commands = vec![ScheduleCommand::MoveToPending {
            order: order.clone(),
        }];
        let report = self.run_commands(order_id, &commands).await?;

        let mut event = ScheduleEvent::new(ScheduleEventType::OrderMovedToPending, order_id);
        if let Some(line_id) = line_id {
            event = event.on_line(&line_id, range);
        }
        self.event_publisher.publish_or_warn(event);

        Ok(report)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 看板视图；窗口天数缺省取 visible_window_days
    pub fn board(
        &self,
        snapshot: &ScheduleSnapshot,
        start: NaiveDate,
        days: Option<u32>,
    ) -> ApiResult<BoardView> {
        let days = days.unwrap_or(self.config.visible_window_days);
        Ok(BoardBuilder::new(snapshot).build(start, days)?)
    }

    /// 校验快照记录与产能红线
    pub fn check(&self, snapshot: &ScheduleSnapshot) -> ApiResult<Vec<CapacityViolation>> {
        snapshot.validate()?;
        Ok(check_capacity(snapshot))
    }

    // ==========================================
    // 内部方法
    // ==========================================

    fn validate_candidate(&self, snapshot: &ScheduleSnapshot, order_id: &str) -> ApiResult<()> {
        let order = snapshot
            .find_order(order_id)
            .ok_or_else(|| ApiError::NotFound(format!("订单(id={})不存在", order_id)))?;
        order.validate()?;
        Ok(())
    }

    /// 执行指令；失败时发布 CascadeFailed 事件并返回错误
    async fn run_commands(
        &self,
        order_id: &str,
        commands: &[ScheduleCommand],
    ) -> ApiResult<CascadeReport> {
        let report = self.executor.execute(commands, self.applier.as_ref()).await;

        match ApiError::from_report(&report) {
            None => Ok(report),
            Some(err) => {
                self.event_publisher.publish_or_warn(
                    ScheduleEvent::new(ScheduleEventType::CascadeFailed, order_id)
                        .with_affected_orders(
                            report.steps.iter().map(|s| s.order_ref.clone()).collect(),
                        )
                        .with_message(report.summary()),
                );
                Err(err)
            }
        }
    }
}
