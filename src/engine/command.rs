// ==========================================
// 成衣排产系统 - 排产指令与落库协作接口
// ==========================================
// 职责: 引擎只产出指令，I/O 由调用方实现的 ScheduleApplier 执行
// 说明: Engine 层定义 trait，持久化/界面层实现
// ==========================================

use crate::domain::order::{DailyPlan, Order};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==========================================
// 协作方错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyError {
    #[error("持久化失败: {0}")]
    Persistence(String),

    #[error("记录未找到: order_id={0}")]
    NotFound(String),

    #[error("协作方拒绝: {0}")]
    Rejected(String),
}

// ==========================================
// OrderPatch - 订单局部更新
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cut_quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_po_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_number: Option<u32>,
    /// 已排订单拆单后裁剪的日产量计划
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_production: Option<DailyPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_end_date: Option<NaiveDate>,
}

impl OrderPatch {
    /// 将非空字段写入订单
    pub fn apply_to(&self, order: &mut Order) {
        if let Some(v) = &self.po_number {
            order.po_number = v.clone();
        }
        if let Some(v) = self.order_quantity {
            order.order_quantity = v;
        }
        if let Some(v) = self.cut_quantity {
            order.cut_quantity = v;
        }
        if let Some(v) = self.issue_quantity {
            order.issue_quantity = v;
        }
        if let Some(v) = &self.base_po_number {
            order.base_po_number = Some(v.clone());
        }
        if let Some(v) = self.split_number {
            order.split_number = Some(v);
        }
        if let Some(v) = &self.actual_production {
            order.actual_production = v.clone();
        }
        if let Some(v) = self.plan_end_date {
            order.plan_end_date = Some(v);
        }
    }
}

// ==========================================
// NewOrder - 待创建订单（id 由协作方分配）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub po_number: String,
    pub order_quantity: u32,
    pub cut_quantity: u32,
    pub issue_quantity: u32,
    pub smv: f64,
    pub mo_count: u32,
    pub base_po_number: Option<String>,
    pub split_number: Option<u32>,
    pub style: Option<String>,
    pub delivery_date: Option<NaiveDate>,
}

impl NewOrder {
    /// 以指定 id 生成待排订单
    pub fn into_order(self, id: String) -> Order {
        Order {
            id,
            po_number: self.po_number,
            order_quantity: self.order_quantity,
            cut_quantity: self.cut_quantity,
            issue_quantity: self.issue_quantity,
            smv: self.smv,
            mo_count: self.mo_count,
            status: Default::default(),
            plan_start_date: None,
            plan_end_date: None,
            assigned_line_id: None,
            actual_production: DailyPlan::new(),
            base_po_number: self.base_po_number,
            split_number: self.split_number,
            style: self.style,
            delivery_date: self.delivery_date,
        }
    }
}

// ==========================================
// ScheduleCommand - 排产指令
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleCommand {
    /// 退回待排（清空计划）
    MoveToPending { order: Order },
    /// 落位日产量计划并置为已排
    ApplySchedule {
        order: Order,
        line_id: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        daily_plan: DailyPlan,
    },
    /// 新建订单（拆单子单）
    CreateOrder { new_order: NewOrder },
    /// 局部更新订单（拆单母单）
    UpdateOrder { order_id: String, patch: OrderPatch },
}

impl ScheduleCommand {
    /// 指令涉及的订单标识（新建订单取 PO 号）
    pub fn order_ref(&self) -> &str {
        match self {
            ScheduleCommand::MoveToPending { order } => &order.id,
            ScheduleCommand::ApplySchedule { order, .. } => &order.id,
            ScheduleCommand::CreateOrder { new_order } => &new_order.po_number,
            ScheduleCommand::UpdateOrder { order_id, .. } => order_id,
        }
    }

    /// 面向操作员的描述
    pub fn describe(&self) -> String {
        match self {
            ScheduleCommand::MoveToPending { order } => {
                format!("退回待排: {}", order.po_number)
            }
            ScheduleCommand::ApplySchedule {
                order,
                line_id,
                start_date,
                end_date,
                ..
            } => format!(
                "排产落位: {} → 产线 {} [{} ~ {}]",
                order.po_number, line_id, start_date, end_date
            ),
            ScheduleCommand::CreateOrder { new_order } => format!(
                "新建拆单: {} ({} 件)",
                new_order.po_number, new_order.order_quantity
            ),
            ScheduleCommand::UpdateOrder { order_id, patch } => match &patch.po_number {
                Some(po) => format!("更新订单: {} ({})", order_id, po),
                None => format!("更新订单: {}", order_id),
            },
        }
    }
}

// ==========================================
// ScheduleApplier - 落库协作接口
// ==========================================

/// 排产指令执行者 Trait
///
/// 由调用方实现（数据库/远端服务/内存快照），引擎不关心存储细节。
/// 级联中的每一步都会被依次 await，后一步可以观察到前一步的效果。
#[async_trait]
pub trait ScheduleApplier: Send + Sync {
    /// 保存日产量计划并将订单置为已排
    async fn apply_schedule(
        &self,
        order: &Order,
        line_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        daily_plan: &DailyPlan,
    ) -> Result<(), ApplyError>;

    /// 清空订单计划并置为待排
    async fn move_to_pending(&self, order: &Order) -> Result<(), ApplyError>;

    /// 新建订单，返回分配了 id 的订单
    async fn create_order(&self, new_order: &NewOrder) -> Result<Order, ApplyError>;

    /// 局部更新订单
    async fn update_order(&self, order_id: &str, patch: &OrderPatch) -> Result<(), ApplyError>;
}
