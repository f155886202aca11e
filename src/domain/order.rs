// ==========================================
// 成衣排产系统 - 订单领域模型
// ==========================================
// 红线: 已排订单 sum(actual_production) == order_quantity
// 红线: plan_start_date/plan_end_date 必须覆盖所有非零日产量
// ==========================================

use crate::domain::calendar::DateRange;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::types::OrderStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 日产量计划: 日期 -> 当日产量
///
/// 序列化时日期键为 ISO `YYYY-MM-DD`。
pub type DailyPlan = BTreeMap<NaiveDate, u32>;

/// 拆单后缀分隔符（`<base> Split <n>`）
pub const SPLIT_SUFFIX: &str = " Split ";

/// 计划合计
pub fn plan_total(plan: &DailyPlan) -> u32 {
    plan.values().sum()
}

// ==========================================
// Order - 生产订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // ===== 标识 =====
    pub id: String,
    pub po_number: String,

    // ===== 数量 =====
    pub order_quantity: u32,
    #[serde(default)]
    pub cut_quantity: u32,
    #[serde(default)]
    pub issue_quantity: u32,

    // ===== 生产参数 =====
    pub smv: f64,      // 标准工时 (分钟/件)
    pub mo_count: u32, // 并行机台/操作组数

    // ===== 排产状态 =====
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub plan_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub plan_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_line_id: Option<String>,
    #[serde(default)]
    pub actual_production: DailyPlan,

    // ===== 拆单谱系 =====
    #[serde(default)]
    pub base_po_number: Option<String>,
    #[serde(default)]
    pub split_number: Option<u32>,

    // ===== 业务信息 (仅展示) =====
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
}

impl Order {
    /// 创建待排订单
    pub fn new_pending(
        id: &str,
        po_number: &str,
        order_quantity: u32,
        smv: f64,
        mo_count: u32,
    ) -> DomainResult<Self> {
        let order = Self {
            id: id.to_string(),
            po_number: po_number.to_string(),
            order_quantity,
            cut_quantity: 0,
            issue_quantity: 0,
            smv,
            mo_count,
            status: OrderStatus::Pending,
            plan_start_date: None,
            plan_end_date: None,
            assigned_line_id: None,
            actual_production: DailyPlan::new(),
            base_po_number: None,
            split_number: None,
            style: None,
            delivery_date: None,
        };
        order.validate()?;
        Ok(order)
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == OrderStatus::Scheduled
    }

    /// 是否排在指定产线
    pub fn is_on_line(&self, line_id: &str) -> bool {
        self.is_scheduled() && self.assigned_line_id.as_deref() == Some(line_id)
    }

    /// 指定日期的计划产量（无则为 0）
    pub fn production_on(&self, date: NaiveDate) -> u32 {
        self.actual_production.get(&date).copied().unwrap_or(0)
    }

    pub fn total_planned(&self) -> u32 {
        plan_total(&self.actual_production)
    }

    pub fn is_fully_planned(&self) -> bool {
        self.is_scheduled() && self.total_planned() == self.order_quantity
    }

    /// 计划日期区间（待排或缺失日期时为 None）
    pub fn date_range(&self) -> Option<DateRange> {
        match (self.plan_start_date, self.plan_end_date) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        }
    }

    /// 计划完工是否晚于交期
    pub fn is_late(&self) -> bool {
        match (self.plan_end_date, self.delivery_date) {
            (Some(end), Some(delivery)) => end > delivery,
            _ => false,
        }
    }

    /// 基础 PO 号（去除 ` Split <n>` 后缀）
    pub fn resolved_base_po(&self) -> String {
        match &self.base_po_number {
            Some(base) if !base.trim().is_empty() => base.trim().to_string(),
            _ => parse_split_suffix(&self.po_number).0,
        }
    }

    /// 当前拆单序号（未拆单的原始订单视为 0）
    pub fn resolved_split_number(&self) -> u32 {
        self.split_number
            .or_else(|| parse_split_suffix(&self.po_number).1)
            .unwrap_or(0)
    }

    /// 退回待排：清空计划、产线与日产量
    pub fn clear_plan(&mut self) {
        self.status = OrderStatus::Pending;
        self.plan_start_date = None;
        self.plan_end_date = None;
        self.assigned_line_id = None;
        self.actual_production.clear();
    }

    /// 落位日产量计划
    pub fn assign_plan(
        &mut self,
        line_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        plan: DailyPlan,
    ) {
        self.status = OrderStatus::Scheduled;
        self.assigned_line_id = Some(line_id.to_string());
        self.plan_start_date = Some(start_date);
        self.plan_end_date = Some(end_date);
        self.actual_production = plan;
    }

    /// 校验订单数量（排产前置条件）
    pub fn validate_quantity(&self) -> DomainResult<()> {
        if self.order_quantity == 0 {
            return Err(DomainError::field(
                "Order",
                "order_quantity",
                format!("订单 {} 数量必须大于 0", self.id),
            ));
        }
        Ok(())
    }

    /// 校验订单不变量
    pub fn validate(&self) -> DomainResult<()> {
        if self.id.trim().is_empty() {
            return Err(DomainError::field("Order", "id", "不能为空"));
        }
        self.validate_quantity()?;
        if !self.smv.is_finite() || self.smv < 0.0 {
            return Err(DomainError::field(
                "Order",
                "smv",
                format!("必须为非负有限数，实际 {}", self.smv),
            ));
        }

        match self.status {
            OrderStatus::Pending => {
                if self.plan_start_date.is_some()
                    || self.plan_end_date.is_some()
                    || self.assigned_line_id.is_some()
                    || !self.actual_production.is_empty()
                {
                    return Err(DomainError::InconsistentState {
                        order_id: self.id.clone(),
                        message: "待排订单不应携带计划日期/产线/日产量".to_string(),
                    });
                }
            }
            OrderStatus::Scheduled => {
                if self.assigned_line_id.is_none() {
                    return Err(DomainError::InconsistentState {
                        order_id: self.id.clone(),
                        message: "已排订单缺少产线".to_string(),
                    });
                }
                let planned = self.total_planned();
                if planned != self.order_quantity {
                    return Err(DomainError::QuantityMismatch {
                        order_id: self.id.clone(),
                        planned,
                        expected: self.order_quantity,
                    });
                }
                let range = self.date_range().ok_or_else(|| DomainError::InconsistentState {
                    order_id: self.id.clone(),
                    message: "已排订单缺少计划起止日期".to_string(),
                })?;
                let out_of_range = self
                    .actual_production
                    .iter()
                    .any(|(date, qty)| *qty > 0 && !range.contains(*date));
                if out_of_range {
                    return Err(DomainError::InconsistentState {
                        order_id: self.id.clone(),
                        message: format!("日产量超出计划区间 {}", range),
                    });
                }
            }
        }

        Ok(())
    }
}

// ==========================================
// 拆单 PO 号解析
// ==========================================

/// 解析 `<base> Split <n>` 形式的 PO 号
///
/// # 返回
/// (基础 PO 号, 拆单序号)；无合法后缀时序号为 None
pub fn parse_split_suffix(po_number: &str) -> (String, Option<u32>) {
    let trimmed = po_number.trim();
    if let Some((base, suffix)) = trimmed.rsplit_once(SPLIT_SUFFIX) {
        if let Ok(n) = suffix.trim().parse::<u32>() {
            return (base.trim_end().to_string(), Some(n));
        }
    }
    (trimmed.to_string(), None)
}

/// 生成拆单 PO 号
pub fn format_split_po(base: &str, split_number: u32) -> String {
    format!("{}{}{}", base, SPLIT_SUFFIX, split_number)
}
