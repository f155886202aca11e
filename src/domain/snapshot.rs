// ==========================================
// 成衣排产系统 - 排产输入快照
// ==========================================
// 职责: 调用方持有的订单/产线/节假日/爬坡计划集合
// 约定: 引擎只读快照，不保存任何跨调用状态
// ==========================================

use crate::domain::calendar::{Holiday, HolidayCalendar};
use crate::domain::error::DomainResult;
use crate::domain::line::ProductionLine;
use crate::domain::order::Order;
use crate::domain::rampup::RampUpPlan;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub lines: Vec<ProductionLine>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub ramp_up_plans: Vec<RampUpPlan>,
}

impl ScheduleSnapshot {
    pub fn find_order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    pub fn find_order_mut(&mut self, order_id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == order_id)
    }

    pub fn find_line(&self, line_id: &str) -> Option<&ProductionLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    pub fn find_ramp_up_plan(&self, plan_id: &str) -> Option<&RampUpPlan> {
        self.ramp_up_plans.iter().find(|p| p.id == plan_id)
    }

    /// 节假日日历
    pub fn calendar(&self) -> HolidayCalendar {
        HolidayCalendar::from_holidays(&self.holidays)
    }

    /// 已排订单数量
    pub fn scheduled_count(&self) -> usize {
        self.orders.iter().filter(|o| o.is_scheduled()).count()
    }

    /// 逐条校验快照记录
    pub fn validate(&self) -> DomainResult<()> {
        for line in &self.lines {
            line.validate()?;
        }
        for plan in &self.ramp_up_plans {
            plan.validate()?;
        }
        for order in &self.orders {
            order.validate()?;
        }
        Ok(())
    }
}
