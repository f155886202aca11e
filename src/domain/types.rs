// ==========================================
// 成衣排产系统 - 领域类型定义
// ==========================================
// 职责: 订单状态、排产方法、落位策略等枚举
// 序列化格式: snake_case (与快照 JSON 一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// pending: 待排 (无计划日期/产线/日产量)
// scheduled: 已排 (日产量计划已落位)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Scheduled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Scheduled => write!(f, "scheduled"),
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// ==========================================
// 排产方法 (Planning Method)
// ==========================================
// capacity: 按产线日产能平铺
// rampup: 按爬坡效率曲线逐日递增
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningMethod {
    Capacity,
    #[serde(alias = "ramp_up")]
    Rampup,
}

impl PlanningMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanningMethod::Capacity => "capacity",
            PlanningMethod::Rampup => "rampup",
        }
    }
}

impl fmt::Display for PlanningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for PlanningMethod {
    fn default() -> Self {
        PlanningMethod::Capacity
    }
}

impl std::str::FromStr for PlanningMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "capacity" => Ok(PlanningMethod::Capacity),
            "rampup" | "ramp_up" | "ramp-up" => Ok(PlanningMethod::Rampup),
            other => Err(format!("未知排产方法: {}", other)),
        }
    }
}

// ==========================================
// 落位策略 (Placement Policy)
// ==========================================
// 仅在检测到重叠时由人工选择，无默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// 新订单插入，重叠订单退回待排后首尾相接重排
    Before,
    /// 新订单追加到重叠区块之后
    After,
}

impl PlacementPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementPolicy::Before => "before",
            PlacementPolicy::After => "after",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            PlacementPolicy::Before => "插入前置",
            PlacementPolicy::After => "顺延追加",
        }
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlacementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "before" => Ok(PlacementPolicy::Before),
            "after" => Ok(PlacementPolicy::After),
            other => Err(format!("未知落位策略: {}", other)),
        }
    }
}
