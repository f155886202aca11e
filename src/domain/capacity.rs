// ==========================================
// 成衣排产系统 - 产线日产能领域模型
// ==========================================
// 红线: 任一产线任一日的已排产量合计不得超过产线日产能
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// LineDayCapacity - 单产线单日产能格
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDayCapacity {
    pub line_id: String,
    pub date: NaiveDate,
    pub capacity: u32, // 产线日产能
    pub used: u32,     // 已排产量
}

impl LineDayCapacity {
    pub fn new(line_id: &str, date: NaiveDate, capacity: u32, used: u32) -> Self {
        Self {
            line_id: line_id.to_string(),
            date,
            capacity,
            used,
        }
    }

    /// 超出日产能的件数（正常数据应为 0）
    pub fn overflow(&self) -> u32 {
        self.used.saturating_sub(self.capacity)
    }
}

// ==========================================
// Trait: CapacityConstraint
// ==========================================
// 用途: 排产计算的产能约束检查接口
pub trait CapacityConstraint {
    /// 检查是否还能再排 quantity 件
    fn can_allocate(&self, quantity: u32) -> bool;

    /// 是否已排满
    fn is_full(&self) -> bool;

    /// 剩余产能（不为负）
    fn remaining_capacity(&self) -> u32;

    /// 产能利用率 (0.0 ~ 1.0+)
    fn utilization_ratio(&self) -> f64;
}

impl CapacityConstraint for LineDayCapacity {
    fn can_allocate(&self, quantity: u32) -> bool {
        self.used.saturating_add(quantity) <= self.capacity
    }

    fn is_full(&self) -> bool {
        self.used >= self.capacity
    }

    fn remaining_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.used)
    }

    fn utilization_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.used as f64 / self.capacity as f64
    }
}
