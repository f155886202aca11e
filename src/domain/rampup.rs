// ==========================================
// 成衣排产系统 - 爬坡效率曲线
// ==========================================
// 用途: 新产线开线期按工作日序号给出效率百分比
// 约定: 工作日序号从 1 开始，节假日不计数
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// 爬坡检查点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampUpCheckpoint {
    pub day: u32,        // 工作日序号 (>= 1)
    pub efficiency: f64, // 百分比 (50.0 = 50%)
}

/// 爬坡计划
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampUpPlan {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub checkpoints: Vec<RampUpCheckpoint>,
    pub final_efficiency: f64,
}

impl RampUpPlan {
    /// 创建并校验爬坡计划（检查点按 day 升序保存）
    pub fn new(
        id: &str,
        name: &str,
        mut checkpoints: Vec<RampUpCheckpoint>,
        final_efficiency: f64,
    ) -> DomainResult<Self> {
        checkpoints.sort_by_key(|c| c.day);
        let plan = Self {
            id: id.to_string(),
            name: name.to_string(),
            checkpoints,
            final_efficiency,
        };
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> DomainResult<()> {
        let valid_pct = |v: f64| v.is_finite() && v >= 0.0;

        if !valid_pct(self.final_efficiency) {
            return Err(DomainError::field(
                "RampUpPlan",
                "final_efficiency",
                format!("效率必须为非负百分比，实际 {}", self.final_efficiency),
            ));
        }

        let mut last_day = 0;
        let mut sorted = self.checkpoints.clone();
        sorted.sort_by_key(|c| c.day);
        for checkpoint in &sorted {
            if checkpoint.day == 0 {
                return Err(DomainError::field("RampUpPlan", "checkpoints.day", "工作日序号从 1 开始"));
            }
            if checkpoint.day == last_day {
                return Err(DomainError::field(
                    "RampUpPlan",
                    "checkpoints.day",
                    format!("工作日序号重复: {}", checkpoint.day),
                ));
            }
            if !valid_pct(checkpoint.efficiency) {
                return Err(DomainError::field(
                    "RampUpPlan",
                    "checkpoints.efficiency",
                    format!("第 {} 天效率非法: {}", checkpoint.day, checkpoint.efficiency),
                ));
            }
            last_day = checkpoint.day;
        }

        Ok(())
    }

    /// 最后一个检查点的工作日序号
    pub fn last_checkpoint_day(&self) -> u32 {
        self.checkpoints.iter().map(|c| c.day).max().unwrap_or(0)
    }

    /// 查询第 working_day 个工作日的效率百分比
    ///
    /// 规则:
    /// 1) 命中检查点 → 检查点效率
    /// 2) 超过所有检查点 → final_efficiency
    /// 3) 落在检查点间隙 → 沿用之前最近的检查点；早于首个检查点则取首个检查点
    pub fn efficiency_for_day(&self, working_day: u32) -> f64 {
        if working_day > self.last_checkpoint_day() {
            return self.final_efficiency;
        }

        let mut preceding: Option<&RampUpCheckpoint> = None;
        let mut earliest: Option<&RampUpCheckpoint> = None;
        for checkpoint in &self.checkpoints {
            if checkpoint.day == working_day {
                return checkpoint.efficiency;
            }
            if checkpoint.day < working_day
                && preceding.map_or(true, |p| checkpoint.day > p.day)
            {
                preceding = Some(checkpoint);
            }
            if earliest.map_or(true, |e| checkpoint.day < e.day) {
                earliest = Some(checkpoint);
            }
        }

        preceding
            .or(earliest)
            .map(|c| c.efficiency)
            .unwrap_or(self.final_efficiency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoint(day: u32, efficiency: f64) -> RampUpCheckpoint {
        RampUpCheckpoint { day, efficiency }
    }

    #[test]
    fn test_efficiency_lookup() {
        let plan = RampUpPlan::new(
            "R1",
            "新线爬坡",
            vec![checkpoint(2, 80.0), checkpoint(1, 50.0), checkpoint(4, 90.0)],
            100.0,
        )
        .unwrap();

        assert_eq!(plan.efficiency_for_day(1), 50.0);
        assert_eq!(plan.efficiency_for_day(2), 80.0);
        // 间隙沿用前一检查点
        assert_eq!(plan.efficiency_for_day(3), 80.0);
        assert_eq!(plan.efficiency_for_day(4), 90.0);
        assert_eq!(plan.efficiency_for_day(5), 100.0);
        assert_eq!(plan.efficiency_for_day(40), 100.0);
    }

    #[test]
    fn test_empty_checkpoints_use_final() {
        let plan = RampUpPlan::new("R1", "", vec![], 75.0).unwrap();
        assert_eq!(plan.efficiency_for_day(1), 75.0);
    }

    #[test]
    fn test_validation() {
        assert!(RampUpPlan::new("R1", "", vec![checkpoint(0, 50.0)], 100.0).is_err());
        assert!(RampUpPlan::new("R1", "", vec![checkpoint(1, 50.0), checkpoint(1, 60.0)], 100.0).is_err());
        assert!(RampUpPlan::new("R1", "", vec![checkpoint(1, -5.0)], 100.0).is_err());
        assert!(RampUpPlan::new("R1", "", vec![], f64::NAN).is_err());
    }
}
