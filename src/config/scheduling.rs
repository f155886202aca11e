// ==========================================
// 成衣排产系统 - 排产参数
// ==========================================
// 职责: 集中管理排产算法中的常量（班次分钟数、计算上限、看板窗口）
// ==========================================

use crate::domain::types::PlanningMethod;
use serde::{Deserialize, Serialize};

/// 标准班次分钟数
pub const DEFAULT_SHIFT_MINUTES: u32 = 540;

/// 单次排产最多迭代的自然日数
pub const DEFAULT_MAX_PLAN_DAYS: u32 = 366;

/// 排产看板默认可视窗口（天）
pub const DEFAULT_VISIBLE_WINDOW_DAYS: u32 = 30;

/// 排产参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// 班次分钟数（爬坡法基准产量 = shift_minutes / smv * mo_count）
    #[serde(default = "default_shift_minutes")]
    pub shift_minutes: u32,

    /// 计算安全上限（自然日），超出视为排产失败
    #[serde(default = "default_max_plan_days")]
    pub max_plan_days: u32,

    /// 看板可视窗口（天）
    #[serde(default = "default_visible_window_days")]
    pub visible_window_days: u32,

    /// 未指定时使用的排产方法
    #[serde(default)]
    pub default_method: PlanningMethod,

    /// 默认方法为爬坡法时使用的爬坡计划
    #[serde(default)]
    pub default_ramp_up_plan_id: Option<String>,
}

fn default_shift_minutes() -> u32 {
    DEFAULT_SHIFT_MINUTES
}

fn default_max_plan_days() -> u32 {
    DEFAULT_MAX_PLAN_DAYS
}

fn default_visible_window_days() -> u32 {
    DEFAULT_VISIBLE_WINDOW_DAYS
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            shift_minutes: DEFAULT_SHIFT_MINUTES,
            max_plan_days: DEFAULT_MAX_PLAN_DAYS,
            visible_window_days: DEFAULT_VISIBLE_WINDOW_DAYS,
            default_method: PlanningMethod::Capacity,
            default_ramp_up_plan_id: None,
        }
    }
}

impl SchedulingConfig {
    /// 参数校验：所有数值必须为正；默认爬坡法必须指定爬坡计划
    pub fn validate(&self) -> Result<(), String> {
        if self.shift_minutes == 0 {
            return Err("shift_minutes 必须大于 0".to_string());
        }
        if self.max_plan_days == 0 {
            return Err("max_plan_days 必须大于 0".to_string());
        }
        if self.visible_window_days == 0 {
            return Err("visible_window_days 必须大于 0".to_string());
        }
        if self.default_method == PlanningMethod::Rampup && self.default_ramp_up_plan_id.is_none()
        {
            return Err("default_method 为 rampup 时必须配置 default_ramp_up_plan_id".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SchedulingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rampup_default_requires_plan() {
        let mut config = SchedulingConfig {
            default_method: PlanningMethod::Rampup,
            ..SchedulingConfig::default()
        };
        assert!(config.validate().is_err());

        config.default_ramp_up_plan_id = Some("R1".to_string());
        assert!(config.validate().is_ok());
    }
}
