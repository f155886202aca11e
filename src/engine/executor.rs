// ==========================================
// 成衣排产系统 - 级联指令执行器
// ==========================================
// 职责: 按顺序执行排产指令，记录每一步结果
// 约定: 首个失败即停止，后续步骤标记为跳过；已执行步骤不回滚
// ==========================================

use crate::domain::order::Order;
use crate::engine::command::{ScheduleApplier, ScheduleCommand};
use serde::Serialize;

/// 单步执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Applied,
    Failed,
    Skipped,
}

/// 级联步骤记录
#[derive(Debug, Clone, Serialize)]
pub struct CascadeStep {
    pub index: usize,
    pub order_ref: String,
    pub description: String,
    pub status: StepStatus,
    pub error: Option<String>,
}

/// 级联执行报告（部分失败日志）
#[derive(Debug, Clone, Default, Serialize)]
pub struct CascadeReport {
    pub steps: Vec<CascadeStep>,
    /// 执行过程中新建的订单（拆单子单）
    pub created_orders: Vec<Order>,
}

impl CascadeReport {
    pub fn is_success(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Applied)
    }

    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn applied_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Applied)
            .count()
    }

    pub fn failed_step(&self) -> Option<&CascadeStep> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    /// 面向操作员的结果摘要
    pub fn summary(&self) -> String {
        match self.failed_step() {
            None => format!("已完成 {} 步", self.total()),
            Some(step) => format!(
                "第 {}/{} 步失败 ({}): {}；已执行 {} 步未回滚",
                step.index + 1,
                self.total(),
                step.description,
                step.error.as_deref().unwrap_or("未知错误"),
                self.applied_count()
            ),
        }
    }
}

// ==========================================
// CascadeExecutor - 指令执行器
// ==========================================
pub struct CascadeExecutor;

impl CascadeExecutor {
    pub fn new() -> Self {
        Self
    }

    /// 依次执行指令（每一步 await 完成后才进入下一步）
    pub async fn execute(
        &self,
        commands: &[ScheduleCommand],
        applier: &dyn ScheduleApplier,
    ) -> CascadeReport {
        let mut report = CascadeReport::default();
        let mut failed = false;

        for (index, command) in commands.iter().enumerate() {
            let mut step = CascadeStep {
                index,
                order_ref: command.order_ref().to_string(),
                description: command.describe(),
                status: StepStatus::Skipped,
                error: None,
            };

            if failed {
                report.steps.push(step);
                continue;
            }

            let result = match command {
                ScheduleCommand::MoveToPending { order } => applier.move_to_pending(order).await,
                ScheduleCommand::ApplySchedule {
                    order,
                    line_id,
                    start_date,
                    end_date,
                    daily_plan,
                } => {
                    applier
                        .apply_schedule(order, line_id, *start_date, *end_date, daily_plan)
                        .await
                }
                ScheduleCommand::CreateOrder { new_order } => {
                    applier.create_order(new_order).await.map(|created| {
                        report.created_orders.push(created);
                    })
                }
                ScheduleCommand::UpdateOrder { order_id, patch } => {
                    applier.update_order(order_id, patch).await
                }
            };

            match result {
                Ok(()) => {
                    tracing::info!("级联第 {} 步完成: {}", index + 1, step.description);
                    step.status = StepStatus::Applied;
                }
                Err(e) => {
                    tracing::error!(
                        "级联第 {} 步失败: {} - {}；前 {} 步已生效，不回滚",
                        index + 1,
                        step.description,
                        e,
                        index
                    );
                    step.status = StepStatus::Failed;
                    step.error = Some(e.to_string());
                    failed = true;
                }
            }

            report.steps.push(step);
        }

        report
    }
}

impl Default for CascadeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(index: usize, status: StepStatus, error: Option<&str>) -> CascadeStep {
        CascadeStep {
            index,
            order_ref: format!("o{}", index),
            description: format!("步骤{}", index + 1),
            status,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_successful_report() {
        let report = CascadeReport {
            steps: vec![
                step(0, StepStatus::Applied, None),
                step(1, StepStatus::Applied, None),
            ],
            created_orders: vec![],
        };

        assert!(report.is_success());
        assert_eq!(report.applied_count(), 2);
        assert!(report.failed_step().is_none());
        assert_eq!(report.summary(), "已完成 2 步");
    }

    #[test]
    fn test_partial_failure_report() {
        let report = CascadeReport {
            steps: vec![
                step(0, StepStatus::Applied, None),
                step(1, StepStatus::Failed, Some("写入超时")),
                step(2, StepStatus::Skipped, None),
            ],
            created_orders: vec![],
        };

        assert!(!report.is_success());
        assert_eq!(report.total(), 3);
        assert_eq!(report.applied_count(), 1);
        assert_eq!(report.failed_step().map(|s| s.index), Some(1));
        assert_eq!(
            report.summary(),
            "第 2/3 步失败 (步骤2): 写入超时；已执行 1 步未回滚"
        );
    }

    #[test]
    fn test_failed_step_without_message() {
        let report = CascadeReport {
            steps: vec![step(0, StepStatus::Failed, None)],
            created_orders: vec![],
        };
        assert!(report.summary().contains("未知错误"));
        assert_eq!(report.applied_count(), 0);
    }
}
