// ==========================================
// 成衣排产系统 - API层错误类型
// ==========================================
// 职责: 将引擎/领域/配置错误转换为面向操作员的错误消息
// ==========================================

use crate::config::ConfigError;
use crate::domain::error::DomainError;
use crate::engine::error::EngineError;
use crate::engine::executor::CascadeReport;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与业务规则错误（无副作用）
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    /// 安全上限内无法排完，整个方案被拒绝
    #[error("排产失败: {0}")]
    PlanningFailed(String),

    // ==========================================
    // 执行错误（可能已部分生效）
    // ==========================================
    /// 级联中途失败，前 applied 步已生效且不回滚
    #[error("级联执行失败: 第 {step}/{total} 步 ({description}) 出错: {reason}；已生效 {applied} 步，未回滚")]
    CascadeFailed {
        step: usize,
        total: usize,
        applied: usize,
        description: String,
        reason: String,
    },

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 由失败的级联报告构造错误（报告成功时返回 None）
    pub fn from_report(report: &CascadeReport) -> Option<Self> {
        let failed = report.failed_step()?;
        Some(ApiError::CascadeFailed {
            step: failed.index + 1,
            total: report.total(),
            applied: report.applied_count(),
            description: failed.description.clone(),
            reason: failed.error.clone().unwrap_or_default(),
        })
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            EngineError::OrderNotFound(id) => ApiError::NotFound(format!("订单(id={})不存在", id)),
            EngineError::LineNotFound(id) => ApiError::NotFound(format!("产线(id={})不存在", id)),
            EngineError::RampUpPlanNotFound(id) => {
                ApiError::NotFound(format!("爬坡计划(id={})不存在", id))
            }
            e @ EngineError::PlanningExhausted { .. } => ApiError::PlanningFailed(e.to_string()),
            EngineError::Domain(e) => e.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
