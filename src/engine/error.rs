// ==========================================
// 成衣排产系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 所有错误在产生任何副作用之前返回
// ==========================================

use crate::domain::error::DomainError;
use chrono::NaiveDate;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("订单不存在: {0}")]
    OrderNotFound(String),

    #[error("产线不存在: {0}")]
    LineNotFound(String),

    #[error("爬坡计划不存在: {0}")]
    RampUpPlanNotFound(String),

    #[error(
        "排产失败: 订单 {order_id} 自 {start_date} 起 {days} 天内仅排入 {allocated}/{requested} 件"
    )]
    PlanningExhausted {
        order_id: String,
        start_date: NaiveDate,
        days: u32,
        allocated: u32,
        requested: u32,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type EngineResult<T> = Result<T, EngineError>;
