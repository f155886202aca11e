// ==========================================
// 成衣排产系统 - 领域层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 用途: 领域记录构造/变更边界上的校验失败
// ==========================================

use thiserror::Error;

/// 领域校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("字段值错误 (entity={entity}, field={field}): {message}")]
    FieldValueError {
        entity: String,
        field: String,
        message: String,
    },

    #[error("订单 {order_id} 数量守恒被破坏: 计划合计={planned}, 订单数量={expected}")]
    QuantityMismatch {
        order_id: String,
        planned: u32,
        expected: u32,
    },

    #[error("订单 {order_id} 状态不一致: {message}")]
    InconsistentState { order_id: String, message: String },
}

impl DomainError {
    pub fn field(entity: &str, field: &str, message: impl Into<String>) -> Self {
        DomainError::FieldValueError {
            entity: entity.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
