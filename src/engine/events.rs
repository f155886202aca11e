// ==========================================
// 成衣排产系统 - 排产事件发布
// ==========================================
// 职责: 定义排产事件发布 trait，看板刷新/通知由调用方实现
// 说明: 事件只在指令执行之后发布，发布失败不影响排产结果
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 排产事件类型
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEventType {
    /// 订单落位（含级联重排）
    OrderScheduled,
    /// 订单退回待排
    OrderMovedToPending,
    /// 拆单完成
    OrderSplit,
    /// 级联中途失败（部分生效）
    CascadeFailed,
}

impl ScheduleEventType {
    pub fn as_str(&self) -> &str {
        match self {
            ScheduleEventType::OrderScheduled => "OrderScheduled",
            ScheduleEventType::OrderMovedToPending => "OrderMovedToPending",
            ScheduleEventType::OrderSplit => "OrderSplit",
            ScheduleEventType::CascadeFailed => "CascadeFailed",
        }
    }
}

/// 排产事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub event_type: ScheduleEventType,
    /// 触发操作的订单
    pub order_id: String,
    /// 受影响的订单（含触发订单）
    pub affected_orders: Vec<String>,
    /// 受影响的产线（None 表示无产线变化）
    pub line_id: Option<String>,
    /// 受影响的日期范围
    pub affected_date_range: Option<(NaiveDate, NaiveDate)>,
    /// 操作员可读说明
    pub message: Option<String>,
}

impl ScheduleEvent {
    pub fn new(event_type: ScheduleEventType, order_id: &str) -> Self {
        Self {
            event_type,
            order_id: order_id.to_string(),
            affected_orders: vec![order_id.to_string()],
            line_id: None,
            affected_date_range: None,
            message: None,
        }
    }

    pub fn with_affected_orders(mut self, orders: Vec<String>) -> Self {
        self.affected_orders = orders;
        self
    }

    pub fn on_line(mut self, line_id: &str, range: Option<(NaiveDate, NaiveDate)>) -> Self {
        self.line_id = Some(line_id.to_string());
        self.affected_date_range = range;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 排产事件发布者 Trait
///
/// # 返回
/// - `Ok(task_id)`: 下游任务 ID（不支持时为空字符串）
/// - `Err`: 发布失败
pub trait ScheduleEventPublisher: Send + Sync {
    fn publish(&self, event: ScheduleEvent) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl ScheduleEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: ScheduleEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - order_id={}, event_type={}",
            event.order_id,
            event.event_type.as_str()
        );
        Ok(String::new())
    }
}

/// 可选的事件发布者包装
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn ScheduleEventPublisher>>,
}

impl OptionalEventPublisher {
    pub fn with_publisher(publisher: Arc<dyn ScheduleEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件（如果有发布者）
    pub fn publish(&self, event: ScheduleEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(event),
            None => {
                tracing::debug!(
                    "OptionalEventPublisher: 未配置发布者，跳过事件 - order_id={}, event_type={}",
                    event.order_id,
                    event.event_type.as_str()
                );
                Ok(String::new())
            }
        }
    }

    /// 发布事件，失败只记录告警
    pub fn publish_or_warn(&self, event: ScheduleEvent) {
        let event_type = event.event_type;
        if let Err(e) = self.publish(event) {
            tracing::warn!("排产事件发布失败 ({}): {}", event_type.as_str(), e);
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}
