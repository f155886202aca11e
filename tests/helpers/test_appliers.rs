// ==========================================
// 测试协作方 - 可注入失败的执行者 / 事件记录器
// ==========================================

use async_trait::async_trait;
use chrono::NaiveDate;
use garment_aps::app::InMemoryScheduleStore;
use garment_aps::domain::order::{DailyPlan, Order};
use garment_aps::engine::{
    ApplyError, NewOrder, OrderPatch, ScheduleApplier, ScheduleEvent, ScheduleEventPublisher,
};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 第 `fail_on_call` 次调用（从 1 计）返回失败，其余委托给内存存储
pub struct FlakyApplier {
    pub store: Arc<InMemoryScheduleStore>,
    fail_on_call: usize,
    calls: Mutex<Vec<String>>,
}

impl FlakyApplier {
    pub fn new(store: Arc<InMemoryScheduleStore>, fail_on_call: usize) -> Self {
        Self {
            store,
            fail_on_call,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 已收到的调用（含失败的那一次）
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ApplyError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        if calls.len() == self.fail_on_call {
            return Err(ApplyError::Persistence("模拟写入失败".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleApplier for FlakyApplier {
    async fn apply_schedule(
        &self,
        order: &Order,
        line_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        daily_plan: &DailyPlan,
    ) -> Result<(), ApplyError> {
        self.record(format!("apply:{}", order.id))?;
        self.store
            .apply_schedule(order, line_id, start_date, end_date, daily_plan)
            .await
    }

    async fn move_to_pending(&self, order: &Order) -> Result<(), ApplyError> {
        self.record(format!("pending:{}", order.id))?;
        self.store.move_to_pending(order).await
    }

    async fn create_order(&self, new_order: &NewOrder) -> Result<Order, ApplyError> {
        self.record(format!("create:{}", new_order.po_number))?;
        self.store.create_order(new_order).await
    }

    async fn update_order(&self, order_id: &str, patch: &OrderPatch) -> Result<(), ApplyError> {
        self.record(format!("update:{}", order_id))?;
        self.store.update_order(order_id, patch).await
    }
}

/// 记录所有发布的事件
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<ScheduleEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<ScheduleEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ScheduleEventPublisher for RecordingPublisher {
    fn publish(&self, event: ScheduleEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        let mut events = self.events.lock().unwrap();
        events.push(event);
        Ok(format!("evt-{}", events.len()))
    }
}
