// ==========================================
// 成衣排产系统 - 内存快照存储
// ==========================================
// 职责: 以内存快照实现 ScheduleApplier，供命令行与测试使用
// 存储: JSON 快照文件（加载/回写）
// ==========================================

use crate::domain::order::{DailyPlan, Order};
use crate::domain::snapshot::ScheduleSnapshot;
use crate::engine::command::{ApplyError, NewOrder, OrderPatch, ScheduleApplier};
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub struct InMemoryScheduleStore {
    snapshot: Mutex<ScheduleSnapshot>,
}

impl InMemoryScheduleStore {
    pub fn new(snapshot: ScheduleSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    /// 从 JSON 快照文件加载
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取快照文件: {}", path.display()))?;
        let snapshot: ScheduleSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("快照文件格式错误: {}", path.display()))?;
        tracing::info!(
            "快照已加载: {} 个订单, {} 条产线, {} 个节假日",
            snapshot.orders.len(),
            snapshot.lines.len(),
            snapshot.holidays.len()
        );
        Ok(Self::new(snapshot))
    }

    /// 回写 JSON 快照文件
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_string_pretty(&snapshot)?;

        // 先写临时文件再替换
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("无法写入快照文件: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("无法替换快照文件: {}", path.display()))?;
        tracing::debug!("快照已保存: {}", path.display());
        Ok(())
    }

    /// 当前快照副本
    pub fn snapshot(&self) -> Result<ScheduleSnapshot, ApplyError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ScheduleSnapshot>, ApplyError> {
        self.snapshot
            .lock()
            .map_err(|e| ApplyError::Persistence(format!("快照锁获取失败: {}", e)))
    }

    /// 在副本上修改订单，校验通过后替换
    fn update_in_place<F>(&self, order_id: &str, mutate: F) -> Result<(), ApplyError>
    where
        F: FnOnce(&mut Order),
    {
        let mut snapshot = self.lock()?;
        let entry = snapshot
            .find_order_mut(order_id)
            .ok_or_else(|| ApplyError::NotFound(order_id.to_string()))?;

        let mut updated = entry.clone();
        mutate(&mut updated);
        updated
            .validate()
            .map_err(|e| ApplyError::Rejected(e.to_string()))?;
        *entry = updated;
        Ok(())
    }
}

#[async_trait]
impl ScheduleApplier for InMemoryScheduleStore {
    async fn apply_schedule(
        &self,
        order: &Order,
        line_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        daily_plan: &DailyPlan,
    ) -> Result<(), ApplyError> {
        {
            let snapshot = self.lock()?;
            if snapshot.find_line(line_id).is_none() {
                return Err(ApplyError::Rejected(format!("产线不存在: {}", line_id)));
            }
        }
        self.update_in_place(&order.id, |o| {
            o.assign_plan(line_id, start_date, end_date, daily_plan.clone())
        })
    }

    async fn move_to_pending(&self, order: &Order) -> Result<(), ApplyError> {
        self.update_in_place(&order.id, Order::clear_plan)
    }

    async fn create_order(&self, new_order: &NewOrder) -> Result<Order, ApplyError> {
        let order = new_order.clone().into_order(Uuid::new_v4().to_string());
        order
            .validate()
            .map_err(|e| ApplyError::Rejected(e.to_string()))?;
        self.lock()?.orders.push(order.clone());
        Ok(order)
    }

    async fn update_order(&self, order_id: &str, patch: &OrderPatch) -> Result<(), ApplyError> {
        self.update_in_place(order_id, |o| patch.apply_to(o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::line::ProductionLine;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn store() -> InMemoryScheduleStore {
        InMemoryScheduleStore::new(ScheduleSnapshot {
            orders: vec![Order::new_pending("o1", "PO-1", 150, 1.0, 1).unwrap()],
            lines: vec![ProductionLine::new("L1", "Line 1", 100).unwrap()],
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_apply_and_move_to_pending() {
        let store = store();
        let order = store.snapshot().unwrap().orders[0].clone();
        let plan: DailyPlan = [(d(2), 100), (d(3), 50)].into_iter().collect();

        store
            .apply_schedule(&order, "L1", d(2), d(3), &plan)
            .await
            .unwrap();
        assert!(store.snapshot().unwrap().orders[0].is_on_line("L1"));

        store.move_to_pending(&order).await.unwrap();
        assert!(!store.snapshot().unwrap().orders[0].is_scheduled());
    }

    #[tokio::test]
    async fn test_inconsistent_plan_rejected_without_change() {
        let store = store();
        let order = store.snapshot().unwrap().orders[0].clone();
        let plan: DailyPlan = [(d(2), 100)].into_iter().collect();

        let err = store
            .apply_schedule(&order, "L1", d(2), d(2), &plan)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyError::Rejected(_)));
        assert!(!store.snapshot().unwrap().orders[0].is_scheduled());
    }

    #[tokio::test]
    async fn test_create_order_assigns_id() {
        let store = store();
        let created = store
            .create_order(&NewOrder {
                po_number: "PO-1 Split 1".to_string(),
                order_quantity: 50,
                cut_quantity: 0,
                issue_quantity: 0,
                smv: 1.0,
                mo_count: 1,
                base_po_number: Some("PO-1".to_string()),
                split_number: Some(1),
                style: None,
                delivery_date: None,
            })
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(store.snapshot().unwrap().orders.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let store = store();
        let ghost = Order::new_pending("ghost", "PO-X", 10, 1.0, 1).unwrap();
        assert_eq!(
            store.move_to_pending(&ghost).await.unwrap_err(),
            ApplyError::NotFound("ghost".to_string())
        );
    }
}
