// ==========================================
// 成衣排产系统 - 拆单操作
// ==========================================
// 红线: 母单剩余数量 + 子单数量 == 拆分前数量
// 红线: 子单序号 = 同基础 PO 下已有最大序号 + 1（未拆原单视为 0）
// ==========================================

use crate::domain::order::{format_split_po, DailyPlan, Order};
use crate::engine::command::{NewOrder, OrderPatch, ScheduleCommand};
use crate::engine::error::{EngineError, EngineResult};
use serde::Serialize;
use tracing::instrument;

/// 拆单方案
#[derive(Debug, Clone, Serialize)]
pub struct SplitPlan {
    pub order_id: String,
    pub base_po_number: String,
    pub split_number: u32,
    pub split_quantity: u32,
    pub sibling: NewOrder,
    pub original_patch: OrderPatch,
    /// 依次为 CreateOrder、UpdateOrder
    pub commands: Vec<ScheduleCommand>,
}

pub struct OrderSplitter;

impl OrderSplitter {
    pub fn new() -> Self {
        Self
    }

    /// 生成拆单方案
    ///
    /// # 参数
    /// - `orders`: 快照中全部订单（用于计算拆单序号）
    /// - `order_id`: 被拆订单
    /// - `split_quantity`: 子单数量，需满足 0 < q < 订单数量
    #[instrument(skip(self, orders))]
    pub fn plan_split(
        &self,
        orders: &[Order],
        order_id: &str,
        split_quantity: u32,
    ) -> EngineResult<SplitPlan> {
        let original = orders
            .iter()
            .find(|o| o.id == order_id)
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;

        if split_quantity == 0 || split_quantity >= original.order_quantity {
            return Err(EngineError::InvalidInput(format!(
                "拆单数量必须在 1 ~ {} 之间，实际 {}",
                original.order_quantity.saturating_sub(1),
                split_quantity
            )));
        }

        let base_po = original.resolved_base_po();
        let split_number = orders
            .iter()
            .filter(|o| o.resolved_base_po() == base_po)
            .map(|o| o.resolved_split_number())
            .max()
            .unwrap_or(0)
            + 1;

        let ratio = split_quantity as f64 / original.order_quantity as f64;
        let sibling_cut = prorate(original.cut_quantity, ratio);
        let sibling_issue = prorate(original.issue_quantity, ratio);

        let sibling = NewOrder {
            po_number: format_split_po(&base_po, split_number),
            order_quantity: split_quantity,
            cut_quantity: sibling_cut,
            issue_quantity: sibling_issue,
            smv: original.smv,
            mo_count: original.mo_count,
            base_po_number: Some(base_po.clone()),
            split_number: Some(split_number),
            style: original.style.clone(),
            delivery_date: original.delivery_date,
        };

        let mut original_patch = OrderPatch {
            order_quantity: Some(original.order_quantity - split_quantity),
            cut_quantity: Some(original.cut_quantity - sibling_cut),
            issue_quantity: Some(original.issue_quantity - sibling_issue),
            base_po_number: Some(base_po.clone()),
            ..Default::default()
        };

        // 原单未带拆单后缀时补命名为 Split 0
        if original.split_number.is_none() && original.po_number.trim() == base_po {
            original_patch.po_number = Some(format_split_po(&base_po, 0));
            original_patch.split_number = Some(0);
        }

        // 已排原单: 从最晚日起裁剪日产量，保持数量守恒
        if original.is_scheduled() {
            let trimmed = trim_plan_from_end(&original.actual_production, split_quantity);
            original_patch.plan_end_date = trimmed.keys().next_back().copied();
            original_patch.actual_production = Some(trimmed);
        }

        tracing::info!(
            "拆单方案: {} → {} ({} 件), 原单剩余 {} 件",
            original.po_number,
            sibling.po_number,
            split_quantity,
            original.order_quantity - split_quantity
        );

        let commands = vec![
            ScheduleCommand::CreateOrder {
                new_order: sibling.clone(),
            },
            ScheduleCommand::UpdateOrder {
                order_id: original.id.clone(),
                patch: original_patch.clone(),
            },
        ];

        Ok(SplitPlan {
            order_id: original.id.clone(),
            base_po_number: base_po,
            split_number,
            split_quantity,
            sibling,
            original_patch,
            commands,
        })
    }
}

impl Default for OrderSplitter {
    fn default() -> Self {
        Self::new()
    }
}

/// 按比例分摊（四舍五入，远离零），不超过原值
fn prorate(quantity: u32, ratio: f64) -> u32 {
    let value = (quantity as f64 * ratio).round();
    (value.max(0.0) as u32).min(quantity)
}

/// 从最晚日起扣减 `amount` 件，丢弃扣减为 0 的日期
fn trim_plan_from_end(plan: &DailyPlan, amount: u32) -> DailyPlan {
    let mut trimmed = plan.clone();
    let mut remaining = amount;
    for (_, qty) in trimmed.iter_mut().rev() {
        if remaining == 0 {
            break;
        }
        let take = (*qty).min(remaining);
        *qty -= take;
        remaining -= take;
    }
    trimmed.retain(|_, qty| *qty > 0);
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn order(id: &str, po: &str, qty: u32) -> Order {
        let mut order = Order::new_pending(id, po, qty, 1.0, 1).unwrap();
        order.cut_quantity = qty;
        order.issue_quantity = qty / 2;
        order
    }

    #[test]
    fn test_first_split_renames_original() {
        let orders = vec![order("o1", "PO-7", 1000)];
        let plan = OrderSplitter::new().plan_split(&orders, "o1", 300).unwrap();

        assert_eq!(plan.split_number, 1);
        assert_eq!(plan.sibling.po_number, "PO-7 Split 1");
        assert_eq!(plan.sibling.cut_quantity, 300);
        assert_eq!(plan.sibling.issue_quantity, 150);
        assert_eq!(plan.original_patch.po_number.as_deref(), Some("PO-7 Split 0"));
        assert_eq!(plan.original_patch.split_number, Some(0));
        assert_eq!(plan.original_patch.order_quantity, Some(700));
        assert_eq!(plan.original_patch.cut_quantity, Some(700));
        assert!(matches!(plan.commands[0], ScheduleCommand::CreateOrder { .. }));
        assert!(matches!(plan.commands[1], ScheduleCommand::UpdateOrder { .. }));
    }

    #[test]
    fn test_split_number_follows_existing_siblings() {
        let mut original = order("o1", "PO-7 Split 0", 500);
        original.split_number = Some(0);
        original.base_po_number = Some("PO-7".to_string());
        let orders = vec![
            original,
            order("o2", "PO-7 Split 1", 200),
            order("o3", "PO-7 Split 4", 100),
            order("o9", "PO-8", 100),
        ];

        let plan = OrderSplitter::new().plan_split(&orders, "o2", 50).unwrap();
        assert_eq!(plan.split_number, 5);
        assert_eq!(plan.sibling.po_number, "PO-7 Split 5");
        // 已带后缀的订单不改名
        assert!(plan.original_patch.po_number.is_none());
    }

    #[test]
    fn test_proration_rounds_half_away_from_zero() {
        let mut original = order("o1", "PO-1", 4);
        original.cut_quantity = 3;
        original.issue_quantity = 1;
        let plan = OrderSplitter::new().plan_split(&[original], "o1", 2).unwrap();
        // 3 * 0.5 = 1.5 → 2; 1 * 0.5 = 0.5 → 1
        assert_eq!(plan.sibling.cut_quantity, 2);
        assert_eq!(plan.sibling.issue_quantity, 1);
        assert_eq!(plan.original_patch.cut_quantity, Some(1));
        assert_eq!(plan.original_patch.issue_quantity, Some(0));
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let orders = vec![order("o1", "PO-1", 100)];
        let splitter = OrderSplitter::new();
        assert!(matches!(
            splitter.plan_split(&orders, "o1", 0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            splitter.plan_split(&orders, "o1", 100),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            splitter.plan_split(&orders, "nope", 10),
            Err(EngineError::OrderNotFound(_))
        ));
    }

    #[test]
    fn test_scheduled_original_trimmed_from_latest_day() {
        let mut original = order("o1", "PO-1", 250);
        let plan: DailyPlan = [(d(2), 100), (d(3), 100), (d(4), 50)].into_iter().collect();
        original.assign_plan("L1", d(2), d(4), plan);

        let split = OrderSplitter::new().plan_split(&[original], "o1", 120).unwrap();
        let trimmed = split.original_patch.actual_production.unwrap();
        assert_eq!(trimmed.get(&d(2)), Some(&100));
        assert_eq!(trimmed.get(&d(3)), Some(&30));
        assert!(!trimmed.contains_key(&d(4)));
        assert_eq!(split.original_patch.plan_end_date, Some(d(3)));
    }
}
