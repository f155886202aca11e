// ==========================================
// 测试数据构建器 - 订单/快照
// ==========================================

use chrono::NaiveDate;
use garment_aps::domain::calendar::Holiday;
use garment_aps::domain::line::ProductionLine;
use garment_aps::domain::order::{DailyPlan, Order};
use garment_aps::domain::rampup::RampUpPlan;
use garment_aps::domain::snapshot::ScheduleSnapshot;

/// 2026-03 月的某一天（2026-03-02 为周一）
pub fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

// ==========================================
// Order 构建器
// ==========================================

pub struct OrderBuilder {
    id: String,
    po_number: Option<String>,
    quantity: u32,
    cut_quantity: u32,
    issue_quantity: u32,
    smv: f64,
    mo_count: u32,
    plan: Option<(String, Vec<(u32, u32)>)>,
    delivery_day: Option<u32>,
}

impl OrderBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            po_number: None,
            quantity: 100,
            cut_quantity: 0,
            issue_quantity: 0,
            smv: 1.0,
            mo_count: 1,
            plan: None,
            delivery_day: None,
        }
    }

    pub fn po(mut self, po: &str) -> Self {
        self.po_number = Some(po.to_string());
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn cut_issue(mut self, cut: u32, issue: u32) -> Self {
        self.cut_quantity = cut;
        self.issue_quantity = issue;
        self
    }

    pub fn smv(mut self, smv: f64, mo_count: u32) -> Self {
        self.smv = smv;
        self.mo_count = mo_count;
        self
    }

    pub fn delivery(mut self, day: u32) -> Self {
        self.delivery_day = Some(day);
        self
    }

    /// 已排订单；数量取日产量合计
    pub fn scheduled_on(mut self, line_id: &str, entries: &[(u32, u32)]) -> Self {
        self.quantity = entries.iter().map(|(_, q)| *q).sum();
        self.plan = Some((line_id.to_string(), entries.to_vec()));
        self
    }

    /// 同一产线连续若干天，每天相同产量
    pub fn scheduled_range(self, line_id: &str, first: u32, last: u32, per_day: u32) -> Self {
        let entries: Vec<(u32, u32)> = (first..=last).map(|day| (day, per_day)).collect();
        self.scheduled_on(line_id, &entries)
    }

    pub fn build(self) -> Order {
        let po = self
            .po_number
            .unwrap_or_else(|| format!("PO-{}", self.id.to_uppercase()));
        let mut order =
            Order::new_pending(&self.id, &po, self.quantity, self.smv, self.mo_count).unwrap();
        order.cut_quantity = self.cut_quantity;
        order.issue_quantity = self.issue_quantity;
        order.delivery_date = self.delivery_day.map(d);

        if let Some((line_id, entries)) = self.plan {
            let plan: DailyPlan = entries.iter().map(|(day, q)| (d(*day), *q)).collect();
            let start = entries.iter().map(|(day, _)| *day).min().unwrap();
            let end = entries.iter().map(|(day, _)| *day).max().unwrap();
            order.assign_plan(&line_id, d(start), d(end), plan);
        }
        order
    }
}

// ==========================================
// ScheduleSnapshot 构建器
// ==========================================

#[derive(Default)]
pub struct SnapshotBuilder {
    snapshot: ScheduleSnapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, id: &str, capacity: u32) -> Self {
        self.snapshot
            .lines
            .push(ProductionLine::new(id, &format!("Line {}", id), capacity).unwrap());
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.snapshot.orders.push(order);
        self
    }

    pub fn holiday(mut self, day: u32) -> Self {
        self.snapshot.holidays.push(Holiday::new(d(day)));
        self
    }

    pub fn ramp_up(mut self, plan: RampUpPlan) -> Self {
        self.snapshot.ramp_up_plans.push(plan);
        self
    }

    pub fn build(self) -> ScheduleSnapshot {
        self.snapshot
    }
}
