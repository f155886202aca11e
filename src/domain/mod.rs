// ==========================================
// 成衣排产系统 - 领域模型层
// ==========================================
// 职责: 定义订单、产线、节假日、爬坡计划等领域实体
// 红线: 不含 I/O，不含引擎逻辑
// ==========================================

pub mod calendar;
pub mod capacity;
pub mod error;
pub mod line;
pub mod order;
pub mod rampup;
pub mod snapshot;
pub mod types;

// 重导出核心类型
pub use calendar::{DateRange, Holiday, HolidayCalendar};
pub use capacity::{CapacityConstraint, LineDayCapacity};
pub use error::{DomainError, DomainResult};
pub use line::ProductionLine;
pub use order::{format_split_po, parse_split_suffix, plan_total, DailyPlan, Order};
pub use rampup::{RampUpCheckpoint, RampUpPlan};
pub use snapshot::ScheduleSnapshot;
pub use types::{OrderStatus, PlacementPolicy, PlanningMethod};
