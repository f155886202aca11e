// ==========================================
// 成衣排产系统 - 引擎层
// ==========================================
// 职责: 产能计算、排产计划、重叠检测、落位决策、拆单
// 红线: 引擎只读快照并产出指令，不直接做 I/O
// ==========================================

pub mod board;
pub mod capacity;
pub mod command;
pub mod error;
pub mod events;
pub mod executor;
pub mod overlap;
pub mod placement;
pub mod plan_calculator;
pub mod split;

// 重导出核心引擎
pub use board::{check_capacity, BoardBuilder, BoardCell, BoardRow, BoardView, CapacityViolation, CellOrder};
pub use capacity::{available_capacity, line_day_capacity, orders_for_cell, used_capacity};
pub use command::{ApplyError, NewOrder, OrderPatch, ScheduleApplier, ScheduleCommand};
pub use error::{EngineError, EngineResult};
pub use events::{
    NoOpEventPublisher, OptionalEventPublisher, ScheduleEvent, ScheduleEventPublisher,
    ScheduleEventType,
};
pub use executor::{CascadeExecutor, CascadeReport, CascadeStep, StepStatus};
pub use overlap::OverlapDetector;
pub use placement::{
    PlacementOutcome, PlacementPlan, PlacementRequest, PlacementResolver, PlannedPlacement,
};
pub use plan_calculator::{PlanOutcome, PlanRequest, ProductionPlanCalculator};
pub use split::{OrderSplitter, SplitPlan};
