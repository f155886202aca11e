// ==========================================
// 成衣排产系统 - 核心库
// ==========================================
// 系统定位: 产线 × 日期看板上的订单排程分配
// 红线: 任一产线任一日已排产量不超过日产能
// 红线: 已排订单日产量合计等于订单数量
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 排产规则
pub mod engine;

// 配置层 - 排产参数
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 快照存储与状态组装
pub mod app;

// 报表导出
pub mod report;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{OrderStatus, PlacementPolicy, PlanningMethod};

// 领域实体
pub use domain::{
    DailyPlan, DateRange, Holiday, HolidayCalendar, Order, ProductionLine, RampUpCheckpoint,
    RampUpPlan, ScheduleSnapshot,
};

// 引擎
pub use engine::{
    CascadeExecutor, CascadeReport, OrderSplitter, OverlapDetector, PlacementOutcome,
    PlacementRequest, PlacementResolver, ProductionPlanCalculator, ScheduleApplier,
    ScheduleCommand,
};

// API
pub use api::{ApiError, ApiResult, ScheduleApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "成衣排产系统";
