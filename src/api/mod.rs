// ==========================================
// 成衣排产系统 - API 层
// ==========================================
// 职责: 面向命令行/界面的排产业务接口
// ==========================================

pub mod error;
pub mod schedule_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use schedule_api::{PlaceOrderResult, ScheduleApi, SplitOrderResult};
