// ==========================================
// 成衣排产系统 - 应用层
// ==========================================
// 职责: 快照存储与应用状态组装
// ==========================================

pub mod memory_store;
pub mod state;

// 重导出
pub use memory_store::InMemoryScheduleStore;
pub use state::{load_config, AppState};
