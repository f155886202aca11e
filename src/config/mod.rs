// ==========================================
// 成衣排产系统 - 配置层
// ==========================================
// 职责: 排产常量的加载与覆写（文件 + 环境变量）
// ==========================================

pub mod config_manager;
pub mod scheduling;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigError, ConfigManager};
pub use scheduling::SchedulingConfig;
