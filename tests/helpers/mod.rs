// ==========================================
// 集成测试辅助模块
// ==========================================

#![allow(dead_code)]

pub mod order_builder;
pub mod test_appliers;
