// ==========================================
// 成衣排产系统 - 报表导出
// ==========================================

pub mod board_csv;

pub use board_csv::{write_board_csv, BOARD_CSV_HEADERS};
