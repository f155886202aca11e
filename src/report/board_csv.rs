// ==========================================
// 成衣排产系统 - 看板 CSV 导出
// ==========================================
// 列: line_id,line_name,date,holiday,capacity,used,available,orders
// orders 列格式: `PO号:件数`，多单以 `;` 分隔
// ==========================================

use crate::engine::board::{BoardCell, BoardView};
use std::io::Write;

pub const BOARD_CSV_HEADERS: [&str; 8] = [
    "line_id",
    "line_name",
    "date",
    "holiday",
    "capacity",
    "used",
    "available",
    "orders",
];

/// 将看板逐单元格写出为 CSV
///
/// # 返回
/// 写出的数据行数（不含表头）
pub fn write_board_csv<W: Write>(board: &BoardView, writer: W) -> anyhow::Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(BOARD_CSV_HEADERS)?;

    let mut rows = 0;
    for row in &board.rows {
        for cell in &row.cells {
            csv_writer.write_record([
                row.line_id.clone(),
                row.line_name.clone(),
                cell.date.format("%Y-%m-%d").to_string(),
                cell.holiday.to_string(),
                cell.capacity.to_string(),
                cell.used.to_string(),
                cell.available.to_string(),
                format_cell_orders(cell),
            ])?;
            rows += 1;
        }
    }

    csv_writer.flush()?;
    tracing::debug!("看板 CSV 导出完成: {} 行", rows);
    Ok(rows)
}

fn format_cell_orders(cell: &BoardCell) -> String {
    cell.orders
        .iter()
        .map(|o| format!("{}:{}", o.po_number, o.quantity))
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::line::ProductionLine;
    use crate::domain::order::{DailyPlan, Order};
    use crate::domain::snapshot::ScheduleSnapshot;
    use crate::engine::board::BoardBuilder;
    use chrono::NaiveDate;

    #[test]
    fn test_write_board_csv() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut order = Order::new_pending("o1", "PO-1", 80, 1.0, 1).unwrap();
        let plan: DailyPlan = [(day, 80)].into_iter().collect();
        order.assign_plan("L1", day, day, plan);

        let snapshot = ScheduleSnapshot {
            orders: vec![order],
            lines: vec![ProductionLine::new("L1", "Line 1", 100).unwrap()],
            ..Default::default()
        };
        let board = BoardBuilder::new(&snapshot).build(day, 2).unwrap();

        let mut buf = Vec::new();
        let rows = write_board_csv(&board, &mut buf).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "line_id,line_name,date,holiday,capacity,used,available,orders");
        assert_eq!(lines[1], "L1,Line 1,2026-03-02,false,100,80,20,PO-1:80");
        assert_eq!(lines[2], "L1,Line 1,2026-03-03,false,100,0,100,");
    }
}
