// ==========================================
// 成衣排产系统 - 命令行入口
// ==========================================
// 用法:
//   garment-aps <snapshot.json> board [start] [days] [--csv out.csv]
//   garment-aps <snapshot.json> check
//   garment-aps <snapshot.json> place <order_id> <line_id> <date> [--policy before|after] [--rampup <plan_id>]
//   garment-aps <snapshot.json> split <order_id> <quantity>
//   garment-aps <snapshot.json> pending <order_id>
// 通用选项: --config <config.json>
// 日志: RUST_LOG 控制级别，GARMENT_APS_LOG_FORMAT=json 输出 JSON
// 变更类命令执行后回写快照文件
// ==========================================

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;

use garment_aps::api::PlaceOrderResult;
use garment_aps::app::{load_config, AppState};
use garment_aps::domain::types::PlacementPolicy;
use garment_aps::engine::PlacementRequest;
use garment_aps::report::write_board_csv;
use garment_aps::ScheduleSnapshot;

const USAGE: &str = "用法: garment-aps <snapshot.json> <board|check|place|split|pending> [参数...] [--config <config.json>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::var("GARMENT_APS_LOG_FORMAT").as_deref() {
        Ok("json") => garment_aps::logging::init_json(),
        _ => garment_aps::logging::init(),
    }

    let (args, options) = split_options(std::env::args().skip(1).collect())?;
    let mut args = args.into_iter();

    let snapshot_path = PathBuf::from(args.next().ok_or_else(|| anyhow!(USAGE))?);
    let command = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let rest: Vec<String> = args.collect();

    tracing::info!("{} v{} - {}", garment_aps::APP_NAME, garment_aps::VERSION, command);

    let config = load_config(options.config.as_deref())?;
    let state = AppState::new(&snapshot_path, config, None)?;

    match command.as_str() {
        "board" => run_board(&state, &rest, options.csv.as_deref()),
        "check" => run_check(&state),
        "place" => run_place(&state, &rest, &options).await,
        "split" => run_split(&state, &rest).await,
        "pending" => run_pending(&state, &rest).await,
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }
}

// ==========================================
// 命令实现
// ==========================================

fn run_board(state: &AppState, args: &[String], csv_path: Option<&Path>) -> anyhow::Result<()> {
    let snapshot = state.snapshot()?;
    let start = match args.first() {
        Some(raw) => parse_date(raw)?,
        None => default_board_start(&snapshot),
    };
    let days = args
        .get(1)
        .map(|raw| raw.parse::<u32>().with_context(|| format!("无效天数: {}", raw)))
        .transpose()?;

    let board = state.schedule_api.board(&snapshot, start, days)?;
    let rows = match csv_path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("无法创建文件: {}", path.display()))?;
            write_board_csv(&board, file)?
        }
        None => write_board_csv(&board, std::io::stdout().lock())?,
    };
    tracing::info!("看板窗口 {} 共 {} 行", board.window, rows);
    Ok(())
}

fn run_check(state: &AppState) -> anyhow::Result<()> {
    let snapshot = state.snapshot()?;
    let violations = state.schedule_api.check(&snapshot)?;
    if violations.is_empty() {
        println!("OK: {} 个已排订单均满足产能约束", snapshot.scheduled_count());
        return Ok(());
    }
    for v in &violations {
        println!(
            "超产: 产线 {} 日期 {} 已排 {} / 产能 {} (超出 {})",
            v.line_id,
            v.date,
            v.used,
            v.capacity,
            v.overflow()
        );
    }
    bail!("发现 {} 个超产单元格", violations.len())
}

async fn run_place(state: &AppState, args: &[String], options: &CliOptions) -> anyhow::Result<()> {
    let [order_id, line_id, date] = args else {
        bail!("用法: place <order_id> <line_id> <date> [--policy before|after] [--rampup <plan_id>]");
    };

    let target_date = parse_date(date)?;
    let request = match &options.rampup {
        Some(plan_id) => PlacementRequest::new(order_id, line_id, target_date).with_ramp_up(plan_id),
        None => state
            .schedule_api
            .default_request(order_id, line_id, target_date),
    };

    let snapshot = state.snapshot()?;
    match state
        .schedule_api
        .place_order(&snapshot, &request, options.policy)
        .await
    {
        Ok(PlaceOrderResult::PolicyRequired { overlapping }) => {
            println!("目标位置与以下已排订单重叠，请使用 --policy before|after 重新提交:");
            for order in &overlapping {
                if let Some(range) = order.date_range() {
                    println!("  {} {}", order.po_number, range);
                }
            }
            Ok(())
        }
        Ok(PlaceOrderResult::Applied { plan, report }) => {
            state.persist()?;
            println!("{}", serde_json::to_string_pretty(&plan.placements)?);
            println!("{}", report.summary());
            Ok(())
        }
        Err(e) => persist_partial(state, e.into()),
    }
}

async fn run_split(state: &AppState, args: &[String]) -> anyhow::Result<()> {
    let [order_id, quantity] = args else {
        bail!("用法: split <order_id> <quantity>");
    };
    let quantity: u32 = quantity
        .parse()
        .with_context(|| format!("无效数量: {}", quantity))?;

    let snapshot = state.snapshot()?;
    match state
        .schedule_api
        .split_order(&snapshot, order_id, quantity)
        .await
    {
        Ok(result) => {
            state.persist()?;
            println!(
                "拆单完成: {} ({} 件), 子单 id={}",
                result.plan.sibling.po_number,
                result.plan.split_quantity,
                result.sibling.map(|o| o.id).unwrap_or_default()
            );
            Ok(())
        }
        Err(e) => persist_partial(state, e.into()),
    }
}

async fn run_pending(state: &AppState, args: &[String]) -> anyhow::Result<()> {
    let [order_id] = args else {
        bail!("用法: pending <order_id>");
    };
    let snapshot = state.snapshot()?;
    match state.schedule_api.move_to_pending(&snapshot, order_id).await {
        Ok(report) => {
            state.persist()?;
            println!("{}", report.summary());
            Ok(())
        }
        Err(e) => persist_partial(state, e.into()),
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 级联部分生效时同样回写，保证文件与已执行步骤一致
fn persist_partial(state: &AppState, err: anyhow::Error) -> anyhow::Result<()> {
    if let Err(save_err) = state.persist() {
        tracing::error!("回写快照失败: {}", save_err);
    }
    Err(err)
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("无效日期: {}", raw))
}

/// 看板默认起始日: 最早的计划开始日，无已排订单时取今天
fn default_board_start(snapshot: &ScheduleSnapshot) -> NaiveDate {
    snapshot
        .orders
        .iter()
        .filter_map(|o| o.plan_start_date)
        .min()
        .unwrap_or_else(|| chrono::Local::now().date_naive())
}

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    csv: Option<PathBuf>,
    policy: Option<PlacementPolicy>,
    rampup: Option<String>,
}

/// 拆分位置参数与 `--key value` 选项
fn split_options(raw: Vec<String>) -> anyhow::Result<(Vec<String>, CliOptions)> {
    let mut positional = Vec::new();
    let mut options = CliOptions::default();
    let mut iter = raw.into_iter();

    while let Some(arg) = iter.next() {
        let Some(name) = arg.strip_prefix("--") else {
            positional.push(arg);
            continue;
        };
        let value = iter
            .next()
            .ok_or_else(|| anyhow!("选项 --{} 缺少取值", name))?;
        match name {
            "config" => options.config = Some(PathBuf::from(value)),
            "csv" => options.csv = Some(PathBuf::from(value)),
            "policy" => {
                options.policy = Some(value.parse::<PlacementPolicy>().map_err(|e| anyhow!(e))?)
            }
            "rampup" => options.rampup = Some(value),
            other => bail!("未知选项: --{}", other),
        }
    }

    Ok((positional, options))
}
