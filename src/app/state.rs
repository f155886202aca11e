// ==========================================
// 成衣排产系统 - 应用状态
// ==========================================
// 职责: 组装配置、快照存储与排产 API
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::api::ScheduleApi;
use crate::app::memory_store::InMemoryScheduleStore;
use crate::config::{ConfigManager, SchedulingConfig};
use crate::domain::snapshot::ScheduleSnapshot;
use crate::engine::{ScheduleApplier, ScheduleEventPublisher};

/// 应用状态
pub struct AppState {
    /// 快照文件路径（变更后回写）
    pub snapshot_path: PathBuf,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 排产参数
    pub scheduling: SchedulingConfig,

    /// 内存快照存储（ScheduleApplier 实现）
    pub store: Arc<InMemoryScheduleStore>,

    /// 排产 API
    pub schedule_api: Arc<ScheduleApi>,
}

impl AppState {
    /// 创建应用状态
    ///
    /// # 参数
    /// - `snapshot_path`: JSON 快照文件
    /// - `config_manager`: 已加载并应用覆写的配置
    /// - `event_publisher`: 可选的事件发布者
    pub fn new(
        snapshot_path: &Path,
        config_manager: ConfigManager,
        event_publisher: Option<Arc<dyn ScheduleEventPublisher>>,
    ) -> anyhow::Result<Self> {
        tracing::info!("初始化AppState，快照路径: {}", snapshot_path.display());

        let scheduling = config_manager
            .get_scheduling_config()
            .context("排产参数加载失败")?;
        scheduling
            .validate()
            .map_err(|msg| anyhow::anyhow!("排产参数无效: {}", msg))?;

        let store = Arc::new(InMemoryScheduleStore::load(snapshot_path)?);
        let applier: Arc<dyn ScheduleApplier> = store.clone();

        let mut api = ScheduleApi::new(applier, scheduling.clone());
        if let Some(publisher) = event_publisher {
            api = api.with_event_publisher(publisher);
        }

        tracing::info!(
            "AppState初始化成功: shift_minutes={}, max_plan_days={}, visible_window_days={}",
            scheduling.shift_minutes,
            scheduling.max_plan_days,
            scheduling.visible_window_days
        );

        Ok(Self {
            snapshot_path: snapshot_path.to_path_buf(),
            config_manager: Arc::new(config_manager),
            scheduling,
            store,
            schedule_api: Arc::new(api),
        })
    }

    /// 当前快照
    pub fn snapshot(&self) -> anyhow::Result<ScheduleSnapshot> {
        Ok(self.store.snapshot()?)
    }

    /// 回写快照文件
    pub fn persist(&self) -> anyhow::Result<()> {
        self.store.save(&self.snapshot_path)
    }
}

/// 加载配置: 指定文件优先，否则默认路径；随后应用 GARMENT_APS_* 环境变量
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<ConfigManager> {
    let manager = match explicit {
        Some(path) => ConfigManager::load(path)?,
        None => ConfigManager::load_default()?,
    };
    if let Some(source) = manager.source() {
        tracing::info!("使用配置文件: {}", source.display());
    }
    Ok(manager.with_env_overrides())
}
