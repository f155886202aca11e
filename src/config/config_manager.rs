// ==========================================
// 成衣排产系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: JSON 文件（扁平 key-value），环境变量 GARMENT_APS_* 覆写
// ==========================================

use crate::config::scheduling::{
    SchedulingConfig, DEFAULT_MAX_PLAN_DAYS, DEFAULT_SHIFT_MINUTES, DEFAULT_VISIBLE_WINDOW_DAYS,
};
use crate::domain::types::PlanningMethod;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误 ({path}): {message}")]
    FormatError { path: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ValueError {
        key: String,
        value: String,
        message: String,
    },
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: BTreeMap<String, String>,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建空配置（全部取默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文件加载配置
    ///
    /// 文件内容为扁平对象，值可以是字符串/数字/布尔：
    /// `{"shift_minutes": 480, "default_method": "rampup", "default_ramp_up_plan_id": "R1"}`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let parsed: JsonValue =
            serde_json::from_str(&raw).map_err(|e| ConfigError::FormatError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let object = parsed.as_object().ok_or_else(|| ConfigError::FormatError {
            path: path.display().to_string(),
            message: "顶层必须是 JSON 对象".to_string(),
        })?;

        let mut values = BTreeMap::new();
        for (key, value) in object {
            let text = match value {
                JsonValue::String(s) => s.clone(),
                JsonValue::Null => continue,
                other => other.to_string(),
            };
            values.insert(key.clone(), text);
        }

        tracing::debug!("已加载配置文件: {} ({} 项)", path.display(), values.len());

        Ok(Self {
            values,
            source: Some(path.to_path_buf()),
        })
    }

    /// 默认配置文件路径: <config_dir>/garment-aps/config.json
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("garment-aps").join("config.json"))
    }

    /// 加载默认路径的配置（文件不存在时返回空配置）
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::new()),
        }
    }

    /// 配置来源文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 应用环境变量覆写（GARMENT_APS_<KEY>）
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::vars())
    }

    /// 应用一组 (变量名, 值) 覆写；仅识别 GARMENT_APS_ 前缀的已知键
    pub fn with_overrides<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(suffix) = name.strip_prefix(config_keys::ENV_PREFIX) else {
                continue;
            };
            let key = suffix.to_lowercase();
            if config_keys::ALL.contains(&key.as_str()) {
                tracing::debug!("环境变量覆写配置: {}={}", key, value);
                self.values.insert(key, value);
            }
        }
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// 读取配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    fn parse_u32_or_default(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        match self.get_global_config_value(key) {
            None => Ok(default),
            Some(raw) => {
                let value = raw.trim().parse::<u32>().map_err(|e| ConfigError::ValueError {
                    key: key.to_string(),
                    value: raw.to_string(),
                    message: e.to_string(),
                })?;
                if value == 0 {
                    return Err(ConfigError::ValueError {
                        key: key.to_string(),
                        value: raw.to_string(),
                        message: "必须大于 0".to_string(),
                    });
                }
                Ok(value)
            }
        }
    }

    /// 组装排产参数
    pub fn get_scheduling_config(&self) -> Result<SchedulingConfig, ConfigError> {
        let default_method = match self.get_global_config_value(config_keys::DEFAULT_METHOD) {
            None => PlanningMethod::Capacity,
            Some(raw) => raw
                .parse::<PlanningMethod>()
                .map_err(|message| ConfigError::ValueError {
                    key: config_keys::DEFAULT_METHOD.to_string(),
                    value: raw.to_string(),
                    message,
                })?,
        };

        Ok(SchedulingConfig {
            shift_minutes: self
                .parse_u32_or_default(config_keys::SHIFT_MINUTES, DEFAULT_SHIFT_MINUTES)?,
            max_plan_days: self
                .parse_u32_or_default(config_keys::MAX_PLAN_DAYS, DEFAULT_MAX_PLAN_DAYS)?,
            visible_window_days: self.parse_u32_or_default(
                config_keys::VISIBLE_WINDOW_DAYS,
                DEFAULT_VISIBLE_WINDOW_DAYS,
            )?,
            default_method,
            default_ramp_up_plan_id: self
                .get_global_config_value(config_keys::DEFAULT_RAMP_UP_PLAN_ID)
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        })
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.values)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const ENV_PREFIX: &str = "GARMENT_APS_";

    // 爬坡法班次分钟数
    pub const SHIFT_MINUTES: &str = "shift_minutes";

    // 计算安全上限
    pub const MAX_PLAN_DAYS: &str = "max_plan_days";

    // 看板窗口
    pub const VISIBLE_WINDOW_DAYS: &str = "visible_window_days";

    // 默认排产方法
    pub const DEFAULT_METHOD: &str = "default_method";

    // 默认爬坡计划
    pub const DEFAULT_RAMP_UP_PLAN_ID: &str = "default_ramp_up_plan_id";

    pub const ALL: &[&str] = &[
        SHIFT_MINUTES,
        MAX_PLAN_DAYS,
        VISIBLE_WINDOW_DAYS,
        DEFAULT_METHOD,
        DEFAULT_RAMP_UP_PLAN_ID,
    ];
}
