// ==========================================
// 成衣排产系统 - 产线领域模型
// ==========================================
// 产线日产能在单次排产操作内不可变
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionLine {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub capacity: u32, // 日产能 (件/天)
}

impl ProductionLine {
    pub fn new(id: &str, name: &str, capacity: u32) -> DomainResult<Self> {
        let line = Self {
            id: id.to_string(),
            name: name.to_string(),
            capacity,
        };
        line.validate()?;
        Ok(line)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.id.trim().is_empty() {
            return Err(DomainError::field("ProductionLine", "id", "不能为空"));
        }
        if self.capacity == 0 {
            return Err(DomainError::field(
                "ProductionLine",
                "capacity",
                format!("产线 {} 日产能必须大于 0", self.id),
            ));
        }
        Ok(())
    }

    /// 展示名（无名称时回退到 id）
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
