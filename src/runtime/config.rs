//! 运行时配置结构体

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// 运行时配置，对应 JSON 配置文件
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeConfig {
    /// 把每个组件的 id 写到它的元素上
    pub expose_ids: bool,
    /// id 暴露和子组件占位标记共用的属性名
    pub id_attribute: String,
    /// 列表占位标记的属性名
    pub list_attribute: String,
    /// 未指定标签时使用的标签
    pub default_tag: String,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            expose_ids: false,
            id_attribute: "data-id".to_string(),
            list_attribute: "data-list".to_string(),
            default_tag: "div".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
