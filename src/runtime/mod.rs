//! 组件运行时上下文
//!
//! 持有配置和 id 发放器，构造组件时显式传入，不依赖全局状态。

mod config;

pub use config::RuntimeConfig;

use crate::component::{Component, ComponentId};
use crate::dom::{Element, Node};
use crate::error::Result;
use std::cell::Cell;
use std::rc::Rc;

/// 组件 id 发放器
pub trait IdIssuer {
    fn issue(&self) -> ComponentId;
}

/// 随机 uuid v4，默认实现
#[derive(Debug, Default)]
pub struct UuidIssuer;

impl IdIssuer for UuidIssuer {
    fn issue(&self) -> ComponentId {
        ComponentId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// 运行时内的单调计数器，id 可预测，适合测试
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: Cell::new(1),
        }
    }
}

impl IdIssuer for SequentialIds {
    fn issue(&self) -> ComponentId {
        let n = self.next.get();
        self.next.set(n + 1);
        ComponentId::new(format!("{}-{}", self.prefix, n))
    }
}

struct RuntimeInner {
    config: RuntimeConfig,
    ids: Box<dyn IdIssuer>,
}

/// 运行时上下文，克隆成本很低
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_ids(config, UuidIssuer)
    }

    pub fn with_ids<I>(config: RuntimeConfig, ids: I) -> Self
    where
        I: IdIssuer + 'static,
    {
        Self {
            inner: Rc::new(RuntimeInner {
                config,
                ids: Box::new(ids),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn issue_id(&self) -> ComponentId {
        self.inner.ids.issue()
    }

    /// 把组件挂到根元素下并触发 MOUNT
    pub fn mount(&self, root: &Element, component: &Component) -> Result<()> {
        root.append_child(Node::Element(component.get_content()?));
        log::debug!("mounted component {} under <{}>", component.id(), root.tag());
        component.dispatch_component_did_mount()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

/// 初始化日志系统，RUST_LOG 优先，否则使用配置里的级别
pub fn init_logging(level: &str) {
    let parsed = level.parse::<log::LevelFilter>().ok();
    let _ = env_logger::Builder::new()
        .filter_level(parsed.unwrap_or(log::LevelFilter::Warn))
        .parse_default_env()
        .try_init();
    if parsed.is_none() {
        log::warn!("unknown log level `{}`, using warn", level);
    }
}
