//! Mini Component - 组件化 UI 渲染运行时
//! 把树状组件挂到元素树上，跟踪内部状态，状态变化时重新渲染

mod error;

pub use error::{Error, Result};

// 事件总线
pub mod event;

// 属性拦截层
pub mod props;

// 渲染目标（元素树）
pub mod dom;

// 标记解析器和模板引擎
pub mod parser;

// 组件与生命周期
pub mod component;

// 运行时上下文、配置、日志
pub mod runtime;

pub use component::{
    Component, ComponentBuilder, ComponentId, LifecycleEvent, LifecycleState, PropsSnapshot,
};
pub use dom::{handler, DomEvent, Element, Fragment, Handler, Node};
pub use event::EventBus;
pub use props::{events, partition, EventMap, ListItem, ObservableBag, Prop, PropValue};
pub use runtime::{init_logging, IdIssuer, Runtime, RuntimeConfig, SequentialIds, UuidIssuer};

// 单元测试
#[cfg(test)]
mod tests;
