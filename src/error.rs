//! 运行时错误类型

use thiserror::Error;

/// 组件运行时错误
#[derive(Debug, Error)]
pub enum Error {
    /// 属性键只能新增或覆盖，不能删除
    #[error("no access: property `{key}` cannot be removed")]
    AccessViolation { key: String },

    /// render / mount / update 钩子内部抛出的错误
    #[error("render fault in component {component}: {message}")]
    RenderFault { component: String, message: String },

    /// INIT 之前访问元素
    #[error("element of component {component} is not created yet")]
    ElementUnavailable { component: String },

    #[error("markup error: {0}")]
    Markup(String),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// 钩子中构造 RenderFault 的便捷方法
    pub fn render_fault(component: impl ToString, message: impl Into<String>) -> Self {
        Error::RenderFault {
            component: component.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
