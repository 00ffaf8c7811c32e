//! 标记解析器和模板引擎

pub mod markup;
pub mod template;

pub use markup::MarkupParser;
pub use template::TemplateEngine;
