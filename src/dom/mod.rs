//! 渲染目标 - 内存中的元素树
//!
//! 运行时只需要宿主平台提供：按标签创建元素、替换内容、设置属性、
//! 挂载/移除事件监听器。这里用 `Rc<RefCell<..>>` 句柄实现这组能力。

mod element;

pub use element::Element;

use crate::error::Result;
use crate::parser::MarkupParser;
use serde_json::Value as JsonValue;
use std::rc::Rc;

/// 事件处理器，以 Rc 身份区分
pub type Handler = Rc<dyn Fn(&DomEvent)>;

/// 宿主输入事件
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub name: String,
    pub target: Element,
    pub detail: JsonValue,
}

/// 把闭包包装成 [`Handler`]
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&DomEvent) + 'static,
{
    Rc::new(f)
}

/// 处理器身份比较
pub fn same_handler(a: &Handler, b: &Handler) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// 元素树节点
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn text(content: &str) -> Self {
        Node::Text(content.to_string())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => out.push_str(&element.text_content()),
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(element) => element.write_html(out),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// 编译产物：一组有序的顶层节点（相当于 template.content）
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    nodes: Vec<Node>,
}

impl Fragment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// 解析标记文本
    pub fn parse(markup: &str) -> Result<Self> {
        let nodes = MarkupParser::new(markup).parse()?;
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.collect_text(&mut out);
        }
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }

    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<Element> {
        element::find_in_nodes(&self.nodes, name, value)
    }

    /// 找到 `name="value"` 的标记元素，用 replacement 原地替换。
    /// 没有找到标记时返回 false，replacement 被丢弃。
    pub fn replace_marker(&mut self, name: &str, value: &str, replacement: Vec<Node>) -> bool {
        let mut replacement = Some(replacement);
        element::replace_in_nodes(&mut self.nodes, name, value, &mut replacement)
    }
}

/// 没有结束标签的 HTML 元素
const VOID_TAGS: &[&str] = &["input", "img", "br", "hr", "meta", "link"];

pub(crate) fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag.to_ascii_lowercase().as_str())
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// 转义 `& < > " '`，结果可以放进文本或引号内的属性值
pub(crate) fn escape_attr(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
