//! 元素句柄 - 宿主平台 UI 节点的内存实现

use super::{escape_attr, is_void_tag, same_handler, DomEvent, Fragment, Handler, Node};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    style: IndexMap<String, String>,
    children: Vec<Node>,
    listeners: Vec<(String, Handler)>,
}

/// 元素句柄
///
/// 克隆只复制句柄，所有克隆指向同一个节点。重新渲染时原地修改，从不替换。
#[derive(Clone)]
pub struct Element(Rc<RefCell<ElementData>>);

impl Element {
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            tag: tag.to_string(),
            attributes: IndexMap::new(),
            style: IndexMap::new(),
            children: Vec::new(),
            listeners: Vec::new(),
        })))
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    /// 是否为同一个节点
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    pub fn attributes(&self) -> Vec<(String, String)> {
        self.0
            .borrow()
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn set_style(&self, property: &str, value: &str) {
        self.0
            .borrow_mut()
            .style
            .insert(property.to_string(), value.to_string());
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.0.borrow().style.get(property).cloned()
    }

    pub fn append_child(&self, node: Node) {
        self.0.borrow_mut().children.push(node);
    }

    pub fn append_fragment(&self, fragment: Fragment) {
        self.0.borrow_mut().children.extend(fragment.into_nodes());
    }

    /// 清空子节点（innerHTML = ""），属性和监听器保留
    pub fn clear_children(&self) {
        self.0.borrow_mut().children.clear();
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn child_elements(&self) -> Vec<Element> {
        self.0
            .borrow()
            .children
            .iter()
            .filter_map(|node| node.as_element().cloned())
            .collect()
    }

    pub fn add_event_listener(&self, event: &str, handler: Handler) {
        log::trace!("attach `{}` listener on <{}>", event, self.tag());
        self.0
            .borrow_mut()
            .listeners
            .push((event.to_string(), handler));
    }

    /// 按处理器身份移除，返回是否找到
    pub fn remove_event_listener(&self, event: &str, handler: &Handler) -> bool {
        let mut data = self.0.borrow_mut();
        let position = data
            .listeners
            .iter()
            .position(|(name, h)| name == event && same_handler(h, handler));
        match position {
            Some(index) => {
                data.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// 宿主输入事件入口，按挂载顺序调用监听器，返回调用数量
    pub fn dispatch_event(&self, event: &str, detail: JsonValue) -> usize {
        // 先复制一份，处理器内部可以自由修改监听器列表
        let handlers: Vec<Handler> = self
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, h)| h.clone())
            .collect();

        let dom_event = DomEvent {
            name: event.to_string(),
            target: self.clone(),
            detail,
        };
        for handler in &handlers {
            handler(&dom_event);
        }
        handlers.len()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in self.0.borrow().children.iter() {
            child.collect_text(&mut out);
        }
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub(crate) fn write_html(&self, out: &mut String) {
        let data = self.0.borrow();
        out.push('<');
        out.push_str(&data.tag);
        for (name, value) in &data.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
        }
        if !data.style.is_empty() {
            let style: Vec<String> = data
                .style
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            out.push_str(&format!(" style=\"{}\"", escape_attr(&style.join("; "))));
        }
        out.push('>');
        if is_void_tag(&data.tag) {
            return;
        }
        for child in &data.children {
            child.write_html(out);
        }
        out.push_str(&format!("</{}>", data.tag));
    }

    /// 深度优先查找属性匹配的后代元素（不含自身）
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<Element> {
        find_in_nodes(&self.0.borrow().children, name, value)
    }

    pub(crate) fn replace_marker_in_children(
        &self,
        name: &str,
        value: &str,
        replacement: &mut Option<Vec<Node>>,
    ) -> bool {
        replace_in_nodes(&mut self.0.borrow_mut().children, name, value, replacement)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => f
                .debug_struct("Element")
                .field("tag", &data.tag)
                .field("attributes", &data.attributes)
                .field("children", &data.children.len())
                .finish(),
            Err(_) => f.write_str("Element(<borrowed>)"),
        }
    }
}

pub(crate) fn find_in_nodes(nodes: &[Node], name: &str, value: &str) -> Option<Element> {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.attribute(name).as_deref() == Some(value) {
                return Some(element.clone());
            }
            if let Some(found) = element.find_by_attribute(name, value) {
                return Some(found);
            }
        }
    }
    None
}

/// 把第一个匹配的标记节点原地替换为 replacement 中的节点
pub(crate) fn replace_in_nodes(
    nodes: &mut Vec<Node>,
    name: &str,
    value: &str,
    replacement: &mut Option<Vec<Node>>,
) -> bool {
    for index in 0..nodes.len() {
        let element = match &nodes[index] {
            Node::Element(element) => element.clone(),
            Node::Text(_) => continue,
        };
        if element.attribute(name).as_deref() == Some(value) {
            let spliced = replacement.take().unwrap_or_default();
            nodes.splice(index..=index, spliced);
            return true;
        }
        if element.replace_marker_in_children(name, value, replacement) {
            return true;
        }
    }
    false
}
