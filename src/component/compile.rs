//! 模板编译和占位替换
//!
//! 子组件和列表先以占位标记进入模板，模板引擎不会深入子组件内部；
//! 解析成节点后再把标记原地换成子组件的元素或列表内容。
//! 普通数据转义后写入，解析时还原，值里的 `<` 或引号不会变成标记。

use super::{Component, PropsSnapshot};
use crate::dom::{escape_attr, Fragment, Node};
use crate::error::Result;
use crate::parser::TemplateEngine;
use crate::props::{ListItem, PropValue};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

impl Component {
    /// 用给定属性编译模板，子组件必须已经渲染过
    pub fn compile_with(&self, template: &str, props: &PropsSnapshot) -> Result<Fragment> {
        let config = self.runtime().config();
        let children = self.0.children.snapshot();
        let lists = self.0.lists.snapshot();

        let data: Map<String, JsonValue> = props
            .iter()
            .filter_map(|(key, value)| match value {
                PropValue::Data(value) => Some((key.clone(), value.clone())),
                PropValue::Events(_) => None,
            })
            .collect();
        let data = JsonValue::Object(data);

        // 占位标记原样写入，数据值一律转义
        let mut stubs: HashMap<&str, String> = HashMap::new();
        for (key, child) in &children {
            let stub = format!("<div {}=\"{}\"></div>", config.id_attribute, child.id());
            stubs.insert(key.as_str(), stub);
        }
        for key in lists.keys() {
            let stub = format!("<div {}=\"{}\"></div>", config.list_attribute, key);
            stubs.insert(key.as_str(), stub);
        }

        let markup = TemplateEngine::render_with(template, |expr| match stubs.get(expr) {
            Some(stub) => stub.clone(),
            None => escape_attr(&TemplateEngine::evaluate_expression(expr, &data)),
        });
        let mut fragment = Fragment::parse(&markup)?;

        for (key, child) in &children {
            let content = child.get_content()?;
            if !fragment.replace_marker(
                &config.id_attribute,
                child.id().as_str(),
                vec![Node::Element(content)],
            ) {
                log::trace!("component {}: no stub for child `{}`", self.id(), key);
            }
        }

        for (key, items) in &lists {
            let nodes = items
                .iter()
                .map(|item| match item {
                    ListItem::Component(component) => component.get_content().map(Node::Element),
                    ListItem::Text(text) => Ok(Node::Text(text.clone())),
                })
                .collect::<Result<Vec<_>>>()?;
            if !fragment.replace_marker(&config.list_attribute, key, nodes) {
                log::trace!("component {}: no stub for list `{}`", self.id(), key);
            }
        }

        Ok(fragment)
    }
}
