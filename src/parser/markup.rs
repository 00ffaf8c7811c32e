//! 标记解析器 - 把模板编译后的文本解析成元素树

use crate::dom::{is_void_tag, Element, Node};
use crate::error::{Error, Result};

/// 可识别的字符实体
const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

/// 标记解析器
pub struct MarkupParser {
    input: Vec<char>,
    pos: usize,
}

impl MarkupParser {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// 顶层首尾的空白文本被丢弃，元素之间的空白保留
    pub fn parse(&mut self) -> Result<Vec<Node>> {
        let mut nodes = self.parse_nodes()?;
        if self.pos < self.input.len() {
            return Err(Error::Markup(format!(
                "unexpected closing tag at offset {}",
                self.pos
            )));
        }

        let is_blank = |node: &Node| matches!(node, Node::Text(text) if text.trim().is_empty());
        while nodes.last().is_some_and(is_blank) {
            nodes.pop();
        }
        let leading = nodes.iter().take_while(|node| is_blank(*node)).count();
        nodes.drain(..leading);
        Ok(nodes)
    }

    fn parse_nodes(&mut self) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        while self.pos < self.input.len() {
            if self.starts_with("<!--") {
                self.skip_comment();
            } else if self.current_char() == '<' {
                if self.starts_with("</") {
                    break; // 结束标签，返回上层
                }
                nodes.push(Node::Element(self.parse_element()?));
            } else {
                let text = self.parse_text();
                // 注释两侧的文本合并成一个节点
                match nodes.last_mut() {
                    Some(Node::Text(previous)) => previous.push_str(&text),
                    _ => nodes.push(Node::Text(text)),
                }
            }
        }

        Ok(nodes)
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect('<')?;

        let tag_name = self.parse_name();
        if tag_name.is_empty() {
            return Err(Error::Markup(format!("empty tag name at offset {}", self.pos)));
        }

        let element = Element::new(&tag_name);

        loop {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                return Err(Error::Markup(format!("unterminated tag <{}>", tag_name)));
            }
            if self.current_char() == '>' || self.starts_with("/>") {
                break;
            }

            let (name, value) = self.parse_attribute()?;
            element.set_attribute(&name, &value);
        }

        // 自闭合标签
        if self.starts_with("/>") {
            self.pos += 2;
            return Ok(element);
        }

        self.expect('>')?;

        if is_void_tag(&tag_name) {
            return Ok(element);
        }

        for child in self.parse_nodes()? {
            element.append_child(child);
        }

        if !self.starts_with("</") {
            return Err(Error::Markup(format!("missing closing tag for <{}>", tag_name)));
        }
        self.pos += 2;
        let end_tag = self.parse_name();
        if end_tag != tag_name {
            return Err(Error::Markup(format!(
                "mismatched tags: {} vs {}",
                tag_name, end_tag
            )));
        }
        self.skip_whitespace();
        self.expect('>')?;

        Ok(element)
    }

    fn parse_name(&mut self) -> String {
        let mut name = String::new();
        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '.' {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        name
    }

    fn parse_attribute(&mut self) -> Result<(String, String)> {
        let name = self.parse_name();
        if name.is_empty() {
            return Err(Error::Markup(format!(
                "invalid attribute character '{}' at offset {}",
                self.current_char(),
                self.pos
            )));
        }

        self.skip_whitespace();

        if self.current_char() != '=' {
            return Ok((name, String::new()));
        }

        self.pos += 1; // skip '='
        self.skip_whitespace();

        Ok((name, self.parse_attribute_value()))
    }

    fn parse_attribute_value(&mut self) -> String {
        let quote = self.current_char();
        if quote != '"' && quote != '\'' {
            // 无引号值
            let mut value = String::new();
            while self.pos < self.input.len() {
                let c = self.current_char();
                if c.is_whitespace() || c == '>' || self.starts_with("/>") {
                    break;
                }
                value.push(c);
                self.pos += 1;
            }
            return decode_entities(&value);
        }

        self.pos += 1;

        let mut value = String::new();
        while self.pos < self.input.len() && self.current_char() != quote {
            value.push(self.current_char());
            self.pos += 1;
        }

        if self.pos < self.input.len() {
            self.pos += 1;
        }

        decode_entities(&value)
    }

    fn parse_text(&mut self) -> String {
        let mut text = String::new();
        while self.pos < self.input.len() && self.current_char() != '<' {
            text.push(self.current_char());
            self.pos += 1;
        }
        decode_entities(&text)
    }

    fn skip_comment(&mut self) {
        self.pos += 4;
        while self.pos < self.input.len() && !self.starts_with("-->") {
            self.pos += 1;
        }
        self.pos = (self.pos + 3).min(self.input.len());
    }

    fn current_char(&self) -> char {
        self.input.get(self.pos).copied().unwrap_or('\0')
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.current_char().is_whitespace() {
            self.pos += 1;
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.input.get(self.pos + i) == Some(&c))
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.current_char() == c {
            self.pos += 1;
            Ok(())
        } else {
            Err(Error::Markup(format!(
                "expected '{}', got '{}'",
                c,
                self.current_char()
            )))
        }
    }
}

/// 单遍解码，`&amp;lt;` 只还原一层
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
