//! 模板引擎 - 处理 {{}} 数据绑定

use serde_json::Value as JsonValue;

/// 模板引擎
///
/// 纯函数：模板字符串 + 扁平数据 → 标记字符串。不支持条件和循环。
pub struct TemplateEngine;

impl TemplateEngine {
    /// 渲染模板，替换 {{}} 表达式
    pub fn render(template: &str, data: &JsonValue) -> String {
        Self::render_with(template, |expr| Self::evaluate_expression(expr, data))
    }

    /// 渲染模板，每个 {{}} 的输出由 `resolve` 决定（参数是去掉首尾空白的表达式）
    pub fn render_with<F>(template: &str, mut resolve: F) -> String
    where
        F: FnMut(&str) -> String,
    {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            let Some(close) = rest[open..].find("}}") else {
                break;
            };
            let close = open + close;
            result.push_str(&rest[..open]);
            result.push_str(&resolve(rest[open + 2..close].trim()));
            rest = &rest[close + 2..];
        }

        result.push_str(rest);
        result
    }

    /// 计算表达式
    pub fn evaluate_expression(expr: &str, data: &JsonValue) -> String {
        let expr = expr.trim();

        // 字符串字面量
        if expr.len() >= 2
            && ((expr.starts_with('\'') && expr.ends_with('\''))
                || (expr.starts_with('"') && expr.ends_with('"')))
        {
            return expr[1..expr.len() - 1].to_string();
        }

        // 数字字面量
        if expr.parse::<f64>().is_ok() {
            return expr.to_string();
        }

        Self::get_value(expr, data)
            .map(Self::json_to_string)
            .unwrap_or_default()
    }

    /// 获取数据值，支持 a.b 和 a[0]
    pub fn get_value<'a>(path: &str, data: &'a JsonValue) -> Option<&'a JsonValue> {
        let mut current = data;

        for part in path.split('.') {
            if let Some(bracket_pos) = part.find('[') {
                let name = &part[..bracket_pos];
                let index_str = part[bracket_pos + 1..].trim_end_matches(']');

                if !name.is_empty() {
                    current = current.get(name)?;
                }

                current = current.get(index_str.parse::<usize>().ok()?)?;
            } else {
                current = current.get(part)?;
            }
        }

        Some(current)
    }

    pub fn json_to_string(value: &JsonValue) -> String {
        match value {
            JsonValue::String(s) => s.clone(),
            JsonValue::Number(n) => n.to_string(),
            JsonValue::Bool(b) => b.to_string(),
            JsonValue::Null => String::new(),
            _ => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interpolation() {
        let data = json!({ "label": "Hi", "count": 3, "user": { "name": "Ann" }, "tags": ["x", "y"] });

        assert_eq!(TemplateEngine::render("<span>{{label}}</span>", &data), "<span>Hi</span>");
        assert_eq!(TemplateEngine::render("{{ count }} of {{user.name}}", &data), "3 of Ann");
        assert_eq!(TemplateEngine::render("{{tags[1]}}", &data), "y");
    }

    #[test]
    fn test_missing_and_literals() {
        let data = json!({});

        assert_eq!(TemplateEngine::render("[{{nothing}}]", &data), "[]");
        assert_eq!(TemplateEngine::render("{{'lit'}} {{42}}", &data), "lit 42");
        assert_eq!(TemplateEngine::render("open {{ never", &data), "open {{ never");
    }

    #[test]
    fn test_render_with_resolver() {
        let out = TemplateEngine::render_with("<p>{{ a }}|{{b}}</p>", |expr| expr.to_uppercase());
        assert_eq!(out, "<p>A|B</p>");
    }
}
