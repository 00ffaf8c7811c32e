//! 模板编译单元测试
//! 测试占位替换、列表拼接和缺失占位

use super::{test_runtime, test_runtime_with};
use crate::{Component, ListItem, Node, RuntimeConfig};
use serde_json::json;

/// 取 fragment 第一个元素
fn first_element(fragment: &crate::Fragment) -> crate::Element {
    fragment.nodes()[0].as_element().cloned().unwrap()
}

/// 测试基本数据绑定
#[test]
fn test_compile_plain_props() {
    let runtime = test_runtime();
    let component = Component::builder("div")
        .prop("label", "Hi")
        .build(&runtime)
        .unwrap();

    let fragment = component.compile("<span>{{label}}</span>").unwrap();

    assert_eq!(fragment.text_content(), "Hi");
    assert_eq!(first_element(&fragment).tag(), "span");
}

/// 测试显式传入的属性优先于自身属性
#[test]
fn test_compile_with_explicit_props() {
    let runtime = test_runtime();
    let component = Component::builder("div")
        .prop("label", "own")
        .build(&runtime)
        .unwrap();

    let mut props = component.props().snapshot();
    props.insert("label".to_string(), crate::PropValue::Data(json!("given")));
    let fragment = component.compile_with("<i>{{label}}</i>", &props).unwrap();

    assert_eq!(fragment.text_content(), "given");
}

/// 测试子组件占位被替换为子组件的活元素（按身份比较）
#[test]
fn test_child_stub_replaced_by_live_element() {
    let runtime = test_runtime();
    let child = Component::builder("b")
        .template("{{name}}")
        .prop("name", "inner")
        .build(&runtime)
        .unwrap();
    let parent = Component::builder("section")
        .child("child", child.clone())
        .build(&runtime)
        .unwrap();

    let fragment = parent.compile("<div>{{child}}</div>").unwrap();
    let div = first_element(&fragment);
    let children = div.children();

    assert_eq!(children.len(), 1);
    let inserted = children[0].as_element().unwrap();
    assert!(inserted.ptr_eq(&child.get_content().unwrap()));
    assert_eq!(fragment.text_content(), "inner");
    assert!(fragment.find_by_attribute("data-id", child.id().as_str()).is_none());
}

/// 测试模板引擎看不到子组件的属性
#[test]
fn test_child_props_do_not_leak_into_parent_template() {
    let runtime = test_runtime();
    let child = Component::builder("span")
        .prop("secret", "x")
        .build(&runtime)
        .unwrap();
    let parent = Component::builder("div")
        .child("child", child)
        .build(&runtime)
        .unwrap();

    let fragment = parent.compile("<p>{{secret}}</p>{{child}}").unwrap();
    assert_eq!(fragment.nodes()[0].as_element().unwrap().text_content(), "");
}

/// 测试列表按顺序拼接字符串项
#[test]
fn test_list_items_in_order() {
    let runtime = test_runtime();
    let component = Component::builder("div")
        .list("items", ["A", "B", "C"])
        .build(&runtime)
        .unwrap();

    let fragment = component.compile("<ul>{{items}}</ul>").unwrap();
    let ul = first_element(&fragment);
    let texts: Vec<String> = ul
        .children()
        .iter()
        .map(|node| match node {
            Node::Text(text) => text.clone(),
            Node::Element(element) => element.to_html(),
        })
        .collect();

    assert_eq!(texts, vec!["A", "B", "C"]);
    assert_eq!(ul.text_content(), "ABC");
}

/// 测试列表顺序变化时输出顺序同步变化
#[test]
fn test_reordered_list_reorders_output() {
    let runtime = test_runtime();
    let component = Component::builder("div")
        .template("<ul>{{items}}</ul>")
        .list("items", ["A", "B", "C"])
        .build(&runtime)
        .unwrap();

    component
        .set_props([(
            "items",
            crate::Prop::List(vec!["C".into(), "A".into(), "B".into()]),
        )])
        .unwrap();

    assert_eq!(component.get_content().unwrap().text_content(), "CAB");
}

/// 测试列表中的组件贡献自己的元素
#[test]
fn test_list_with_components() {
    let runtime = test_runtime();
    let first = Component::builder("li")
        .template("one")
        .build(&runtime)
        .unwrap();
    let second = Component::builder("li")
        .template("two")
        .build(&runtime)
        .unwrap();
    let list = Component::builder("div")
        .list(
            "rows",
            vec![
                ListItem::from(first.clone()),
                ListItem::from("-"),
                ListItem::from(second.clone()),
            ],
        )
        .build(&runtime)
        .unwrap();

    let fragment = list.compile("<ol>{{rows}}</ol>").unwrap();
    let ol = first_element(&fragment);
    let nodes = ol.children();

    assert_eq!(nodes.len(), 3);
    assert!(nodes[0].as_element().unwrap().ptr_eq(&first.get_content().unwrap()));
    assert!(matches!(&nodes[1], Node::Text(t) if t == "-"));
    assert!(nodes[2].as_element().unwrap().ptr_eq(&second.get_content().unwrap()));
    assert_eq!(ol.to_html(), "<ol><li>one</li>-<li>two</li></ol>");
}

/// 测试模板里没有占位时静默忽略
#[test]
fn test_missing_stub_is_ignored() {
    let runtime = test_runtime();
    let child = Component::builder("span")
        .template("hidden")
        .build(&runtime)
        .unwrap();
    let parent = Component::builder("div")
        .child("child", child)
        .list("items", ["x"])
        .build(&runtime)
        .unwrap();

    let fragment = parent.compile("<p>only text</p>").unwrap();
    assert_eq!(fragment.to_html(), "<p>only text</p>");
}

/// 测试自定义占位属性名
#[test]
fn test_custom_marker_attributes() {
    let config = RuntimeConfig {
        id_attribute: "data-cid".to_string(),
        list_attribute: "data-slot".to_string(),
        ..RuntimeConfig::default()
    };
    let runtime = test_runtime_with(config);
    let child = Component::builder("em")
        .template("c")
        .build(&runtime)
        .unwrap();
    let parent = Component::builder("div")
        .template("<p>{{child}}|{{items}}</p>")
        .child("child", child)
        .list("items", ["1", "2"])
        .build(&runtime)
        .unwrap();

    assert_eq!(
        parent.get_content().unwrap().to_html(),
        "<div><p><em>c</em>|12</p></div>"
    );
}

/// 测试编译产生非法标记时返回错误
#[test]
fn test_malformed_markup_is_error() {
    let runtime = test_runtime();
    let component = Component::builder("div").build(&runtime).unwrap();

    let err = component.compile("<p><span></p>").unwrap_err();
    assert!(matches!(err, crate::Error::Markup(_)));
}

/// 测试数据里的 `<` 作为文本输出，不影响解析
#[test]
fn test_data_with_angle_bracket_is_text() {
    let runtime = test_runtime();
    let component = Component::builder("span")
        .template("<p>{{label}}</p>")
        .prop("label", "1 < 2")
        .build(&runtime)
        .unwrap();

    let element = component.get_content().unwrap();
    assert_eq!(element.text_content(), "1 < 2");
    assert_eq!(element.to_html(), "<span><p>1 &lt; 2</p></span>");

    component.set_prop("label", "a > b & c").unwrap();
    assert_eq!(element.text_content(), "a > b & c");
}

/// 测试数据里的标签不会变成元素
#[test]
fn test_data_cannot_inject_elements() {
    let runtime = test_runtime();
    let component = Component::builder("div")
        .template("<p>{{label}}</p>")
        .prop("label", "<b>bold</b>")
        .build(&runtime)
        .unwrap();

    let p = component.get_content().unwrap().child_elements()[0].clone();
    assert!(p.child_elements().is_empty());
    assert_eq!(p.text_content(), "<b>bold</b>");
    assert_eq!(p.to_html(), "<p>&lt;b&gt;bold&lt;/b&gt;</p>");
}

/// 测试引号属性值里的引号
#[test]
fn test_quotes_inside_attribute_value() {
    let runtime = test_runtime();
    let component = Component::builder("div")
        .template(r#"<input value="{{v}}" title='{{t}}'>"#)
        .prop("v", r#"say "hi""#)
        .prop("t", "it's")
        .build(&runtime)
        .unwrap();

    let input = component.get_content().unwrap().child_elements()[0].clone();
    assert_eq!(input.attribute("value").as_deref(), Some(r#"say "hi""#));
    assert_eq!(input.attribute("title").as_deref(), Some("it's"));
    assert_eq!(
        input.to_html(),
        r#"<input value="say &quot;hi&quot;" title="it&#39;s">"#
    );
}

/// 测试实体：模板里的实体被还原，数据里的实体文本原样保留
#[test]
fn test_entities_in_template_and_data() {
    let runtime = test_runtime();
    let component = Component::builder("div")
        .template("<p>x &lt; y</p><p>{{raw}}</p>")
        .prop("raw", "a &lt; b")
        .build(&runtime)
        .unwrap();

    let element = component.get_content().unwrap();
    let paragraphs = element.child_elements();
    assert_eq!(paragraphs[0].text_content(), "x < y");
    assert_eq!(paragraphs[0].to_html(), "<p>x &lt; y</p>");
    assert_eq!(paragraphs[1].text_content(), "a &lt; b");
    assert_eq!(paragraphs[1].to_html(), "<p>a &amp;lt; b</p>");
}

/// 测试行内元素之间的空格被保留
#[test]
fn test_space_between_inline_elements_kept() {
    let runtime = test_runtime();
    let component = Component::builder("p")
        .template("<b>{{a}}</b> <i>{{b}}</i><input name=x>")
        .prop("a", "John")
        .prop("b", "Doe")
        .build(&runtime)
        .unwrap();

    let element = component.get_content().unwrap();
    assert_eq!(element.text_content(), "John Doe");
    assert_eq!(
        element.to_html(),
        r#"<p><b>John</b> <i>Doe</i><input name="x"></p>"#
    );
}
