//! Mini Component 演示程序：组装一个登录页，挂载后打印标记

use mini_component::{
    handler, init_logging, Component, Element, Error, ListItem, Runtime, RuntimeConfig,
};
use serde_json::json;

const AUTH_TPL: &str = r#"
<h1 class="form__title">{{title}}</h1>
<form class="form">{{fields}}</form>
<div class="form__actions">{{actionBtn}}{{commonBtn}}</div>
"#;

const FIELD_TPL: &str = r#"
<label class="form__label" for={{name}}>{{label}}</label>
{{authInput}}
"#;

/// 输入框：失焦时按是否为空写回 dataValid
fn input(runtime: &Runtime, name: &str) -> Result<Component, Error> {
    Component::builder("input")
        .attr([
            ("class", json!("form__input reset-input")),
            ("type", json!("text")),
            ("name", json!(name)),
            ("id", json!(name)),
            ("dataValid", json!(false)),
        ])
        .events([(
            "blur",
            handler(|event| {
                let valid = event.detail["value"]
                    .as_str()
                    .map_or(false, |v| !v.trim().is_empty());
                event.target.set_attribute("dataValid", &valid.to_string());
            }),
        )])
        .build(runtime)
}

fn auth_field(runtime: &Runtime, label: &str, name: &str) -> Result<Component, Error> {
    Component::builder("div")
        .template(FIELD_TPL)
        .prop("label", label)
        .prop("name", name)
        .list("authInput", vec![ListItem::from(input(runtime, name)?)])
        .attr([("class", json!("form__item flex"))])
        .build(runtime)
}

fn button(runtime: &Runtime, value: &str, class: &str) -> Result<Component, Error> {
    Component::builder("button")
        .template("{{value}}")
        .prop("value", value)
        .attr([("class", json!(class))])
        .build(runtime)
}

fn main() -> Result<(), Error> {
    let config = match std::env::args().nth(1) {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::default(),
    };
    init_logging(&config.log_level);
    let runtime = Runtime::new(config);

    let login = auth_field(&runtime, "Login", "login")?;
    let password = auth_field(&runtime, "Password", "password")?;
    let submit = button(&runtime, "Sign in", "action-button reset-btn")?;
    let register = button(&runtime, "Create account", "common-button reset-btn")?;

    let page = Component::builder("main")
        .template(AUTH_TPL)
        .prop("title", "Sign in")
        .list("fields", vec![ListItem::from(login.clone()), ListItem::from(password)])
        .list("actionBtn", vec![ListItem::from(submit.clone())])
        .list("commonBtn", vec![ListItem::from(register)])
        .attr([("class", json!("container flex"))])
        .on_mount(|c| {
            log::info!("page {} mounted", c.id());
            Ok(())
        })
        .build(&runtime)?;

    let body = Element::new("body");
    runtime.mount(&body, &page)?;

    // 模拟用户输入
    if let Some(field) = login.get_content()?.find_by_attribute("name", "login") {
        field.dispatch_event("blur", json!({ "value": "admin" }));
    }
    submit.set_prop("value", "Signing in...")?;

    println!("{}", body.to_html());
    Ok(())
}
