//! 属性更新单元测试
//! 测试 set_props 合并、只增不删和 UPDATE 合并

use super::test_runtime;
use crate::{Component, Error, Prop, PropValue};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

/// 创建一个统计 UPDATE 次数的组件
fn counting_component(updates: &Rc<Cell<usize>>) -> Component {
    let updates = updates.clone();
    Component::builder("div")
        .template("{{a}}-{{b}}-{{c}}")
        .prop("a", json!(0))
        .prop("b", json!(0))
        .prop("c", json!(0))
        .on_update(move |_, _, _| {
            updates.set(updates.get() + 1);
            Ok(true)
        })
        .build(&test_runtime())
        .unwrap()
}

/// 测试一次 set_props 改三个键只触发一次 UPDATE
#[test]
fn test_update_coalescing() {
    let updates = Rc::new(Cell::new(0));
    let component = counting_component(&updates);

    component
        .set_props([
            ("a", Prop::from(json!(1))),
            ("b", Prop::from(json!(2))),
            ("c", Prop::from(json!(3))),
        ])
        .unwrap();

    assert_eq!(updates.get(), 1);
    assert_eq!(component.render_count(), 2);
    assert_eq!(component.get_content().unwrap().text_content(), "1-2-3");
}

/// 测试 set_props 序列：键不丢失，最后写入者胜出
#[test]
fn test_keys_never_lost_and_last_write_wins() {
    let updates = Rc::new(Cell::new(0));
    let component = counting_component(&updates);
    let before = component.props().keys();

    let batches: Vec<Vec<(&str, Prop)>> = vec![
        vec![("a", Prop::from("x")), ("extra", Prop::from(json!(true)))],
        vec![("b", Prop::from("y")), ("a", Prop::from("z"))],
        vec![("c", Prop::from(json!([1, 2])))],
        vec![("a", Prop::from("z"))],
    ];
    for batch in batches {
        component.set_props(batch).unwrap();
        let keys = component.props().keys();
        assert!(before.iter().all(|key| keys.contains(key)));
    }

    assert_eq!(component.prop("a"), Some(json!("z")));
    assert_eq!(component.prop("b"), Some(json!("y")));
    assert_eq!(component.prop("c"), Some(json!([1, 2])));
    assert_eq!(component.prop("extra"), Some(json!(true)));
    // 最后一批没有变化
    assert_eq!(updates.get(), 3);
}

/// 测试同一批里重复的键后写覆盖先写
#[test]
fn test_duplicate_key_in_one_call() {
    let updates = Rc::new(Cell::new(0));
    let component = counting_component(&updates);

    component
        .set_props([("a", Prop::from(json!(5))), ("a", Prop::from(json!(6)))])
        .unwrap();

    assert_eq!(component.prop("a"), Some(json!(6)));
    assert_eq!(updates.get(), 1);
}

/// 测试三个属性袋都拒绝删除
#[test]
fn test_delete_rejected_in_every_bag() {
    let runtime = test_runtime();
    let child = Component::builder("span").build(&runtime).unwrap();
    let component = Component::builder("div")
        .prop("title", "t")
        .child("child", child)
        .list("items", ["a"])
        .build(&runtime)
        .unwrap();

    assert!(matches!(component.props().remove("title"), Err(Error::AccessViolation { .. })));
    assert!(matches!(component.children().remove("child"), Err(Error::AccessViolation { .. })));
    assert!(matches!(component.lists().remove("items"), Err(Error::AccessViolation { .. })));

    assert!(component.props().contains_key("title"));
    assert!(component.child("child").is_some());
    assert_eq!(component.list("items").map(|items| items.len()), Some(1));
}

/// 测试构造时按值类型分到三个属性袋
#[test]
fn test_construction_partitions_bags() {
    let runtime = test_runtime();
    let child = Component::builder("span").build(&runtime).unwrap();
    let component = Component::builder("div")
        .props(vec![
            ("title", Prop::from("t")),
            ("child", Prop::from(child.clone())),
            ("rows", Prop::List(vec!["r".into()])),
        ])
        .build(&runtime)
        .unwrap();

    assert_eq!(component.props().keys(), vec!["title", "__id"]);
    assert_eq!(component.children().keys(), vec!["child"]);
    assert_eq!(component.lists().keys(), vec!["rows"]);
    assert!(component.child("child").unwrap().ptr_eq(&child));
}

/// 测试直接写属性袋只打标记，flush_updates 时才触发 UPDATE
#[test]
fn test_direct_bag_write_is_flushed_once() {
    let updates = Rc::new(Cell::new(0));
    let component = counting_component(&updates);

    component.props().set("a", PropValue::Data(json!(7)));
    component.props().set("b", PropValue::Data(json!(8)));
    assert!(component.props().is_dirty());
    assert_eq!(updates.get(), 0);

    assert!(component.flush_updates().unwrap());
    assert!(!component.flush_updates().unwrap());
    assert_eq!(updates.get(), 1);
    assert_eq!(component.get_content().unwrap().text_content(), "7-8-0");
}

/// 测试属性袋观察者收到提交的写入
#[test]
fn test_bag_watchers_receive_changes() {
    let updates = Rc::new(Cell::new(0));
    let component = counting_component(&updates);
    let changed = Rc::new(Cell::new(0));
    {
        let changed = changed.clone();
        component.props().watch(move |change| {
            assert_eq!(change.key, "a");
            changed.set(changed.get() + 1);
        });
    }

    component.set_prop("a", json!(1)).unwrap();
    component.set_prop("a", json!(1)).unwrap();

    assert_eq!(changed.get(), 1);
}
