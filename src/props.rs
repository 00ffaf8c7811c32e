//! 属性拦截层
//!
//! 三个属性袋（普通属性、子组件、列表）都是 [`ObservableBag`]：读取透明，
//! 写入先比较，值真正变化时才提交并打上待更新标记，同时通知观察者。
//! 键只增不减：删除一律返回 `AccessViolation`。

use crate::component::Component;
use crate::dom::{same_handler, Handler};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// 保留键：组件自身 id
pub const ID_KEY: &str = "__id";
/// 保留键：每次渲染后写到元素上的属性
pub const ATTR_KEY: &str = "attr";
/// 保留键：每次渲染前后（解）绑定的事件
pub const EVENTS_KEY: &str = "events";
/// 保留键：组件级设置，如 `{"withInternalID": true}`
pub const SETTINGS_KEY: &str = "settings";

/// 事件名 → 处理器
pub type EventMap = IndexMap<String, Handler>;

/// 普通属性袋里的值
#[derive(Clone)]
pub enum PropValue {
    Data(JsonValue),
    Events(EventMap),
}

impl PropValue {
    pub fn as_data(&self) -> Option<&JsonValue> {
        match self {
            PropValue::Data(value) => Some(value),
            PropValue::Events(_) => None,
        }
    }

    pub fn as_events(&self) -> Option<&EventMap> {
        match self {
            PropValue::Events(events) => Some(events),
            PropValue::Data(_) => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Data(a), PropValue::Data(b)) => a == b,
            (PropValue::Events(a), PropValue::Events(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|((ka, ha), (kb, hb))| {
                        ka == kb && same_handler(ha, hb)
                    })
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for PropValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropValue::Data(value) => write!(f, "Data({})", value),
            PropValue::Events(events) => f
                .debug_tuple("Events")
                .field(&events.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// 列表中的一项：组件贡献它的元素，其他值贡献字符串
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Component(Component),
    Text(String),
}

impl From<Component> for ListItem {
    fn from(component: Component) -> Self {
        ListItem::Component(component)
    }
}

impl From<&str> for ListItem {
    fn from(text: &str) -> Self {
        ListItem::Text(text.to_string())
    }
}

impl From<String> for ListItem {
    fn from(text: String) -> Self {
        ListItem::Text(text)
    }
}

/// 构造组件或 set_props 时传入的值，按类型分流到三个属性袋
#[derive(Clone)]
pub enum Prop {
    Data(JsonValue),
    Events(EventMap),
    Child(Component),
    List(Vec<ListItem>),
}

impl std::fmt::Debug for Prop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prop::Data(value) => write!(f, "Data({})", value),
            Prop::Events(events) => f
                .debug_tuple("Events")
                .field(&events.keys().collect::<Vec<_>>())
                .finish(),
            Prop::Child(component) => f.debug_tuple("Child").field(component).finish(),
            Prop::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl From<JsonValue> for Prop {
    fn from(value: JsonValue) -> Self {
        Prop::Data(value)
    }
}

impl From<&str> for Prop {
    fn from(value: &str) -> Self {
        Prop::Data(JsonValue::String(value.to_string()))
    }
}

impl From<String> for Prop {
    fn from(value: String) -> Self {
        Prop::Data(JsonValue::String(value))
    }
}

impl From<Component> for Prop {
    fn from(component: Component) -> Self {
        Prop::Child(component)
    }
}

impl From<Vec<ListItem>> for Prop {
    fn from(items: Vec<ListItem>) -> Self {
        Prop::List(items)
    }
}

impl From<EventMap> for Prop {
    fn from(events: EventMap) -> Self {
        Prop::Events(events)
    }
}

/// 由 (事件名, 处理器) 列表构造 `events` 值
pub fn events<I, S>(entries: I) -> Prop
where
    I: IntoIterator<Item = (S, Handler)>,
    S: Into<String>,
{
    Prop::Events(
        entries
            .into_iter()
            .map(|(name, handler)| (name.into(), handler))
            .collect(),
    )
}

/// 分流结果
#[derive(Debug, Default)]
pub struct Partition {
    pub props: Vec<(String, PropValue)>,
    pub children: Vec<(String, Component)>,
    pub lists: Vec<(String, Vec<ListItem>)>,
}

impl Partition {
    pub fn is_empty(&self) -> bool {
        self.props.is_empty() && self.children.is_empty() && self.lists.is_empty()
    }
}

/// 按值的类型分类，分类只看值本身，与顺序无关
pub fn partition<I, K>(entries: I) -> Partition
where
    I: IntoIterator<Item = (K, Prop)>,
    K: Into<String>,
{
    let mut out = Partition::default();
    for (key, prop) in entries {
        let key = key.into();
        match prop {
            Prop::Child(component) => out.children.push((key, component)),
            Prop::List(items) => out.lists.push((key, items)),
            Prop::Data(value) => out.props.push((key, PropValue::Data(value))),
            Prop::Events(events) => out.props.push((key, PropValue::Events(events))),
        }
    }
    out
}

/// 一次已提交的写入
#[derive(Debug, Clone)]
pub struct Change<V> {
    pub key: String,
    pub old: Option<V>,
    pub new: V,
}

type Watcher<V> = Rc<dyn Fn(&Change<V>)>;

/// 可观察的键值袋
///
/// 不提供绕过比较的写入路径；删除操作存在但永远失败。
pub struct ObservableBag<V> {
    name: &'static str,
    entries: RefCell<IndexMap<String, V>>,
    dirty: Cell<bool>,
    watchers: RefCell<Vec<Watcher<V>>>,
}

impl<V: Clone + PartialEq> ObservableBag<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RefCell::new(IndexMap::new()),
            dirty: Cell::new(false),
            watchers: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// 按插入顺序的值
    pub fn values(&self) -> Vec<V> {
        self.entries.borrow().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn snapshot(&self) -> IndexMap<String, V> {
        self.entries.borrow().clone()
    }

    /// 写入一个键，返回值是否真的变化
    pub fn set(&self, key: &str, value: V) -> bool {
        let old = {
            let mut entries = self.entries.borrow_mut();
            if entries.get(key) == Some(&value) {
                return false;
            }
            entries.insert(key.to_string(), value.clone())
        };
        self.dirty.set(true);
        log::trace!("{} bag: `{}` changed", self.name, key);

        let change = Change {
            key: key.to_string(),
            old,
            new: value,
        };
        let watchers: Vec<Watcher<V>> = self.watchers.borrow().clone();
        for watcher in watchers {
            watcher(&change);
        }
        true
    }

    /// 浅合并，后写覆盖先写，返回是否有任何键变化
    pub fn merge<I>(&self, entries: I) -> bool
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let mut changed = false;
        for (key, value) in entries {
            changed |= self.set(&key, value);
        }
        changed
    }

    /// 删除被拒绝
    pub fn remove(&self, key: &str) -> Result<V> {
        log::debug!("{} bag: rejected removal of `{}`", self.name, key);
        Err(Error::AccessViolation {
            key: key.to_string(),
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// 读取并清除待更新标记
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    /// 订阅已提交的写入
    pub fn watch<F>(&self, watcher: F)
    where
        F: Fn(&Change<V>) + 'static,
    {
        self.watchers.borrow_mut().push(Rc::new(watcher));
    }
}
