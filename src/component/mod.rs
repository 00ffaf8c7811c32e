//! 组件基础定义
//!
//! 具体组件不再继承基类，而是把标签、模板、属性和三个钩子
//! （render / did_mount / did_update）交给 [`ComponentBuilder`] 组装。

mod compile;
mod lifecycle;

pub use lifecycle::{LifecycleEvent, LifecyclePayload, LifecycleState};

use crate::dom::{Element, Fragment, Handler};
use crate::error::{Error, Result};
use crate::event::EventBus;
use crate::props::{
    partition, EventMap, ListItem, ObservableBag, Prop, PropValue, ATTR_KEY, EVENTS_KEY, ID_KEY,
};
use crate::runtime::Runtime;
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use serde_json::Value as JsonValue;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// 组件 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 普通属性快照，传给 update 钩子
pub type PropsSnapshot = IndexMap<String, PropValue>;

pub type RenderFn = Rc<dyn Fn(&Component) -> Result<Fragment>>;
pub type MountFn = Rc<dyn Fn(&Component) -> Result<()>>;
pub type UpdateFn = Rc<dyn Fn(&Component, &PropsSnapshot, &PropsSnapshot) -> Result<bool>>;

pub(crate) struct Hooks {
    template: Option<String>,
    render: Option<RenderFn>,
    did_mount: Option<MountFn>,
    did_update: Option<UpdateFn>,
}

pub(crate) struct ComponentInner {
    id: ComponentId,
    tag: String,
    runtime: Runtime,
    element: OnceCell<Element>,
    props: ObservableBag<PropValue>,
    children: ObservableBag<Component>,
    lists: ObservableBag<Vec<ListItem>>,
    bus: EventBus<LifecycleEvent, LifecyclePayload>,
    hooks: Hooks,
    state: Cell<LifecycleState>,
    render_count: Cell<usize>,
    rendering: Cell<bool>,
    render_pending: Cell<bool>,
    bound_listeners: RefCell<Vec<(String, Handler)>>,
    // 上一次 UPDATE 时的属性快照
    last_snapshot: RefCell<PropsSnapshot>,
}

/// 组件句柄
///
/// 克隆得到同一个组件。父组件通过属性持有子组件，子组件不知道父组件。
#[derive(Clone)]
pub struct Component(Rc<ComponentInner>);

impl Component {
    pub fn builder(tag: &str) -> ComponentBuilder {
        ComponentBuilder::new(Some(tag))
    }

    pub fn id(&self) -> &ComponentId {
        &self.0.id
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn runtime(&self) -> &Runtime {
        &self.0.runtime
    }

    pub fn state(&self) -> LifecycleState {
        self.0.state.get()
    }

    /// 已完成的渲染次数
    pub fn render_count(&self) -> usize {
        self.0.render_count.get()
    }

    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// 组件的元素，INIT 之后永远存在
    pub fn get_content(&self) -> Result<Element> {
        self.element().cloned()
    }

    pub(crate) fn element(&self) -> Result<&Element> {
        self.0.element.get().ok_or_else(|| Error::ElementUnavailable {
            component: self.0.id.to_string(),
        })
    }

    pub fn props(&self) -> &ObservableBag<PropValue> {
        &self.0.props
    }

    pub fn children(&self) -> &ObservableBag<Component> {
        &self.0.children
    }

    pub fn lists(&self) -> &ObservableBag<Vec<ListItem>> {
        &self.0.lists
    }

    /// 读取普通数据属性
    pub fn prop(&self, key: &str) -> Option<JsonValue> {
        self.0.props.get(key).and_then(|v| v.as_data().cloned())
    }

    pub fn child(&self, key: &str) -> Option<Component> {
        self.0.children.get(key)
    }

    pub fn list(&self, key: &str) -> Option<Vec<ListItem>> {
        self.0.lists.get(key)
    }

    /// 合并一组属性/子组件/列表，有变化时只触发一次 UPDATE
    pub fn set_props<I, K>(&self, update: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Prop)>,
        K: Into<String>,
    {
        let parts = partition(update);
        if parts.is_empty() {
            return Ok(());
        }

        if !parts.children.is_empty() {
            self.0.children.merge(parts.children);
        }
        if !parts.lists.is_empty() {
            self.0.lists.merge(parts.lists);
        }
        if !parts.props.is_empty() {
            self.0.props.merge(parts.props);
        }

        self.flush_updates().map(|_| ())
    }

    pub fn set_prop(&self, key: &str, value: impl Into<Prop>) -> Result<()> {
        self.set_props([(key, value.into())])
    }

    /// 任何属性袋带有待更新标记时触发一次 UPDATE，返回是否触发
    pub fn flush_updates(&self) -> Result<bool> {
        // 三个标记都要清掉，不能短路
        let children = self.0.children.take_dirty();
        let lists = self.0.lists.take_dirty();
        let props = self.0.props.take_dirty();
        if !(children || lists || props) {
            return Ok(false);
        }

        let new = self.0.props.snapshot();
        let old = self.0.last_snapshot.replace(new.clone());
        self.emit(LifecycleEvent::Update, &LifecyclePayload::Update { old, new })?;
        Ok(true)
    }

    pub fn show(&self) -> Result<()> {
        self.element()?.set_style("display", "block");
        Ok(())
    }

    pub fn hide(&self) -> Result<()> {
        self.element()?.set_style("display", "none");
        Ok(())
    }

    /// 用自身当前属性编译模板
    pub fn compile(&self, template: &str) -> Result<Fragment> {
        let props = self.0.props.snapshot();
        self.compile_with(template, &props)
    }

    /// 子组件和列表（按声明顺序）中的所有组件
    pub(crate) fn owned_components(&self) -> Vec<Component> {
        let mut owned = self.0.children.values();
        for items in self.0.lists.values() {
            owned.extend(items.into_iter().filter_map(|item| match item {
                ListItem::Component(component) => Some(component),
                ListItem::Text(_) => None,
            }));
        }
        owned
    }

    pub(crate) fn emit(&self, event: LifecycleEvent, payload: &LifecyclePayload) -> Result<()> {
        self.0.bus.emit(&event, payload)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.0.id)
            .field("tag", &self.0.tag)
            .field("state", &self.0.state.get())
            .finish()
    }
}

/// 组件构造器
pub struct ComponentBuilder {
    tag: Option<String>,
    entries: Vec<(String, Prop)>,
    hooks: Hooks,
}

impl ComponentBuilder {
    /// `tag` 为 None 时使用配置里的默认标签
    pub fn new(tag: Option<&str>) -> Self {
        Self {
            tag: tag.map(str::to_string),
            entries: Vec::new(),
            hooks: Hooks {
                template: None,
                render: None,
                did_mount: None,
                did_update: None,
            },
        }
    }

    pub fn template(mut self, template: &str) -> Self {
        self.hooks.template = Some(template.to_string());
        self
    }

    pub fn prop(mut self, key: &str, value: impl Into<Prop>) -> Self {
        self.entries.push((key.to_string(), value.into()));
        self
    }

    pub fn props<I, K>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Prop)>,
        K: Into<String>,
    {
        self.entries
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    pub fn child(self, key: &str, component: Component) -> Self {
        self.prop(key, Prop::Child(component))
    }

    pub fn list<I, T>(self, key: &str, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ListItem>,
    {
        let items = items.into_iter().map(Into::into).collect();
        self.prop(key, Prop::List(items))
    }

    /// 保留键 `attr`
    pub fn attr<I, K, V>(self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<JsonValue>,
    {
        let map: serde_json::Map<String, JsonValue> = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.prop(ATTR_KEY, JsonValue::Object(map))
    }

    /// 保留键 `events`
    pub fn events<I, K>(self, events: I) -> Self
    where
        I: IntoIterator<Item = (K, Handler)>,
        K: Into<String>,
    {
        let map: EventMap = events.into_iter().map(|(k, h)| (k.into(), h)).collect();
        self.prop(EVENTS_KEY, Prop::Events(map))
    }

    pub fn render_with<F>(mut self, render: F) -> Self
    where
        F: Fn(&Component) -> Result<Fragment> + 'static,
    {
        self.hooks.render = Some(Rc::new(render));
        self
    }

    pub fn on_mount<F>(mut self, did_mount: F) -> Self
    where
        F: Fn(&Component) -> Result<()> + 'static,
    {
        self.hooks.did_mount = Some(Rc::new(did_mount));
        self
    }

    pub fn on_update<F>(mut self, did_update: F) -> Self
    where
        F: Fn(&Component, &PropsSnapshot, &PropsSnapshot) -> Result<bool> + 'static,
    {
        self.hooks.did_update = Some(Rc::new(did_update));
        self
    }

    /// 创建组件并同步走完 INIT → RENDER
    pub fn build(self, runtime: &Runtime) -> Result<Component> {
        let id = runtime.issue_id();
        let tag = self
            .tag
            .unwrap_or_else(|| runtime.config().default_tag.clone());
        let parts = partition(self.entries);

        let inner = ComponentInner {
            id: id.clone(),
            tag,
            runtime: runtime.clone(),
            element: OnceCell::new(),
            props: ObservableBag::new("props"),
            children: ObservableBag::new("children"),
            lists: ObservableBag::new("lists"),
            bus: EventBus::new(),
            hooks: self.hooks,
            state: Cell::new(LifecycleState::Uninitialized),
            render_count: Cell::new(0),
            rendering: Cell::new(false),
            render_pending: Cell::new(false),
            bound_listeners: RefCell::new(Vec::new()),
            last_snapshot: RefCell::new(IndexMap::new()),
        };
        inner.children.merge(parts.children);
        inner.lists.merge(parts.lists);
        inner.props.merge(parts.props);
        inner
            .props
            .set(ID_KEY, PropValue::Data(JsonValue::String(id.to_string())));
        inner.props.take_dirty();
        inner.children.take_dirty();
        inner.lists.take_dirty();
        inner.last_snapshot.replace(inner.props.snapshot());

        let component = Component(Rc::new(inner));
        component.register_lifecycle();
        log::debug!("component {} <{}> created", component.id(), component.tag());
        component.emit(LifecycleEvent::Init, &LifecyclePayload::Empty)?;
        Ok(component)
    }
}
