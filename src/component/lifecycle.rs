//! 生命周期状态机
//!
//! INIT → RENDER → MOUNT，UPDATE 时回到 RENDER。阶段之间只通过组件私有的
//! 事件总线衔接，事件集合是封闭的枚举。

use super::{Component, PropsSnapshot};
use crate::dom::{Element, Fragment};
use crate::error::Result;
use crate::parser::TemplateEngine;
use crate::props::{PropValue, ATTR_KEY, EVENTS_KEY, SETTINGS_KEY};
use serde_json::Value as JsonValue;
use std::rc::Rc;

/// 生命周期事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Init,
    Render,
    Mount,
    Update,
}

/// 事件参数
#[derive(Debug, Clone)]
pub enum LifecyclePayload {
    Empty,
    Update {
        old: PropsSnapshot,
        new: PropsSnapshot,
    },
}

/// 组件状态，没有终止状态，组件被动回收
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    /// 元素已创建
    Initialized,
    Rendered,
    Mounted,
}

type Transition = fn(&Component, &LifecyclePayload) -> Result<()>;

impl Component {
    pub(super) fn register_lifecycle(&self) {
        let bus = &self.0.bus;
        bus.on(LifecycleEvent::Init, self.bind(|c, _| c.init()));
        bus.on(LifecycleEvent::Render, self.bind(|c, _| c.render_pass()));
        bus.on(LifecycleEvent::Mount, self.bind(|c, _| c.did_mount()));
        bus.on(LifecycleEvent::Update, self.bind(Component::did_update));
    }

    // 总线在组件内部，处理器只持有弱引用
    fn bind(&self, transition: Transition) -> impl Fn(&LifecyclePayload) -> Result<()> + 'static {
        let weak = Rc::downgrade(&self.0);
        move |payload| match weak.upgrade() {
            Some(inner) => transition(&Component(inner), payload),
            None => Ok(()),
        }
    }

    fn init(&self) -> Result<()> {
        if self.0.element.set(self.create_element()).is_err() {
            log::debug!("component {} already initialized", self.id());
            return Ok(());
        }
        self.0.state.set(LifecycleState::Initialized);
        log::debug!("component {} init <{}>", self.id(), self.tag());
        self.emit(LifecycleEvent::Render, &LifecyclePayload::Empty)
    }

    fn create_element(&self) -> Element {
        let element = Element::new(self.tag());
        if self.exposes_id() {
            let attribute = &self.runtime().config().id_attribute;
            element.set_attribute(attribute, self.id().as_str());
        }
        element
    }

    fn exposes_id(&self) -> bool {
        if self.runtime().config().expose_ids {
            return true;
        }
        self.prop(SETTINGS_KEY)
            .and_then(|settings| settings.get("withInternalID").and_then(JsonValue::as_bool))
            .unwrap_or(false)
    }

    /// 渲染中再次请求渲染时只记标记，当前这一轮结束后补一轮
    fn render_pass(&self) -> Result<()> {
        if self.0.rendering.get() {
            log::debug!("component {} render requested while rendering, deferred", self.id());
            self.0.render_pending.set(true);
            return Ok(());
        }

        self.0.rendering.set(true);
        let result = loop {
            self.0.render_pending.set(false);
            if let Err(err) = self.render_once() {
                break Err(err);
            }
            if !self.0.render_pending.get() {
                break Ok(());
            }
        };
        self.0.rendering.set(false);
        self.0.render_pending.set(false);
        result
    }

    // 顺序固定：解绑 → 清空 → 追加 → 重新绑定 → 写属性
    fn render_once(&self) -> Result<()> {
        let element = self.element()?.clone();
        let fragment = self.run_render_hook()?;

        self.remove_events(&element);
        element.clear_children();
        element.append_fragment(fragment);
        self.add_events(&element);
        self.add_attributes(&element);

        self.0.render_count.set(self.0.render_count.get() + 1);
        if self.0.state.get() == LifecycleState::Initialized {
            self.0.state.set(LifecycleState::Rendered);
        }
        log::debug!("component {} rendered (#{})", self.id(), self.render_count());
        Ok(())
    }

    fn run_render_hook(&self) -> Result<Fragment> {
        if let Some(render) = self.0.hooks.render.clone() {
            return render(self);
        }
        match &self.0.hooks.template {
            Some(template) => self.compile(template),
            None => Ok(Fragment::default()),
        }
    }

    /// 只解绑上一轮真正绑上去的处理器
    fn remove_events(&self, element: &Element) {
        let bound = std::mem::take(&mut *self.0.bound_listeners.borrow_mut());
        for (event, handler) in &bound {
            element.remove_event_listener(event, handler);
        }
    }

    fn add_events(&self, element: &Element) {
        let Some(PropValue::Events(events)) = self.props().get(EVENTS_KEY) else {
            return;
        };
        let mut bound = self.0.bound_listeners.borrow_mut();
        for (event, handler) in events {
            element.add_event_listener(&event, handler.clone());
            bound.push((event, handler));
        }
    }

    fn add_attributes(&self, element: &Element) {
        let Some(JsonValue::Object(attributes)) = self.prop(ATTR_KEY) else {
            return;
        };
        for (name, value) in &attributes {
            element.set_attribute(name, &TemplateEngine::json_to_string(value));
        }
    }

    fn did_mount(&self) -> Result<()> {
        if let Some(hook) = self.0.hooks.did_mount.clone() {
            hook(self)?;
        }
        self.0.state.set(LifecycleState::Mounted);
        log::debug!("component {} mounted", self.id());

        for child in self.owned_components() {
            child.dispatch_component_did_mount()?;
        }
        Ok(())
    }

    /// 由父组件（或应用外壳）在元素接入后调用
    pub fn dispatch_component_did_mount(&self) -> Result<()> {
        self.emit(LifecycleEvent::Mount, &LifecyclePayload::Empty)?;

        // 子组件挂载完成后重新渲染一次，拿到它们最新的输出
        if !self.owned_components().is_empty() {
            self.emit(LifecycleEvent::Render, &LifecyclePayload::Empty)?;
        }
        Ok(())
    }

    fn did_update(&self, payload: &LifecyclePayload) -> Result<()> {
        let LifecyclePayload::Update { old, new } = payload else {
            return Ok(());
        };
        let rerender = match self.0.hooks.did_update.clone() {
            Some(hook) => hook(self, old, new)?,
            None => true,
        };
        log::debug!("component {} updated, re-render: {}", self.id(), rerender);

        if rerender {
            self.emit(LifecycleEvent::Render, &LifecyclePayload::Empty)?;
        }
        Ok(())
    }
}
