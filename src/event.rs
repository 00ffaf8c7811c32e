//! 事件总线 - 进程内发布/订阅
//!
//! 组件生命周期的各个阶段只通过总线衔接，阶段顺序由总线里注册的处理器决定。

use crate::error::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// 总线处理器
pub type BusHandler<A> = Rc<dyn Fn(&A) -> Result<()>>;

/// 事件总线
///
/// `on` 追加处理器，不去重也不支持注销；`emit` 按注册顺序同步调用。
/// 处理器返回错误时立即停止本次分发并把错误交给调用方（fail-fast）。
pub struct EventBus<K, A> {
    listeners: RefCell<HashMap<K, Vec<BusHandler<A>>>>,
}

impl<K, A> EventBus<K, A>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(HashMap::new()),
        }
    }

    pub fn on<F>(&self, event: K, handler: F)
    where
        F: Fn(&A) -> Result<()> + 'static,
    {
        self.listeners
            .borrow_mut()
            .entry(event)
            .or_default()
            .push(Rc::new(handler));
    }

    /// 分发事件，没有处理器时什么也不做
    pub fn emit(&self, event: &K, args: &A) -> Result<()> {
        // 先复制处理器列表，处理器内部可以继续 on / emit
        let handlers: Vec<BusHandler<A>> = match self.listeners.borrow().get(event) {
            Some(handlers) => handlers.clone(),
            None => return Ok(()),
        };

        for handler in handlers {
            handler(args)?;
        }
        Ok(())
    }

    pub fn handler_count(&self, event: &K) -> usize {
        self.listeners.borrow().get(event).map_or(0, Vec::len)
    }
}

impl<K, A> Default for EventBus<K, A>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
