//! 单元测试模块
//! 覆盖生命周期、模板编译、属性更新、挂载传播等功能

pub mod compile_tests;
pub mod props_tests;

use crate::{Runtime, RuntimeConfig, SequentialIds};

/// 测试用运行时：可预测的 id，日志输出到测试捕获
pub(crate) fn test_runtime() -> Runtime {
    test_runtime_with(RuntimeConfig::default())
}

pub(crate) fn test_runtime_with(config: RuntimeConfig) -> Runtime {
    let _ = env_logger::builder().is_test(true).try_init();
    Runtime::with_ids(config, SequentialIds::new("cmp"))
}
