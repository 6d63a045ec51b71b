//! 绑定图插件接口
//!
//! 插件在处理器构建时显式注册，不存在全局注册表

use crate::graph::BindingGraph;
use config_abstractions::ProcessingOptions;
use di_common::Diagnostic;

/// 绑定图插件 trait
pub trait BindingGraphPlugin: Send + Sync {
    /// 插件名称，用作诊断种类
    fn plugin_name(&self) -> &str;

    /// 插件识别的选项名称
    fn supported_options(&self) -> Vec<String> {
        Vec::new()
    }

    /// 在第一次处理之前调用一次
    fn initialize(&mut self, _options: &ProcessingOptions) {}

    /// 访问单个组件的只读绑定图
    fn visit(&self, graph: &BindingGraph) -> Vec<Diagnostic>;
}
