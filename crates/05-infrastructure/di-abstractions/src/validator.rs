//! 绑定图校验接口

use crate::graph::BindingGraph;
use config_abstractions::ProcessingOptions;
use di_common::Diagnostic;

/// 校验检查 trait
///
/// 每个检查在每个组件的图上独立运行，只能返回诊断记录
pub trait ValidationCheck: Send + Sync {
    /// 检查名称
    fn name(&self) -> &'static str;

    /// 在当前选项下是否启用
    fn is_enabled(&self, _options: &ProcessingOptions) -> bool {
        true
    }

    /// 检查单个组件的图
    fn check(&self, graph: &BindingGraph, options: &ProcessingOptions) -> Vec<Diagnostic>;
}
