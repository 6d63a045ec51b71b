//! 校验流水线
//!
//! 内置检查和插件在每个组件的图上依次运行，彼此独立，任何检查都不会抑制其他检查

pub mod checks;

pub use checks::*;

use crate::sink::DiagnosticsSink;
use config_abstractions::ProcessingOptions;
use di_abstractions::{BindingGraph, BindingGraphPlugin, ValidationCheck};
use std::sync::Arc;
use tracing::debug;

/// 校验流水线
pub struct ValidationPipeline {
    checks: Vec<Box<dyn ValidationCheck>>,
    plugins: Vec<Arc<dyn BindingGraphPlugin>>,
}

impl ValidationPipeline {
    /// 创建不含任何检查的流水线
    pub fn empty() -> Self {
        Self {
            checks: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// 创建含有全部内置检查的流水线
    pub fn new() -> Self {
        Self {
            checks: builtin_checks(),
            plugins: Vec::new(),
        }
    }

    /// 追加检查
    pub fn with_check(mut self, check: Box<dyn ValidationCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// 追加插件，插件需要已经初始化
    pub fn with_plugin(mut self, plugin: Arc<dyn BindingGraphPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// 检查名称，按运行顺序
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|check| check.name()).collect()
    }

    /// 校验一棵组件树的全部图
    pub fn validate(
        &self,
        graph: &BindingGraph,
        options: &ProcessingOptions,
        sink: &mut DiagnosticsSink,
    ) {
        let enabled: Vec<&dyn ValidationCheck> = self
            .checks
            .iter()
            .map(|check| check.as_ref())
            .filter(|check| check.is_enabled(options))
            .collect();

        for component in graph.walk() {
            for check in &enabled {
                let diagnostics = check.check(component, options);
                if !diagnostics.is_empty() {
                    debug!(
                        "检查 {} 在组件 {} 中发现 {} 个问题",
                        check.name(),
                        component.name(),
                        diagnostics.len()
                    );
                }
                sink.record_all(diagnostics);
            }
            for plugin in &self.plugins {
                sink.record_all(plugin.visit(component));
            }
        }
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new()
    }
}
