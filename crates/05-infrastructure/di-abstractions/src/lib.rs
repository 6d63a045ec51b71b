//! # Binding Graph Abstractions
//!
//! 绑定图抽象层，定义绑定、绑定图以及围绕绑定图的扩展接口。
//!
//! ## 核心接口
//!
//! - [`Binding`] - 封闭的绑定种类
//! - [`BindingGraph`] - 组装完成后只读的绑定图
//! - [`DeclarationLookup`] - 声明索引的只读查询接口
//! - [`ValidationCheck`] - 内置校验检查接口
//! - [`BindingGraphPlugin`] - 校验插件接口
//! - [`CodeEmitter`] - 代码生成接口
//! - [`DiagnosticReporter`] - 诊断报告接口
//! - [`DeclarationSource`] - 声明来源接口

pub mod binding;
pub mod emitter;
pub mod graph;
pub mod plugin;
pub mod registry;
pub mod reporter;
pub mod scanner;
pub mod validator;

pub use binding::*;
pub use emitter::*;
pub use graph::*;
pub use plugin::*;
pub use registry::*;
pub use reporter::*;
pub use scanner::*;
pub use validator::*;
