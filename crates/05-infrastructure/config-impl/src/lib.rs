//! # Options Implementation
//!
//! 处理选项的具体实现，提供各种选项来源、默认校验器和加载器。
//!
//! ## 主要组件
//!
//! - [`OptionsLoader`] - 按优先级合并选项来源并校验
//! - [`MapOptionsProvider`] - 内存选项（命令行参数）
//! - [`FileOptionsProvider`] - TOML/JSON 选项文件
//! - [`EnvironmentOptionsProvider`] - 环境变量选项
//! - [`DefaultOptionsValidator`] - 默认选项校验器

pub mod loader;
pub mod providers;
pub mod validation;

pub use loader::*;
pub use providers::*;
pub use validation::*;
