//! # Options Abstractions
//!
//! 处理选项抽象层，定义选项的读取和校验接口。
//!
//! ## 核心接口
//!
//! - [`OptionsProvider`] - 选项提供者接口
//! - [`OptionsValidator`] - 选项校验接口
//! - [`ProcessingOptions`] - 校验后的处理选项

pub mod options;
pub mod provider;
pub mod validator;

pub use options::*;
pub use provider::*;
pub use validator::*;
