//! # DI Common
//!
//! 编译期依赖注入绑定图解析器的公共数据模型。
//!
//! ## 核心类型
//!
//! - [`Key`] - 被请求值的标识
//! - [`DependencyRequest`] - 对某个键的一次消费
//! - [`ComponentTree`] - 以 arena 方式存储的组件树
//! - [`Declaration`] - 外部声明提取器给出的原始声明
//! - [`Diagnostic`] - 诊断记录
//!
//! ## 设计原则
//!
//! - 所有数据在创建后不可变
//! - 结构相等即同一个值，便于去重和确定性排序
//! - 组件之间只通过下标互相引用

pub mod component;
pub mod declaration;
pub mod diagnostics;
pub mod errors;
pub mod key;
pub mod request;
pub mod scope;

pub use component::*;
pub use declaration::*;
pub use diagnostics::*;
pub use errors::*;
pub use key::*;
pub use request::*;
pub use scope::*;
