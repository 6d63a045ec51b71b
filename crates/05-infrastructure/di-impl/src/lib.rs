//! # 绑定图解析实现
//!
//! 提供声明索引、绑定解析器、绑定图组装器、校验流水线和诊断收集器的具体实现。
//!
//! 数据流：声明索引 → 解析器（每棵组件树一次）→ 组装器 → 校验流水线 → 诊断收集器

pub mod assembler;
pub mod index;
pub mod resolver;
pub mod sink;
pub mod validation;

pub use assembler::*;
pub use index::*;
pub use resolver::*;
pub use sink::*;
pub use validation::*;
