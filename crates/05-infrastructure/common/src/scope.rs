//! 作用域定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 可复用作用域名称，只能用于绑定
pub const REUSABLE_SCOPE: &str = "Reusable";

/// 缓存作用域
///
/// 带作用域的绑定在声明同一作用域的组件实例内只计算一次
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope {
    /// 作用域名称
    pub name: String,
}

impl Scope {
    /// 创建命名作用域
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// 常用的单例作用域
    pub fn singleton() -> Self {
        Self::new("Singleton")
    }

    /// 可复用作用域
    pub fn reusable() -> Self {
        Self::new(REUSABLE_SCOPE)
    }

    /// 是否为可复用作用域
    pub fn is_reusable(&self) -> bool {
        self.name == REUSABLE_SCOPE
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)
    }
}
