//! 依赖请求定义

use crate::key::Key;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 请求方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// 直接请求实例
    #[default]
    Instance,
    /// 请求提供者
    Provider,
    /// 请求延迟实例
    Lazy,
    /// 请求生产者
    Producer,
    /// 请求成员注入
    MembersInjection,
    /// 可选请求，缺失时不报错
    Optional,
}

impl RequestKind {
    /// 该请求方式是否推迟实例化，从而允许依赖环
    pub fn defers_instantiation(&self) -> bool {
        matches!(self, Self::Provider | Self::Lazy | Self::Producer)
    }

    /// 请求方式的展示名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instance => "instance",
            Self::Provider => "provider",
            Self::Lazy => "lazy",
            Self::Producer => "producer",
            Self::MembersInjection => "members_injection",
            Self::Optional => "optional",
        }
    }
}

/// 依赖请求
///
/// 表示对某个键的一次消费，例如构造参数或字段
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyRequest {
    /// 被请求的键
    pub key: Key,
    /// 请求方式
    #[serde(default)]
    pub kind: RequestKind,
    /// 请求元素名称（参数名、字段名或入口方法名）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

impl DependencyRequest {
    /// 创建实例请求
    pub fn instance(key: Key) -> Self {
        Self {
            key,
            kind: RequestKind::Instance,
            element: None,
        }
    }

    /// 创建指定方式的请求
    pub fn of_kind(key: Key, kind: RequestKind) -> Self {
        Self {
            key,
            kind,
            element: None,
        }
    }

    /// 设置请求元素名称
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// 缺失时是否必须报错
    pub fn is_required(&self) -> bool {
        self.kind != RequestKind::Optional
    }
}

impl fmt::Display for DependencyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RequestKind::Instance => write!(f, "{}", self.key),
            kind => write!(f, "{}<{}>", kind.as_str(), self.key),
        }
    }
}

/// 将请求链格式化为 `A -> B -> C`
pub fn format_chain<'a, I>(chain: I) -> String
where
    I: IntoIterator<Item = &'a DependencyRequest>,
{
    chain
        .into_iter()
        .map(|request| request.key.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
