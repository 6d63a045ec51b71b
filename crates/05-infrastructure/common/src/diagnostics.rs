//! 诊断记录定义

use crate::key::Key;
use crate::request::{format_chain, DependencyRequest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 诊断级别
///
/// 排序时错误在警告之前
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// 错误，图无效
    Error,
    /// 警告
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// 诊断种类
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// 声明形状不合法
    MalformedDeclaration,
    /// 依赖环
    DependencyCycle,
    /// 同一个键有多个绑定
    DuplicateBinding,
    /// 缺少绑定
    MissingBinding,
    /// 作用域不匹配
    ScopeMismatch,
    /// 映射多绑定的键重复
    AmbiguousMultibindingKey,
    /// 同一聚合混用集合与映射贡献
    IncompatibleMultibinding,
    /// 子组件关系不合法
    InvalidSubcomponent,
    /// 未被使用的作用域绑定
    UnusedBinding,
    /// 组件没有入口
    EmptyComponent,
    /// 集合多绑定的元素顺序无法确定
    UnorderedMultibinding,
    /// 处理选项错误
    ConfigurationError,
    /// 插件报告的诊断
    Plugin(String),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDeclaration => write!(f, "malformed-declaration"),
            Self::DependencyCycle => write!(f, "dependency-cycle"),
            Self::DuplicateBinding => write!(f, "duplicate-binding"),
            Self::MissingBinding => write!(f, "missing-binding"),
            Self::ScopeMismatch => write!(f, "scope-mismatch"),
            Self::AmbiguousMultibindingKey => write!(f, "ambiguous-multibinding-key"),
            Self::IncompatibleMultibinding => write!(f, "incompatible-multibinding"),
            Self::InvalidSubcomponent => write!(f, "invalid-subcomponent"),
            Self::UnusedBinding => write!(f, "unused-binding"),
            Self::EmptyComponent => write!(f, "empty-component"),
            Self::UnorderedMultibinding => write!(f, "unordered-multibinding"),
            Self::ConfigurationError => write!(f, "configuration-error"),
            Self::Plugin(name) => write!(f, "plugin:{}", name),
        }
    }
}

/// 诊断位置
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "at", rename_all = "snake_case")]
pub enum DiagnosticLocation {
    /// 某个声明元素
    Declaration { element: String },
    /// 某个组件中的绑定
    Binding { component: String, key: Key },
    /// 某个组件中从入口开始的请求链
    RequestChain {
        component: String,
        chain: Vec<DependencyRequest>,
    },
    /// 某个组件
    Component { component: String },
    /// 某个处理选项
    Option { name: String },
}

impl DiagnosticLocation {
    /// 位置所属的组件
    pub fn component(&self) -> Option<&str> {
        match self {
            Self::Binding { component, .. }
            | Self::RequestChain { component, .. }
            | Self::Component { component } => Some(component),
            Self::Declaration { .. } | Self::Option { .. } => None,
        }
    }
}

impl fmt::Display for DiagnosticLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declaration { element } => write!(f, "{}", element),
            Self::Binding { component, key } => write!(f, "{}: {}", component, key),
            Self::RequestChain { component, chain } => {
                write!(f, "{}: {}", component, format_chain(chain))
            }
            Self::Component { component } => write!(f, "{}", component),
            Self::Option { name } => write!(f, "option {}", name),
        }
    }
}

/// 诊断记录
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 级别
    pub severity: Severity,
    /// 种类
    pub kind: DiagnosticKind,
    /// 消息
    pub message: String,
    /// 位置
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<DiagnosticLocation>,
}

impl Diagnostic {
    /// 创建错误诊断
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// 创建警告诊断
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// 设置位置
    pub fn at(mut self, location: DiagnosticLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// 是否为错误
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({})", location)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_sort_before_warnings() {
        assert!(Severity::Error < Severity::Warning);
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::error(DiagnosticKind::MissingBinding, "缺少绑定: Repo").at(
            DiagnosticLocation::RequestChain {
                component: "App".to_string(),
                chain: vec![
                    DependencyRequest::instance(Key::new("Service")),
                    DependencyRequest::instance(Key::new("Repo")),
                ],
            },
        );
        assert_eq!(
            diagnostic.to_string(),
            "[error] missing-binding: 缺少绑定: Repo (App: Service -> Repo)"
        );
    }
}
