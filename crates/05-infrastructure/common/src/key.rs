//! 绑定键定义
//!
//! 键是被请求值的不可变标识：类型 + 可选限定符 + 可选的多绑定贡献标识

use serde::{Deserialize, Serialize};
use std::fmt;

/// 框架包装类型前缀，不能直接作为绑定的返回类型
pub const FRAMEWORK_WRAPPERS: &[&str] = &["Provider<", "Lazy<", "Producer<", "MembersInjector<"];

/// 多绑定贡献标识
///
/// 区分同一聚合键下来自不同声明的贡献
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContributionIdentifier {
    /// 贡献所在的模块或组件
    pub origin: String,
    /// 贡献声明元素名称
    pub element: String,
}

impl ContributionIdentifier {
    /// 创建新的贡献标识
    pub fn new(origin: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            element: element.into(),
        }
    }
}

/// 绑定键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    /// 类型名称
    #[serde(rename = "type")]
    pub type_name: String,
    /// 限定符
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    /// 多绑定贡献标识
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution: Option<ContributionIdentifier>,
}

impl Key {
    /// 创建无限定符的键
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            qualifier: None,
            contribution: None,
        }
    }

    /// 创建带限定符的键
    pub fn qualified(type_name: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            qualifier: Some(qualifier.into()),
            contribution: None,
        }
    }

    /// 设置限定符
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// 生成贡献键
    pub fn with_contribution(mut self, contribution: ContributionIdentifier) -> Self {
        self.contribution = Some(contribution);
        self
    }

    /// 是否为多绑定贡献键
    pub fn is_contribution(&self) -> bool {
        self.contribution.is_some()
    }

    /// 去掉贡献标识后的键
    pub fn without_contribution(&self) -> Self {
        Self {
            type_name: self.type_name.clone(),
            qualifier: self.qualifier.clone(),
            contribution: None,
        }
    }

    /// 检查键能否作为绑定的返回类型，返回不合法的原因
    pub fn malformation(&self) -> Option<String> {
        let type_name = self.type_name.trim();
        if type_name.is_empty() {
            return Some("类型名称为空".to_string());
        }
        if type_name == "()" || type_name == "void" {
            return Some(format!("类型 {} 不能作为绑定类型", type_name));
        }
        if let Some(wrapper) = FRAMEWORK_WRAPPERS
            .iter()
            .find(|wrapper| type_name.starts_with(*wrapper))
        {
            return Some(format!(
                "框架类型 {}…> 不能作为绑定类型: {}",
                wrapper, type_name
            ));
        }
        if matches!(&self.qualifier, Some(q) if q.trim().is_empty()) {
            return Some("限定符为空".to_string());
        }
        None
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(qualifier) = &self.qualifier {
            write!(f, "@{} ", qualifier)?;
        }
        write!(f, "{}", self.type_name)?;
        if let Some(contribution) = &self.contribution {
            write!(f, " [{}#{}]", contribution.origin, contribution.element)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(Key::new("Service").to_string(), "Service");
        assert_eq!(Key::qualified("String", "Named").to_string(), "@Named String");

        let contribution = Key::new("Set<Plugin>")
            .with_contribution(ContributionIdentifier::new("PluginModule", "first"));
        assert_eq!(contribution.to_string(), "Set<Plugin> [PluginModule#first]");
        assert_eq!(contribution.without_contribution(), Key::new("Set<Plugin>"));
    }

    #[test]
    fn test_key_malformation() {
        assert!(Key::new("Service").malformation().is_none());
        assert!(Key::new("").malformation().is_some());
        assert!(Key::new("void").malformation().is_some());
        assert!(Key::new("Provider<Service>").malformation().is_some());
        assert!(Key::qualified("Service", " ").malformation().is_some());
    }
}
