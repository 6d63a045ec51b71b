//! 原始声明记录
//!
//! 外部声明提取器把模块、组件和可注入类型上的声明规范化为这些记录

use crate::key::Key;
use crate::request::DependencyRequest;
use crate::scope::Scope;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 声明来源
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationOrigin {
    /// 模块中的声明，对安装了该模块的组件可见
    Module(String),
    /// 组件自身的声明，例如构建时绑定的实例
    Component(String),
    /// 可注入类型的构造器，任何组件都可以隐式使用
    InjectableType,
}

impl fmt::Display for DeclarationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(name) => write!(f, "module {}", name),
            Self::Component(name) => write!(f, "component {}", name),
            Self::InjectableType => write!(f, "injectable type"),
        }
    }
}

/// 多绑定贡献方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionType {
    /// 向集合贡献单个元素
    IntoSet,
    /// 向集合批量贡献元素
    ElementsIntoSet,
    /// 向映射贡献一个条目
    IntoMap,
}

impl ContributionType {
    /// 对应的聚合类型
    pub fn aggregate_kind(&self) -> AggregateKind {
        match self {
            Self::IntoSet | Self::ElementsIntoSet => AggregateKind::Set,
            Self::IntoMap => AggregateKind::Map,
        }
    }
}

/// 聚合类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    /// 集合
    Set,
    /// 映射
    Map,
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => write!(f, "set"),
            Self::Map => write!(f, "map"),
        }
    }
}

/// 声明种类
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclarationKind {
    /// 显式工厂
    Provision {
        key: Key,
        #[serde(default)]
        dependencies: Vec<DependencyRequest>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<Scope>,
    },
    /// 可注入构造器
    Injection {
        key: Key,
        #[serde(default)]
        dependencies: Vec<DependencyRequest>,
        #[serde(default)]
        members: Vec<DependencyRequest>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<Scope>,
    },
    /// 把一个键转发到另一个键
    Delegate {
        key: Key,
        target: Key,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<Scope>,
    },
    /// 多绑定贡献
    MultibindingContribution {
        aggregate: Key,
        contribution: ContributionType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        map_key: Option<String>,
        #[serde(default)]
        dependencies: Vec<DependencyRequest>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<Scope>,
    },
    /// 声明一个可能为空的聚合
    Multibinds {
        aggregate: Key,
        aggregate_kind: AggregateKind,
    },
    /// 子组件创建器
    SubcomponentCreator { key: Key, subcomponent: String },
    /// 构建组件时直接提供的实例
    BoundInstance { key: Key },
}

/// 原始声明
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Declaration {
    /// 声明来源
    pub origin: DeclarationOrigin,
    /// 声明元素名称，例如 `AppModule.provideService`
    pub element: String,
    /// 声明内容
    #[serde(flatten)]
    pub kind: DeclarationKind,
}

impl Declaration {
    /// 创建模块中的工厂声明
    pub fn provision(module: impl Into<String>, element: impl Into<String>, key: Key) -> Self {
        Self {
            origin: DeclarationOrigin::Module(module.into()),
            element: element.into(),
            kind: DeclarationKind::Provision {
                key,
                dependencies: Vec::new(),
                scope: None,
            },
        }
    }

    /// 创建可注入构造器声明
    pub fn injection(key: Key) -> Self {
        Self {
            origin: DeclarationOrigin::InjectableType,
            element: format!("{}.<init>", key.type_name),
            kind: DeclarationKind::Injection {
                key,
                dependencies: Vec::new(),
                members: Vec::new(),
                scope: None,
            },
        }
    }

    /// 创建委托声明
    pub fn delegate(
        module: impl Into<String>,
        element: impl Into<String>,
        key: Key,
        target: Key,
    ) -> Self {
        Self {
            origin: DeclarationOrigin::Module(module.into()),
            element: element.into(),
            kind: DeclarationKind::Delegate {
                key,
                target,
                scope: None,
            },
        }
    }

    /// 创建多绑定贡献声明
    pub fn contribution(
        module: impl Into<String>,
        element: impl Into<String>,
        aggregate: Key,
        contribution: ContributionType,
    ) -> Self {
        Self {
            origin: DeclarationOrigin::Module(module.into()),
            element: element.into(),
            kind: DeclarationKind::MultibindingContribution {
                aggregate,
                contribution,
                map_key: None,
                dependencies: Vec::new(),
                scope: None,
            },
        }
    }

    /// 创建聚合声明
    pub fn multibinds(
        module: impl Into<String>,
        element: impl Into<String>,
        aggregate: Key,
        aggregate_kind: AggregateKind,
    ) -> Self {
        Self {
            origin: DeclarationOrigin::Module(module.into()),
            element: element.into(),
            kind: DeclarationKind::Multibinds {
                aggregate,
                aggregate_kind,
            },
        }
    }

    /// 创建子组件创建器声明
    pub fn subcomponent_creator(
        module: impl Into<String>,
        element: impl Into<String>,
        key: Key,
        subcomponent: impl Into<String>,
    ) -> Self {
        Self {
            origin: DeclarationOrigin::Module(module.into()),
            element: element.into(),
            kind: DeclarationKind::SubcomponentCreator {
                key,
                subcomponent: subcomponent.into(),
            },
        }
    }

    /// 创建组件构建时绑定的实例声明
    pub fn bound_instance(component: impl Into<String>, element: impl Into<String>, key: Key) -> Self {
        Self {
            origin: DeclarationOrigin::Component(component.into()),
            element: element.into(),
            kind: DeclarationKind::BoundInstance { key },
        }
    }

    /// 改变声明来源
    pub fn with_origin(mut self, origin: DeclarationOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// 添加依赖请求，对没有依赖的声明种类无效
    pub fn with_dependency(mut self, request: DependencyRequest) -> Self {
        match &mut self.kind {
            DeclarationKind::Provision { dependencies, .. }
            | DeclarationKind::Injection { dependencies, .. }
            | DeclarationKind::MultibindingContribution { dependencies, .. } => {
                dependencies.push(request)
            }
            DeclarationKind::Delegate { .. }
            | DeclarationKind::Multibinds { .. }
            | DeclarationKind::SubcomponentCreator { .. }
            | DeclarationKind::BoundInstance { .. } => {}
        }
        self
    }

    /// 添加实例依赖
    pub fn depends_on(self, key: Key) -> Self {
        self.with_dependency(DependencyRequest::instance(key))
    }

    /// 添加成员注入请求，仅对可注入构造器有效
    pub fn with_member(mut self, request: DependencyRequest) -> Self {
        if let DeclarationKind::Injection { members, .. } = &mut self.kind {
            members.push(request);
        }
        self
    }

    /// 设置作用域
    pub fn with_scope(mut self, new_scope: Scope) -> Self {
        match &mut self.kind {
            DeclarationKind::Provision { scope, .. }
            | DeclarationKind::Injection { scope, .. }
            | DeclarationKind::Delegate { scope, .. }
            | DeclarationKind::MultibindingContribution { scope, .. } => *scope = Some(new_scope),
            DeclarationKind::Multibinds { .. }
            | DeclarationKind::SubcomponentCreator { .. }
            | DeclarationKind::BoundInstance { .. } => {}
        }
        self
    }

    /// 设置映射键，仅对多绑定贡献有效
    pub fn with_map_key(mut self, key: impl Into<String>) -> Self {
        if let DeclarationKind::MultibindingContribution { map_key, .. } = &mut self.kind {
            *map_key = Some(key.into());
        }
        self
    }

    /// 声明满足的键；多绑定贡献与聚合声明返回聚合键
    pub fn declared_key(&self) -> &Key {
        match &self.kind {
            DeclarationKind::Provision { key, .. }
            | DeclarationKind::Injection { key, .. }
            | DeclarationKind::Delegate { key, .. }
            | DeclarationKind::SubcomponentCreator { key, .. }
            | DeclarationKind::BoundInstance { key } => key,
            DeclarationKind::MultibindingContribution { aggregate, .. }
            | DeclarationKind::Multibinds { aggregate, .. } => aggregate,
        }
    }

    /// 声明种类名称
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            DeclarationKind::Provision { .. } => "provision",
            DeclarationKind::Injection { .. } => "injection",
            DeclarationKind::Delegate { .. } => "delegate",
            DeclarationKind::MultibindingContribution { .. } => "multibinding_contribution",
            DeclarationKind::Multibinds { .. } => "multibinds",
            DeclarationKind::SubcomponentCreator { .. } => "subcomponent_creator",
            DeclarationKind::BoundInstance { .. } => "bound_instance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_json_shape() {
        let declaration = Declaration::provision("AppModule", "provideService", Key::new("Service"))
            .depends_on(Key::new("Repo"))
            .with_scope(Scope::singleton());

        let json = serde_json::to_value(&declaration).unwrap();
        assert_eq!(json["origin"]["module"], "AppModule");
        assert_eq!(json["kind"], "provision");
        assert_eq!(json["key"]["type"], "Service");
        assert_eq!(json["scope"], "Singleton");

        let parsed: Declaration = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, declaration);
    }

    #[test]
    fn test_builders_ignore_inapplicable_fields() {
        let instance = Declaration::bound_instance("App", "seed", Key::new("Seed"))
            .depends_on(Key::new("Other"))
            .with_scope(Scope::singleton());
        assert_eq!(instance.kind, DeclarationKind::BoundInstance { key: Key::new("Seed") });
    }
}
