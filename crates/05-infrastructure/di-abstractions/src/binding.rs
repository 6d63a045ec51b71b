//! 绑定定义
//!
//! 绑定是解析的基本单元，以封闭的枚举表示，所有使用方都需要穷举匹配

use di_common::{
    AggregateKind, ContributionIdentifier, ContributionType, Declaration, DeclarationKind,
    DeclarationOrigin, DependencyRequest, Key, Scope,
};
use std::fmt;

/// 显式工厂绑定
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProvisionBinding {
    pub key: Key,
    pub dependencies: Vec<DependencyRequest>,
    pub scope: Option<Scope>,
    pub element: String,
    pub origin: DeclarationOrigin,
}

/// 可注入构造器绑定
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InjectionBinding {
    pub key: Key,
    pub dependencies: Vec<DependencyRequest>,
    /// 构造后需要注入的成员
    pub members: Vec<DependencyRequest>,
    pub scope: Option<Scope>,
    pub element: String,
}

/// 委托绑定
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelegateBinding {
    pub key: Key,
    pub target: DependencyRequest,
    pub scope: Option<Scope>,
    pub element: String,
    pub origin: DeclarationOrigin,
}

/// 多绑定贡献
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContributionBinding {
    /// 带贡献标识的键
    pub key: Key,
    /// 聚合键
    pub aggregate: Key,
    pub contribution: ContributionType,
    pub map_key: Option<String>,
    pub dependencies: Vec<DependencyRequest>,
    pub scope: Option<Scope>,
    pub element: String,
    pub origin: DeclarationOrigin,
}

/// 合成的多绑定
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultiboundBinding {
    pub key: Key,
    pub aggregate_kind: AggregateKind,
    /// 对各个贡献键的请求，祖先的贡献在前
    pub contributions: Vec<DependencyRequest>,
}

/// 子组件创建器绑定
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubcomponentCreatorBinding {
    pub key: Key,
    pub subcomponent: String,
    pub element: String,
    pub origin: DeclarationOrigin,
}

/// 组件构建时提供的实例
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundInstanceBinding {
    pub key: Key,
    pub element: String,
    pub component: String,
}

/// 绑定种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingKind {
    Provision,
    Injection,
    Delegate,
    MultibindingContribution,
    Multibinding,
    SubcomponentCreator,
    BoundInstance,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Provision => "provision",
            Self::Injection => "injection",
            Self::Delegate => "delegate",
            Self::MultibindingContribution => "contribution",
            Self::Multibinding => "multibinding",
            Self::SubcomponentCreator => "subcomponent-creator",
            Self::BoundInstance => "bound-instance",
        };
        write!(f, "{}", name)
    }
}

/// 绑定
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Binding {
    Provision(ProvisionBinding),
    Injection(InjectionBinding),
    Delegate(DelegateBinding),
    MultibindingContribution(ContributionBinding),
    Multibinding(MultiboundBinding),
    SubcomponentCreator(SubcomponentCreatorBinding),
    BoundInstance(BoundInstanceBinding),
}

impl Binding {
    /// 把原始声明转换为绑定；聚合声明本身不是绑定，返回 `None`
    pub fn from_declaration(declaration: &Declaration) -> Option<Self> {
        let element = declaration.element.clone();
        let origin = declaration.origin.clone();
        let binding = match &declaration.kind {
            DeclarationKind::Provision {
                key,
                dependencies,
                scope,
            } => Self::Provision(ProvisionBinding {
                key: key.clone(),
                dependencies: dependencies.clone(),
                scope: scope.clone(),
                element,
                origin,
            }),
            DeclarationKind::Injection {
                key,
                dependencies,
                members,
                scope,
            } => Self::Injection(InjectionBinding {
                key: key.clone(),
                dependencies: dependencies.clone(),
                members: members.clone(),
                scope: scope.clone(),
                element,
            }),
            DeclarationKind::Delegate { key, target, scope } => Self::Delegate(DelegateBinding {
                key: key.clone(),
                target: DependencyRequest::instance(target.clone()),
                scope: scope.clone(),
                element,
                origin,
            }),
            DeclarationKind::MultibindingContribution {
                aggregate,
                contribution,
                map_key,
                dependencies,
                scope,
            } => {
                let origin_name = match &origin {
                    DeclarationOrigin::Module(name) | DeclarationOrigin::Component(name) => {
                        name.clone()
                    }
                    DeclarationOrigin::InjectableType => String::new(),
                };
                Self::MultibindingContribution(ContributionBinding {
                    key: aggregate
                        .clone()
                        .with_contribution(ContributionIdentifier::new(origin_name, &element)),
                    aggregate: aggregate.clone(),
                    contribution: *contribution,
                    map_key: map_key.clone(),
                    dependencies: dependencies.clone(),
                    scope: scope.clone(),
                    element,
                    origin,
                })
            }
            DeclarationKind::Multibinds { .. } => return None,
            DeclarationKind::SubcomponentCreator { key, subcomponent } => {
                Self::SubcomponentCreator(SubcomponentCreatorBinding {
                    key: key.clone(),
                    subcomponent: subcomponent.clone(),
                    element,
                    origin,
                })
            }
            DeclarationKind::BoundInstance { key } => {
                let component = match &origin {
                    DeclarationOrigin::Component(name) | DeclarationOrigin::Module(name) => {
                        name.clone()
                    }
                    DeclarationOrigin::InjectableType => String::new(),
                };
                Self::BoundInstance(BoundInstanceBinding {
                    key: key.clone(),
                    element,
                    component,
                })
            }
        };
        Some(binding)
    }

    /// 绑定满足的键
    pub fn key(&self) -> &Key {
        match self {
            Self::Provision(binding) => &binding.key,
            Self::Injection(binding) => &binding.key,
            Self::Delegate(binding) => &binding.key,
            Self::MultibindingContribution(binding) => &binding.key,
            Self::Multibinding(binding) => &binding.key,
            Self::SubcomponentCreator(binding) => &binding.key,
            Self::BoundInstance(binding) => &binding.key,
        }
    }

    /// 绑定种类
    pub fn kind(&self) -> BindingKind {
        match self {
            Self::Provision(_) => BindingKind::Provision,
            Self::Injection(_) => BindingKind::Injection,
            Self::Delegate(_) => BindingKind::Delegate,
            Self::MultibindingContribution(_) => BindingKind::MultibindingContribution,
            Self::Multibinding(_) => BindingKind::Multibinding,
            Self::SubcomponentCreator(_) => BindingKind::SubcomponentCreator,
            Self::BoundInstance(_) => BindingKind::BoundInstance,
        }
    }

    /// 按顺序列出依赖请求；可注入构造器的成员请求排在构造参数之后
    pub fn dependencies(&self) -> Vec<&DependencyRequest> {
        match self {
            Self::Provision(binding) => binding.dependencies.iter().collect(),
            Self::Injection(binding) => binding
                .dependencies
                .iter()
                .chain(binding.members.iter())
                .collect(),
            Self::Delegate(binding) => vec![&binding.target],
            Self::MultibindingContribution(binding) => binding.dependencies.iter().collect(),
            Self::Multibinding(binding) => binding.contributions.iter().collect(),
            Self::SubcomponentCreator(_) | Self::BoundInstance(_) => Vec::new(),
        }
    }

    /// 声明的作用域
    pub fn scope(&self) -> Option<&Scope> {
        match self {
            Self::Provision(binding) => binding.scope.as_ref(),
            Self::Injection(binding) => binding.scope.as_ref(),
            Self::Delegate(binding) => binding.scope.as_ref(),
            Self::MultibindingContribution(binding) => binding.scope.as_ref(),
            Self::Multibinding(_) | Self::SubcomponentCreator(_) | Self::BoundInstance(_) => None,
        }
    }

    /// 声明元素名称；合成的多绑定没有声明元素
    pub fn element(&self) -> Option<&str> {
        match self {
            Self::Provision(binding) => Some(&binding.element),
            Self::Injection(binding) => Some(&binding.element),
            Self::Delegate(binding) => Some(&binding.element),
            Self::MultibindingContribution(binding) => Some(&binding.element),
            Self::Multibinding(_) => None,
            Self::SubcomponentCreator(binding) => Some(&binding.element),
            Self::BoundInstance(binding) => Some(&binding.element),
        }
    }

    /// 是否由可注入构造器隐式提供
    pub fn is_implicit(&self) -> bool {
        matches!(self, Self::Injection(_))
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.key())?;
        if let Some(element) = self.element() {
            write!(f, " ({})", element)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_key_carries_origin() {
        let declaration = Declaration::contribution(
            "PluginModule",
            "firstPlugin",
            Key::new("Set<Plugin>"),
            ContributionType::IntoSet,
        );
        let binding = Binding::from_declaration(&declaration).unwrap();
        let contribution = binding.key().contribution.as_ref().unwrap();
        assert_eq!(contribution.origin, "PluginModule");
        assert_eq!(contribution.element, "firstPlugin");
        assert_eq!(binding.kind(), BindingKind::MultibindingContribution);
    }

    #[test]
    fn test_injection_members_follow_constructor_dependencies() {
        let declaration = Declaration::injection(Key::new("Widget"))
            .depends_on(Key::new("Engine"))
            .with_member(DependencyRequest::instance(Key::new("Logger")));
        let binding = Binding::from_declaration(&declaration).unwrap();
        let keys: Vec<_> = binding
            .dependencies()
            .into_iter()
            .map(|request| request.key.type_name.clone())
            .collect();
        assert_eq!(keys, vec!["Engine", "Logger"]);
        assert!(binding.is_implicit());
    }

    #[test]
    fn test_multibinds_is_not_a_binding() {
        let declaration = Declaration::multibinds(
            "PluginModule",
            "plugins",
            Key::new("Set<Plugin>"),
            AggregateKind::Set,
        );
        assert!(Binding::from_declaration(&declaration).is_none());
    }
}
