//! 声明索引
//!
//! 按组件和键对声明分组，并在建立索引时拒绝形状不合法的声明。这里不做任何依赖解析。

use crate::sink::DiagnosticsSink;
use di_abstractions::{Binding, DeclarationLookup};
use di_common::{
    AggregateKind, ComponentTree, ContributionType, Declaration, DeclarationKind,
    DeclarationOrigin, Diagnostic, DiagnosticKind, DiagnosticLocation, Key,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 单个组件的本地声明
#[derive(Debug, Default)]
struct ComponentDeclarations {
    explicit: BTreeMap<Key, Vec<Arc<Binding>>>,
    contributions: BTreeMap<Key, Vec<Arc<Binding>>>,
    multibinds: BTreeMap<Key, Vec<AggregateKind>>,
    local: Vec<Arc<Binding>>,
}

/// 声明索引
#[derive(Debug, Default)]
pub struct DeclarationIndex {
    components: HashMap<String, ComponentDeclarations>,
    injectables: BTreeMap<Key, Arc<Binding>>,
    indexed: usize,
}

impl DeclarationIndex {
    /// 为一组组件树建立索引，问题记录到收集器中
    pub fn build(
        trees: &[ComponentTree],
        declarations: &[Declaration],
        sink: &mut DiagnosticsSink,
    ) -> Self {
        let mut index = Self::default();
        let mut installers: HashMap<&str, Vec<String>> = HashMap::new();
        for tree in trees {
            for node in tree.nodes() {
                index
                    .components
                    .insert(node.name().to_string(), ComponentDeclarations::default());
                for module in &node.descriptor.modules {
                    installers
                        .entry(module.as_str())
                        .or_default()
                        .push(node.name().to_string());
                }
            }
        }

        let mut seen = HashSet::new();
        for declaration in declarations {
            if !seen.insert(declaration) {
                debug!("忽略重复声明: {}", declaration.element);
                continue;
            }
            if let Some(reason) = index.malformation(declaration) {
                sink.record(malformed(declaration, reason));
                continue;
            }

            if let DeclarationKind::Injection { key, .. } = &declaration.kind {
                index.add_injectable(declaration, key, sink);
                continue;
            }

            let targets = match &declaration.origin {
                DeclarationOrigin::Module(module) => match installers.get(module.as_str()) {
                    Some(components) => components.clone(),
                    None => {
                        warn!("模块 {} 未被任何组件安装，忽略声明 {}", module, declaration.element);
                        sink.record(
                            Diagnostic::warning(
                                DiagnosticKind::MalformedDeclaration,
                                format!(
                                    "模块 {} 未被任何组件安装，声明 {} 被忽略",
                                    module, declaration.element
                                ),
                            )
                            .at(declaration_location(declaration)),
                        );
                        continue;
                    }
                },
                DeclarationOrigin::Component(component) => vec![component.clone()],
                DeclarationOrigin::InjectableType => Vec::new(),
            };

            index.add(declaration, &targets);
        }

        info!(
            "声明索引构建完成: {} 条声明, {} 个组件, {} 个可注入类型",
            index.indexed,
            index.components.len(),
            index.injectables.len()
        );
        index
    }

    /// 检查声明形状，返回不合法的原因
    fn malformation(&self, declaration: &Declaration) -> Option<String> {
        if let Some(reason) = declaration.declared_key().malformation() {
            return Some(reason);
        }
        if declaration.declared_key().is_contribution() {
            return Some("声明的键不能携带贡献标识".to_string());
        }

        match (&declaration.origin, &declaration.kind) {
            (DeclarationOrigin::InjectableType, DeclarationKind::Injection { .. }) => {}
            (_, DeclarationKind::Injection { .. }) => {
                return Some("可注入构造器只能声明在可注入类型上".to_string());
            }
            (DeclarationOrigin::InjectableType, _) => {
                return Some(format!(
                    "{} 声明必须来自模块或组件",
                    declaration.kind_name()
                ));
            }
            (DeclarationOrigin::Component(component), _)
                if !self.components.contains_key(component) =>
            {
                return Some(format!("声明来自未知组件 {}", component));
            }
            _ => {}
        }

        match &declaration.kind {
            DeclarationKind::Delegate { key, target, .. } => {
                if key == target {
                    return Some(format!("委托绑定把 {} 转发给自身", key));
                }
                target.malformation()
            }
            DeclarationKind::MultibindingContribution {
                contribution,
                map_key,
                ..
            } => match (contribution, map_key) {
                (ContributionType::IntoMap, None) => Some("映射贡献缺少映射键".to_string()),
                (ContributionType::IntoSet | ContributionType::ElementsIntoSet, Some(map_key)) => {
                    Some(format!("集合贡献不能带映射键 {}", map_key))
                }
                _ => None,
            },
            DeclarationKind::Injection { key, .. } if key.qualifier.is_some() => {
                Some(format!("可注入类型 {} 不能带限定符", key.type_name))
            }
            DeclarationKind::SubcomponentCreator { subcomponent, .. }
                if !self.components.contains_key(subcomponent) =>
            {
                Some(format!("子组件创建器指向未知组件 {}", subcomponent))
            }
            _ => None,
        }
    }

    fn add_injectable(&mut self, declaration: &Declaration, key: &Key, sink: &mut DiagnosticsSink) {
        if let Some(existing) = self.injectables.get(key) {
            sink.record(malformed(
                declaration,
                format!(
                    "类型 {} 已有可注入构造器 {}",
                    key,
                    existing.element().unwrap_or_default()
                ),
            ));
            return;
        }
        if let Some(binding) = Binding::from_declaration(declaration) {
            self.injectables.insert(key.clone(), Arc::new(binding));
            self.indexed += 1;
        }
    }

    fn add(&mut self, declaration: &Declaration, targets: &[String]) {
        if let DeclarationKind::Multibinds {
            aggregate,
            aggregate_kind,
        } = &declaration.kind
        {
            for target in targets {
                if let Some(component) = self.components.get_mut(target) {
                    component
                        .multibinds
                        .entry(aggregate.clone())
                        .or_default()
                        .push(*aggregate_kind);
                }
            }
            self.indexed += 1;
            return;
        }

        let Some(binding) = Binding::from_declaration(declaration) else {
            return;
        };
        let binding = Arc::new(binding);
        for target in targets {
            let Some(component) = self.components.get_mut(target) else {
                continue;
            };
            component
                .explicit
                .entry(binding.key().clone())
                .or_default()
                .push(Arc::clone(&binding));
            if let Binding::MultibindingContribution(contribution) = binding.as_ref() {
                component
                    .contributions
                    .entry(contribution.aggregate.clone())
                    .or_default()
                    .push(Arc::clone(&binding));
            }
            component.local.push(Arc::clone(&binding));
        }
        self.indexed += 1;
    }

    /// 已建立索引的声明数量
    pub fn declaration_count(&self) -> usize {
        self.indexed
    }

    /// 可注入类型数量
    pub fn injectable_count(&self) -> usize {
        self.injectables.len()
    }
}

impl DeclarationLookup for DeclarationIndex {
    fn explicit_bindings(&self, component: &str, key: &Key) -> &[Arc<Binding>] {
        self.components
            .get(component)
            .and_then(|declarations| declarations.explicit.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn contributions(&self, component: &str, aggregate: &Key) -> &[Arc<Binding>] {
        self.components
            .get(component)
            .and_then(|declarations| declarations.contributions.get(aggregate))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn multibinds(&self, component: &str, aggregate: &Key) -> &[AggregateKind] {
        self.components
            .get(component)
            .and_then(|declarations| declarations.multibinds.get(aggregate))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn injectable(&self, key: &Key) -> Option<&Arc<Binding>> {
        self.injectables.get(key)
    }

    fn local_bindings(&self, component: &str) -> &[Arc<Binding>] {
        self.components
            .get(component)
            .map(|declarations| declarations.local.as_slice())
            .unwrap_or(&[])
    }
}

fn declaration_location(declaration: &Declaration) -> DiagnosticLocation {
    DiagnosticLocation::Declaration {
        element: declaration.element.clone(),
    }
}

fn malformed(declaration: &Declaration, reason: String) -> Diagnostic {
    Diagnostic::error(
        DiagnosticKind::MalformedDeclaration,
        format!("声明 {} 不合法: {}", declaration.element, reason),
    )
    .at(declaration_location(declaration))
}
