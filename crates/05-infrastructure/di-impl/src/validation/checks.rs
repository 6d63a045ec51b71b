//! 内置校验检查

use config_abstractions::ProcessingOptions;
use di_abstractions::{Binding, BindingGraph, ValidationCheck};
use di_common::{
    AggregateKind, ComponentTree, ContributionType, Diagnostic, DiagnosticKind,
    DiagnosticLocation, Scope,
};

/// 未被使用的作用域绑定
#[derive(Debug, Default, Clone, Copy)]
pub struct UnusedScopedBindingCheck;

impl ValidationCheck for UnusedScopedBindingCheck {
    fn name(&self) -> &'static str {
        "unused-scoped-binding"
    }

    fn is_enabled(&self, options: &ProcessingOptions) -> bool {
        options.warn_unused_scoped_bindings
    }

    fn check(&self, graph: &BindingGraph, _options: &ProcessingOptions) -> Vec<Diagnostic> {
        graph
            .declarations()
            .iter()
            .filter(|binding| binding.scope().is_some_and(|scope| !scope.is_reusable()))
            .filter(|binding| {
                !graph
                    .owned_nodes()
                    .any(|node| node.binding == **binding)
            })
            .map(|binding| {
                Diagnostic::warning(
                    DiagnosticKind::UnusedBinding,
                    format!("作用域绑定 {} 没有被任何请求使用", binding),
                )
                .at(DiagnosticLocation::Binding {
                    component: graph.name().to_string(),
                    key: binding.key().clone(),
                })
            })
            .collect()
    }
}

/// 没有入口的组件
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyComponentCheck;

impl ValidationCheck for EmptyComponentCheck {
    fn name(&self) -> &'static str {
        "empty-component"
    }

    fn check(&self, graph: &BindingGraph, _options: &ProcessingOptions) -> Vec<Diagnostic> {
        if !graph.entry_points().is_empty() {
            return Vec::new();
        }
        vec![Diagnostic::warning(
            DiagnosticKind::EmptyComponent,
            format!("组件 {} 没有任何入口", graph.lineage().join(" > ")),
        )
        .at(DiagnosticLocation::Component {
            component: graph.name().to_string(),
        })]
    }
}

/// 组件层级中的作用域问题
///
/// 只在根组件的图上运行一次，沿子图向下检查整棵树
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentHierarchyCheck;

impl ValidationCheck for ComponentHierarchyCheck {
    fn name(&self) -> &'static str {
        "component-hierarchy"
    }

    fn check(&self, graph: &BindingGraph, _options: &ProcessingOptions) -> Vec<Diagnostic> {
        if graph.component().is_subcomponent() {
            return Vec::new();
        }
        let mut diagnostics = Vec::new();
        let mut stack: Vec<(&BindingGraph, Vec<(String, Scope)>)> = vec![(graph, Vec::new())];
        while let Some((current, ancestors)) = stack.pop() {
            diagnostics.extend(scope_problems(current.name(), current.scope(), &ancestors));
            let mut inherited = ancestors;
            if let Some(scope) = current.scope() {
                inherited.push((current.name().to_string(), scope.clone()));
            }
            for subgraph in current.subgraphs().iter().rev() {
                stack.push((subgraph, inherited.clone()));
            }
        }
        diagnostics
    }
}

/// 不经过绑定图直接检查组件树，供头文件步骤使用
pub fn hierarchy_diagnostics(tree: &ComponentTree) -> Vec<Diagnostic> {
    tree.nodes()
        .iter()
        .flat_map(|node| {
            let ancestors: Vec<(String, Scope)> = tree
                .lineage(node.id)
                .into_iter()
                .filter(|ancestor| *ancestor != node.id)
                .filter_map(|ancestor| {
                    let ancestor = tree.node(ancestor);
                    ancestor
                        .scope()
                        .map(|scope| (ancestor.name().to_string(), scope.clone()))
                })
                .collect();
            scope_problems(node.name(), node.scope(), &ancestors)
        })
        .collect()
}

fn scope_problems(
    component: &str,
    scope: Option<&Scope>,
    ancestors: &[(String, Scope)],
) -> Vec<Diagnostic> {
    let Some(scope) = scope else {
        return Vec::new();
    };
    let location = DiagnosticLocation::Component {
        component: component.to_string(),
    };
    if scope.is_reusable() {
        return vec![Diagnostic::error(
            DiagnosticKind::ScopeMismatch,
            format!("组件 {} 不能声明 {} 作用域", component, scope),
        )
        .at(location)];
    }
    ancestors
        .iter()
        .filter(|(_, ancestor_scope)| ancestor_scope == scope)
        .map(|(ancestor, _)| {
            Diagnostic::error(
                DiagnosticKind::ScopeMismatch,
                format!(
                    "子组件 {} 重复使用了祖先 {} 的作用域 {}",
                    component, ancestor, scope
                ),
            )
            .at(location.clone())
        })
        .collect()
}

/// 子组件创建器必须指向拥有者的直接子组件
#[derive(Debug, Default, Clone, Copy)]
pub struct SubcomponentCreatorCheck;

impl ValidationCheck for SubcomponentCreatorCheck {
    fn name(&self) -> &'static str {
        "subcomponent-creator"
    }

    fn check(&self, graph: &BindingGraph, _options: &ProcessingOptions) -> Vec<Diagnostic> {
        let owned = graph.owned_nodes().map(|node| &node.binding);
        let declared = graph.declarations().iter();
        owned
            .chain(declared)
            .filter_map(|binding| match binding.as_ref() {
                Binding::SubcomponentCreator(creator) => Some(creator),
                _ => None,
            })
            .filter(|creator| {
                !graph
                    .subgraphs()
                    .iter()
                    .any(|subgraph| subgraph.name() == creator.subcomponent)
            })
            .map(|creator| {
                Diagnostic::error(
                    DiagnosticKind::InvalidSubcomponent,
                    format!(
                        "创建器 {} 指向的 {} 不是组件 {} 的子组件",
                        creator.element,
                        creator.subcomponent,
                        graph.name()
                    ),
                )
                .at(DiagnosticLocation::Binding {
                    component: graph.name().to_string(),
                    key: creator.key.clone(),
                })
            })
            .collect()
    }
}

/// 预先生成子组件模式下，每个子组件都需要父组件声明的创建器
#[derive(Debug, Default, Clone, Copy)]
pub struct AheadOfTimeCreatorCheck;

impl ValidationCheck for AheadOfTimeCreatorCheck {
    fn name(&self) -> &'static str {
        "ahead-of-time-creator"
    }

    fn is_enabled(&self, options: &ProcessingOptions) -> bool {
        options.ahead_of_time_subcomponents
    }

    fn check(&self, graph: &BindingGraph, _options: &ProcessingOptions) -> Vec<Diagnostic> {
        if !graph.component().is_subcomponent() || graph.creator().is_some() {
            return Vec::new();
        }
        let parent = graph
            .lineage()
            .iter()
            .rev()
            .nth(1)
            .map(String::as_str)
            .unwrap_or_default();
        vec![Diagnostic::error(
            DiagnosticKind::InvalidSubcomponent,
            format!(
                "预先生成子组件模式下，子组件 {} 需要在父组件 {} 中声明创建器",
                graph.name(),
                parent
            ),
        )
        .at(DiagnosticLocation::Component {
            component: graph.name().to_string(),
        })]
    }
}

/// 严格多绑定顺序模式下，批量贡献的集合多绑定顺序无法确定
#[derive(Debug, Default, Clone, Copy)]
pub struct MultibindingOrderingCheck;

impl ValidationCheck for MultibindingOrderingCheck {
    fn name(&self) -> &'static str {
        "multibinding-ordering"
    }

    fn is_enabled(&self, options: &ProcessingOptions) -> bool {
        options.strict_multibinding_ordering
    }

    fn check(&self, graph: &BindingGraph, _options: &ProcessingOptions) -> Vec<Diagnostic> {
        graph
            .owned_nodes()
            .filter(|node| {
                matches!(
                    node.binding.as_ref(),
                    Binding::Multibinding(multibinding) if multibinding.aggregate_kind == AggregateKind::Set
                )
            })
            .filter(|node| {
                graph.dependencies_of(node.id).any(|edge| {
                    graph.node(edge.target).is_some_and(|target| {
                        matches!(
                            target.binding.as_ref(),
                            Binding::MultibindingContribution(contribution)
                                if contribution.contribution == ContributionType::ElementsIntoSet
                        )
                    })
                })
            })
            .map(|node| {
                Diagnostic::warning(
                    DiagnosticKind::UnorderedMultibinding,
                    format!("集合多绑定 {} 含有批量贡献，元素顺序无法确定", node.key()),
                )
                .at(DiagnosticLocation::Binding {
                    component: graph.name().to_string(),
                    key: node.key().clone(),
                })
            })
            .collect()
    }
}

/// 按固定顺序排列的内置检查
pub fn builtin_checks() -> Vec<Box<dyn ValidationCheck>> {
    vec![
        Box::new(UnusedScopedBindingCheck),
        Box::new(EmptyComponentCheck),
        Box::new(ComponentHierarchyCheck),
        Box::new(SubcomponentCreatorCheck),
        Box::new(AheadOfTimeCreatorCheck),
        Box::new(MultibindingOrderingCheck),
    ]
}
