//! 绑定解析器
//!
//! 对一棵组件树做深度优先解析。解析使用显式的工作栈而不是递归，
//! 每个 `(组件, 键)` 在一次处理中最多解析一次。

use crate::sink::DiagnosticsSink;
use di_abstractions::{
    Binding, BindingNode, BindingNodeId, DeclarationLookup, DependencyEdge, EdgeSource,
    MultiboundBinding, UnresolvedRequest,
};
use di_common::{
    format_chain, AggregateKind, ComponentId, ComponentTree, DependencyRequest, Diagnostic,
    DiagnosticKind, DiagnosticLocation, Key,
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// 单次请求的解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(BindingNodeId),
    Unresolved,
}

impl Resolution {
    pub fn node(&self) -> Option<BindingNodeId> {
        match self {
            Self::Resolved(id) => Some(*id),
            Self::Unresolved => None,
        }
    }
}

/// 单个组件的解析记录
#[derive(Debug, Default, Clone)]
pub struct ComponentResolution {
    /// 在本组件上下文中发出的请求
    pub edges: Vec<DependencyEdge>,
    /// 本组件上下文中无法满足的必需请求
    pub unresolved: Vec<UnresolvedRequest>,
    /// 本组件上下文中可见的节点
    pub visible: BTreeSet<BindingNodeId>,
    /// 父组件中创建本组件的绑定
    pub creator: Option<BindingNodeId>,
}

/// 一棵组件树的解析结果
#[derive(Debug, Default, Clone)]
pub struct ResolvedTree {
    /// 节点 arena，下标即节点标识
    pub nodes: Vec<Arc<BindingNode>>,
    /// 按组件下标排列的解析记录
    pub components: Vec<ComponentResolution>,
}

enum Lookup {
    Bind(Arc<Binding>),
    Delegate(ComponentId),
    Missing,
}

enum Frame {
    Request {
        component: ComponentId,
        source: Option<EdgeSource>,
        request: DependencyRequest,
    },
    Finish {
        node: BindingNodeId,
        aliases: Vec<ComponentId>,
    },
}

/// 正在展开的节点
struct PathEntry {
    owner: ComponentId,
    key: Key,
    request: DependencyRequest,
    node: BindingNodeId,
}

/// 绑定解析器
pub struct Resolver<'a> {
    tree: &'a ComponentTree,
    index: &'a dyn DeclarationLookup,
    sink: &'a mut DiagnosticsSink,
    cache: HashMap<(ComponentId, Key), Resolution>,
    in_progress: HashMap<(ComponentId, Key), BindingNodeId>,
    path: Vec<PathEntry>,
    nodes: Vec<Arc<BindingNode>>,
    components: Vec<ComponentResolution>,
    reported: HashSet<(DiagnosticKind, ComponentId, Key)>,
    reported_cycles: HashSet<Vec<(ComponentId, Key)>>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        tree: &'a ComponentTree,
        index: &'a dyn DeclarationLookup,
        sink: &'a mut DiagnosticsSink,
    ) -> Self {
        Self {
            tree,
            index,
            sink,
            cache: HashMap::new(),
            in_progress: HashMap::new(),
            path: Vec::new(),
            nodes: Vec::new(),
            components: vec![ComponentResolution::default(); tree.len()],
            reported: HashSet::new(),
            reported_cycles: HashSet::new(),
        }
    }

    /// 解析组件中的一个请求及其全部传递依赖
    ///
    /// `source` 为 `None` 时不记录依赖边
    pub fn resolve(
        &mut self,
        component: ComponentId,
        source: Option<EdgeSource>,
        request: DependencyRequest,
    ) -> Resolution {
        let mut stack = vec![Frame::Request {
            component,
            source,
            request,
        }];
        let mut outcome = None;
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Request {
                    component,
                    source,
                    request,
                } => {
                    let resolution = self.step(component, source, request, &mut stack);
                    outcome.get_or_insert(resolution);
                }
                Frame::Finish { node, aliases } => self.finish(node, aliases),
            }
        }
        outcome.unwrap_or(Resolution::Unresolved)
    }

    /// 解析子组件的创建器并记录在子组件上
    pub fn resolve_creator(
        &mut self,
        parent: ComponentId,
        child: ComponentId,
        request: DependencyRequest,
    ) -> Resolution {
        let resolution = self.resolve(parent, None, request);
        self.components[child.index()].creator = resolution.node();
        resolution
    }

    /// 结束解析，交出节点和各组件的记录
    pub fn into_resolved(self) -> ResolvedTree {
        ResolvedTree {
            nodes: self.nodes,
            components: self.components,
        }
    }

    fn step(
        &mut self,
        component: ComponentId,
        source: Option<EdgeSource>,
        request: DependencyRequest,
        stack: &mut Vec<Frame>,
    ) -> Resolution {
        let key = request.key.clone();
        let mut target = component;
        let mut aliases = Vec::new();
        loop {
            if let Some(&resolution) = self.cache.get(&(target, key.clone())) {
                for alias in aliases {
                    self.cache.insert((alias, key.clone()), resolution);
                }
                return self.connect(component, source, request, resolution);
            }

            if let Some(&node) = self.in_progress.get(&(target, key.clone())) {
                self.report_cycle(&request, node);
                self.record_edge(component, source, request, node);
                return Resolution::Resolved(node);
            }

            match self.lookup(target, &key) {
                Lookup::Delegate(owner) => {
                    debug!(
                        "{} 在 {} 中的绑定由祖先 {} 提供",
                        key,
                        self.tree.name(target),
                        self.tree.name(owner)
                    );
                    aliases.push(target);
                    target = owner;
                }
                Lookup::Missing => {
                    aliases.push(target);
                    for alias in aliases {
                        self.cache.insert((alias, key.clone()), Resolution::Unresolved);
                    }
                    return self.connect(component, source, request, Resolution::Unresolved);
                }
                Lookup::Bind(binding) => {
                    let node = self.create_node(target, binding);
                    self.check_scope(target, node);
                    self.in_progress.insert((target, key.clone()), node);
                    self.record_edge(component, source, request.clone(), node);

                    let binding = Arc::clone(&self.nodes[node.0].binding);
                    // Finish 在全部依赖之后弹出
                    stack.push(Frame::Finish { node, aliases });
                    for dependency in binding.dependencies().into_iter().rev() {
                        // 依赖在拥有者组件中解析
                        stack.push(Frame::Request {
                            component: target,
                            source: Some(EdgeSource::Binding(node)),
                            request: dependency.clone(),
                        });
                    }

                    self.path.push(PathEntry {
                        owner: target,
                        key,
                        request,
                        node,
                    });
                    return Resolution::Resolved(node);
                }
            }
        }
    }

    fn finish(&mut self, node: BindingNodeId, aliases: Vec<ComponentId>) {
        let Some(entry) = self.path.pop() else {
            return;
        };
        debug_assert_eq!(entry.node, node);
        self.in_progress.remove(&(entry.owner, entry.key.clone()));
        let resolution = Resolution::Resolved(node);
        self.cache.insert((entry.owner, entry.key.clone()), resolution);
        for alias in aliases {
            self.cache.insert((alias, entry.key.clone()), resolution);
        }
    }

    /// 按查找顺序确定绑定：聚合、本地显式、祖先显式、可注入构造器
    fn lookup(&mut self, component: ComponentId, key: &Key) -> Lookup {
        let tree = self.tree;
        let index = self.index;

        if !key.is_contribution() {
            let declaring = tree
                .ancestors(component)
                .find(|ancestor| index.declares_aggregate(tree.name(*ancestor), key));
            if let Some(declaring) = declaring {
                self.check_explicit_aggregate(component, key);
                let owner = tree
                    .ancestors(component)
                    .find(|ancestor| !index.contributions(tree.name(*ancestor), key).is_empty())
                    .unwrap_or(declaring);
                if owner != component {
                    return Lookup::Delegate(owner);
                }
                return Lookup::Bind(self.synthesize_multibinding(owner, key));
            }
        }

        let local = index.explicit_bindings(tree.name(component), key);
        if let Some(first) = local.first() {
            self.check_duplicates(component, key, local);
            return Lookup::Bind(Arc::clone(first));
        }

        if let Some(ancestor) = tree
            .ancestors(component)
            .skip(1)
            .find(|ancestor| !index.explicit_bindings(tree.name(*ancestor), key).is_empty())
        {
            return Lookup::Delegate(ancestor);
        }

        if let Some(binding) = index.injectable(key) {
            if let Some(scope) = binding.scope().filter(|scope| !scope.is_reusable()) {
                if let Some(owner) = tree.nearest_with_scope(component, scope) {
                    if owner != component {
                        return Lookup::Delegate(owner);
                    }
                }
            }
            return Lookup::Bind(Arc::clone(binding));
        }

        Lookup::Missing
    }

    fn synthesize_multibinding(&mut self, owner: ComponentId, aggregate: &Key) -> Arc<Binding> {
        let tree = self.tree;
        let index = self.index;
        let owner_name = tree.name(owner).to_string();

        let mut seen = HashSet::new();
        let mut contributions: Vec<Arc<Binding>> = Vec::new();
        let mut kinds: Vec<AggregateKind> = Vec::new();
        for ancestor in tree.lineage(owner) {
            let name = tree.name(ancestor);
            for contribution in index.contributions(name, aggregate) {
                if seen.insert(contribution.key().clone()) {
                    contributions.push(Arc::clone(contribution));
                }
            }
            kinds.extend_from_slice(index.multibinds(name, aggregate));
        }

        let mut contributed_kinds = contributions.iter().filter_map(|binding| match binding.as_ref() {
            Binding::MultibindingContribution(contribution) => {
                Some(contribution.contribution.aggregate_kind())
            }
            _ => None,
        });
        let aggregate_kind = contributed_kinds
            .next()
            .or_else(|| kinds.first().copied())
            .unwrap_or(AggregateKind::Set);
        let incompatible = contributed_kinds.chain(kinds.iter().copied()).any(|kind| kind != aggregate_kind);
        if incompatible {
            self.sink.record(
                Diagnostic::error(
                    DiagnosticKind::IncompatibleMultibinding,
                    format!("聚合 {} 同时有集合贡献和映射贡献", aggregate),
                )
                .at(DiagnosticLocation::Binding {
                    component: owner_name.clone(),
                    key: aggregate.clone(),
                }),
            );
        }

        if aggregate_kind == AggregateKind::Map {
            let mut by_map_key: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
            for binding in &contributions {
                if let Binding::MultibindingContribution(contribution) = binding.as_ref() {
                    if let Some(map_key) = &contribution.map_key {
                        by_map_key
                            .entry(map_key.as_str())
                            .or_default()
                            .push(contribution.element.as_str());
                    }
                }
            }
            for (map_key, elements) in by_map_key.into_iter().filter(|(_, elements)| elements.len() > 1) {
                self.sink.record(
                    Diagnostic::error(
                        DiagnosticKind::AmbiguousMultibindingKey,
                        format!(
                            "映射多绑定 {} 的键 {} 有多个贡献: {}",
                            aggregate,
                            map_key,
                            elements.join(", ")
                        ),
                    )
                    .at(DiagnosticLocation::Binding {
                        component: owner_name.clone(),
                        key: aggregate.clone(),
                    }),
                );
            }
        }

        debug!(
            "在 {} 中合成多绑定 {}，共 {} 个贡献",
            owner_name,
            aggregate,
            contributions.len()
        );
        Arc::new(Binding::Multibinding(MultiboundBinding {
            key: aggregate.clone(),
            aggregate_kind,
            contributions: contributions
                .iter()
                .map(|binding| {
                    let request = DependencyRequest::instance(binding.key().clone());
                    match binding.element() {
                        Some(element) => request.with_element(element),
                        None => request,
                    }
                })
                .collect(),
        }))
    }

    /// 同一组件内或跨层级存在不同的显式绑定时报告重复
    fn check_duplicates(&mut self, component: ComponentId, key: &Key, local: &[Arc<Binding>]) {
        let tree = self.tree;
        let index = self.index;
        let mut distinct: Vec<&Arc<Binding>> = Vec::new();
        let inherited = tree
            .ancestors(component)
            .skip(1)
            .flat_map(|ancestor| index.explicit_bindings(tree.name(ancestor), key));
        for binding in local.iter().chain(inherited) {
            if !distinct.iter().any(|existing| existing == &binding) {
                distinct.push(binding);
            }
        }
        if distinct.len() < 2 {
            return;
        }
        if !self
            .reported
            .insert((DiagnosticKind::DuplicateBinding, component, key.clone()))
        {
            return;
        }
        let elements: Vec<&str> = distinct
            .iter()
            .filter_map(|binding| binding.element())
            .collect();
        self.sink.record(
            Diagnostic::error(
                DiagnosticKind::DuplicateBinding,
                format!("{} 被绑定了多次: {}", key, elements.join(", ")),
            )
            .at(DiagnosticLocation::Binding {
                component: tree.name(component).to_string(),
                key: key.clone(),
            }),
        );
    }

    /// 聚合键同时有显式绑定时报告重复，解析继续使用合成的多绑定
    fn check_explicit_aggregate(&mut self, component: ComponentId, key: &Key) {
        let tree = self.tree;
        let index = self.index;
        let explicit: Vec<&Arc<Binding>> = tree
            .ancestors(component)
            .flat_map(|ancestor| index.explicit_bindings(tree.name(ancestor), key))
            .collect();
        if explicit.is_empty() {
            return;
        }
        if !self
            .reported
            .insert((DiagnosticKind::DuplicateBinding, component, key.clone()))
        {
            return;
        }
        let elements: Vec<&str> = explicit
            .iter()
            .filter_map(|binding| binding.element())
            .collect();
        self.sink.record(
            Diagnostic::error(
                DiagnosticKind::DuplicateBinding,
                format!(
                    "{} 被绑定了多次: 多绑定贡献, {}",
                    key,
                    elements.join(", ")
                ),
            )
            .at(DiagnosticLocation::Binding {
                component: tree.name(component).to_string(),
                key: key.clone(),
            }),
        );
    }

    /// 有作用域的绑定必须由声明了该作用域的组件拥有
    fn check_scope(&mut self, owner: ComponentId, node: BindingNodeId) {
        let binding = Arc::clone(&self.nodes[node.0].binding);
        let Some(scope) = binding.scope().filter(|scope| !scope.is_reusable()) else {
            return;
        };
        if self.tree.node(owner).scope() == Some(scope) {
            return;
        }
        let key = binding.key().clone();
        if !self
            .reported
            .insert((DiagnosticKind::ScopeMismatch, owner, key.clone()))
        {
            return;
        }
        let message = match self.tree.nearest_with_scope(owner, scope) {
            Some(scoped) => format!(
                "绑定 {} 的作用域 {} 属于组件 {}，但绑定安装在组件 {}",
                binding,
                scope,
                self.tree.name(scoped),
                self.tree.path(owner)
            ),
            None => format!(
                "组件 {} 及其祖先都没有声明作用域 {}，无法使用绑定 {}",
                self.tree.path(owner),
                scope,
                binding
            ),
        };
        self.sink.record(
            Diagnostic::error(DiagnosticKind::ScopeMismatch, message).at(
                DiagnosticLocation::Binding {
                    component: self.tree.name(owner).to_string(),
                    key,
                },
            ),
        );
    }

    /// 报告依赖环；路径中有推迟实例化的请求时允许该环
    fn report_cycle(&mut self, request: &DependencyRequest, node: BindingNodeId) {
        let Some(position) = self.path.iter().position(|entry| entry.node == node) else {
            return;
        };
        let cycle = &self.path[position..];
        let deferred = cycle
            .iter()
            .skip(1)
            .map(|entry| &entry.request)
            .chain(std::iter::once(request))
            .any(|request| request.kind.defers_instantiation());
        if deferred {
            debug!("依赖环经过推迟实例化的请求，允许: {}", request.key);
            return;
        }

        let mut members: Vec<(ComponentId, Key)> = cycle
            .iter()
            .map(|entry| (entry.owner, entry.key.clone()))
            .collect();
        if let Some(start) = members
            .iter()
            .enumerate()
            .min_by(|(_, left), (_, right)| left.cmp(right))
            .map(|(start, _)| start)
        {
            members.rotate_left(start);
        }
        if !self.reported_cycles.insert(members) {
            return;
        }

        let chain: Vec<DependencyRequest> = cycle
            .iter()
            .map(|entry| entry.request.clone())
            .chain(std::iter::once(request.clone()))
            .collect();
        let component = self.tree.name(cycle[0].owner).to_string();
        self.sink.record(
            Diagnostic::error(
                DiagnosticKind::DependencyCycle,
                format!("发现依赖环: {}", format_chain(&chain)),
            )
            .at(DiagnosticLocation::RequestChain { component, chain }),
        );
    }

    fn create_node(&mut self, owner: ComponentId, binding: Arc<Binding>) -> BindingNodeId {
        let id = BindingNodeId(self.nodes.len());
        self.nodes.push(Arc::new(BindingNode {
            id,
            binding,
            owner,
            owner_name: self.tree.name(owner).to_string(),
        }));
        self.components[owner.index()].visible.insert(id);
        id
    }

    fn record_edge(
        &mut self,
        component: ComponentId,
        source: Option<EdgeSource>,
        request: DependencyRequest,
        target: BindingNodeId,
    ) {
        let resolution = &mut self.components[component.index()];
        resolution.visible.insert(target);
        if let Some(source) = source {
            resolution.edges.push(DependencyEdge {
                source,
                request,
                target,
            });
        }
    }

    fn connect(
        &mut self,
        component: ComponentId,
        source: Option<EdgeSource>,
        request: DependencyRequest,
        resolution: Resolution,
    ) -> Resolution {
        match resolution {
            Resolution::Resolved(node) => self.record_edge(component, source, request, node),
            Resolution::Unresolved if request.is_required() => {
                self.report_missing(component, &request);
                if let Some(source) = source {
                    self.components[component.index()]
                        .unresolved
                        .push(UnresolvedRequest { source, request });
                }
            }
            Resolution::Unresolved => {}
        }
        resolution
    }

    /// 每个组件中缺失的键只报告一次，附带从入口开始的完整请求链
    fn report_missing(&mut self, component: ComponentId, request: &DependencyRequest) {
        if !self.reported.insert((
            DiagnosticKind::MissingBinding,
            component,
            request.key.clone(),
        )) {
            return;
        }
        let chain: Vec<DependencyRequest> = self
            .path
            .iter()
            .map(|entry| entry.request.clone())
            .chain(std::iter::once(request.clone()))
            .collect();
        self.sink.record(
            Diagnostic::error(
                DiagnosticKind::MissingBinding,
                format!(
                    "{} 没有可用的绑定，请求路径: {}",
                    request.key,
                    format_chain(&chain)
                ),
            )
            .at(DiagnosticLocation::RequestChain {
                component: self.tree.name(component).to_string(),
                chain,
            }),
        );
    }
}
