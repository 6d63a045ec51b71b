//! 绑定图定义
//!
//! 绑定图在组装完成后不可变。同一个绑定节点以 `Arc` 在组件和它的子孙之间共享，
//! 因此从任何子组件观察到的祖先绑定都是同一个对象。

use crate::binding::{Binding, BindingKind};
use di_common::{ComponentId, ComponentNode, DependencyRequest, Key, Scope};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 绑定节点标识，在一棵组件树内唯一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingNodeId(pub usize);

impl fmt::Display for BindingNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// 已解析的绑定节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingNode {
    pub id: BindingNodeId,
    pub binding: Arc<Binding>,
    /// 拥有该绑定的组件
    pub owner: ComponentId,
    /// 拥有者名称
    pub owner_name: String,
}

impl BindingNode {
    pub fn key(&self) -> &Key {
        self.binding.key()
    }

    pub fn kind(&self) -> BindingKind {
        self.binding.kind()
    }
}

/// 依赖边的起点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeSource {
    /// 组件入口
    EntryPoint,
    /// 某个绑定的依赖
    Binding(BindingNodeId),
}

/// 依赖边
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub source: EdgeSource,
    pub request: DependencyRequest,
    pub target: BindingNodeId,
}

/// 无法满足的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRequest {
    pub source: EdgeSource,
    pub request: DependencyRequest,
}

/// 单个组件的绑定图
#[derive(Debug, Clone)]
pub struct BindingGraph {
    component: ComponentNode,
    lineage: Vec<String>,
    nodes: Vec<Arc<BindingNode>>,
    by_key: BTreeMap<Key, usize>,
    edges: Vec<DependencyEdge>,
    unresolved: Vec<UnresolvedRequest>,
    declarations: Vec<Arc<Binding>>,
    creator: Option<Arc<BindingNode>>,
    subgraphs: Vec<BindingGraph>,
}

impl BindingGraph {
    /// 创建空图，由组装器逐步填充
    pub fn new(component: ComponentNode, lineage: Vec<String>) -> Self {
        Self {
            component,
            lineage,
            nodes: Vec::new(),
            by_key: BTreeMap::new(),
            edges: Vec::new(),
            unresolved: Vec::new(),
            declarations: Vec::new(),
            creator: None,
            subgraphs: Vec::new(),
        }
    }

    /// 设置在本组件上下文中解析到的节点，按节点标识排序
    pub fn with_nodes(mut self, nodes: Vec<Arc<BindingNode>>) -> Self {
        let mut nodes = nodes;
        nodes.sort_by_key(|node| node.id);
        nodes.dedup_by_key(|node| node.id);
        self.by_key = nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.key().clone(), position))
            .collect();
        self.nodes = nodes;
        self
    }

    pub fn with_edges(mut self, edges: Vec<DependencyEdge>) -> Self {
        self.edges = edges;
        self
    }

    pub fn with_unresolved(mut self, unresolved: Vec<UnresolvedRequest>) -> Self {
        self.unresolved = unresolved;
        self
    }

    /// 设置本组件本地声明的显式绑定
    pub fn with_declarations(mut self, declarations: Vec<Arc<Binding>>) -> Self {
        self.declarations = declarations;
        self
    }

    /// 设置父组件中创建本组件的绑定
    pub fn with_creator(mut self, creator: Option<Arc<BindingNode>>) -> Self {
        self.creator = creator;
        self
    }

    pub fn with_subgraph(mut self, subgraph: BindingGraph) -> Self {
        self.subgraphs.push(subgraph);
        self
    }

    /// 组件节点
    pub fn component(&self) -> &ComponentNode {
        &self.component
    }

    /// 组件名称
    pub fn name(&self) -> &str {
        self.component.name()
    }

    /// 组件作用域
    pub fn scope(&self) -> Option<&Scope> {
        self.component.scope()
    }

    /// 从根到本组件的名称链
    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    /// 入口请求
    pub fn entry_points(&self) -> &[DependencyRequest] {
        &self.component.descriptor.entry_points
    }

    /// 本组件上下文中可见的全部节点
    pub fn nodes(&self) -> &[Arc<BindingNode>] {
        &self.nodes
    }

    /// 按键查找节点
    pub fn binding_for(&self, key: &Key) -> Option<&Arc<BindingNode>> {
        self.by_key.get(key).map(|&position| &self.nodes[position])
    }

    /// 按标识查找节点
    pub fn node(&self, id: BindingNodeId) -> Option<&Arc<BindingNode>> {
        self.nodes
            .binary_search_by_key(&id, |node| node.id)
            .ok()
            .map(|position| &self.nodes[position])
    }

    /// 本组件拥有的节点
    pub fn owned_nodes(&self) -> impl Iterator<Item = &Arc<BindingNode>> {
        let owner = self.component.id;
        self.nodes.iter().filter(move |node| node.owner == owner)
    }

    /// 本组件记录的全部依赖边
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// 入口边
    pub fn entry_point_edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges
            .iter()
            .filter(|edge| edge.source == EdgeSource::EntryPoint)
    }

    /// 某个节点的依赖边
    pub fn dependencies_of(&self, id: BindingNodeId) -> impl Iterator<Item = &DependencyEdge> {
        self.edges
            .iter()
            .filter(move |edge| edge.source == EdgeSource::Binding(id))
    }

    /// 无法满足的请求
    pub fn unresolved(&self) -> &[UnresolvedRequest] {
        &self.unresolved
    }

    /// 本组件本地声明的显式绑定
    pub fn declarations(&self) -> &[Arc<Binding>] {
        &self.declarations
    }

    /// 父组件中创建本组件的绑定
    pub fn creator(&self) -> Option<&Arc<BindingNode>> {
        self.creator.as_ref()
    }

    /// 直接子组件的图
    pub fn subgraphs(&self) -> &[BindingGraph] {
        &self.subgraphs
    }

    /// 按名称查找子孙组件的图
    pub fn subgraph(&self, name: &str) -> Option<&BindingGraph> {
        self.walk().into_iter().find(|graph| graph.name() == name)
    }

    /// 前序遍历本图及全部子孙图
    pub fn walk(&self) -> Vec<&BindingGraph> {
        let mut graphs = Vec::new();
        let mut stack = vec![self];
        while let Some(graph) = stack.pop() {
            graphs.push(graph);
            stack.extend(graph.subgraphs.iter().rev());
        }
        graphs
    }

    /// 本图及子孙图中没有未满足的请求
    pub fn is_complete(&self) -> bool {
        self.walk().iter().all(|graph| graph.unresolved.is_empty())
    }

    /// 树中各组件拥有的节点总数
    pub fn owned_node_count(&self) -> usize {
        self.walk()
            .iter()
            .map(|graph| graph.owned_nodes().count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BoundInstanceBinding;
    use di_common::{ComponentDescriptor, ComponentTree};

    fn instance_node(id: usize, type_name: &str, owner: ComponentId) -> Arc<BindingNode> {
        Arc::new(BindingNode {
            id: BindingNodeId(id),
            binding: Arc::new(Binding::BoundInstance(BoundInstanceBinding {
                key: Key::new(type_name),
                element: format!("App.{}", type_name),
                component: "App".to_string(),
            })),
            owner,
            owner_name: "App".to_string(),
        })
    }

    #[test]
    fn test_lookup_and_walk() {
        let trees = ComponentTree::build_forest(&[
            ComponentDescriptor::new("App"),
            ComponentDescriptor::new("Session").with_parent("App"),
        ])
        .unwrap();
        let tree = &trees[0];
        let session_id = tree.find("Session").unwrap();

        let child = BindingGraph::new(
            tree.node(session_id).clone(),
            vec!["App".to_string(), "Session".to_string()],
        )
        .with_nodes(vec![instance_node(0, "Config", ComponentId::ROOT)]);
        let graph = BindingGraph::new(tree.root().clone(), vec!["App".to_string()])
            .with_nodes(vec![
                instance_node(1, "Clock", ComponentId::ROOT),
                instance_node(0, "Config", ComponentId::ROOT),
            ])
            .with_subgraph(child);

        assert_eq!(graph.nodes()[0].id, BindingNodeId(0));
        assert!(graph.binding_for(&Key::new("Clock")).is_some());
        assert!(graph.node(BindingNodeId(1)).is_some());
        assert_eq!(graph.walk().len(), 2);
        assert_eq!(graph.subgraph("Session").unwrap().owned_nodes().count(), 0);
        assert_eq!(graph.owned_node_count(), 2);
        assert!(graph.is_complete());
    }
}
