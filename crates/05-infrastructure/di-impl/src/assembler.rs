//! 绑定图组装器

use crate::resolver::{ResolvedTree, Resolver};
use crate::sink::DiagnosticsSink;
use di_abstractions::{Binding, BindingGraph, DeclarationLookup, EdgeSource};
use di_common::{ComponentNode, ComponentTree, DependencyRequest};
use std::sync::Arc;
use tracing::debug;

/// 为一棵组件树组装绑定图
///
/// 先解析根组件的全部入口，再按广度优先顺序处理子组件：
/// 先在父组件中解析子组件的创建器，再解析子组件自身的入口
pub fn assemble(
    tree: &ComponentTree,
    index: &dyn DeclarationLookup,
    sink: &mut DiagnosticsSink,
) -> BindingGraph {
    let mut resolver = Resolver::new(tree, index, sink);
    for node in tree.nodes() {
        if let Some(parent) = node.parent {
            if let Some(creator) = find_creator(index, tree.name(parent), node.name()) {
                resolver.resolve_creator(
                    parent,
                    node.id,
                    DependencyRequest::instance(creator.key().clone()),
                );
            }
        }
        for entry_point in &node.descriptor.entry_points {
            resolver.resolve(node.id, Some(EdgeSource::EntryPoint), entry_point.clone());
        }
        debug!("组件 {} 的入口解析完成", tree.path(node.id));
    }
    link_graphs(tree, index, resolver.into_resolved())
}

/// 父组件本地声明的第一个指向该子组件的创建器
fn find_creator<'a>(
    index: &'a dyn DeclarationLookup,
    parent: &str,
    child: &str,
) -> Option<&'a Arc<Binding>> {
    index.local_bindings(parent).iter().find(|binding| {
        matches!(binding.as_ref(), Binding::SubcomponentCreator(creator) if creator.subcomponent == child)
    })
}

/// 自底向上把各组件的解析记录连接成图
fn link_graphs(
    tree: &ComponentTree,
    index: &dyn DeclarationLookup,
    resolved: ResolvedTree,
) -> BindingGraph {
    let ResolvedTree {
        nodes,
        mut components,
    } = resolved;
    let mut graphs: Vec<Option<BindingGraph>> = (0..tree.len()).map(|_| None).collect();

    // 广度优先构建的树中子组件的下标总是大于父组件
    for node in tree.nodes().iter().rev() {
        let resolution = std::mem::take(&mut components[node.id.index()]);
        let lineage = tree
            .lineage(node.id)
            .into_iter()
            .map(|ancestor| tree.name(ancestor).to_string())
            .collect();
        let mut graph = BindingGraph::new(node.clone(), lineage)
            .with_nodes(
                resolution
                    .visible
                    .iter()
                    .map(|id| Arc::clone(&nodes[id.0]))
                    .collect(),
            )
            .with_edges(resolution.edges)
            .with_unresolved(resolution.unresolved)
            .with_declarations(index.local_bindings(node.name()).to_vec())
            .with_creator(resolution.creator.map(|id| Arc::clone(&nodes[id.0])));
        for child in &node.children {
            if let Some(subgraph) = graphs[child.index()].take() {
                graph = graph.with_subgraph(subgraph);
            }
        }
        graphs[node.id.index()] = Some(graph);
    }

    graphs
        .into_iter()
        .next()
        .flatten()
        .unwrap_or_else(|| empty_graph(tree.root()))
}

fn empty_graph(root: &ComponentNode) -> BindingGraph {
    BindingGraph::new(root.clone(), vec![root.name().to_string()])
}
