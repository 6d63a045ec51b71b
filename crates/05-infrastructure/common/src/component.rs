//! 组件定义
//!
//! 组件组成父子树。树以 arena 方式存储：父节点持有子节点下标，子节点只保存父节点下标用于查找

use crate::errors::{InputError, InputResult};
use crate::request::DependencyRequest;
use crate::scope::Scope;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// 组件描述符
///
/// 由外部声明提取器提供
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// 组件名称，在一次处理中唯一
    pub name: String,
    /// 组件作用域
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    /// 父组件名称，为空表示顶层组件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// 安装的模块
    #[serde(default)]
    pub modules: Vec<String>,
    /// 入口请求
    #[serde(default)]
    pub entry_points: Vec<DependencyRequest>,
}

impl ComponentDescriptor {
    /// 创建新的组件描述符
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: None,
            parent: None,
            modules: Vec::new(),
            entry_points: Vec::new(),
        }
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// 设置父组件
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// 安装模块
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.modules.push(module.into());
        self
    }

    /// 添加入口请求
    pub fn with_entry_point(mut self, request: DependencyRequest) -> Self {
        self.entry_points.push(request);
        self
    }
}

/// 组件在所属树中的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

impl ComponentId {
    /// 根组件下标
    pub const ROOT: ComponentId = ComponentId(0);

    /// 下标值
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 组件树节点
#[derive(Debug, Clone)]
pub struct ComponentNode {
    /// 节点下标
    pub id: ComponentId,
    /// 组件描述符
    pub descriptor: ComponentDescriptor,
    /// 父组件下标
    pub parent: Option<ComponentId>,
    /// 子组件下标，按声明顺序
    pub children: Vec<ComponentId>,
    /// 距根组件的深度
    pub depth: usize,
}

impl ComponentNode {
    /// 组件名称
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// 组件作用域
    pub fn scope(&self) -> Option<&Scope> {
        self.descriptor.scope.as_ref()
    }

    /// 是否为子组件
    pub fn is_subcomponent(&self) -> bool {
        self.parent.is_some()
    }
}

/// 组件树
#[derive(Debug, Clone)]
pub struct ComponentTree {
    nodes: Vec<ComponentNode>,
    by_name: HashMap<String, ComponentId>,
}

impl ComponentTree {
    /// 从描述符构建所有顶层组件树，树的顺序与顶层组件的声明顺序一致
    pub fn build_forest(descriptors: &[ComponentDescriptor]) -> InputResult<Vec<ComponentTree>> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (position, descriptor) in descriptors.iter().enumerate() {
            if descriptor.name.trim().is_empty() {
                return Err(InputError::EmptyComponentName { position });
            }
            if positions.insert(descriptor.name.as_str(), position).is_some() {
                return Err(InputError::DuplicateComponent {
                    name: descriptor.name.clone(),
                });
            }
        }

        let mut children_of: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (position, descriptor) in descriptors.iter().enumerate() {
            match &descriptor.parent {
                None => roots.push(position),
                Some(parent) => {
                    if !positions.contains_key(parent.as_str()) {
                        return Err(InputError::UnknownParent {
                            component: descriptor.name.clone(),
                            parent: parent.clone(),
                        });
                    }
                    children_of.entry(parent.as_str()).or_default().push(position);
                }
            }
        }

        let mut visited: HashSet<usize> = HashSet::new();
        let mut trees = Vec::with_capacity(roots.len());
        for root in roots {
            let mut tree = ComponentTree {
                nodes: Vec::new(),
                by_name: HashMap::new(),
            };
            let mut queue = VecDeque::from([(root, None::<ComponentId>, 0usize)]);
            while let Some((position, parent, depth)) = queue.pop_front() {
                visited.insert(position);
                let descriptor = &descriptors[position];
                let id = ComponentId(tree.nodes.len());
                tree.by_name.insert(descriptor.name.clone(), id);
                tree.nodes.push(ComponentNode {
                    id,
                    descriptor: descriptor.clone(),
                    parent,
                    children: Vec::new(),
                    depth,
                });
                if let Some(parent) = parent {
                    tree.nodes[parent.0].children.push(id);
                }
                for child in children_of.get(descriptor.name.as_str()).into_iter().flatten() {
                    queue.push_back((*child, Some(id), depth + 1));
                }
            }
            trees.push(tree);
        }

        if let Some(position) = (0..descriptors.len()).find(|p| !visited.contains(p)) {
            return Err(InputError::ParentCycle {
                component: descriptors[position].name.clone(),
            });
        }

        Ok(trees)
    }

    /// 根组件
    pub fn root(&self) -> &ComponentNode {
        &self.nodes[ComponentId::ROOT.0]
    }

    /// 获取节点
    pub fn node(&self, id: ComponentId) -> &ComponentNode {
        &self.nodes[id.0]
    }

    /// 所有节点，父节点总在子节点之前
    pub fn nodes(&self) -> &[ComponentNode] {
        &self.nodes
    }

    /// 组件数量
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 是否为空树
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 按名称查找组件
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.by_name.get(name).copied()
    }

    /// 组件名称
    pub fn name(&self, id: ComponentId) -> &str {
        self.nodes[id.0].name()
    }

    /// 从自身开始向上的祖先链（包含自身）
    pub fn ancestors(&self, id: ComponentId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// 从根开始向下的祖先链（包含自身）
    pub fn lineage(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut lineage: Vec<ComponentId> = self.ancestors(id).collect();
        lineage.reverse();
        lineage
    }

    /// 最近的声明了指定作用域的祖先（包含自身）
    pub fn nearest_with_scope(&self, id: ComponentId, scope: &Scope) -> Option<ComponentId> {
        self.ancestors(id)
            .find(|ancestor| self.node(*ancestor).scope() == Some(scope))
    }

    /// 组件路径，例如 `App > Session`
    pub fn path(&self, id: ComponentId) -> String {
        self.lineage(id)
            .into_iter()
            .map(|ancestor| self.name(ancestor))
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

/// 祖先链迭代器
pub struct Ancestors<'a> {
    tree: &'a ComponentTree,
    next: Option<ComponentId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ComponentId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.node(current).parent;
        Some(current)
    }
}
