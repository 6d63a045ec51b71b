//! 组件计划输出

use async_trait::async_trait;
use di_abstractions::{BindingGraph, CodeEmitter, EdgeSource};
use di_common::{ComponentDescriptor, EmitResult};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// 组件中的一个绑定
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedBinding {
    pub binding: String,
    pub dependencies: Vec<String>,
}

/// 单个组件的生成计划
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentPlan {
    /// 从根组件开始的路径
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// 只生成接口
    pub header_only: bool,
    pub entry_points: Vec<String>,
    /// 本组件拥有的绑定
    pub bindings: Vec<PlannedBinding>,
}

impl ComponentPlan {
    fn from_graph(graph: &BindingGraph) -> Self {
        let bindings = graph
            .owned_nodes()
            .map(|node| PlannedBinding {
                binding: node.binding.to_string(),
                dependencies: graph
                    .dependencies_of(node.id)
                    .map(|edge| match graph.node(edge.target) {
                        Some(target) if target.owner != node.owner => {
                            format!("{} (来自 {})", edge.request, target.owner_name)
                        }
                        _ => edge.request.to_string(),
                    })
                    .collect(),
            })
            .collect();
        Self {
            component: graph.lineage().join(" > "),
            scope: graph.scope().map(ToString::to_string),
            header_only: false,
            entry_points: graph
                .edges()
                .iter()
                .filter(|edge| edge.source == EdgeSource::EntryPoint)
                .map(|edge| edge.request.to_string())
                .collect(),
            bindings,
        }
    }

    fn header(component: &ComponentDescriptor) -> Self {
        Self {
            component: component.name.clone(),
            scope: component.scope.as_ref().map(ToString::to_string),
            header_only: true,
            entry_points: component
                .entry_points
                .iter()
                .map(ToString::to_string)
                .collect(),
            bindings: Vec::new(),
        }
    }
}

impl fmt::Display for ComponentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "组件 {}", self.component)?;
        if let Some(scope) = &self.scope {
            write!(f, " [{}]", scope)?;
        }
        if self.header_only {
            write!(f, " (仅接口)")?;
        }
        writeln!(f)?;
        for entry_point in &self.entry_points {
            writeln!(f, "  入口 {}", entry_point)?;
        }
        for binding in &self.bindings {
            writeln!(f, "  {}", binding.binding)?;
            for dependency in &binding.dependencies {
                writeln!(f, "    -> {}", dependency)?;
            }
        }
        Ok(())
    }
}

/// 把绑定图记录成计划而不生成代码
#[derive(Debug, Default)]
pub struct PlanEmitter {
    plans: Mutex<Vec<ComponentPlan>>,
}

impl PlanEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出已记录的计划
    pub fn take(&self) -> Vec<ComponentPlan> {
        std::mem::take(&mut *self.plans.lock())
    }
}

#[async_trait]
impl CodeEmitter for PlanEmitter {
    fn name(&self) -> &str {
        "plan"
    }

    async fn emit(&self, graph: Arc<BindingGraph>) -> EmitResult<()> {
        let plans: Vec<ComponentPlan> = graph
            .walk()
            .into_iter()
            .map(ComponentPlan::from_graph)
            .collect();
        self.plans.lock().extend(plans);
        Ok(())
    }

    async fn emit_header(&self, component: &ComponentDescriptor) -> EmitResult<()> {
        self.plans.lock().push(ComponentPlan::header(component));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::ProcessingInput;
    use di_common::{Declaration, DependencyRequest, Key};
    use di_composition::ProcessorBuilder;

    #[tokio::test]
    async fn test_plan_lists_owned_bindings() {
        let emitter = Arc::new(PlanEmitter::new());
        let processor = ProcessorBuilder::new()
            .with_emitter(emitter.clone())
            .build()
            .await
            .unwrap();
        let input = ProcessingInput::new()
            .with_component(
                ComponentDescriptor::new("App")
                    .with_entry_point(DependencyRequest::instance(Key::new("Service"))),
            )
            .with_component(
                ComponentDescriptor::new("Session")
                    .with_parent("App")
                    .with_entry_point(DependencyRequest::instance(Key::new("Service"))),
            )
            .with_declaration(Declaration::injection(Key::new("Service")).depends_on(Key::new("Repo")))
            .with_declaration(Declaration::injection(Key::new("Repo")));

        let outcome = processor.process(input).await.unwrap();
        assert!(outcome.emitted);

        let plans = emitter.take();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].component, "App");
        assert_eq!(plans[0].bindings.len(), 2);
        assert_eq!(plans[0].entry_points, vec!["Service".to_string()]);
        assert_eq!(plans[1].component, "App > Session");
        assert!(plans[1].to_string().contains("入口 Service"));
        assert!(emitter.take().is_empty());
    }

    #[tokio::test]
    async fn test_header_plan() {
        let emitter = PlanEmitter::new();
        let component = ComponentDescriptor::new("App")
            .with_entry_point(DependencyRequest::instance(Key::new("Service")));
        emitter.emit_header(&component).await.unwrap();

        let plans = emitter.take();
        assert!(plans[0].header_only);
        assert!(plans[0].to_string().starts_with("组件 App (仅接口)"));
    }
}
