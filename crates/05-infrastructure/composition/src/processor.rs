//! 组件处理器
//!
//! 一次处理：构建组件树，索引声明，按根组件并行解析和校验，合并诊断，
//! 没有错误时交给代码生成器

use crate::statistics::{PassSummary, ProcessingStatistics};
use config_abstractions::ProcessingOptions;
use di_abstractions::{
    BindingGraph, CodeEmitter, DeclarationSource, DiagnosticReporter, ProcessingInput,
};
use di_common::{ComponentDescriptor, ComponentTree, Diagnostic, ProcessingError, ProcessingResult, Severity};
use di_impl::{assemble, hierarchy_diagnostics, DeclarationIndex, DiagnosticsSink, ValidationPipeline};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// 处理步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStep {
    /// 只检查组件层级并生成组件接口
    Header,
    /// 完整解析绑定图
    Full,
}

/// 一次处理的结果
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    /// 处理标识
    pub pass_id: Uuid,
    pub step: ProcessingStep,
    /// 错误在前的全部诊断
    pub diagnostics: Vec<Diagnostic>,
    /// 按根组件顺序排列的绑定图，头文件步骤为空
    pub graphs: Vec<Arc<BindingGraph>>,
    /// 是否调用了代码生成器
    pub emitted: bool,
}

impl ProcessingOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Warning)
    }

    /// 按名称查找根组件的图
    pub fn graph(&self, root: &str) -> Option<&Arc<BindingGraph>> {
        self.graphs.iter().find(|graph| graph.name() == root)
    }
}

/// 组件处理器
pub struct ComponentProcessor {
    options: Arc<ProcessingOptions>,
    /// 选项校验产生的诊断，每次处理都会报告
    option_diagnostics: Vec<Diagnostic>,
    supported: BTreeSet<String>,
    pipeline: Arc<ValidationPipeline>,
    emitter: Option<Arc<dyn CodeEmitter>>,
    reporter: Arc<dyn DiagnosticReporter>,
    cancellation: CancellationToken,
    statistics: Arc<Mutex<ProcessingStatistics>>,
}

impl ComponentProcessor {
    pub(crate) fn new(
        options: ProcessingOptions,
        option_diagnostics: Vec<Diagnostic>,
        supported: BTreeSet<String>,
        pipeline: ValidationPipeline,
        emitter: Option<Arc<dyn CodeEmitter>>,
        reporter: Arc<dyn DiagnosticReporter>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            options: Arc::new(options),
            option_diagnostics,
            supported,
            pipeline: Arc::new(pipeline),
            emitter,
            reporter,
            cancellation,
            statistics: Arc::new(Mutex::new(ProcessingStatistics::default())),
        }
    }

    /// 创建构建器
    pub fn builder() -> crate::ProcessorBuilder {
        crate::ProcessorBuilder::new()
    }

    /// 可识别的选项名称：处理器自身的选项加上插件的选项
    pub fn supported_options(&self) -> &BTreeSet<String> {
        &self.supported
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    /// 本次处理使用的步骤
    pub fn step(&self) -> ProcessingStep {
        if self.options.uses_header_step() {
            ProcessingStep::Header
        } else {
            ProcessingStep::Full
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// 取消正在进行和之后的处理
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// 统计快照
    pub fn statistics(&self) -> ProcessingStatistics {
        self.statistics.lock().clone()
    }

    /// 从声明来源读取输入并处理
    pub async fn process_source(
        &self,
        source: &dyn DeclarationSource,
    ) -> ProcessingResult<ProcessingOutcome> {
        info!("从声明来源 {} 读取输入", source.name());
        let input = source.load().await?;
        self.process(input).await
    }

    /// 处理一份输入
    pub async fn process(&self, input: ProcessingInput) -> ProcessingResult<ProcessingOutcome> {
        let pass_id = Uuid::new_v4();
        let span = info_span!("processing_pass", pass_id = %pass_id);
        self.run_pass(pass_id, input).instrument(span).await
    }

    async fn run_pass(
        &self,
        pass_id: Uuid,
        input: ProcessingInput,
    ) -> ProcessingResult<ProcessingOutcome> {
        let started = Instant::now();
        self.statistics.lock().mark_started();
        if self.cancellation.is_cancelled() {
            return Err(self.cancelled());
        }

        let step = self.step();
        info!(
            "开始处理: {} 个组件, {} 个声明, 步骤 {:?}",
            input.components.len(),
            input.declarations.len(),
            step
        );

        let trees = ComponentTree::build_forest(&input.components).map_err(|e| {
            error!("组件结构无效: {}", e);
            ProcessingError::from(e)
        })?;
        let component_count: usize = trees.iter().map(ComponentTree::len).sum();
        let roots: Vec<ComponentDescriptor> = trees
            .iter()
            .map(|tree| tree.root().descriptor.clone())
            .collect();

        let mut sink = DiagnosticsSink::new();
        sink.record_all(self.option_diagnostics.iter().cloned());
        let index = Arc::new(DeclarationIndex::build(&trees, &input.declarations, &mut sink));
        debug!(
            "声明索引完成: {} 个声明, {} 个可注入类型",
            index.declaration_count(),
            index.injectable_count()
        );

        let graphs = match step {
            ProcessingStep::Header => {
                for tree in &trees {
                    sink.record_all(hierarchy_diagnostics(tree));
                }
                Vec::new()
            }
            ProcessingStep::Full => self.resolve_trees(trees, index, &mut sink).await?,
        };

        if self.cancellation.is_cancelled() {
            return Err(self.cancelled());
        }

        let diagnostics = sink.drain();
        self.reporter.report(&diagnostics).await;

        let error_count = diagnostics.iter().filter(|d| d.is_error()).count();
        let warning_count = diagnostics.len() - error_count;
        let emit = error_count == 0 && (warning_count == 0 || self.options.emit_on_warnings);
        let emitted = match (&self.emitter, emit) {
            (Some(emitter), true) => {
                self.emit(emitter.as_ref(), step, &roots, &graphs).await?;
                true
            }
            (Some(emitter), false) => {
                warn!(
                    "存在 {} 个错误、{} 个警告，跳过代码生成器 {}",
                    error_count,
                    warning_count,
                    emitter.name()
                );
                false
            }
            (None, _) => false,
        };

        let summary = PassSummary {
            component_count,
            binding_count: graphs.iter().map(|graph| graph.owned_node_count()).sum(),
            error_count,
            warning_count,
            elapsed: started.elapsed(),
        };
        let statistics = {
            let mut statistics = self.statistics.lock();
            statistics.record_pass(summary);
            statistics.clone()
        };
        info!(
            "处理完成: 第 {} 次, {} 个组件, {} 个绑定节点, {} 个错误, {} 个警告, 耗时 {:?}",
            statistics.pass_count,
            summary.component_count,
            summary.binding_count,
            summary.error_count,
            summary.warning_count,
            summary.elapsed
        );

        Ok(ProcessingOutcome {
            pass_id,
            step,
            diagnostics,
            graphs,
            emitted,
        })
    }

    /// 每棵组件树在阻塞线程中独立解析，结果按根组件顺序合并
    async fn resolve_trees(
        &self,
        trees: Vec<ComponentTree>,
        index: Arc<DeclarationIndex>,
        sink: &mut DiagnosticsSink,
    ) -> ProcessingResult<Vec<Arc<BindingGraph>>> {
        let mut handles = Vec::with_capacity(trees.len());
        for tree in trees {
            let index = Arc::clone(&index);
            let pipeline = Arc::clone(&self.pipeline);
            let options = Arc::clone(&self.options);
            handles.push(tokio::task::spawn_blocking(move || {
                let mut tree_sink = DiagnosticsSink::new();
                let graph = assemble(&tree, &*index, &mut tree_sink);
                pipeline.validate(&graph, &options, &mut tree_sink);
                debug!(
                    "组件树 {} 解析完成: {} 个诊断",
                    tree.root().name(),
                    tree_sink.len()
                );
                (graph, tree_sink)
            }));
        }

        let mut graphs = Vec::with_capacity(handles.len());
        for handle in handles {
            let joined = tokio::select! {
                _ = self.cancellation.cancelled() => {
                    return Err(self.cancelled());
                }
                joined = handle => joined,
            };
            let (graph, tree_sink) = joined.map_err(|e| {
                error!("组件树解析任务失败: {}", e);
                ProcessingError::TaskFailed {
                    message: e.to_string(),
                }
            })?;
            sink.merge(tree_sink);
            graphs.push(Arc::new(graph));
        }
        Ok(graphs)
    }

    async fn emit(
        &self,
        emitter: &dyn CodeEmitter,
        step: ProcessingStep,
        roots: &[ComponentDescriptor],
        graphs: &[Arc<BindingGraph>],
    ) -> ProcessingResult<()> {
        match step {
            ProcessingStep::Header => {
                for root in roots {
                    emitter.emit_header(root).await?;
                }
            }
            ProcessingStep::Full => {
                for graph in graphs {
                    emitter.emit(Arc::clone(graph)).await.map_err(|e| {
                        error!("代码生成器 {} 失败: {}", emitter.name(), e);
                        e
                    })?;
                }
            }
        }
        debug!("代码生成器 {} 完成", emitter.name());
        Ok(())
    }

    fn cancelled(&self) -> ProcessingError {
        warn!("处理已取消");
        self.statistics.lock().record_cancelled();
        ProcessingError::Cancelled
    }
}
