//! 代码生成接口

use crate::graph::BindingGraph;
use async_trait::async_trait;
use di_common::{ComponentDescriptor, EmitResult};
use std::sync::Arc;

/// 代码生成器 trait
///
/// 只会收到没有错误诊断的根组件图
#[async_trait]
pub trait CodeEmitter: Send + Sync {
    /// 生成器名称
    fn name(&self) -> &str;

    /// 为一棵组件树生成代码
    async fn emit(&self, graph: Arc<BindingGraph>) -> EmitResult<()>;

    /// 头文件步骤只生成组件接口
    async fn emit_header(&self, _component: &ComponentDescriptor) -> EmitResult<()> {
        Ok(())
    }
}
