//! 声明来源抽象接口
//!
//! 从源代码中提取声明不属于本系统，外部提取器通过这个接口交付规范化的输入

use async_trait::async_trait;
use di_common::{ComponentDescriptor, Declaration, ProcessingResult};
use serde::{Deserialize, Serialize};

/// 一次处理的输入
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingInput {
    /// 组件描述符
    #[serde(default)]
    pub components: Vec<ComponentDescriptor>,
    /// 原始声明
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl ProcessingInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加组件
    pub fn with_component(mut self, component: ComponentDescriptor) -> Self {
        self.components.push(component);
        self
    }

    /// 添加声明
    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// 追加另一份输入
    pub fn merge(mut self, other: ProcessingInput) -> Self {
        self.components.extend(other.components);
        self.declarations.extend(other.declarations);
        self
    }
}

/// 声明来源 trait
#[async_trait]
pub trait DeclarationSource: Send + Sync {
    /// 读取输入
    async fn load(&self) -> ProcessingResult<ProcessingInput>;

    /// 获取来源名称
    fn name(&self) -> &str;
}
