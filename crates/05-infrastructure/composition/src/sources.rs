//! 声明来源实现

use async_trait::async_trait;
use di_abstractions::{DeclarationSource, ProcessingInput};
use di_common::{InputError, ProcessingResult};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// 内存中的声明输入
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    name: String,
    input: ProcessingInput,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, input: ProcessingInput) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }
}

#[async_trait]
impl DeclarationSource for InMemorySource {
    async fn load(&self) -> ProcessingResult<ProcessingInput> {
        Ok(self.input.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// JSON 文件形式的声明输入，由外部提取器生成
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }

    /// 从 JSON 文本解析输入
    pub fn parse(name: &str, content: &str) -> ProcessingResult<ProcessingInput> {
        serde_json::from_str(content).map_err(|e| {
            error!("声明输入 {} 解析失败: {}", name, e);
            InputError::Unreadable {
                source_name: name.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl DeclarationSource for JsonFileSource {
    async fn load(&self) -> ProcessingResult<ProcessingInput> {
        debug!("读取声明输入: {}", self.name);
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            error!("声明输入 {} 读取失败: {}", self.name, e);
            InputError::Unreadable {
                source_name: self.name.clone(),
                message: e.to_string(),
            }
        })?;
        let input = Self::parse(&self.name, &content)?;
        debug!(
            "声明输入 {} 包含 {} 个组件、{} 个声明",
            self.name,
            input.components.len(),
            input.declarations.len()
        );
        Ok(input)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
