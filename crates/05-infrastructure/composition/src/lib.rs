//! # 处理器组合层
//!
//! 把选项加载、声明索引、绑定解析、校验流水线、诊断报告和代码生成组合成一个
//! 完整的处理器。
//!
//! ## 主要功能
//!
//! - **处理器构建器**: 使用构建者模式组装选项来源、插件和代码生成器
//! - **声明来源**: 从内存或 JSON 文件读取外部提取器的输出
//! - **并行处理**: 每棵组件树在独立的阻塞任务中解析，结果按根组件顺序合并
//! - **处理统计**: 记录处理次数、耗时和诊断数量
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_composition::{JsonFileSource, ProcessorBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let processor = ProcessorBuilder::new()
//!         .with_option("strict_multibinding_ordering", "true")
//!         .build()
//!         .await?;
//!
//!     let outcome = processor
//!         .process_source(&JsonFileSource::new("declarations.json"))
//!         .await?;
//!     for diagnostic in &outcome.diagnostics {
//!         println!("{}", diagnostic);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod processor;
pub mod sources;
pub mod statistics;


// 重新导出主要类型
pub use builder::{LoggingConfig, ProcessorBuilder};
pub use processor::{ComponentProcessor, ProcessingOutcome, ProcessingStep};
pub use sources::{InMemorySource, JsonFileSource};
pub use statistics::{PassSummary, ProcessingStatistics};

// 重新导出错误类型
pub use di_common::ProcessingError;
