//! 错误类型定义
//!
//! 这里只包含会中止处理的错误；绑定图中的问题以诊断记录的形式报告

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置类型转换失败: {message}")]
    TypeConversionError { message: String },
}

/// 输入结构错误类型
///
/// 外部声明提取器给出的结构本身不完整时产生，处理在生成任何诊断之前中止
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("第 {position} 个组件的名称为空")]
    EmptyComponentName { position: usize },

    #[error("组件重复声明: {name}")]
    DuplicateComponent { name: String },

    #[error("组件 {component} 的父组件不存在: {parent}")]
    UnknownParent { component: String, parent: String },

    #[error("组件父子关系存在环: {component}")]
    ParentCycle { component: String },

    #[error("声明输入 {source_name} 无法读取: {message}")]
    Unreadable { source_name: String, message: String },
}

/// 代码生成错误类型
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("组件 {component} 代码生成失败: {message}")]
    GenerationFailed { component: String, message: String },
}

/// 处理错误类型
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("输入错误: {source}")]
    InputError {
        #[from]
        source: InputError,
    },

    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("代码生成错误: {source}")]
    EmitError {
        #[from]
        source: EmitError,
    },

    #[error("处理已取消")]
    Cancelled,

    #[error("处理任务失败: {message}")]
    TaskFailed { message: String },

    #[error("处理器构建失败: {message}")]
    BuildFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type InputResult<T> = Result<T, InputError>;
pub type EmitResult<T> = Result<T, EmitError>;
pub type ProcessingResult<T> = Result<T, ProcessingError>;
