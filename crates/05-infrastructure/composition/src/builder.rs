//! 处理器构建器

use crate::processor::ComponentProcessor;
use config_abstractions::{OptionsProvider, ProcessingOptions, SUPPORTED_OPTIONS};
use config_impl::{EnvironmentOptionsProvider, FileOptionsProvider, MapOptionsProvider, OptionsLoader};
use di_abstractions::{
    BindingGraphPlugin, CodeEmitter, DiagnosticReporter, TracingReporter, ValidationCheck,
};
use di_common::{ProcessingError, ProcessingResult};
use di_impl::ValidationPipeline;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing::{debug, error, info};

/// 处理器构建器
///
/// 使用建造者模式组装选项来源、插件、代码生成器和诊断报告器
pub struct ProcessorBuilder {
    /// 选项提供者列表
    option_providers: Vec<Box<dyn OptionsProvider>>,
    /// 直接设置的选项
    inline_options: MapOptionsProvider,
    /// 插件，构建时初始化
    plugins: Vec<Box<dyn BindingGraphPlugin>>,
    /// 追加的校验检查
    checks: Vec<Box<dyn ValidationCheck>>,
    /// 是否包含内置检查
    builtin_checks: bool,
    emitter: Option<Arc<dyn CodeEmitter>>,
    reporter: Arc<dyn DiagnosticReporter>,
    cancellation: CancellationToken,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ProcessorBuilder {
    /// 创建新的处理器构建器
    pub fn new() -> Self {
        Self {
            option_providers: Vec::new(),
            inline_options: MapOptionsProvider::new("builder"),
            plugins: Vec::new(),
            checks: Vec::new(),
            builtin_checks: true,
            emitter: None,
            reporter: Arc::new(TracingReporter),
            cancellation: CancellationToken::new(),
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 设置单个选项
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inline_options = self.inline_options.with_option(name, value);
        self
    }

    /// 添加 `name=value` 形式的选项参数
    pub fn with_option_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for argument in arguments {
            self.inline_options = self.inline_options.with_argument(argument.as_ref());
        }
        self
    }

    /// 添加选项文件
    pub fn add_options_file<P: AsRef<Path>>(mut self, path: P) -> ProcessingResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ProcessingError::BuildFailed {
                message: format!("选项文件不存在: {}", path.display()),
            });
        }
        info!("添加选项文件: {}", path.display());
        self.option_providers
            .push(Box::new(FileOptionsProvider::new(path)));
        Ok(self)
    }

    /// 添加环境变量选项来源
    pub fn add_options_env(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        info!("添加环境变量选项来源，前缀: {}", prefix);
        self.option_providers
            .push(Box::new(EnvironmentOptionsProvider::new(prefix)));
        self
    }

    /// 添加自定义选项提供者
    pub fn add_options_provider<T: OptionsProvider + 'static>(mut self, provider: T) -> Self {
        info!("添加自定义选项提供者: {}", provider.name());
        self.option_providers.push(Box::new(provider));
        self
    }

    /// 注册插件
    pub fn with_plugin<T: BindingGraphPlugin + 'static>(mut self, plugin: T) -> Self {
        debug!("注册插件: {}", plugin.plugin_name());
        self.plugins.push(Box::new(plugin));
        self
    }

    /// 使用固定的插件集合，替换已注册的插件
    pub fn with_plugins(mut self, plugins: Vec<Box<dyn BindingGraphPlugin>>) -> Self {
        self.plugins = plugins;
        self
    }

    /// 追加校验检查
    pub fn with_check<T: ValidationCheck + 'static>(mut self, check: T) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// 是否包含内置检查
    pub fn with_builtin_checks(mut self, enabled: bool) -> Self {
        self.builtin_checks = enabled;
        self
    }

    /// 设置代码生成器
    pub fn with_emitter(mut self, emitter: Arc<dyn CodeEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// 设置诊断报告器
    pub fn with_reporter(mut self, reporter: Arc<dyn DiagnosticReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// 使用外部的取消令牌
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true; // 启用日志初始化
        self
    }

    /// 构建处理器
    ///
    /// 加载并校验选项，然后用解析后的选项初始化每个插件一次
    pub async fn build(self) -> ProcessingResult<ComponentProcessor> {
        // 只有在明确配置了日志时才初始化日志
        if self.logging_enabled {
            self.initialize_logging()?;
        }
        info!("开始构建处理器");

        let plugin_options: Vec<String> = self
            .plugins
            .iter()
            .flat_map(|plugin| plugin.supported_options())
            .collect();

        let mut loader = OptionsLoader::new().with_supported_options(plugin_options);
        for provider in self.option_providers {
            loader = loader.with_provider(provider);
        }
        if !self.inline_options.is_empty() {
            loader = loader.with_provider(Box::new(self.inline_options));
        }
        let supported = loader.supported_options().clone();
        let loaded = loader.load().await.map_err(|e| {
            error!("处理选项加载失败: {}", e);
            ProcessingError::from(e)
        })?;

        let pipeline = build_pipeline(
            self.builtin_checks,
            self.checks,
            self.plugins,
            &loaded.options,
        );

        info!(
            "处理器构建完成: {} 个检查, 头文件步骤: {}",
            pipeline.check_names().len(),
            loaded.options.uses_header_step()
        );
        Ok(ComponentProcessor::new(
            loaded.options,
            loaded.diagnostics,
            supported,
            pipeline,
            self.emitter,
            self.reporter,
            self.cancellation,
        ))
    }

    /// 直接使用给定的选项构建，跳过选项来源
    pub fn build_with_options(self, options: ProcessingOptions) -> ComponentProcessor {
        let supported: BTreeSet<String> = SUPPORTED_OPTIONS
            .iter()
            .map(|name| name.to_string())
            .chain(
                self.plugins
                    .iter()
                    .flat_map(|plugin| plugin.supported_options()),
            )
            .collect();
        let pipeline = build_pipeline(self.builtin_checks, self.checks, self.plugins, &options);
        ComponentProcessor::new(
            options,
            Vec::new(),
            supported,
            pipeline,
            self.emitter,
            self.reporter,
            self.cancellation,
        )
    }

    /// 初始化日志系统
    fn initialize_logging(&self) -> ProcessingResult<()> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.logging_config.level)
            .with_target(self.logging_config.show_target)
            .with_thread_ids(self.logging_config.show_thread_ids)
            .with_file(self.logging_config.show_file)
            .with_line_number(self.logging_config.show_line_number)
            .with_writer(if self.logging_config.stderr {
                BoxMakeWriter::new(std::io::stderr)
            } else {
                BoxMakeWriter::new(std::io::stdout)
            });

        if self.logging_config.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| ProcessingError::BuildFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}

/// 组装校验流水线并初始化插件
fn build_pipeline(
    builtin_checks: bool,
    checks: Vec<Box<dyn ValidationCheck>>,
    plugins: Vec<Box<dyn BindingGraphPlugin>>,
    options: &ProcessingOptions,
) -> ValidationPipeline {
    let mut pipeline = if builtin_checks {
        ValidationPipeline::new()
    } else {
        ValidationPipeline::empty()
    };
    for check in checks {
        pipeline = pipeline.with_check(check);
    }
    for mut plugin in plugins {
        plugin.initialize(options);
        debug!("插件 {} 初始化完成", plugin.plugin_name());
        pipeline = pipeline.with_plugin(Arc::from(plugin));
    }
    pipeline
}

impl Default for ProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
    /// 是否写到标准错误
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
            stderr: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境：调试级别，带源码位置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
            stderr: false,
        }
    }

    /// 生产环境：JSON 输出
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
            stderr: false,
        }
    }

    /// 指定日志级别
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// 日志写到标准错误，标准输出留给处理结果
    pub fn with_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }
}
