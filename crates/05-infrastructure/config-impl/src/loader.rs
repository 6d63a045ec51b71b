//! 处理选项加载器

use crate::validation::DefaultOptionsValidator;
use config_abstractions::{
    OptionValue, OptionsProvider, OptionsValidator, ProcessingOptions, RawOption,
    SUPPORTED_OPTIONS,
};
use di_common::{ConfigResult, Diagnostic};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// 加载结果
#[derive(Debug, Clone, Default)]
pub struct LoadedOptions {
    /// 校验后的选项
    pub options: ProcessingOptions,
    /// 校验中产生的配置诊断
    pub diagnostics: Vec<Diagnostic>,
    /// 按优先级排列的原始选项
    pub raw: Vec<RawOption>,
}

impl LoadedOptions {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// 处理选项加载器
///
/// 提供者按优先级从高到低读取，同名选项以优先级最高的来源为准
pub struct OptionsLoader {
    providers: Vec<Box<dyn OptionsProvider>>,
    validators: Vec<Box<dyn OptionsValidator>>,
    supported: BTreeSet<String>,
}

impl OptionsLoader {
    /// 创建只识别处理器自身选项的加载器
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            validators: vec![Box::new(DefaultOptionsValidator)],
            supported: SUPPORTED_OPTIONS.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn with_provider(mut self, provider: Box<dyn OptionsProvider>) -> Self {
        self.providers.push(provider);
        // 稳定排序，同优先级保持注册顺序
        self.providers
            .sort_by(|a, b| b.priority().cmp(&a.priority()));
        self
    }

    pub fn with_validator(mut self, validator: Box<dyn OptionsValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// 追加可识别的选项名称，例如插件的选项
    pub fn with_supported_options<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn supported_options(&self) -> &BTreeSet<String> {
        &self.supported
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// 读取全部提供者并校验
    pub async fn load(&self) -> ConfigResult<LoadedOptions> {
        let mut raw = Vec::new();
        for provider in &self.providers {
            let options = provider.load().await.map_err(|e| {
                warn!("选项提供者 {} 加载失败: {}", provider.name(), e);
                e
            })?;
            debug!(
                "选项提供者 {}（优先级 {}）给出 {} 个选项",
                provider.name(),
                provider.priority(),
                options.len()
            );
            raw.extend(options);
        }

        let diagnostics: Vec<Diagnostic> = self
            .validators
            .iter()
            .flat_map(|validator| validator.validate(&raw, &self.supported))
            .collect();

        let mut values: BTreeMap<String, OptionValue> = BTreeMap::new();
        for option in raw.iter().filter(|option| self.supported.contains(&option.name)) {
            let value = OptionValue::parse(&option.value);
            if config_abstractions::is_boolean_option(&option.name) && value.as_bool().is_none() {
                continue;
            }
            match values.get(&option.name) {
                Some(existing) if *existing != value => debug!(
                    "选项 {} 的取值 {} 被更高优先级的 {} 覆盖",
                    option.name, value, existing
                ),
                Some(_) => {}
                None => {
                    values.insert(option.name.clone(), value);
                }
            }
        }

        let options = ProcessingOptions::from_values(values);
        info!(
            "处理选项加载完成: {} 个选项, {} 个诊断",
            options.values.len(),
            diagnostics.len()
        );
        Ok(LoadedOptions {
            options,
            diagnostics,
            raw,
        })
    }
}

impl Default for OptionsLoader {
    fn default() -> Self {
        Self::new()
    }
}
