//! 选项提供者实现

use async_trait::async_trait;
use config::Source;
use config_abstractions::{OptionsProvider, RawOption};
use di_common::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 内存中的选项，通常来自命令行的 `-A name=value`
#[derive(Debug, Clone, Default)]
pub struct MapOptionsProvider {
    name: String,
    entries: Vec<(String, String)>,
    priority: i32,
}

impl MapOptionsProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            // 命令行选项默认最高优先级
            priority: 300,
        }
    }

    /// 追加一个选项，同名选项可以出现多次
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    /// 解析 `name=value` 形式的参数；只有名称时视为 `true`
    pub fn with_argument(self, argument: &str) -> Self {
        match argument.split_once('=') {
            Some((name, value)) => self.with_option(name.trim(), value.trim()),
            None => self.with_option(argument.trim(), "true"),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl OptionsProvider for MapOptionsProvider {
    async fn load(&self) -> ConfigResult<Vec<RawOption>> {
        Ok(self
            .entries
            .iter()
            .map(|(name, value)| RawOption::new(name, value, &self.name))
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// TOML 或 JSON 选项文件，格式由扩展名决定
///
/// 嵌套的表按 `.` 展开成选项名，例如 `[plugin] mode = "x"` 得到 `plugin.mode`
#[derive(Debug, Clone)]
pub struct FileOptionsProvider {
    path: PathBuf,
    required: bool,
    priority: i32,
}

impl FileOptionsProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
            priority: 100,
        }
    }

    /// 文件不存在时是否报错
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OptionsProvider for FileOptionsProvider {
    async fn load(&self) -> ConfigResult<Vec<RawOption>> {
        if !self.path.exists() {
            if self.required {
                return Err(ConfigError::FileNotFound {
                    path: self.path.display().to_string(),
                });
            }
            debug!("选项文件不存在，跳过: {}", self.path.display());
            return Ok(Vec::new());
        }

        debug!("加载选项文件: {}", self.path.display());
        let settings = config::Config::builder()
            .add_source(config::File::from(self.path.as_path()))
            .build()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;
        let table = settings
            .collect()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;

        let mut flattened = Vec::new();
        flatten_table(String::new(), table, &mut flattened)?;
        flattened.sort();

        let source = self.path.display().to_string();
        debug!("选项文件 {} 中有 {} 个选项", source, flattened.len());
        Ok(flattened
            .into_iter()
            .map(|(name, value)| RawOption::new(name, value, &source))
            .collect())
    }

    fn name(&self) -> &str {
        "file"
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

fn flatten_table(
    prefix: String,
    table: HashMap<String, config::Value>,
    output: &mut Vec<(String, String)>,
) -> ConfigResult<()> {
    for (key, value) in table {
        let name = if prefix.is_empty() {
            key
        } else {
            format!("{}.{}", prefix, key)
        };
        match value.clone().into_table() {
            Ok(nested) => flatten_table(name, nested, output)?,
            Err(_) => {
                let text = value
                    .into_string()
                    .map_err(|e| ConfigError::TypeConversionError {
                        message: format!("选项 {} 的值不是标量: {}", name, e),
                    })?;
                output.push((name, text));
            }
        }
    }
    Ok(())
}

/// 带前缀的环境变量，例如前缀 `DI` 时 `DI_HEADER_COMPILATION=true`
#[derive(Debug, Clone)]
pub struct EnvironmentOptionsProvider {
    prefix: String,
    priority: i32,
    overrides: Option<HashMap<String, String>>,
}

impl EnvironmentOptionsProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            priority: 200,
            overrides: None,
        }
    }

    /// 用给定的变量表代替进程环境
    pub fn with_variables(mut self, variables: HashMap<String, String>) -> Self {
        self.overrides = Some(variables);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[async_trait]
impl OptionsProvider for EnvironmentOptionsProvider {
    async fn load(&self) -> ConfigResult<Vec<RawOption>> {
        debug!("加载环境变量选项，前缀: {}", self.prefix);
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(&self.prefix).source(self.overrides.clone()),
            )
            .build()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;
        let table = settings
            .collect()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;

        let mut flattened = Vec::new();
        flatten_table(String::new(), table, &mut flattened)?;
        flattened.sort();
        debug!("加载了 {} 个环境变量选项", flattened.len());

        let source = format!("env:{}", self.prefix);
        Ok(flattened
            .into_iter()
            .map(|(name, value)| RawOption::new(name.to_lowercase(), value, &source))
            .collect())
    }

    fn name(&self) -> &str {
        "environment"
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_map_provider_parses_arguments() {
        let provider = MapOptionsProvider::new("command-line")
            .with_argument("header_compilation=true")
            .with_argument("strict_multibinding_ordering");
        let options = provider.load().await.unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].name, "header_compilation");
        assert_eq!(options[0].value, "true");
        assert_eq!(options[1].value, "true");
        assert_eq!(options[1].source, "command-line");
    }

    #[tokio::test]
    async fn test_toml_file_provider_flattens_tables() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "ahead_of_time_subcomponents = true").unwrap();
        writeln!(file, "[plugin]").unwrap();
        writeln!(file, "mode = \"fast\"").unwrap();

        let provider = FileOptionsProvider::new(file.path());
        let options = provider.load().await.unwrap();
        let pairs: Vec<_> = options
            .iter()
            .map(|option| (option.name.as_str(), option.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("ahead_of_time_subcomponents", "true"), ("plugin.mode", "fast")]
        );
    }

    #[tokio::test]
    async fn test_json_file_provider() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{\"emit_on_warnings\": false}}").unwrap();

        let options = FileOptionsProvider::new(file.path()).load().await.unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].name, "emit_on_warnings");
        assert_eq!(options[0].value, "false");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let provider = FileOptionsProvider::new("/nonexistent/options.toml");
        assert!(matches!(
            provider.load().await,
            Err(ConfigError::FileNotFound { .. })
        ));

        let optional = FileOptionsProvider::new("/nonexistent/options.toml").with_required(false);
        assert!(optional.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_environment_provider_strips_prefix() {
        let mut variables = HashMap::new();
        variables.insert("BINDING_HEADER_COMPILATION".to_string(), "true".to_string());
        variables.insert("OTHER_VALUE".to_string(), "1".to_string());

        let provider = EnvironmentOptionsProvider::new("BINDING").with_variables(variables);
        let options = provider.load().await.unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].name, "header_compilation");
        assert_eq!(options[0].value, "true");
        assert_eq!(options[0].source, "env:BINDING");
    }
}
