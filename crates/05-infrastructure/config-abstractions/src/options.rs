//! 处理选项定义

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 头文件编译模式：只生成组件接口，不解析绑定图
pub const HEADER_COMPILATION: &str = "header_compilation";
/// 预先生成子组件模式：每个子组件都必须在父组件中声明创建器
pub const AHEAD_OF_TIME_SUBCOMPONENTS: &str = "ahead_of_time_subcomponents";
/// 严格多绑定顺序：批量贡献的集合多绑定给出警告
pub const STRICT_MULTIBINDING_ORDERING: &str = "strict_multibinding_ordering";
/// 报告未使用的作用域绑定
pub const WARN_UNUSED_SCOPED_BINDINGS: &str = "warn_unused_scoped_bindings";
/// 只有警告时仍然生成代码
pub const EMIT_ON_WARNINGS: &str = "emit_on_warnings";

/// 处理器自身识别的选项名称
pub const SUPPORTED_OPTIONS: &[&str] = &[
    HEADER_COMPILATION,
    AHEAD_OF_TIME_SUBCOMPONENTS,
    STRICT_MULTIBINDING_ORDERING,
    WARN_UNUSED_SCOPED_BINDINGS,
    EMIT_ON_WARNINGS,
];

/// 判断是否为处理器自身的布尔选项
pub fn is_boolean_option(name: &str) -> bool {
    SUPPORTED_OPTIONS.contains(&name)
}

/// 选项值
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl OptionValue {
    /// 解析原始文本；`true`/`false`（忽略大小写）解析为布尔值
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Self::Bool(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Self::Bool(false)
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// 布尔值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    /// 文本值
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Bool(_) => None,
            Self::Text(value) => Some(value),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::Text(value) => write!(f, "{}", value),
        }
    }
}

/// 未经校验的选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOption {
    /// 选项名称
    pub name: String,
    /// 原始文本值
    pub value: String,
    /// 来源提供者名称
    pub source: String,
}

impl RawOption {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            source: source.into(),
        }
    }
}

/// 经过校验的处理选项
///
/// 处理器自身的开关以字段形式给出，其余（例如插件选项）保存在 `values` 中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    pub header_compilation: bool,
    pub ahead_of_time_subcomponents: bool,
    pub strict_multibinding_ordering: bool,
    pub warn_unused_scoped_bindings: bool,
    pub emit_on_warnings: bool,
    /// 全部已识别的选项值，按名称排序
    #[serde(default)]
    pub values: BTreeMap<String, OptionValue>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            header_compilation: false,
            ahead_of_time_subcomponents: false,
            strict_multibinding_ordering: false,
            warn_unused_scoped_bindings: true,
            emit_on_warnings: true,
            values: BTreeMap::new(),
        }
    }
}

impl ProcessingOptions {
    /// 从已校验的选项值构建
    pub fn from_values(values: BTreeMap<String, OptionValue>) -> Self {
        let defaults = Self::default();
        let flag = |name: &str, default: bool| {
            values
                .get(name)
                .and_then(OptionValue::as_bool)
                .unwrap_or(default)
        };
        Self {
            header_compilation: flag(HEADER_COMPILATION, defaults.header_compilation),
            ahead_of_time_subcomponents: flag(
                AHEAD_OF_TIME_SUBCOMPONENTS,
                defaults.ahead_of_time_subcomponents,
            ),
            strict_multibinding_ordering: flag(
                STRICT_MULTIBINDING_ORDERING,
                defaults.strict_multibinding_ordering,
            ),
            warn_unused_scoped_bindings: flag(
                WARN_UNUSED_SCOPED_BINDINGS,
                defaults.warn_unused_scoped_bindings,
            ),
            emit_on_warnings: flag(EMIT_ON_WARNINGS, defaults.emit_on_warnings),
            values,
        }
    }

    /// 设置一个选项并刷新开关字段
    pub fn with_option(self, name: impl Into<String>, value: OptionValue) -> Self {
        let mut values = self.values;
        values.insert(name.into(), value);
        Self::from_values(values)
    }

    /// 设置头文件编译模式
    pub fn with_header_compilation(self, enabled: bool) -> Self {
        self.with_option(HEADER_COMPILATION, OptionValue::Bool(enabled))
    }

    /// 设置预先生成子组件模式
    pub fn with_ahead_of_time_subcomponents(self, enabled: bool) -> Self {
        self.with_option(AHEAD_OF_TIME_SUBCOMPONENTS, OptionValue::Bool(enabled))
    }

    /// 设置严格多绑定顺序
    pub fn with_strict_multibinding_ordering(self, enabled: bool) -> Self {
        self.with_option(STRICT_MULTIBINDING_ORDERING, OptionValue::Bool(enabled))
    }

    /// 按名称读取选项
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// 读取布尔选项，不存在或不是布尔值时返回默认值
    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.get(name)
            .and_then(OptionValue::as_bool)
            .unwrap_or(default)
    }

    /// 是否只运行头文件步骤
    pub fn uses_header_step(&self) -> bool {
        self.header_compilation && !self.ahead_of_time_subcomponents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_value_parse() {
        assert_eq!(OptionValue::parse("TRUE"), OptionValue::Bool(true));
        assert_eq!(OptionValue::parse(" false "), OptionValue::Bool(false));
        assert_eq!(
            OptionValue::parse("yes"),
            OptionValue::Text("yes".to_string())
        );
    }

    #[test]
    fn test_defaults() {
        let options = ProcessingOptions::default();
        assert!(options.warn_unused_scoped_bindings);
        assert!(options.emit_on_warnings);
        assert!(!options.uses_header_step());
    }

    #[test]
    fn test_header_step_requires_aot_off() {
        let options = ProcessingOptions::default().with_header_compilation(true);
        assert!(options.uses_header_step());

        let options = options.with_ahead_of_time_subcomponents(true);
        assert!(!options.uses_header_step());
    }

    #[test]
    fn test_plugin_option_is_kept() {
        let options = ProcessingOptions::default()
            .with_option("naming.prefix", OptionValue::Text("Lorn".to_string()));
        assert_eq!(
            options.get("naming.prefix").and_then(OptionValue::as_text),
            Some("Lorn")
        );
        assert!(!options.bool_or("naming.prefix", false));
    }
}
