//! 处理选项校验

use config_abstractions::{is_boolean_option, OptionValue, OptionsValidator, RawOption};
use di_common::{Diagnostic, DiagnosticKind, DiagnosticLocation};
use std::collections::{BTreeMap, BTreeSet};

/// 默认选项校验器
///
/// - 未识别的选项名称给出警告
/// - 布尔选项的值不是 `true`/`false` 时给出错误
/// - 同一来源中同一选项出现多次且取值不同时给出错误
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultOptionsValidator;

impl DefaultOptionsValidator {
    pub fn new() -> Self {
        Self
    }
}

impl OptionsValidator for DefaultOptionsValidator {
    fn validate(&self, options: &[RawOption], supported: &BTreeSet<String>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut first_seen: BTreeMap<(&str, &str), &str> = BTreeMap::new();

        for option in options {
            let location = DiagnosticLocation::Option {
                name: option.name.clone(),
            };

            if !supported.contains(&option.name) {
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::ConfigurationError,
                        format!("未识别的处理选项 {}（来源 {}）", option.name, option.source),
                    )
                    .at(location),
                );
                continue;
            }

            if is_boolean_option(&option.name)
                && OptionValue::parse(&option.value).as_bool().is_none()
            {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::ConfigurationError,
                        format!(
                            "处理选项 {} 只接受 true 或 false，实际为 {}",
                            option.name, option.value
                        ),
                    )
                    .at(location.clone()),
                );
            }

            let key = (option.source.as_str(), option.name.as_str());
            match first_seen.get(&key) {
                Some(previous) if OptionValue::parse(previous) != OptionValue::parse(&option.value) => {
                    diagnostics.push(
                        Diagnostic::error(
                            DiagnosticKind::ConfigurationError,
                            format!(
                                "处理选项 {} 在 {} 中有冲突的取值: {} 和 {}",
                                option.name, option.source, previous, option.value
                            ),
                        )
                        .at(location),
                    );
                }
                Some(_) => {}
                None => {
                    first_seen.insert(key, option.value.as_str());
                }
            }
        }

        diagnostics
    }

    fn name(&self) -> &str {
        "default"
    }
}
