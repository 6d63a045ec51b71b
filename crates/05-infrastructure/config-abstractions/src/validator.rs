//! 选项校验抽象接口

use crate::options::RawOption;
use di_common::Diagnostic;
use std::collections::BTreeSet;

/// 选项校验器 trait
///
/// 以诊断记录报告问题，而不是中止处理
pub trait OptionsValidator: Send + Sync {
    /// 校验按优先级排好序的原始选项
    fn validate(&self, options: &[RawOption], supported: &BTreeSet<String>) -> Vec<Diagnostic>;

    /// 获取校验器名称
    fn name(&self) -> &str;
}
