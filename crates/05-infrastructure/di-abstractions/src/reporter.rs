//! 诊断报告接口

use async_trait::async_trait;
use di_common::{Diagnostic, Severity};
use tracing::{error, warn};

/// 诊断报告器 trait
#[async_trait]
pub trait DiagnosticReporter: Send + Sync {
    /// 报告一次处理的全部诊断，顺序已经稳定
    async fn report(&self, diagnostics: &[Diagnostic]);

    /// 报告器名称
    fn name(&self) -> &str;
}

/// 把诊断写入日志的报告器
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

#[async_trait]
impl DiagnosticReporter for TracingReporter {
    async fn report(&self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => error!("{}", diagnostic),
                Severity::Warning => warn!("{}", diagnostic),
            }
        }
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
