//! 诊断收集器

use di_common::{Diagnostic, Severity};
use std::collections::HashSet;

/// 一次处理的诊断收集器
///
/// 结构相同的诊断只记录一次；输出时错误在前，同级别内保持首次记录的顺序
#[derive(Debug, Default, Clone)]
pub struct DiagnosticsSink {
    diagnostics: Vec<Diagnostic>,
    seen: HashSet<Diagnostic>,
}

impl DiagnosticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录诊断，重复时返回 `false`
    pub fn record(&mut self, diagnostic: Diagnostic) -> bool {
        if self.seen.contains(&diagnostic) {
            return false;
        }
        self.seen.insert(diagnostic.clone());
        self.diagnostics.push(diagnostic);
        true
    }

    /// 批量记录
    pub fn record_all(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.record(diagnostic);
        }
    }

    /// 是否存在错误
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == severity)
            .count()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 按记录顺序查看
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// 取出全部诊断并清空
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.seen.clear();
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.sort_by_key(|diagnostic| diagnostic.severity);
        diagnostics
    }

    /// 按顺序追加另一个收集器的内容
    pub fn merge(&mut self, other: DiagnosticsSink) {
        self.record_all(other.diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_common::DiagnosticKind;

    #[test]
    fn test_identical_diagnostics_recorded_once() {
        let mut sink = DiagnosticsSink::new();
        assert!(sink.record(Diagnostic::error(DiagnosticKind::MissingBinding, "Repo")));
        assert!(!sink.record(Diagnostic::error(DiagnosticKind::MissingBinding, "Repo")));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_drain_puts_errors_first_and_keeps_order() {
        let mut sink = DiagnosticsSink::new();
        sink.record(Diagnostic::warning(DiagnosticKind::EmptyComponent, "w1"));
        sink.record(Diagnostic::error(DiagnosticKind::MissingBinding, "e1"));
        sink.record(Diagnostic::warning(DiagnosticKind::UnusedBinding, "w2"));
        sink.record(Diagnostic::error(DiagnosticKind::DependencyCycle, "e2"));

        let messages: Vec<_> = sink
            .drain()
            .into_iter()
            .map(|diagnostic| diagnostic.message)
            .collect();
        assert_eq!(messages, vec!["e1", "e2", "w1", "w2"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_merge_appends_in_order() {
        let mut first = DiagnosticsSink::new();
        first.record(Diagnostic::error(DiagnosticKind::MissingBinding, "a"));
        let mut second = DiagnosticsSink::new();
        second.record(Diagnostic::error(DiagnosticKind::MissingBinding, "a"));
        second.record(Diagnostic::error(DiagnosticKind::MissingBinding, "b"));

        first.merge(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.diagnostics()[1].message, "b");
        assert!(first.has_errors());
        assert_eq!(first.error_count(), 2);
    }
}
