//! 处理结果输出

use crate::plan::ComponentPlan;
use clap::ValueEnum;
use di_common::{Diagnostic, Severity};
use di_composition::ProcessingOutcome;
use serde_json::json;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// 按格式渲染处理结果
pub fn render(
    format: OutputFormat,
    outcome: &ProcessingOutcome,
    plans: &[ComponentPlan],
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(outcome, plans)),
        OutputFormat::Json => {
            let document = json!({
                "pass_id": outcome.pass_id.to_string(),
                "step": format!("{:?}", outcome.step).to_lowercase(),
                "errors": outcome.errors().count(),
                "warnings": outcome.warnings().count(),
                "diagnostics": outcome.diagnostics,
                "plan": plans,
            });
            Ok(serde_json::to_string_pretty(&document)?)
        }
    }
}

fn render_text(outcome: &ProcessingOutcome, plans: &[ComponentPlan]) -> String {
    let mut text = String::new();
    for diagnostic in &outcome.diagnostics {
        text.push_str(&render_diagnostic(diagnostic));
        text.push('\n');
    }
    for plan in plans {
        text.push_str(&plan.to_string());
    }
    text.push_str(&format!(
        "{} 个错误, {} 个警告\n",
        outcome.errors().count(),
        outcome.warnings().count()
    ));
    text
}

fn render_diagnostic(diagnostic: &Diagnostic) -> String {
    let label = match diagnostic.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    match &diagnostic.location {
        Some(location) => format!(
            "{}[{}]: {}\n  --> {}",
            label, diagnostic.kind, diagnostic.message, location
        ),
        None => format!("{}[{}]: {}", label, diagnostic.kind, diagnostic.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_common::{DiagnosticKind, DiagnosticLocation};

    #[test]
    fn test_render_diagnostic() {
        let diagnostic = Diagnostic::warning(DiagnosticKind::EmptyComponent, "组件 App 没有任何入口")
            .at(DiagnosticLocation::Component {
                component: "App".to_string(),
            });
        let rendered = render_diagnostic(&diagnostic);
        assert!(rendered.starts_with("warning["));
        assert!(rendered.contains("组件 App 没有任何入口"));
        assert!(rendered.contains("\n  --> "));
    }
}
