//! 端到端集成测试：JSON 输入 → 处理器 → 诊断和绑定图

use anyhow::Result;
use di_abstractions::{BindingKind, ProcessingInput};
use di_common::{DiagnosticKind, Key, Severity};
use di_composition::{JsonFileSource, ProcessingOutcome, ProcessorBuilder};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

async fn process(input: serde_json::Value) -> Result<ProcessingOutcome> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, "{}", input)?;
    let processor = ProcessorBuilder::new().build().await?;
    Ok(processor
        .process_source(&JsonFileSource::new(file.path()))
        .await?)
}

fn injectable(name: &str, dependencies: &[&str]) -> serde_json::Value {
    json!({
        "origin": "injectable_type",
        "element": format!("{}.<init>", name),
        "kind": "injection",
        "key": {"type": name},
        "dependencies": dependencies
            .iter()
            .map(|dependency| json!({"key": {"type": dependency}}))
            .collect::<Vec<_>>(),
    })
}

fn entry(name: &str) -> serde_json::Value {
    json!({"key": {"type": name}})
}

#[tokio::test]
async fn test_service_with_repository() -> Result<()> {
    let outcome = process(json!({
        "components": [{"name": "App", "entry_points": [entry("Service")]}],
        "declarations": [injectable("Service", &["Repo"]), injectable("Repo", &[])],
    }))
    .await?;

    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    let graph = outcome.graph("App").expect("App 的绑定图");
    assert!(graph.is_complete());
    let service = graph.binding_for(&Key::new("Service")).expect("Service 节点");
    let repo = graph.binding_for(&Key::new("Repo")).expect("Repo 节点");
    let targets: Vec<_> = graph.dependencies_of(service.id).map(|edge| edge.target).collect();
    assert_eq!(targets, vec![repo.id]);
    Ok(())
}

#[tokio::test]
async fn test_missing_repository() -> Result<()> {
    let outcome = process(json!({
        "components": [{"name": "App", "entry_points": [entry("Service")]}],
        "declarations": [injectable("Service", &["Repo"])],
    }))
    .await?;

    assert_eq!(outcome.diagnostics.len(), 1);
    let diagnostic = &outcome.diagnostics[0];
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.kind, DiagnosticKind::MissingBinding);
    assert!(diagnostic.message.contains("Service -> Repo"));
    assert!(!outcome.emitted);
    Ok(())
}

#[tokio::test]
async fn test_two_node_cycle() -> Result<()> {
    let outcome = process(json!({
        "components": [{"name": "App", "entry_points": [entry("A")]}],
        "declarations": [injectable("A", &["B"]), injectable("B", &["A"])],
    }))
    .await?;

    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::DependencyCycle);
    assert!(outcome.diagnostics[0].message.contains("A -> B -> A"));
    Ok(())
}

#[tokio::test]
async fn test_application_with_session_subcomponent() -> Result<()> {
    let outcome = process(json!({
        "components": [
            {
                "name": "App",
                "scope": "Singleton",
                "modules": ["AppModule"],
                "entry_points": [entry("Session.Factory"), entry("Set<Interceptor>")]
            },
            {
                "name": "Session",
                "parent": "App",
                "scope": "SessionScope",
                "modules": ["SessionModule"],
                "entry_points": [entry("Handler"), entry("Set<Interceptor>")]
            }
        ],
        "declarations": [
            {
                "origin": {"module": "AppModule"},
                "element": "AppModule.session",
                "kind": "subcomponent_creator",
                "key": {"type": "Session.Factory"},
                "subcomponent": "Session"
            },
            {
                "origin": {"module": "AppModule"},
                "element": "AppModule.database",
                "kind": "provision",
                "key": {"type": "Database"},
                "scope": "Singleton"
            },
            {
                "origin": {"module": "AppModule"},
                "element": "AppModule.logging",
                "kind": "multibinding_contribution",
                "aggregate": {"type": "Set<Interceptor>"},
                "contribution": "into_set"
            },
            {
                "origin": {"module": "SessionModule"},
                "element": "SessionModule.auth",
                "kind": "multibinding_contribution",
                "aggregate": {"type": "Set<Interceptor>"},
                "contribution": "into_set",
                "dependencies": [{"key": {"type": "Database"}}]
            },
            injectable("Handler", &["Database", "UserStore"]),
            {
                "origin": "injectable_type",
                "element": "UserStore.<init>",
                "kind": "injection",
                "key": {"type": "UserStore"},
                "scope": "SessionScope",
                "dependencies": [{"key": {"type": "Database"}}]
            }
        ]
    }))
    .await?;

    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);

    let app = outcome.graph("App").expect("App 的绑定图");
    let session = app.subgraph("Session").expect("Session 的绑定图");

    let creator = session.creator().expect("Session 的创建器");
    assert_eq!(creator.owner_name, "App");

    let database_in_app = app.binding_for(&Key::new("Database")).expect("App 中的 Database");
    let database_in_session = session
        .binding_for(&Key::new("Database"))
        .expect("Session 中的 Database");
    assert!(Arc::ptr_eq(database_in_app, database_in_session));

    let store = session.binding_for(&Key::new("UserStore")).expect("UserStore");
    assert_eq!(store.owner_name, "Session");

    let app_set = app.binding_for(&Key::new("Set<Interceptor>")).expect("App 的集合");
    let session_set = session
        .binding_for(&Key::new("Set<Interceptor>"))
        .expect("Session 的集合");
    assert_eq!(app_set.kind(), BindingKind::Multibinding);
    assert_eq!(app_set.binding.dependencies().len(), 1);
    assert_eq!(session_set.binding.dependencies().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_diagnostics_are_deterministic_and_serializable() -> Result<()> {
    let input = json!({
        "components": [
            {"name": "App", "modules": ["AppModule"], "entry_points": [entry("Service"), entry("Config")]},
            {"name": "Admin", "entry_points": [entry("Missing"), entry("A")]}
        ],
        "declarations": [
            injectable("Service", &["Repo"]),
            injectable("A", &["B"]),
            injectable("B", &["A"]),
            {"origin": {"module": "AppModule"}, "element": "AppModule.first", "kind": "provision", "key": {"type": "Config"}},
            {"origin": {"module": "AppModule"}, "element": "AppModule.second", "kind": "provision", "key": {"type": "Config"}}
        ]
    });

    let first = process(input.clone()).await?;
    let second = process(input).await?;
    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.errors().count(), 4);

    let encoded = serde_json::to_string(&first.diagnostics)?;
    let decoded: Vec<di_common::Diagnostic> = serde_json::from_str(&encoded)?;
    assert_eq!(decoded, first.diagnostics);
    Ok(())
}

#[tokio::test]
async fn test_input_round_trips_through_json() -> Result<()> {
    let input: ProcessingInput = serde_json::from_value(json!({
        "components": [{"name": "App", "entry_points": [entry("Service")]}],
        "declarations": [injectable("Service", &[])],
    }))?;
    let encoded = serde_json::to_value(&input)?;
    let decoded: ProcessingInput = serde_json::from_value(encoded)?;
    assert_eq!(decoded, input);
    Ok(())
}
