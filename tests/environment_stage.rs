#![cfg(unix)]

mod common;

use common::FakeTools;
use pyexe_bundler::bundler::{
    EnvironmentStage, Error, MemorySink, ProcessRunner, RuntimeEnvironment,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn runner() -> (ProcessRunner, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (ProcessRunner::new(sink.clone()), sink)
}

#[tokio::test]
async fn first_validation_creates_and_installs() {
    let tools = FakeTools::new();
    let config = tools.config();
    let (runner, sink) = runner();

    let env = EnvironmentStage::new(&config, &runner)
        .validate(&CancellationToken::new())
        .await
        .expect("valid environment");

    assert_eq!(env, RuntimeEnvironment::at(&config.environment_root));
    assert!(env.interpreter().is_file());
    assert_eq!(tools.count("venv -m venv"), 1);
    assert_eq!(tools.calls().last().map(String::as_str), Some("pip install pyinstaller pefile"));
    assert!(sink.contains("Successfully installed"));
}

#[tokio::test]
async fn second_validation_only_lists_packages() {
    let tools = FakeTools::new();
    let config = tools.config();
    let (runner, _sink) = runner();
    let stage = EnvironmentStage::new(&config, &runner);
    let cancel = CancellationToken::new();

    stage.validate(&cancel).await.expect("first");
    stage.validate(&cancel).await.expect("second");

    assert_eq!(tools.count("venv"), 1);
    assert_eq!(tools.count("pip install"), 1);
    assert_eq!(tools.count("pip freeze"), 2);
}

#[tokio::test]
async fn only_missing_packages_are_installed() {
    let tools = FakeTools::new();
    let mut config = tools.config();
    let (runner, _sink) = runner();
    let cancel = CancellationToken::new();

    EnvironmentStage::new(&config, &runner)
        .validate(&cancel)
        .await
        .expect("first");

    config.required_packages.push("Pillow".into());
    EnvironmentStage::new(&config, &runner)
        .validate(&cancel)
        .await
        .expect("second");

    let installs: Vec<_> = tools
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("pip install"))
        .collect();
    assert_eq!(installs, vec!["pip install pyinstaller pefile", "pip install Pillow"]);
}

#[tokio::test]
async fn deleted_interpreter_is_recreated() {
    let tools = FakeTools::new();
    let config = tools.config();
    let (runner, _sink) = runner();
    let stage = EnvironmentStage::new(&config, &runner);
    let cancel = CancellationToken::new();

    let env = stage.validate(&cancel).await.expect("first");
    std::fs::remove_file(env.interpreter()).expect("corrupt environment");

    let env = stage.validate(&cancel).await.expect("recreated");
    assert!(env.interpreter().is_file());

    let creations: Vec<_> = tools
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("venv"))
        .collect();
    assert_eq!(creations.len(), 2);
    assert!(creations[1].contains("--clear"));
}

#[tokio::test]
async fn failed_install_is_an_environment_error() {
    let tools = FakeTools::new();
    tools.fail("pip");
    let config = tools.config();
    let (runner, sink) = runner();

    let err = EnvironmentStage::new(&config, &runner)
        .validate(&CancellationToken::new())
        .await
        .expect_err("install fails");

    assert!(matches!(err, Error::Environment(_)));
    assert!(sink.contains("could not install"));
}

#[tokio::test]
async fn missing_base_interpreter_is_an_environment_error() {
    let tools = FakeTools::new();
    let mut config = tools.config();
    config.base_interpreter = tools.path().join("no-python");
    let (runner, _sink) = runner();

    let err = EnvironmentStage::new(&config, &runner)
        .validate(&CancellationToken::new())
        .await
        .expect_err("cannot create");

    assert!(matches!(err, Error::Environment(_)));
}
