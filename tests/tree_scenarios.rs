//! Integration tests for lazy tree expansion against an in-memory driver

use std::sync::Arc;

use serde_json::json;

use tscope_core::{ClassTree, DeviceKind, ProviderMode};
use tscope_driver::test_utils::{test_app, test_device, test_process, FakeCall, FakeDriver};
use tscope_tree::{DevicesProvider, ItemKind, Resources, TargetItem};

fn provider(driver: FakeDriver, mode: ProviderMode) -> DevicesProvider<FakeDriver> {
    DevicesProvider::new(Arc::new(driver), mode, Resources::new("resources"))
}

fn class_tree(value: serde_json::Value) -> ClassTree {
    serde_json::from_value(value).unwrap()
}

fn labels(items: &[TargetItem]) -> Vec<&str> {
    items.iter().map(TargetItem::label).collect()
}

#[tokio::test]
async fn root_device_facets() {
    let driver = FakeDriver::connected().with_devices(vec![test_device(
        "usb1",
        "iPhone",
        DeviceKind::Usb,
    )]);
    let provider = provider(driver, ProviderMode::Apps);

    let roots = provider.get_children(None).await.unwrap();
    assert_eq!(roots.len(), 1);

    let facets = provider.tree_item(&roots[0]);
    assert_eq!(facets.label, "iPhone");
    assert_eq!(facets.tooltip.as_deref(), Some("usb1 (usb)"));
    assert_eq!(facets.description.as_deref(), Some("usb1"));
}

#[tokio::test]
async fn listing_failure_is_contained_at_device() {
    let driver = FakeDriver::connected()
        .with_devices(vec![
            test_device("usb1", "iPhone", DeviceKind::Usb),
            test_device("local", "Local System", DeviceKind::Local),
        ])
        .with_apps_error("usb1", "device offline")
        .with_apps("local", vec![test_app("org.example.calc", "Calculator", Some(311))]);
    let provider = provider(driver, ProviderMode::Apps);

    let roots = provider.get_children(None).await.unwrap();

    let broken = provider.get_children(Some(&roots[0])).await.unwrap();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].kind(), ItemKind::NotFound);
    assert_eq!(broken[0].label(), "device offline");
    assert_eq!(broken[0].device().map(|d| d.id.as_str()), Some("usb1"));

    // The sibling device keeps loading normally.
    let healthy = provider.get_children(Some(&roots[1])).await.unwrap();
    assert_eq!(labels(&healthy), vec!["Calculator"]);
}

#[tokio::test]
async fn class_tree_expands_one_level_per_request() {
    let driver = FakeDriver::connected()
        .with_devices(vec![test_device("usb1", "iPhone", DeviceKind::Usb)])
        .with_apps("usb1", vec![test_app("com.example", "Example", Some(42))])
        .with_classes("usb1", 42, class_tree(json!({"com": {"example": {"Foo": {}}}})));
    let provider = provider(driver, ProviderMode::Apps);

    let roots = provider.get_children(None).await.unwrap();
    let apps = provider.get_children(Some(&roots[0])).await.unwrap();

    let com = provider.get_children(Some(&apps[0])).await.unwrap();
    assert_eq!(labels(&com), vec!["com"]);

    let example = provider.get_children(Some(&com[0])).await.unwrap();
    assert_eq!(labels(&example), vec!["example"]);

    let foo = provider.get_children(Some(&example[0])).await.unwrap();
    assert_eq!(labels(&foo), vec!["Foo"]);

    let leaf = provider.get_children(Some(&foo[0])).await.unwrap();
    assert!(leaf.is_empty());

    // Only the app expansion reached the driver; namespace levels are local.
    assert_eq!(
        provider.driver().calls(),
        vec![
            FakeCall::Devices,
            FakeCall::Apps("usb1".to_string()),
            FakeCall::Classes("usb1".to_string(), 42),
        ]
    );
}

#[tokio::test]
async fn expansion_reconstructs_arbitrary_depth() {
    let input = json!({
        "android": {
            "app": {"Activity": {}, "Service": {}},
            "os": {"Handler": {}}
        },
        "java": {"lang": {"reflect": {"Method": {}}, "Object": {}}},
        "Main": {}
    });
    let driver = FakeDriver::connected()
        .with_processes("emu", vec![test_process("system_server", 500)])
        .with_classes("emu", 500, class_tree(input.clone()));
    let provider = provider(driver, ProviderMode::Processes);
    let device = TargetItem::Device(tscope_tree::DeviceItem::new(
        test_device("emu", "Emulator", DeviceKind::Local),
        ProviderMode::Processes,
    ));

    let processes = provider.get_children(Some(&device)).await.unwrap();
    let top = provider.get_children(Some(&processes[0])).await.unwrap();

    let mut rebuilt = serde_json::Map::new();
    for item in &top {
        rebuilt.insert(item.label().to_string(), rebuild(&provider, item).await);
    }
    assert_eq!(serde_json::Value::Object(rebuilt), input);
}

/// Re-assemble the nested object by expanding every node through the provider.
async fn rebuild(provider: &DevicesProvider<FakeDriver>, item: &TargetItem) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for child in provider.get_children(Some(item)).await.unwrap() {
        let value = Box::pin(rebuild(provider, &child)).await;
        map.insert(child.label().to_string(), value);
    }
    serde_json::Value::Object(map)
}

#[tokio::test]
async fn introspection_failure_rejects_expansion() {
    let driver = FakeDriver::connected()
        .with_apps("usb1", vec![test_app("com.example", "Example", Some(42))])
        .with_classes_error("usb1", 42, "process detached");
    let provider = provider(driver, ProviderMode::Apps);
    let device = TargetItem::Device(tscope_tree::DeviceItem::new(
        test_device("usb1", "iPhone", DeviceKind::Usb),
        ProviderMode::Apps,
    ));

    let apps = provider.get_children(Some(&device)).await.unwrap();
    let err = provider.get_children(Some(&apps[0])).await.unwrap_err();
    assert_eq!(err.reason(), "process detached");
}

#[tokio::test]
async fn not_connected_root_makes_no_calls() {
    let provider = provider(FakeDriver::disconnected(), ProviderMode::Processes);
    assert!(provider.get_children(None).await.unwrap().is_empty());
    assert!(provider.driver().calls().is_empty());
}
