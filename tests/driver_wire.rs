//! End-to-end tests: tree provider over a real TCP driver connection

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use tscope_core::ProviderMode;
use tscope_driver::{Driver, DriverClient};
use tscope_tree::{render_text, walk, DevicesProvider, ItemKind, Resources};

/// Minimal driver: answers one connection with canned results per method.
async fn spawn_driver() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let request: Value = serde_json::from_str(&line).unwrap();
            let params = &request["params"];
            let mut reply = match request["method"].as_str().unwrap() {
                "devices" => json!({"result": [
                    {"id": "usb1", "name": "iPhone", "type": "usb"},
                    {"id": "tcp", "name": "Remote", "type": "remote"}
                ]}),
                "apps" if params[0] == "usb1" => json!({"result": [
                    {"identifier": "com.example", "name": "Example", "pid": 42},
                    {"identifier": "com.idle", "name": "Idle", "pid": 0}
                ]}),
                "apps" => json!({"error": {"message": "device offline"}}),
                "classes" if params == &json!(["usb1", 42]) => {
                    json!({"result": {"com": {"example": {"Foo": {}}}}})
                }
                _ => json!({"error": {"message": "unsupported"}}),
            };
            reply["id"] = request["id"].clone();

            let mut out = reply.to_string();
            out.push('\n');
            if writer.write_all(out.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    addr
}

#[tokio::test]
async fn walk_over_tcp() {
    let addr = spawn_driver().await;
    let client = DriverClient::connect_tcp(&addr, Duration::from_secs(5))
        .await
        .unwrap();
    assert!(client.connected());

    let provider = DevicesProvider::new(Arc::new(client), ProviderMode::Apps, Resources::default());
    let snapshots = walk(&provider, 3).await.unwrap();

    let expected = "\
iPhone  usb1
  Example  com.example
    com
  Idle  com.idle
Remote  tcp
  device offline
";
    assert_eq!(render_text(&snapshots), expected);
    assert_eq!(snapshots[1].children[0].kind, ItemKind::NotFound);
}

#[tokio::test]
async fn unreachable_driver_degrades_to_empty_root() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let client = match DriverClient::connect_tcp(&addr, Duration::from_secs(1)).await {
        Ok(client) => client,
        Err(_) => DriverClient::detached(),
    };
    let provider = DevicesProvider::new(Arc::new(client), ProviderMode::Apps, Resources::default());

    assert!(provider.get_children(None).await.unwrap().is_empty());
}
