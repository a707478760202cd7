//! Registration-time validation and endpoint-set behavior.

mod common;

use apimap::{ApiModule, ModuleConfig, RequestOptions};
use common::{metadatas, MockTransport};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_invalid_entry_is_rejected_and_siblings_survive() {
    let transport = MockTransport::ok(json!("ok"));
    let config = ModuleConfig::new(metadatas(json!({
        "good": { "method": "get", "url": "/api/good" },
        "bad": { "method": "get", "url": "" }
    })))
    .console(false)
    .transport(transport);

    let build = ApiModule::build(config).expect("module builds");

    assert_eq!(build.rejected.len(), 1);
    assert_eq!(build.rejected[0].key, "bad");
    assert!(build.rejected[0].error.is_config());
    assert!(build.rejected[0]
        .error
        .to_string()
        .contains("'method' or 'url' value not found"));

    let module = build.module;
    assert!(module.api().get("bad").is_none());

    // The sibling stays registered and callable.
    let body = module
        .api()
        .get("good")
        .expect("sibling registered")
        .call((), RequestOptions::new())
        .await
        .expect("sibling callable");
    assert_eq!(body, json!("ok"));
}

#[test]
fn test_namespaced_rejection_names_the_dotted_key() {
    let transport = MockTransport::ok(json!(null));
    let config = ModuleConfig::new(metadatas(json!({
        "stock": {
            "list": { "method": "", "url": "/api/stock/list" }
        }
    })))
    .console(false)
    .transport(transport);

    let build = ApiModule::build(config).expect("module builds");
    assert_eq!(build.rejected.len(), 1);
    assert_eq!(build.rejected[0].key, "stock.list");
    assert!(build.module.api().is_empty());
}

#[test]
fn test_api_set_exposes_names_and_back_reference() {
    let transport = MockTransport::ok(json!(null));
    let config = ModuleConfig::new(metadatas(json!({
        "a": { "method": "get", "url": "/a" },
        "b": { "method": "get", "url": "/b" }
    })))
    .console(false)
    .transport(transport);
    let module = ApiModule::build(config).expect("module builds").module;

    let names: Vec<&str> = module.api().names().collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(module.api().len(), 2);

    // The back-reference points at the same shared state the module owns.
    assert!(Arc::ptr_eq(
        module.api().module().transport(),
        module.transport()
    ));
}

#[test]
fn test_endpoint_exposes_its_metadata() {
    let transport = MockTransport::ok(json!(null));
    let config = ModuleConfig::new(metadatas(json!({
        "info": { "method": "post", "url": "/api/info", "name": "fetch info" }
    })))
    .console(false)
    .transport(transport);
    let module = ApiModule::build(config).expect("module builds").module;

    let endpoint = module.api().get("info").expect("registered");
    assert_eq!(endpoint.metadata().method, "post");
    assert_eq!(endpoint.metadata().label(), "fetch info");
}
