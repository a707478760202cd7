//! Minimal end-to-end usage: declare endpoints as data, wire a before-hook
//! and issue a call.
//!
//! Run with a JSON API listening locally, for example:
//!
//! ```sh
//! cargo run --example basic
//! ```

use apimap::{
    ApiModule, BaseConfig, CallData, ContextCell, FnHook, HookOutcome, MetadataMap, ModuleConfig,
    RequestOptions,
};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), apimap::ApiError> {
    tracing_subscriber::fmt().init();

    let metadatas: MetadataMap = serde_json::from_value(json!({
        "main": {
            "getList": { "method": "get", "url": "/api/items" },
            "getInfo": { "method": "get", "url": "/api/items/{id}/info" }
        }
    }))
    .map_err(|err| apimap::ApiError::message(err.to_string()))?;

    let build = ApiModule::build(
        ModuleConfig::new(metadatas).base(BaseConfig::new().base_url("http://localhost:7788")),
    )?;
    for entry in &build.rejected {
        eprintln!("skipped endpoint {}: {}", entry.key, entry.error);
    }
    let module = build.module;

    // Stamp every outgoing request before it reaches the transport.
    module.use_before(FnHook::new(|ctx: ContextCell| async move {
        ctx.lock()
            .options_mut()
            .headers
            .insert("x-request-source".to_owned(), "basic-example".to_owned());
        HookOutcome::Proceed
    }));

    let info = module
        .api()
        .get("main.getInfo")
        .expect("declared above")
        .call(
            CallData::new().param("id", 123).query("verbose", true),
            RequestOptions::new(),
        )
        .await?;
    println!("item info: {info}");

    Ok(())
}
