//! Hook pipeline semantics: error routing, fallback control and the
//! built-in diagnostic line.

mod common;

use apimap::{
    ApiError, ApiModule, ContextCell, FnHook, HookKind, HookOutcome, HookRegistry, ModuleConfig,
    RequestOptions, hook_fn,
};
use common::{metadatas, LogCapture, MockTransport};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

fn module_with(transport: Arc<MockTransport>, console: bool) -> ApiModule {
    let config = ModuleConfig::new(metadatas(json!({
        "test": { "method": "post", "url": "/api/test" }
    })))
    .console(console)
    .transport(transport);
    ApiModule::build(config).expect("module builds").module
}

/// Registers a fallback hook that records the error it observes on the
/// context, then proceeds (re-raising the recorded error).
fn record_fallback(module: &ApiModule, seen: &Arc<Mutex<Option<ApiError>>>) {
    let seen = Arc::clone(seen);
    module.use_fallback(FnHook::new(move |ctx: ContextCell| {
        let seen = Arc::clone(&seen);
        async move {
            *seen.lock() = ctx.lock().response_error().cloned();
            HookOutcome::Proceed
        }
    }));
}

#[tokio::test]
async fn test_before_hook_error_reaches_fallback_and_rejects() {
    let transport = MockTransport::ok(json!(null));
    let module = module_with(Arc::clone(&transport), false);

    module.use_before(FnHook::new(|_ctx| async {
        HookOutcome::Fail(ApiError::message("rejected up front"))
    }));

    let seen = Arc::new(Mutex::new(None));
    record_fallback(&module, &seen);

    let err = module
        .api()
        .get("test")
        .expect("registered")
        .call((), RequestOptions::new())
        .await
        .expect_err("call must reject");

    assert_eq!(err, ApiError::message("rejected up front"));
    assert_eq!(*seen.lock(), Some(ApiError::message("rejected up front")));
    assert!(transport.calls().is_empty(), "dispatch must be skipped");
}

#[tokio::test]
async fn test_error_planted_on_context_by_before_hook_diverts_to_fallback() {
    let transport = MockTransport::ok(json!(null));
    let module = module_with(Arc::clone(&transport), false);

    // The hook proceeds but leaves an error on the context; the
    // orchestrator must still divert.
    module.use_before(FnHook::new(|ctx: ContextCell| async move {
        ctx.lock().set_error("planted");
        HookOutcome::Proceed
    }));

    let err = module
        .api()
        .get("test")
        .expect("registered")
        .call((), RequestOptions::new())
        .await
        .expect_err("call must reject");

    assert_eq!(err, ApiError::message("planted"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_fallback_outcome_replaces_the_final_error() {
    let transport = MockTransport::failing("boom");
    let module = module_with(transport, false);

    module.use_fallback(FnHook::new(|_ctx| async {
        HookOutcome::Fail(ApiError::message("translated"))
    }));

    let endpoint = module.api().get("test").expect("registered");
    let err = endpoint
        .call((), RequestOptions::new())
        .await
        .expect_err("call must reject");

    assert_eq!(err, ApiError::message("translated"));
    // The replacement is re-applied to the retained context.
    let cell = endpoint.context().expect("retained context");
    assert_eq!(
        cell.lock().response_error(),
        Some(&ApiError::message("translated"))
    );
}

#[tokio::test]
async fn test_transport_error_routes_through_fallback() {
    let transport = MockTransport::failing("boom");
    let module = module_with(transport, false);

    let seen = Arc::new(Mutex::new(None));
    record_fallback(&module, &seen);

    let err = module
        .api()
        .get("test")
        .expect("registered")
        .call((), RequestOptions::new())
        .await
        .expect_err("call must reject");

    assert_eq!(err, ApiError::transport("boom"));
    assert_eq!(*seen.lock(), Some(ApiError::transport("boom")));
}

#[tokio::test]
async fn test_after_hook_error_routes_through_fallback() {
    // The after-hook error path is symmetric with the before/transport
    // paths: it diverts through the fallback hook rather than raising
    // directly.
    let transport = MockTransport::ok(json!({ "ok": true }));
    let module = module_with(transport, false);

    module.use_after(FnHook::new(|_ctx| async {
        HookOutcome::Fail(ApiError::message("post-processing failed"))
    }));

    let seen = Arc::new(Mutex::new(None));
    record_fallback(&module, &seen);

    let endpoint = module.api().get("test").expect("registered");
    let err = endpoint
        .call((), RequestOptions::new())
        .await
        .expect_err("call must reject");

    assert_eq!(err, ApiError::message("post-processing failed"));
    assert_eq!(*seen.lock(), Some(ApiError::message("post-processing failed")));

    // The response had already been recorded before the after-hook ran.
    let cell = endpoint.context().expect("retained context");
    assert!(cell.lock().response().is_some());
}

#[tokio::test]
async fn test_default_fallback_emits_one_diagnostic_line() {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let transport = MockTransport::failing("boom");
    let module = module_with(transport, true);

    let err = module
        .api()
        .get("test")
        .expect("registered")
        .call((), RequestOptions::new())
        .await
        .expect_err("call must reject");

    assert_eq!(err.to_string(), "boom");
    assert_eq!(capture.lines_containing("boom"), 1);
    assert_eq!(capture.lines_containing("[POST] [/api/test] failed with boom"), 1);
}

#[tokio::test]
async fn test_console_disabled_suppresses_the_diagnostic() {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let transport = MockTransport::failing("boom");
    let module = module_with(transport, false);

    module
        .api()
        .get("test")
        .expect("registered")
        .call((), RequestOptions::new())
        .await
        .expect_err("call must reject");

    assert_eq!(capture.lines_containing("failed with"), 0);
}

#[tokio::test]
async fn test_instance_hook_wins_over_shared_registry() {
    let shared = Arc::new(HookRegistry::new());
    shared.set(
        HookKind::Before,
        hook_fn(|_ctx| async { HookOutcome::Fail(ApiError::message("shared")) }),
    );

    let transport = MockTransport::ok(json!("ok"));
    let config = ModuleConfig::new(metadatas(json!({
        "test": { "method": "get", "url": "/api/test" }
    })))
    .console(false)
    .shared_hooks(shared)
    .transport(transport);
    let module = ApiModule::build(config).expect("module builds").module;

    // Without an instance hook the shared one rejects the call.
    let err = module
        .api()
        .get("test")
        .expect("registered")
        .call((), RequestOptions::new())
        .await
        .expect_err("shared hook rejects");
    assert_eq!(err, ApiError::message("shared"));

    // An instance hook overrides it.
    module.use_before(FnHook::new(|_ctx| async { HookOutcome::Proceed }));
    let body = module
        .api()
        .get("test")
        .expect("registered")
        .call((), RequestOptions::new())
        .await
        .expect("instance hook proceeds");
    assert_eq!(body, json!("ok"));
}
