//! HTTP boundary for the method channels.

use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::routing::post;

use crate::{BlockAppPlugin, ChannelError, ERROR, MethodCall, MethodResponse};

/// Prefix joined with the `{channel}` path segment.
pub const CHANNEL_PREFIX: &str = "com.block_app/";

/// Create the channel router: `POST /channels/{channel}` with a
/// [`MethodCall`] body, e.g. `/channels/app_block_manager`.
pub fn channel_router(plugin: Arc<BlockAppPlugin>) -> Router {
    Router::new()
        .route("/channels/{channel}", post(invoke))
        .with_state(plugin)
}

async fn invoke(
    State(plugin): State<Arc<BlockAppPlugin>>,
    Path(channel): Path<String>,
    call: Result<Json<MethodCall>, JsonRejection>,
) -> Json<MethodResponse> {
    let call = match call {
        Ok(Json(call)) => call,
        Err(rejection) => {
            tracing::debug!(channel = %channel, error = %rejection, "malformed method call");
            return Json(
                ChannelError::invalid_argument(format!("malformed method call: {rejection}")).into(),
            );
        }
    };

    let channel = format!("{CHANNEL_PREFIX}{channel}");
    tracing::debug!(channel = %channel, method = %call.method, "method call");

    // Handlers touch storage and the OS; keep them off the async workers
    let response = tokio::task::spawn_blocking(move || plugin.handle(&channel, &call)).await;

    Json(response.unwrap_or_else(|e| {
        tracing::error!(error = %e, "method handler panicked");
        ChannelError {
            code: ERROR,
            message: "method handler failed".to_string(),
            details: Some(e.to_string()),
        }
        .into()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt as _;

    async fn post_call(router: Router, channel: &str, body: Value) -> Value {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/channels/{channel}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_block_app_over_http() {
        let fixture = Fixture::new();
        let plugin = Arc::new(BlockAppPlugin::new(
            fixture.blocklist.clone(),
            fixture.overlay.clone(),
        ));
        plugin.attach(fixture.context());
        let router = channel_router(plugin);

        let response = post_call(
            router.clone(),
            "app_block_manager",
            json!({ "method": "blockApp", "arguments": { "packageName": "com.chat" } }),
        )
        .await;
        assert_eq!(response, json!({ "status": "success", "result": true }));

        let response = post_call(
            router.clone(),
            "app_block_manager",
            json!({ "method": "getBlockedApps" }),
        )
        .await;
        assert_eq!(response, json!({ "status": "success", "result": ["com.chat"] }));

        let response = post_call(
            router,
            "app_block_manager",
            json!({ "method": "blockApp", "arguments": {} }),
        )
        .await;
        assert_eq!(response["status"], "error");
        assert_eq!(response["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_malformed_body_is_tagged_error() {
        let fixture = Fixture::new();
        let plugin = Arc::new(BlockAppPlugin::new(
            fixture.blocklist.clone(),
            fixture.overlay.clone(),
        ));
        plugin.attach(fixture.context());
        let router = channel_router(plugin);

        for body in [json!({ "arguments": {} }), json!({ "method": 7 })] {
            let response = post_call(router.clone(), "app_block_manager", body).await;
            assert_eq!(response["status"], "error");
            assert_eq!(response["code"], "INVALID_ARGUMENT");
        }

        let request = Request::builder()
            .method("POST")
            .uri("/channels/app_block_manager")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "INVALID_ARGUMENT");
        assert!(fixture.blocklist.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_channel() {
        let fixture = Fixture::new();
        let plugin = Arc::new(BlockAppPlugin::new(
            fixture.blocklist.clone(),
            fixture.overlay.clone(),
        ));
        let router = channel_router(plugin);

        let response = post_call(router, "camera", json!({ "method": "takePicture" })).await;
        assert_eq!(response, json!({ "status": "notImplemented" }));
    }
}
