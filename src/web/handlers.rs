//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::json;
use tracing::{debug, info, warn};

use super::static_page;
use crate::error::AppError;
use crate::state::AppState;
use crate::stream::{mjpeg, StreamGenerator};
use crate::video::convert;
use crate::video::encoder::JpegEncoder;
use crate::video::frame::EncodedImage;

/// Index page
pub async fn index() -> Html<&'static str> {
    Html(static_page::index_html())
}

/// Liveness check
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "status": "ok" }))
}

/// Current FPS, fixed to two decimals (plain text)
pub async fn fps_text(State(state): State<Arc<AppState>>) -> String {
    state.tracker.current_fps_text()
}

/// Current FPS plus camera controls and configuration (JSON)
///
/// Non-primitive values are rendered as their string representation.
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let camera_config = &state.config.camera;

    let mut controls = serde_json::Map::new();
    for (name, value) in &camera_config.controls {
        controls.insert(name.clone(), json!(value));
    }
    if let Some((min, max)) = camera_config.frame_duration_limits {
        controls.insert(
            "FrameDurationLimits".to_string(),
            json!(format!("({}, {})", min, max)),
        );
    }

    let configuration = json!({
        "device": camera_config.device.display().to_string(),
        "resolution": state.camera.resolution().to_string(),
        "format": state.camera.format().to_string(),
        "jpeg_quality": state.config.stream.jpeg_quality,
    });

    Json(json!({
        "fps": state.tracker.current_fps_text(),
        "controls": controls,
        "configuration": configuration,
    }))
}

/// Single JPEG snapshot
pub async fn snapshot(State(state): State<Arc<AppState>>) -> Response {
    let camera = state.camera.clone();
    let quality = state.config.stream.jpeg_quality;

    let result = tokio::task::spawn_blocking(move || -> crate::error::Result<EncodedImage> {
        let frame = camera.acquire()?;
        let bgr = convert::to_bgr(&frame)?;
        JpegEncoder::new(quality)?.encode(&bgr)
    })
    .await;

    match result {
        Ok(Ok(image)) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "image/jpeg")
            .header(header::CACHE_CONTROL, "no-cache")
            .body(Body::from(image.data))
            .unwrap(),
        Ok(Err(e)) => e.into_response(),
        Err(e) => AppError::Device(format!("Snapshot task failed: {}", e)).into_response(),
    }
}

/// MJPEG stream endpoint
///
/// Each connection gets its own generator over the shared camera. The
/// generator runs on a blocking thread feeding a bounded channel; dropping
/// the response body closes the channel and stops the loop promptly, so no
/// orphaned pipeline outlives its client.
pub async fn video_feed(State(state): State<Arc<AppState>>) -> Response {
    let client_id = uuid::Uuid::new_v4();

    let generator = match StreamGenerator::new(
        state.camera.clone(),
        state.tracker.clone(),
        state.config.stream.jpeg_quality,
    ) {
        Ok(generator) => generator,
        Err(e) => return e.into_response(),
    };

    info!("MJPEG client {} connected", client_id);

    // Bounded channel (capacity 1): the pipeline pulls the next frame only
    // once the previous chunk has been handed to the transport.
    let (tx, mut rx) = tokio::sync::mpsc::channel::<Bytes>(1);

    tokio::task::spawn_blocking(move || {
        for item in generator {
            match item {
                Ok(chunk) => {
                    if tx.blocking_send(chunk).is_err() {
                        debug!("MJPEG client {} disconnected", client_id);
                        break;
                    }
                }
                Err(e) => {
                    warn!("MJPEG stream for client {} ended: {}", client_id, e);
                    break;
                }
            }
        }
    });

    let body_stream = async_stream::stream! {
        while let Some(chunk) = rx.recv().await {
            yield Ok::<Bytes, std::io::Error>(chunk);
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mjpeg::CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
        .header(header::PRAGMA, "no-cache")
        .header(header::EXPIRES, "0")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(body_stream))
        .unwrap()
}
