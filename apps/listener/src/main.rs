//! 设备接入监听服务进程
//!
//! 职责：
//! - 加载配置、初始化日志
//! - 选择连接记录存储（配置了数据库地址用 Postgres，否则内存）
//! - 启动时构造一次不可变的协议表（端口 + 流处理能力）
//! - 运行监听核心（ListenerService）与只读 HTTP 端点
//! - Ctrl-C 触发共享关停信号，两者协同收卷

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use domain::ProtocolSpec;
use geotrack_config::AppConfig;
use geotrack_listener::{ListenerService, Protocol, ShutdownController, StreamHandler};
use geotrack_protocol::{LengthPrefixedHandler, LineDelimitedHandler};
use geotrack_storage::{ConnectionStore, InMemoryConnectionStore, PgConnectionStore};
use geotrack_telemetry::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
struct AppState {
    settings: Arc<Vec<(String, String)>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    let store: Arc<dyn ConnectionStore> = match &config.database_url {
        Some(database_url) => {
            info!("using postgres connection store");
            Arc::new(PgConnectionStore::connect(database_url).await?)
        }
        None => {
            info!("no database configured, using in-memory connection store");
            Arc::new(InMemoryConnectionStore::new())
        }
    };

    let protocols = build_protocols(&config);
    info!("configured protocols: {}", protocols.len());

    let (controller, signal) = ShutdownController::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
        }
        controller.trigger();
    });

    let service = ListenerService::new(
        Arc::clone(&store),
        Duration::from_millis(config.shutdown_grace_ms),
    );
    let listener_signal = signal.clone();
    let listener_task = tokio::spawn(async move {
        service.run(listener_signal, protocols).await;
    });

    // 只读 HTTP 端点：与监听核心共享进程，不参与其契约
    let state = AppState {
        settings: Arc::new(config.settings()),
    };
    let app = Router::new()
        .route("/environment", get(environment))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let http_listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("http endpoint on {}", config.http_addr);
    axum::serve(http_listener, app)
        .with_graceful_shutdown(async move { signal.cancelled().await })
        .await?;

    listener_task.await?;
    Ok(())
}

/// 由配置构造协议表：协议名绑定端口与流处理能力，启动后不再变化。
fn build_protocols(config: &AppConfig) -> Vec<Protocol> {
    config
        .protocols()
        .into_iter()
        .filter_map(|entry| {
            let handler: Arc<dyn StreamHandler> = match entry.name.as_str() {
                "text-line" => Arc::new(LineDelimitedHandler::new(config.max_line_bytes)),
                "bin-frame" => Arc::new(LengthPrefixedHandler::new(config.max_frame_bytes)),
                other => {
                    warn!("unknown protocol in config: {}", other);
                    return None;
                }
            };
            Some(Protocol::new(
                ProtocolSpec::new(entry.name, entry.port),
                handler,
            ))
        })
        .collect()
}

/// GET /environment：解析后的配置项，JSON 映射。
async fn environment(State(state): State<AppState>) -> impl IntoResponse {
    Json(settings_json(&state.settings))
}

/// GET /health：存活探针。
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

/// GET /metrics：进程指标快照。
async fn metrics() -> impl IntoResponse {
    Json(geotrack_telemetry::metrics().snapshot())
}

fn settings_json(settings: &[(String, String)]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (name, value) in settings {
        map.insert(name.clone(), serde_json::Value::String(value.clone()));
    }
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::{build_protocols, settings_json};
    use geotrack_config::AppConfig;

    fn test_config() -> AppConfig {
        AppConfig {
            http_addr: "127.0.0.1:8080".to_string(),
            database_url: None,
            text_line_port: 5027,
            text_line_enabled: true,
            bin_frame_port: 5040,
            bin_frame_enabled: false,
            max_line_bytes: 4096,
            max_frame_bytes: 65535,
            shutdown_grace_ms: 5000,
        }
    }

    #[test]
    fn protocol_table_follows_config() {
        let protocols = build_protocols(&test_config());
        assert_eq!(protocols.len(), 1);
        assert_eq!(protocols[0].spec.name, "text-line");
        assert_eq!(protocols[0].spec.port, 5027);
    }

    #[test]
    fn settings_render_as_json_object() {
        let value = settings_json(&test_config().settings());
        let map = value.as_object().expect("object");
        assert_eq!(
            map.get("http_addr").and_then(|value| value.as_str()),
            Some("127.0.0.1:8080")
        );
        assert_eq!(
            map.get("database_url").and_then(|value| value.as_str()),
            Some("in-memory")
        );
    }
}
