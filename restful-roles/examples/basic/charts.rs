//! Chart service over the in-memory store
//!
//! ```bash
//! cargo run --example charts
//! curl -i -X POST localhost:8080/charts -d '{"title":"Selective Reflation"}'
//! curl -i localhost:8080/charts/<id>
//! curl -i localhost:8080/charts/<id> -H 'If-None-Match: "1"'
//! ```

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use restful_roles::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, signal};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Chart {
    title: String,
    #[serde(default)]
    series: Vec<f64>,
}

type Store = Arc<MemoryStore<Chart>>;
type Charts = InstanceHandler<Versioned<Chart>, Store, Store, Store, Store, Store>;
type ChartCollection =
    CollectionHandler<CollectionIndex<Chart>, Versioned<Chart>, Store, Store, Store, Store, Store>;

#[derive(Clone)]
struct AppState {
    charts: Arc<Charts>,
    collection: Arc<ChartCollection>,
}

async fn list_charts(
    State(state): State<AppState>,
    validators: CacheValidators,
) -> Result<RestResponse, ApiError> {
    state.collection.get(&validators).await
}

async fn head_charts(
    State(state): State<AppState>,
    validators: CacheValidators,
) -> Result<RestResponse, ApiError> {
    state.collection.head(&validators).await
}

async fn create_chart(
    State(state): State<AppState>,
    inbound: Inbound,
) -> Result<RestResponse, ApiError> {
    state.collection.post(&inbound).await
}

async fn delete_charts(State(state): State<AppState>) -> RestResponse {
    state.collection.delete()
}

async fn get_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    validators: CacheValidators,
) -> Result<RestResponse, ApiError> {
    state.charts.get(&id, &validators).await
}

async fn head_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    validators: CacheValidators,
) -> Result<RestResponse, ApiError> {
    state.charts.head(&id, &validators).await
}

async fn put_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    inbound: Inbound,
) -> Result<RestResponse, ApiError> {
    state.charts.put(&id, &inbound).await
}

async fn delete_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<RestResponse, ApiError> {
    state.charts.delete(&id).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let store: Store = Arc::new(MemoryStore::new("/charts").with_entity_type("chart"));

    let charts = InstanceHandler::<Versioned<Chart>>::builder()
        .retriever(Arc::clone(&store))
        .serialiser(Arc::clone(&store))
        .upserter(Arc::clone(&store))
        .deleter(Arc::clone(&store))
        .deserialiser(Arc::clone(&store))
        .caching(&config.caching)
        .build();

    let collection = CollectionHandler::<CollectionIndex<Chart>, Versioned<Chart>>::builder()
        .indexer(Arc::clone(&store))
        .serialiser(Arc::clone(&store))
        .deserialiser(Arc::clone(&store))
        .inserter(Arc::clone(&store))
        .url_generator(store)
        .caching(&config.caching)
        .build();

    let state = AppState {
        charts: Arc::new(charts),
        collection: Arc::new(collection),
    };

    let app = Router::new()
        .route(
            "/charts",
            get(list_charts)
                .head(head_charts)
                .post(create_chart)
                .delete(delete_charts),
        )
        .route(
            "/charts/{id}",
            get(get_chart)
                .head(head_chart)
                .put(put_chart)
                .delete(delete_chart),
        )
        .with_state(state);

    let listener = TcpListener::bind(("0.0.0.0", config.service.port)).await?;
    tracing::info!("Server listening on port {}", config.service.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
