#![feature(int_roundings)]
#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    routes::{
        api::{delete_student, get_students, post_student, put_student},
        index::get_index_route,
        sse::sse_feed,
        students::{
            internal_delete_student, internal_get_add_student_form, internal_get_students,
            internal_post_new_student, internal_put_student,
        },
    },
    state::RollbookState,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod config;
mod data;
mod error;
mod maud_conveniences;
mod routes;
mod state;
mod view;

async fn shutdown_signal(state: RollbookState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    state.sensible_shutdown().await;
    warn!("signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().expect("unable to load env vars");

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    let options = PgPoolOptions::new().max_connections(15);
    let config = RuntimeConfiguration::new().expect("unable to create config");
    let state = RollbookState::new(options, config)
        .await
        .expect("unable to create state");

    let trace_layer = TraceLayer::new_for_http();

    let app = Router::new()
        .route("/", get(get_index_route))
        .route("/api/student", get(get_students).post(post_student))
        .route("/api/student/{id}", put(put_student).delete(delete_student))
        .route("/internal/get_students", get(internal_get_students))
        .route(
            "/internal/students/add_form",
            get(internal_get_add_student_form),
        )
        .route("/internal/students", post(internal_post_new_student))
        .route(
            "/internal/students/{id}",
            put(internal_put_student).delete(internal_delete_student),
        )
        .route("/sse_feed", get(sse_feed))
        .layer(trace_layer)
        .with_state(state.clone());

    let server_ip =
        env::var("ROLLBOOK_SERVER_IP").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = TcpListener::bind(&server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(?server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .expect("unable to serve app");
}
