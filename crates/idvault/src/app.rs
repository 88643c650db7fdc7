use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{Api, AppState, attach_session, verify_page};

pub struct App {
    router: axum::Router,
}

impl App {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        let router = axum::Router::new()
            .route("/health", get(health))
            .route("/verify/{hash}", get(verify_page))
            .nest("/api", Api::new())
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                attach_session,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }

    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        axum::serve(listener, self.router).await
    }
}

async fn health() -> &'static str {
    "ok"
}
