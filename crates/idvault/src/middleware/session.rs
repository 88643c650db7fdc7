use axum::{
    extract::{FromRequestParts, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use uuid::Uuid;

use crate::{AppState, SESSION_TTL, WebSession};

pub const SESSION_COOKIE: &str = "Session";

/// Resolve the `Session` cookie to a live server-side session and attach it to
/// the request extensions. Requests without one pass through untouched.
pub async fn attach_session(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, StatusCode> {
    let (mut parts, body) = req.into_parts();
    let jar = CookieJar::from_request_parts(&mut parts, &state)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(session_id) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
        && let Some(session) = state.get_session(session_id).await
    {
        parts.extensions.insert(session);
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Replace the caller's session (if any) with a fresh one and set its cookie.
pub async fn start_session(
    state: &AppState,
    previous: Option<WebSession>,
    jar: CookieJar,
) -> (WebSession, CookieJar) {
    if let Some(previous) = previous {
        state.end_session(&previous).await;
    }

    let session = state.new_session().await;
    tracing::debug!(session_id = %session.id, "started session");

    let cookie = Cookie::build((SESSION_COOKIE, session.id.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(SESSION_TTL)
        .build();

    (session, jar.add(cookie))
}

/// End the caller's session and clear its cookie.
pub async fn end_session(state: &AppState, session: &WebSession, jar: CookieJar) -> CookieJar {
    state.end_session(session).await;
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

#[cfg(test)]
mod tests {
    use ledger::Ledger;
    use reqwest::Client;
    use serde_json::json;
    use tokio::net::TcpListener;

    use crate::App;

    use super::*;

    async fn spawn(state: AppState) -> String {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("TcpListener bind to port 0");
        let port = listener.local_addr().expect("local_addr").port();
        let app = App::new(state);
        tokio::spawn(async move { app.run(listener).await });
        format!("http://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn anonymous_requests_do_not_create_sessions() {
        let state = AppState::in_memory(Ledger::new());
        let base_url = spawn(state.clone()).await;
        let client = Client::new();

        for _ in 0..50 {
            let response = client
                .get(format!("{base_url}/health"))
                .send()
                .await
                .expect("health");
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get("set-cookie").is_none());
        }
        let response = client
            .get(format!("{base_url}/verify/{}", "ab".repeat(32)))
            .send()
            .await
            .expect("verify page");
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn login_and_logout_bound_the_session_count() {
        let state = AppState::in_memory(Ledger::new());
        let base_url = spawn(state.clone()).await;
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("reqwest client");

        let response = client
            .post(format!("{base_url}/api/register"))
            .json(&json!({
                "username": "carol",
                "password": "password123",
                "fullName": "Carol C",
                "dateOfBirth": "1980-02-02",
                "nationality": "Lebanese",
                "languages": ["ar"],
            }))
            .send()
            .await
            .expect("register");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(state.session_count().await, 1);

        for _ in 0..3 {
            let response = client
                .post(format!("{base_url}/api/login"))
                .json(&json!({ "username": "carol", "password": "password123" }))
                .send()
                .await
                .expect("login");
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(state.session_count().await, 1);

        let response = client
            .post(format!("{base_url}/api/logout"))
            .send()
            .await
            .expect("logout");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.session_count().await, 0);
    }
}
