use askama::Template;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::Form;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::client_ip::client_ip;
use crate::error::WebResult;
use crate::password::verify_password;
use crate::session::COOKIE_NAME;
use crate::state::AppState;
use crate::templates::{DashboardTemplate, LoginTemplate, PerformanceTemplate};
use crate::throttle::{Admission, TOO_MANY_ATTEMPTS};
use crate::widgets::WidgetView;

const INVALID_CREDENTIALS: &str = "Invalid username or password.";
const SLOW_QUERY_ROWS: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

fn login_page_with(status: StatusCode, error: Option<&str>, username: &str) -> WebResult<Response> {
    let page = LoginTemplate {
        error: error.map(str::to_string),
        username: username.to_string(),
    };
    Ok((status, Html(page.render()?)).into_response())
}

fn locked_page(username: &str, retry_after: Option<DateTime<Utc>>, now: DateTime<Utc>) -> WebResult<Response> {
    let mut response = login_page_with(StatusCode::TOO_MANY_REQUESTS, Some(TOO_MANY_ATTEMPTS), username)?;
    if let Some(retry_after) = retry_after {
        let seconds = (retry_after - now).num_seconds().max(1);
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
    }
    Ok(response)
}

pub async fn login_page() -> WebResult<Response> {
    login_page_with(StatusCode::OK, None, "")
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    let ip = client_ip(&headers, Some(peer), &state.config.trusted_proxies);
    let username = form.username.trim();
    let recorded_name = (!username.is_empty()).then_some(username);

    let now = Utc::now();
    let attempt_id = match state.throttle.admit(&state.attempts, &ip, recorded_name, now).await? {
        Admission::Admitted { attempt_id } => attempt_id,
        Admission::Locked { retry_after } => return locked_page(username, retry_after, now),
    };

    let user = state
        .users
        .find_by_username(username)
        .await?
        .filter(|user| user.is_active && verify_password(&form.password, &user.password_hash));

    let Some(user) = user else {
        warn!(ip = %ip, username, "Failed login");
        return login_page_with(StatusCode::UNAUTHORIZED, Some(INVALID_CREDENTIALS), username);
    };

    state.throttle.succeed(&state.attempts, attempt_id).await?;
    state.users.touch_last_login(user.id).await?;
    let session_id = state.sessions.create(user.id, &user.username).await?;
    info!(ip = %ip, username = %user.username, "User logged in");

    let jar = jar.add(state.sessions.cookie(session_id));
    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> WebResult<Response> {
    if let Some(cookie) = jar.get(COOKIE_NAME) {
        state.sessions.delete(cookie.value()).await?;
    }
    let jar = jar.remove(state.sessions.removal_cookie());
    Ok((jar, Redirect::to("/login")).into_response())
}

pub async fn dashboard(State(state): State<Arc<AppState>>, user: AuthUser) -> WebResult<Html<String>> {
    let summary = state.dashboard.summary().await?;
    let weather = state.weather.current(None).await?;
    let widgets = state.widgets.list_widgets(user.user_id).await?;

    let page = DashboardTemplate {
        username: user.username,
        cards: summary.into_iter().map(Into::into).collect(),
        weather: weather.into_iter().map(Into::into).collect(),
        widgets: widgets
            .into_iter()
            .filter(|w| w.visible)
            .map(WidgetView::from)
            .collect(),
    };
    Ok(Html(page.render()?))
}

pub async fn performance(State(state): State<Arc<AppState>>, user: AuthUser) -> WebResult<Html<String>> {
    let (health, health_error) = match state.performance.health().await {
        Ok(health) => (Some(health.into()), None),
        Err(e) => {
            warn!("Database health check failed: {}", e);
            (None, Some(e.to_string()))
        }
    };
    let tables = state.performance.table_stats().await?;
    let report = state
        .performance
        .slow_queries(state.config.slow_query_threshold, SLOW_QUERY_ROWS)
        .await?;

    let page = PerformanceTemplate {
        username: user.username,
        health,
        health_error,
        tables,
        slow_queries_available: report.available,
        slow_queries: report.queries,
        threshold_ms: report.threshold_ms,
    };
    Ok(Html(page.render()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn locked_login_is_429_with_retry_after() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 1, 0).unwrap();
        let lifts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 15, 0).unwrap();

        let response = locked_page("alice", Some(lifts), now).unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "840");
        assert!(body_text(response).await.contains(TOO_MANY_ATTEMPTS));
    }

    #[tokio::test]
    async fn locked_login_without_known_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 1, 0).unwrap();
        let response = locked_page("", None, now).unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }
}
