use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::entity::user_widget_settings;
use std::sync::Arc;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{WebError, WebResult};
use crate::state::AppState;

const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct WidgetView {
    pub name: String,
    pub settings: Value,
    pub position: i32,
    pub visible: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<user_widget_settings::Model> for WidgetView {
    fn from(model: user_widget_settings::Model) -> Self {
        WidgetView {
            name: model.widget_name,
            settings: model.settings,
            position: model.position,
            visible: model.visible,
            updated_at: model.updated_at,
        }
    }
}

impl WidgetView {
    pub fn settings_text(&self) -> String {
        self.settings.to_string()
    }
}

#[derive(Debug, Deserialize)]
pub struct WidgetUpdate {
    #[serde(default = "empty_settings")]
    pub settings: Value,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn empty_settings() -> Value {
    Value::Object(Default::default())
}

fn default_visible() -> bool {
    true
}

pub fn validate_name(name: &str) -> WebResult<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(WebError::BadRequest(format!(
            "widget name must be 1-{} characters of letters, digits, '_' or '-'",
            MAX_NAME_LEN
        )))
    }
}

fn validate_update(update: &WidgetUpdate) -> WebResult<()> {
    if !update.settings.is_object() {
        return Err(WebError::BadRequest("settings must be a JSON object".to_string()));
    }
    if update.position < 0 {
        return Err(WebError::BadRequest("position must not be negative".to_string()));
    }
    Ok(())
}

pub async fn list(State(state): State<Arc<AppState>>, user: AuthUser) -> WebResult<Json<Vec<WidgetView>>> {
    let widgets = state.widgets.list_widgets(user.user_id).await?;
    Ok(Json(widgets.into_iter().map(WidgetView::from).collect()))
}

pub async fn upsert(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(name): Path<String>,
    Json(update): Json<WidgetUpdate>,
) -> WebResult<Json<WidgetView>> {
    validate_name(&name)?;
    validate_update(&update)?;
    let widget = state
        .widgets
        .upsert_widget(user.user_id, &name, update.settings, update.position, update.visible)
        .await?;
    info!(user = %user.username, widget = %name, "Widget settings saved");
    Ok(Json(widget.into()))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(name): Path<String>,
) -> WebResult<StatusCode> {
    validate_name(&name)?;
    if state.widgets.delete_widget(user.user_id, &name).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(shared::Error::NotFound(format!("widget {}", name)).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn widget_names() {
        assert!(validate_name("btc_chart").is_ok());
        assert!(validate_name("weather-helsinki").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("../etc").is_err());
        assert!(validate_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn update_defaults() {
        let update: WidgetUpdate = serde_json::from_value(json!({})).unwrap();
        assert_eq!(update.settings, json!({}));
        assert_eq!(update.position, 0);
        assert!(update.visible);
        assert!(validate_update(&update).is_ok());
    }

    #[test]
    fn rejects_non_object_settings() {
        let update: WidgetUpdate = serde_json::from_value(json!({ "settings": [1, 2] })).unwrap();
        assert!(validate_update(&update).is_err());

        let update: WidgetUpdate = serde_json::from_value(json!({ "position": -1 })).unwrap();
        assert!(validate_update(&update).is_err());
    }
}
