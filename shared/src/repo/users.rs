use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{IntoActiveModel, QueryOrder, QuerySelect, Set};
use std::sync::Arc;

use crate::entity::{login_attempts, user_widget_settings, users};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, user_id: i32) -> Result<Option<users::Model>> {
        let user = users::Entity::find_by_id(user_id).one(self.db.as_ref()).await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?;
        Ok(user)
    }

    pub async fn create(&self, username: &str, password_hash: String) -> Result<users::Model> {
        if self.find_by_username(username).await?.is_some() {
            return Err(Error::Validation(format!("user {} already exists", username)));
        }
        let user = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            last_login_at: Set(None),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;
        Ok(user)
    }

    async fn require(&self, username: &str) -> Result<users::Model> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", username)))
    }

    pub async fn set_password(&self, username: &str, password_hash: String) -> Result<users::Model> {
        let mut user = self.require(username).await?.into_active_model();
        user.password_hash = Set(password_hash);
        user.is_active = Set(true);
        Ok(user.update(self.db.as_ref()).await?)
    }

    pub async fn deactivate(&self, username: &str) -> Result<users::Model> {
        let mut user = self.require(username).await?.into_active_model();
        user.is_active = Set(false);
        Ok(user.update(self.db.as_ref()).await?)
    }

    pub async fn touch_last_login(&self, user_id: i32) -> Result<()> {
        users::Entity::update_many()
            .col_expr(users::Column::LastLoginAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(users::Entity::find().count(self.db.as_ref()).await?)
    }
}

#[derive(Clone)]
pub struct LoginAttemptRepository {
    db: Arc<DatabaseConnection>,
}

impl LoginAttemptRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Inserts an attempt row and returns its id.
    pub async fn record_attempt(
        &self,
        ip_address: &str,
        username: Option<&str>,
        success: bool,
        attempted_at: DateTime<Utc>,
    ) -> Result<i64> {
        let attempt = login_attempts::ActiveModel {
            ip_address: Set(ip_address.to_string()),
            username: Set(username.map(str::to_string)),
            success: Set(success),
            attempted_at: Set(attempted_at),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;
        Ok(attempt.id)
    }

    pub async fn mark_succeeded(&self, attempt_id: i64) -> Result<()> {
        login_attempts::Entity::update_many()
            .col_expr(login_attempts::Column::Success, Expr::value(true))
            .filter(login_attempts::Column::Id.eq(attempt_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    pub async fn delete_attempt(&self, attempt_id: i64) -> Result<()> {
        login_attempts::Entity::delete_by_id(attempt_id)
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    pub async fn failed_attempts_since(&self, ip_address: &str, since: DateTime<Utc>) -> Result<u64> {
        let count = login_attempts::Entity::find()
            .filter(login_attempts::Column::IpAddress.eq(ip_address))
            .filter(login_attempts::Column::Success.eq(false))
            .filter(login_attempts::Column::AttemptedAt.gte(since))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }

    /// Time of the `nth` most recent failure (1-based) since `since`.
    pub async fn nth_recent_failure(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
        nth: u64,
    ) -> Result<Option<DateTime<Utc>>> {
        let attempt = login_attempts::Entity::find()
            .filter(login_attempts::Column::IpAddress.eq(ip_address))
            .filter(login_attempts::Column::Success.eq(false))
            .filter(login_attempts::Column::AttemptedAt.gte(since))
            .order_by_desc(login_attempts::Column::AttemptedAt)
            .offset(nth.saturating_sub(1))
            .limit(1)
            .one(self.db.as_ref())
            .await?;
        Ok(attempt.map(|a| a.attempted_at))
    }

    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = login_attempts::Entity::delete_many()
            .filter(login_attempts::Column::AttemptedAt.lt(cutoff))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}

#[derive(Clone)]
pub struct WidgetRepository {
    db: Arc<DatabaseConnection>,
}

impl WidgetRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list_widgets(&self, user_id: i32) -> Result<Vec<user_widget_settings::Model>> {
        let widgets = user_widget_settings::Entity::find()
            .filter(user_widget_settings::Column::UserId.eq(user_id))
            .order_by_asc(user_widget_settings::Column::Position)
            .order_by_asc(user_widget_settings::Column::WidgetName)
            .all(self.db.as_ref())
            .await?;
        Ok(widgets)
    }

    pub async fn upsert_widget(
        &self,
        user_id: i32,
        widget_name: &str,
        settings: Json,
        position: i32,
        visible: bool,
    ) -> Result<user_widget_settings::Model> {
        let model = user_widget_settings::ActiveModel {
            user_id: Set(user_id),
            widget_name: Set(widget_name.to_string()),
            settings: Set(settings),
            position: Set(position),
            visible: Set(visible),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        let widget = user_widget_settings::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    user_widget_settings::Column::UserId,
                    user_widget_settings::Column::WidgetName,
                ])
                .update_columns([
                    user_widget_settings::Column::Settings,
                    user_widget_settings::Column::Position,
                    user_widget_settings::Column::Visible,
                    user_widget_settings::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_with_returning(self.db.as_ref())
            .await?;
        Ok(widget)
    }

    pub async fn delete_widget(&self, user_id: i32, widget_name: &str) -> Result<bool> {
        let result = user_widget_settings::Entity::delete_many()
            .filter(user_widget_settings::Column::UserId.eq(user_id))
            .filter(user_widget_settings::Column::WidgetName.eq(widget_name))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }
}
