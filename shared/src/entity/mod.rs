pub mod login_attempts;
pub mod user_widget_settings;
pub mod users;
