pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod logging;
pub mod models;
pub mod redis;
pub mod repo;
pub mod timing;

pub use config::{Config, WeatherLocation};
pub use database::{get_db_connection, get_pool, DbPool};
pub use error::{Error, Result};
pub use models::*;
pub use redis::{cache_key, get_connection_manager, get_redis_client, Cache, Redis};
