use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (view, bucket width, policy start offset, policy end offset, schedule)
const AGGREGATES: [(&str, &str, &str, &str, &str); 2] = [
    ("crypto_prices_daily", "1 day", "3 days", "1 hour", "1 hour"),
    ("crypto_prices_weekly", "1 week", "3 weeks", "1 day", "1 day"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Created empty; the refresh policies backfill them outside the migration transaction.
        for (view, width, start_offset, end_offset, schedule) in AGGREGATES {
            db.execute_unprepared(&format!(
                "CREATE MATERIALIZED VIEW IF NOT EXISTS {view}
                 WITH (timescaledb.continuous) AS
                 SELECT time_bucket(INTERVAL '{width}', time) AS bucket,
                        crypto_id,
                        first(open, time) AS open,
                        max(high) AS high,
                        min(low) AS low,
                        last(close, time) AS close,
                        sum(volume) AS volume
                 FROM crypto_prices
                 GROUP BY bucket, crypto_id
                 WITH NO DATA"
            ))
            .await?;

            db.execute_unprepared(&format!(
                "SELECT add_continuous_aggregate_policy('{view}',
                    start_offset => INTERVAL '{start_offset}',
                    end_offset => INTERVAL '{end_offset}',
                    schedule_interval => INTERVAL '{schedule}',
                    if_not_exists => TRUE)"
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for (view, ..) in AGGREGATES.iter().rev() {
            db.execute_unprepared(&format!("DROP MATERIALIZED VIEW IF EXISTS {view} CASCADE"))
                .await?;
        }
        Ok(())
    }
}
