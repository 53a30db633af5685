use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Populated at creation so that later refreshes can run CONCURRENTLY.
        db.execute_unprepared(
            "CREATE MATERIALIZED VIEW IF NOT EXISTS dashboard_summary AS
             SELECT c.id AS crypto_id,
                    c.symbol,
                    c.name,
                    latest.close AS last_close,
                    window_stats.high_30d,
                    window_stats.low_30d,
                    window_stats.volume_30d,
                    latest.time AS as_of
             FROM cryptocurrencies c
             LEFT JOIN LATERAL (
                 SELECT p.time, p.close
                 FROM crypto_prices p
                 WHERE p.crypto_id = c.id
                 ORDER BY p.time DESC
                 LIMIT 1
             ) latest ON TRUE
             LEFT JOIN LATERAL (
                 SELECT max(p.high) AS high_30d,
                        min(p.low) AS low_30d,
                        sum(p.volume) AS volume_30d
                 FROM crypto_prices p
                 WHERE p.crypto_id = c.id
                   AND p.time > now() - INTERVAL '30 days'
             ) window_stats ON TRUE
             WITH DATA",
        )
        .await?;

        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_dashboard_summary_crypto ON dashboard_summary (crypto_id)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP MATERIALIZED VIEW IF EXISTS dashboard_summary")
            .await?;
        Ok(())
    }
}
