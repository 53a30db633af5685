use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_crypto_prices_crypto_time_desc")
                    .table(CryptoPrices::Table)
                    .col(CryptoPrices::CryptoId)
                    .col((CryptoPrices::Time, IndexOrder::Desc))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stock_prices_stock_time_desc")
                    .table(StockPrices::Table)
                    .col(StockPrices::StockId)
                    .col((StockPrices::Time, IndexOrder::Desc))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_historic_weather_location_time_desc")
                    .table(HistoricWeatherData::Table)
                    .col(HistoricWeatherData::Location)
                    .col((HistoricWeatherData::Time, IndexOrder::Desc))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Throttle lookups filter by address inside a time window.
        manager
            .create_index(
                Index::create()
                    .name("idx_login_attempts_ip_time")
                    .table(LoginAttempts::Table)
                    .col(LoginAttempts::IpAddress)
                    .col(LoginAttempts::AttemptedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_login_attempts_ip_time",
            "idx_historic_weather_location_time_desc",
            "idx_stock_prices_stock_time_desc",
            "idx_crypto_prices_crypto_time_desc",
        ] {
            manager
                .drop_index(Index::drop().name(name).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum CryptoPrices {
    Table,
    CryptoId,
    Time,
}

#[derive(DeriveIden)]
enum StockPrices {
    Table,
    StockId,
    Time,
}

#[derive(DeriveIden)]
enum HistoricWeatherData {
    Table,
    Location,
    Time,
}

#[derive(DeriveIden)]
enum LoginAttempts {
    Table,
    IpAddress,
    AttemptedAt,
}
