use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn ohlcv_columns(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(ColumnDef::new(Ohlcv::Open).decimal().not_null())
        .col(ColumnDef::new(Ohlcv::High).decimal().not_null())
        .col(ColumnDef::new(Ohlcv::Low).decimal().not_null())
        .col(ColumnDef::new(Ohlcv::Close).decimal().not_null())
        .col(ColumnDef::new(Ohlcv::Volume).decimal().not_null().default(0))
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS timescaledb").await?;

        manager
            .create_table(
                Table::create()
                    .table(Cryptocurrencies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cryptocurrencies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cryptocurrencies::Symbol).text().not_null().unique_key())
                    .col(ColumnDef::new(Cryptocurrencies::Name).text().not_null())
                    .col(ColumnDef::new(Cryptocurrencies::CoingeckoId).text().null())
                    .to_owned(),
            )
            .await?;

        let mut crypto_prices = Table::create();
        crypto_prices
            .table(CryptoPrices::Table)
            .if_not_exists()
            .col(ColumnDef::new(CryptoPrices::CryptoId).integer().not_null())
            .col(ColumnDef::new(CryptoPrices::Time).timestamp_with_time_zone().not_null());
        ohlcv_columns(&mut crypto_prices)
            .primary_key(Index::create().col(CryptoPrices::CryptoId).col(CryptoPrices::Time))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_crypto_prices_crypto")
                    .from(CryptoPrices::Table, CryptoPrices::CryptoId)
                    .to(Cryptocurrencies::Table, Cryptocurrencies::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            );
        manager.create_table(crypto_prices.to_owned()).await?;

        manager
            .create_table(
                Table::create()
                    .table(CryptoStrategies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CryptoStrategies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CryptoStrategies::Name).text().not_null().unique_key())
                    .col(ColumnDef::new(CryptoStrategies::StrategyType).text().not_null())
                    .col(ColumnDef::new(CryptoStrategies::Description).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CryptoStrategyParameters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CryptoStrategyParameters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CryptoStrategyParameters::StrategyId).integer().not_null())
                    .col(ColumnDef::new(CryptoStrategyParameters::ParamName).text().not_null())
                    .col(ColumnDef::new(CryptoStrategyParameters::ParamValue).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_crypto_strategy_parameters_strategy")
                            .from(CryptoStrategyParameters::Table, CryptoStrategyParameters::StrategyId)
                            .to(CryptoStrategies::Table, CryptoStrategies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_crypto_strategy_parameters_name")
                    .table(CryptoStrategyParameters::Table)
                    .col(CryptoStrategyParameters::StrategyId)
                    .col(CryptoStrategyParameters::ParamName)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Stocks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Stocks::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Stocks::Symbol).text().not_null().unique_key())
                    .col(ColumnDef::new(Stocks::Name).text().not_null())
                    .col(ColumnDef::new(Stocks::Exchange).text().null())
                    .to_owned(),
            )
            .await?;

        let mut stock_prices = Table::create();
        stock_prices
            .table(StockPrices::Table)
            .if_not_exists()
            .col(ColumnDef::new(StockPrices::StockId).integer().not_null())
            .col(ColumnDef::new(StockPrices::Time).timestamp_with_time_zone().not_null());
        ohlcv_columns(&mut stock_prices)
            .primary_key(Index::create().col(StockPrices::StockId).col(StockPrices::Time))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_stock_prices_stock")
                    .from(StockPrices::Table, StockPrices::StockId)
                    .to(Stocks::Table, Stocks::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            );
        manager.create_table(stock_prices.to_owned()).await?;

        db.execute_unprepared(
            "SELECT create_hypertable('crypto_prices', 'time', if_not_exists => TRUE, migrate_data => TRUE)",
        )
        .await?;
        db.execute_unprepared(
            "SELECT create_hypertable('stock_prices', 'time', if_not_exists => TRUE, migrate_data => TRUE)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StockPrices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stocks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CryptoStrategyParameters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CryptoStrategies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CryptoPrices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cryptocurrencies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Ohlcv {
    Open,
    High,
    Low,
    Close,
    Volume,
}

#[derive(DeriveIden)]
enum Cryptocurrencies {
    Table,
    Id,
    Symbol,
    Name,
    CoingeckoId,
}

#[derive(DeriveIden)]
enum CryptoPrices {
    Table,
    CryptoId,
    Time,
}

#[derive(DeriveIden)]
enum CryptoStrategies {
    Table,
    Id,
    Name,
    StrategyType,
    Description,
}

#[derive(DeriveIden)]
enum CryptoStrategyParameters {
    Table,
    Id,
    StrategyId,
    ParamName,
    ParamValue,
}

#[derive(DeriveIden)]
enum Stocks {
    Table,
    Id,
    Symbol,
    Name,
    Exchange,
}

#[derive(DeriveIden)]
enum StockPrices {
    Table,
    StockId,
    Time,
}
