use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HistoricWeatherData::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(HistoricWeatherData::Location).text().not_null())
                    .col(
                        ColumnDef::new(HistoricWeatherData::Time)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HistoricWeatherData::Temperature).double().not_null())
                    .col(ColumnDef::new(HistoricWeatherData::Humidity).double().null())
                    .col(ColumnDef::new(HistoricWeatherData::Precipitation).double().null())
                    .col(ColumnDef::new(HistoricWeatherData::WindSpeed).double().null())
                    .primary_key(
                        Index::create()
                            .col(HistoricWeatherData::Location)
                            .col(HistoricWeatherData::Time),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CurrentWeatherData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CurrentWeatherData::Location)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CurrentWeatherData::Temperature).double().not_null())
                    .col(ColumnDef::new(CurrentWeatherData::Humidity).double().null())
                    .col(ColumnDef::new(CurrentWeatherData::WindSpeed).double().null())
                    .col(ColumnDef::new(CurrentWeatherData::WeatherCode).integer().null())
                    .col(
                        ColumnDef::new(CurrentWeatherData::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "SELECT create_hypertable('historic_weather_data', 'time', if_not_exists => TRUE, migrate_data => TRUE)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CurrentWeatherData::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HistoricWeatherData::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum HistoricWeatherData {
    Table,
    Location,
    Time,
    Temperature,
    Humidity,
    Precipitation,
    WindSpeed,
}

#[derive(DeriveIden)]
enum CurrentWeatherData {
    Table,
    Location,
    Temperature,
    Humidity,
    WindSpeed,
    WeatherCode,
    UpdatedAt,
}
