use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CRYPTOCURRENCIES: [(&str, &str, &str); 3] = [
    ("BTC", "Bitcoin", "bitcoin"),
    ("ETH", "Ethereum", "ethereum"),
    ("SOL", "Solana", "solana"),
];

const STOCKS: [(&str, &str, &str); 3] = [
    ("AAPL", "Apple Inc.", "NASDAQ"),
    ("MSFT", "Microsoft Corporation", "NASDAQ"),
    ("SPY", "SPDR S&P 500 ETF Trust", "NYSEARCA"),
];

/// (name, strategy type, description, parameters)
const STRATEGIES: [(&str, &str, &str, &[(&str, &str)]); 5] = [
    (
        "SMA 10/30 crossover",
        "sma_crossover",
        "Buy when the fast SMA crosses above the slow SMA, sell on the reverse cross",
        &[("fast", "10"), ("slow", "30")],
    ),
    (
        "RSI 14 reversal",
        "rsi",
        "Buy when RSI leaves the oversold zone, sell when it leaves the overbought zone",
        &[("period", "14"), ("oversold", "30"), ("overbought", "70")],
    ),
    (
        "MACD 12/26/9",
        "macd",
        "Trade MACD histogram sign changes",
        &[("fast", "12"), ("slow", "26"), ("signal", "9")],
    ),
    (
        "Bollinger 20/2",
        "bollinger",
        "Buy below the lower band, sell above the upper band",
        &[("period", "20"), ("multiplier", "2.0")],
    ),
    ("Buy and hold", "buy_and_hold", "Benchmark: buy on the first candle", &[]),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut cryptos = Query::insert();
        cryptos
            .into_table(Cryptocurrencies::Table)
            .columns([Cryptocurrencies::Symbol, Cryptocurrencies::Name, Cryptocurrencies::CoingeckoId])
            .on_conflict(OnConflict::column(Cryptocurrencies::Symbol).do_nothing().to_owned());
        for (symbol, name, coingecko_id) in CRYPTOCURRENCIES {
            cryptos.values_panic([symbol.into(), name.into(), coingecko_id.into()]);
        }
        manager.exec_stmt(cryptos).await?;

        let mut stocks = Query::insert();
        stocks
            .into_table(Stocks::Table)
            .columns([Stocks::Symbol, Stocks::Name, Stocks::Exchange])
            .on_conflict(OnConflict::column(Stocks::Symbol).do_nothing().to_owned());
        for (symbol, name, exchange) in STOCKS {
            stocks.values_panic([symbol.into(), name.into(), exchange.into()]);
        }
        manager.exec_stmt(stocks).await?;

        for (name, kind, description, parameters) in STRATEGIES {
            manager
                .exec_stmt(
                    Query::insert()
                        .into_table(CryptoStrategies::Table)
                        .columns([
                            CryptoStrategies::Name,
                            CryptoStrategies::StrategyType,
                            CryptoStrategies::Description,
                        ])
                        .values_panic([name.into(), kind.into(), description.into()])
                        .on_conflict(OnConflict::column(CryptoStrategies::Name).do_nothing().to_owned())
                        .to_owned(),
                )
                .await?;

            for (param_name, param_value) in parameters {
                let strategy_id = Query::select()
                    .column(CryptoStrategies::Id)
                    .from(CryptoStrategies::Table)
                    .and_where(Expr::col(CryptoStrategies::Name).eq(name))
                    .to_owned();
                manager
                    .exec_stmt(
                        Query::insert()
                            .into_table(CryptoStrategyParameters::Table)
                            .columns([
                                CryptoStrategyParameters::StrategyId,
                                CryptoStrategyParameters::ParamName,
                                CryptoStrategyParameters::ParamValue,
                            ])
                            .values_panic([
                                SimpleExpr::SubQuery(None, Box::new(SubQueryStatement::SelectStatement(strategy_id))),
                                (*param_name).into(),
                                (*param_value).into(),
                            ])
                            .on_conflict(
                                OnConflict::columns([
                                    CryptoStrategyParameters::StrategyId,
                                    CryptoStrategyParameters::ParamName,
                                ])
                                .do_nothing()
                                .to_owned(),
                            )
                            .to_owned(),
                    )
                    .await?;
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(CryptoStrategies::Table)
                    .and_where(
                        Expr::col(CryptoStrategies::Name).is_in(STRATEGIES.iter().map(|(name, ..)| *name)),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Stocks::Table)
                    .and_where(Expr::col(Stocks::Symbol).is_in(STOCKS.iter().map(|(symbol, ..)| *symbol)))
                    .to_owned(),
            )
            .await?;
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Cryptocurrencies::Table)
                    .and_where(
                        Expr::col(Cryptocurrencies::Symbol)
                            .is_in(CRYPTOCURRENCIES.iter().map(|(symbol, ..)| *symbol)),
                    )
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Cryptocurrencies {
    Table,
    Symbol,
    Name,
    CoingeckoId,
}

#[derive(DeriveIden)]
enum Stocks {
    Table,
    Symbol,
    Name,
    Exchange,
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
    StrategyId,
    ParamName,
    ParamValue,
}
