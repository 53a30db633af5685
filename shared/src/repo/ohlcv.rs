//! Queries shared by the OHLCV hypertables and their continuous aggregates.
//! Table and column names are compile-time constants, never request input.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::Result;
use crate::models::{PriceBar, TimeRange};

const INSERT_CHUNK: usize = 1000;

pub(crate) struct OhlcvTable {
    pub table: &'static str,
    pub id_column: &'static str,
    pub time_column: &'static str,
}

pub(crate) async fn select_bars(
    pool: &PgPool,
    source: &OhlcvTable,
    id: i32,
    range: &TimeRange,
) -> Result<Vec<PriceBar>> {
    // Latest `limit` rows, returned oldest first.
    let sql = format!(
        "SELECT time, open, high, low, close, volume FROM (
            SELECT {time} AS time, open, high, low, close, volume
            FROM {table}
            WHERE {id} = $1
              AND ($2::timestamptz IS NULL OR {time} >= $2)
              AND ($3::timestamptz IS NULL OR {time} <= $3)
            ORDER BY {time} DESC
            LIMIT $4
        ) bars ORDER BY time ASC",
        time = source.time_column,
        table = source.table,
        id = source.id_column,
    );
    let rows = sqlx::query_as::<_, PriceBar>(&sql)
        .bind(id)
        .bind(range.start)
        .bind(range.end)
        .bind(range.limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub(crate) async fn upsert_bars(
    pool: &PgPool,
    source: &OhlcvTable,
    id: i32,
    bars: &[PriceBar],
) -> Result<u64> {
    let mut written = 0;
    let mut tx = pool.begin().await?;
    for chunk in bars.chunks(INSERT_CHUNK) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}, {}, open, high, low, close, volume) ",
            source.table, source.id_column, source.time_column
        ));
        builder.push_values(chunk, |mut row, bar| {
            row.push_bind(id)
                .push_bind(bar.time)
                .push_bind(bar.open)
                .push_bind(bar.high)
                .push_bind(bar.low)
                .push_bind(bar.close)
                .push_bind(bar.volume);
        });
        builder.push(format!(
            " ON CONFLICT ({}, {}) DO UPDATE SET open = EXCLUDED.open, high = EXCLUDED.high, \
             low = EXCLUDED.low, close = EXCLUDED.close, volume = EXCLUDED.volume",
            source.id_column, source.time_column
        ));
        written += builder.build().execute(&mut *tx).await?.rows_affected();
    }
    tx.commit().await?;
    Ok(written)
}
