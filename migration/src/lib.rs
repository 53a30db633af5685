pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240101_000002_create_market_tables;
mod m20240101_000003_create_weather_tables;
mod m20240102_000001_create_continuous_aggregates;
mod m20240103_000001_add_performance_indexes;
mod m20240104_000001_create_dashboard_summary;
mod m20240105_000001_seed_reference_data;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_market_tables::Migration),
            Box::new(m20240101_000003_create_weather_tables::Migration),
            Box::new(m20240102_000001_create_continuous_aggregates::Migration),
            Box::new(m20240103_000001_add_performance_indexes::Migration),
            Box::new(m20240104_000001_create_dashboard_summary::Migration),
            Box::new(m20240105_000001_seed_reference_data::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered_by_name() {
        let names: Vec<String> = Migrator::migrations().iter().map(|m| m.name().to_string()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 7);
    }
}
