use eav_sampledata::config::AppConfig;
use eav_sampledata::seed::{self, AttributeSeeder};
use eav_sampledata::store::PostgresEavStore;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    println!("EAV sample data: attribute seeder");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: data_dir={}, on_missing_attribute={:?}",
        config.seeding.data_dir, config.seeding.on_missing_attribute
    );

    println!("Connecting to PostgreSQL...");
    let database_url = config.database_url()?;
    let store = PostgresEavStore::new(&database_url).await?;

    println!("Running database migrations...");
    store.migrate().await?;

    let specs = seed::load_attribute_specs(Path::new(&config.seeding.data_dir))?;
    println!("Loaded {} attribute spec(s)", specs.len());

    let seeder = AttributeSeeder::new(config.seeding.on_missing_attribute);
    let summary = seeder.seed(&store, &specs).await?;

    println!(
        "Seeding finished: {} seeded, {} already up to date, {} missing after add",
        summary.seeded, summary.up_to_date, summary.missing
    );

    Ok(())
}
