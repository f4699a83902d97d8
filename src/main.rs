use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use travel_blog::config::{Cli, Command, Config, CountryCommand};
use travel_blog::db::{self, countries};
use travel_blog::state::{AppState, DbPool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli)?;
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database
    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;

    match cli.command {
        Some(Command::Country(command)) => run_country_command(&pool, command),
        Some(Command::Serve) | None => serve(pool, config).await,
    }
}

async fn serve(pool: DbPool, config: Config) -> anyhow::Result<()> {
    // Ensure media directory exists
    std::fs::create_dir_all(config.media_path())?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid listen address")?;

    let app = travel_blog::app(AppState { db: pool, config });

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn run_country_command(pool: &DbPool, command: CountryCommand) -> anyhow::Result<()> {
    let conn = pool.get()?;

    match command {
        CountryCommand::Add {
            title,
            slug,
            description,
        } => {
            let country = countries::create(&conn, &title, &slug, description.as_deref())
                .with_context(|| format!("could not add country '{}'", slug))?;
            println!("Added {} ({})", country.title, country.slug);
        }
        CountryCommand::List => {
            for country in countries::list(&conn)? {
                println!("{}\t{}", country.slug, country.title);
            }
        }
        CountryCommand::Remove { slug } => {
            if countries::delete_by_slug(&conn, &slug)? {
                println!("Removed {}", slug);
            } else {
                anyhow::bail!("no country with slug '{}'", slug);
            }
        }
    }

    Ok(())
}
