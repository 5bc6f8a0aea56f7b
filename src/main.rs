use clap::Parser;
use love_sandwiches::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment variables take precedence
    let _ = dotenvy::dotenv();

    let config = Config::parse();
    love_sandwiches::init_tracing();

    love_sandwiches::run(config).await?;
    Ok(())
}
