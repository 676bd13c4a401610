use log::{error, info};

#[tokio::main]
async fn main() {
    // Read .env before the logger so RUST_LOG may come from it
    let dotenv = dotenvy::dotenv();
    env_logger::init();

    if dotenv.is_err() {
        info!("No .env file found, reading the environment only");
    }

    if let Err(e) = server::run().await {
        error!("{e}");
        std::process::exit(1);
    }
}
