mod bot;
mod config;
mod error;
mod host;
mod telegram;
mod thingspeak;
mod weather;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
