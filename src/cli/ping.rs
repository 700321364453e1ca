use super::ui;
use crate::providers::PingClient;
use anyhow::Result;

pub async fn run(client: &PingClient) -> Result<()> {
    let spinner = ui::new_spinner("Pinging upstream...");
    let reply = client.ping().await;
    spinner.finish_and_clear();

    println!("{}", reply?);
    Ok(())
}
