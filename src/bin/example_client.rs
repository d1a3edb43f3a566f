use std::sync::Arc;

use neophyte_api::{api::NeophyteClient, client::ChannelClient, rpc::ChannelId};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let client = ChannelClient::connect(ChannelId(1)).await?;
    let api = NeophyteClient::new(Arc::new(client));

    api.set_font_height(14.0).await?;
    api.set_font_width(7.0).await?;

    let ten = api.get_ten().await?;
    println!("Host replied: {ten}");

    Ok(())
}
