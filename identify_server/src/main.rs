#[tokio::main]
async fn main() -> std::io::Result<()> {
    identify_server::run_with_config().await
}
