#[tokio::main]
async fn main() {
    let status = osprey::app::startup::startup().await;
    std::process::exit(status);
}
