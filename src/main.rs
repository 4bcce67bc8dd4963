#[tokio::main]
async fn main() {
    let code = ecoscan::app::startup::startup().await;
    std::process::exit(code);
}
