#[tokio::main]
async fn main() {
    if knative_deploy::cli::run().await.is_err() {
        std::process::exit(1);
    }
}
