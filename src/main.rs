use cloudtail::cli::{output, Cli};

#[tokio::main]
async fn main() {
    if let Err(e) = Cli::run().await {
        output::print_error(&e);
        std::process::exit(1);
    }
}
