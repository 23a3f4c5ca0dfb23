use clap::Parser;
use shore::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = shore::app::run(cli).await {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
