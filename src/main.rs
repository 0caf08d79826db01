use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = httplog::cli::Cli::parse();
    if let Err(e) = httplog::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
