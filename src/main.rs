use anyhow::Result;
use named_template::cli;

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::command().get_matches();
    init_tracing(matches.get_flag("verbose"));
    cli::run(&matches).await
}
