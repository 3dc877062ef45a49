use clap::Parser;
use geobatch_lib::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    geobatch_lib::logging::init_tracing(cli.json_logs);

    geobatch_lib::run(cli).await
}
