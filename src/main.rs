use clap::Parser;
use stockcast::cli::{run, Cli};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "stockcast=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    run(Cli::parse())
}
