use anyhow::Result;
use insurance_data::{
    config::FetchConfig,
    fetch::{self, FetchOutcome, RetrievalFailure},
    instructions,
};
use reqwest::Client;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    // stdout is reserved for the guidance text
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    print!("{}", instructions::banner());

    // ─── 2) data dir ─────────────────────────────────────────────────
    let config = FetchConfig::default();
    let dir_ready = match fetch::ensure_data_dir(&config.data_dir) {
        Ok(status) => {
            print!("{}", instructions::dir_status(status));
            Ok(())
        }
        Err(e) => {
            error!("data dir {:?} unavailable: {:#}", config.data_dir, e);
            Err(e)
        }
    };

    // ─── 3) automatic download ───────────────────────────────────────
    print!("{}", instructions::fetch_header());
    let outcome = match dir_ready {
        Ok(()) => fetch::fetch_uci_automobile(&Client::new(), &config).await,
        Err(e) => FetchOutcome::Failed(RetrievalFailure::from(e)),
    };
    print!("{}", instructions::fetch_report(&outcome));

    // ─── 4) manual steps ─────────────────────────────────────────────
    print!("{}", instructions::kaggle_instructions());
    print!("{}", instructions::next_steps());
    print!("{}", instructions::summary(outcome.is_success()));

    info!(success = outcome.is_success(), "all done");
    Ok(())
}
