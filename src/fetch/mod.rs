// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::{
    fmt, fs,
    io::Cursor,
    path::{Path, PathBuf},
};
use tokio::time::Instant;
use tracing::{error, info, instrument};

use crate::config::FetchConfig;
use crate::dataset::AutomobileTable;

pub mod download;

/// What [`ensure_data_dir`] found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirStatus {
    Created,
    AlreadyExists,
}

/// Create `dir` (and any parents) unless it is already there.
pub fn ensure_data_dir(dir: impl AsRef<Path>) -> Result<DirStatus> {
    let dir = dir.as_ref();
    if dir.is_dir() {
        return Ok(DirStatus::AlreadyExists);
    }
    fs::create_dir_all(dir).with_context(|| format!("creating data directory {:?}", dir))?;
    Ok(DirStatus::Created)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub rows: usize,
    pub columns: usize,
    pub path: PathBuf,
}

/// Network, HTTP status and parse errors all collapse into this one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalFailure {
    pub message: String,
}

impl fmt::Display for RetrievalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RetrievalFailure {}

impl From<anyhow::Error> for RetrievalFailure {
    fn from(err: anyhow::Error) -> Self {
        Self {
            message: format!("{:#}", err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Saved(FetchSummary),
    Failed(RetrievalFailure),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Saved(_))
    }
}

/// Download the UCI automobile table, normalize it and write it to
/// `config.output_path()`.
///
/// Never returns an error: every failure is logged and reported as
/// [`FetchOutcome::Failed`], and in that case the destination is left as it
/// was. The data directory must already exist (see [`ensure_data_dir`]).
#[instrument(level = "info", skip(client, config), fields(url = %config.source_url))]
pub async fn fetch_uci_automobile(client: &Client, config: &FetchConfig) -> FetchOutcome {
    let start = Instant::now();
    match try_fetch(client, config).await {
        Ok(summary) => {
            info!(
                rows = summary.rows,
                columns = summary.columns,
                path = %summary.path.display(),
                elapsed = ?start.elapsed(),
                "saved automobile table"
            );
            FetchOutcome::Saved(summary)
        }
        Err(err) => {
            error!("download of {} failed: {:#}", config.source_url, err);
            FetchOutcome::Failed(err.into())
        }
    }
}

async fn try_fetch(client: &Client, config: &FetchConfig) -> Result<FetchSummary> {
    let body = download::download_bytes(client, &config.source_url).await?;

    let table = AutomobileTable::parse(Cursor::new(body), false)
        .with_context(|| format!("parsing table from {}", config.source_url))?;

    let path = config.output_path();
    table.write_csv(&path)?;

    Ok(FetchSummary {
        rows: table.num_rows(),
        columns: table.num_columns(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::COLUMN_NAMES;
    use std::net::SocketAddr;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    const SOURCE: &str = "\
3,?,alfa-romero,gas,std,two,convertible,rwd,front,88.60,168.80,64.10,48.80,2548,dohc,four,130,mpfi,3.47,2.68,9.00,111,5000,21,27,13495
1,?,alfa-romero,gas,std,two,hatchback,rwd,front,94.50,171.20,65.50,52.40,2823,ohcv,six,152,mpfi,2.68,3.47,9.00,154,5000,19,26,16500
2,164,audi,gas,std,four,sedan,fwd,front,99.80,176.60,66.20,54.30,2337,ohc,four,109,mpfi,3.19,3.40,10.00,102,5500,24,30,13950
";

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,insurance_data=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// Answer exactly one request with `status` and `body`, then hang up.
    async fn serve_once(status: &'static str, body: &'static str) -> Result<SocketAddr> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        Ok(addr)
    }

    fn test_client() -> Result<Client> {
        // loopback servers must not be routed through an ambient proxy
        Ok(Client::builder().no_proxy().build()?)
    }

    fn config_for(addr: SocketAddr, data_dir: &Path) -> Result<FetchConfig> {
        FetchConfig::new(&format!("http://{}/imports-85.data", addr), data_dir)
    }

    #[test]
    fn ensure_data_dir_is_idempotent() -> Result<()> {
        let root = tempdir()?;
        let dir = root.path().join("data");

        assert_eq!(ensure_data_dir(&dir)?, DirStatus::Created);
        assert!(dir.is_dir());
        assert_eq!(ensure_data_dir(&dir)?, DirStatus::AlreadyExists);
        Ok(())
    }

    #[test]
    fn ensure_data_dir_creates_parents() -> Result<()> {
        let root = tempdir()?;
        let dir = root.path().join("a").join("b").join("data");
        assert_eq!(ensure_data_dir(&dir)?, DirStatus::Created);
        assert!(dir.is_dir());
        Ok(())
    }

    #[test]
    fn ensure_data_dir_fails_when_a_file_is_in_the_way() -> Result<()> {
        let root = tempdir()?;
        let dir = root.path().join("data");
        fs::write(&dir, "not a directory")?;
        assert!(ensure_data_dir(&dir).is_err());
        Ok(())
    }

    #[test]
    fn anyhow_chain_becomes_failure_message() {
        let err = anyhow::anyhow!("connection refused").context("GET http://x failed");
        let failure = RetrievalFailure::from(err);
        assert_eq!(failure.message, "GET http://x failed: connection refused");
        assert_eq!(failure.to_string(), failure.message);
    }

    #[tokio::test]
    async fn fetch_writes_normalized_table() -> Result<()> {
        init_test_logging();
        let addr = serve_once("200 OK", SOURCE).await?;
        let root = tempdir()?;
        let config = config_for(addr, root.path())?;

        let outcome = fetch_uci_automobile(&test_client()?, &config).await;
        assert!(outcome.is_success(), "unexpected outcome: {:?}", outcome);
        assert_eq!(
            outcome,
            FetchOutcome::Saved(FetchSummary {
                rows: 3,
                columns: 26,
                path: config.output_path(),
            })
        );

        let written = fs::read_to_string(config.output_path())?;
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), SOURCE.lines().count() + 1);
        assert_eq!(lines[0], COLUMN_NAMES.join(","));
        assert!(lines.iter().all(|l| l.split(',').count() == 26));

        let first: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(&first[..3], &["3", "", "alfa-romero"]);
        assert!(lines[3].starts_with("2,164,audi,"));
        Ok(())
    }

    #[tokio::test]
    async fn http_error_status_is_a_failure_and_writes_nothing() -> Result<()> {
        init_test_logging();
        let addr = serve_once("404 Not Found", "gone").await?;
        let root = tempdir()?;
        let config = config_for(addr, root.path())?;

        let outcome = fetch_uci_automobile(&test_client()?, &config).await;
        match &outcome {
            FetchOutcome::Failed(failure) => assert!(failure.message.contains("404")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!outcome.is_success());
        assert!(!config.output_path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_host_is_a_failure_and_keeps_existing_file() -> Result<()> {
        init_test_logging();
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);

        let root = tempdir()?;
        let config = config_for(addr, root.path())?;
        fs::write(config.output_path(), "previous run\n")?;

        let outcome = fetch_uci_automobile(&test_client()?, &config).await;
        assert!(!outcome.is_success());
        assert_eq!(fs::read_to_string(config.output_path())?, "previous run\n");
        Ok(())
    }

    #[tokio::test]
    async fn malformed_rows_are_a_failure_and_write_nothing() -> Result<()> {
        init_test_logging();
        let addr = serve_once("200 OK", "3,?,alfa-romero\n2,164,audi\n").await?;
        let root = tempdir()?;
        let config = config_for(addr, root.path())?;

        let outcome = fetch_uci_automobile(&test_client()?, &config).await;
        match &outcome {
            FetchOutcome::Failed(failure) => assert!(failure.message.contains("parsing table")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!config.output_path().exists());
        Ok(())
    }
}
