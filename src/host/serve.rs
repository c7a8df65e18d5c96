//! Stdio host: one JSON request per input line, one JSON push per output
//! line. Lets an external frontend (an editor sidebar, say) drive the router.

use crate::host::router::CommandRouter;
use crate::models::PersistenceStore;
use crate::protocol::{self, Request};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Runs the host loop over the process's stdin/stdout until stdin closes
pub fn serve_stdio<S: PersistenceStore>(router: CommandRouter<S>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    runtime.block_on(serve(router, tokio::io::stdin(), tokio::io::stdout()))
}

pub async fn serve<S, R, W>(mut router: CommandRouter<S>, reader: R, mut writer: W) -> Result<()>
where
    S: PersistenceStore,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    router.initialize()?;
    tracing::info!("Host ready");

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }

        let request: Request = match protocol::decode(&line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Ignoring request: {:#}", e);
                continue;
            }
        };

        for push in router.handle(request) {
            let mut encoded = protocol::encode(&push)?;
            encoded.push('\n');
            writer
                .write_all(encoded.as_bytes())
                .await
                .context("Failed to write push")?;
        }
        writer.flush().await.context("Failed to flush pushes")?;
    }

    tracing::info!("Input closed; host stopping");
    Ok(())
}
