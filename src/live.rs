// src/live.rs
//
// Datagram ingest for the live pipeline.
//
// A reader task forwards datagrams into a bounded mpsc queue; the runner
// consumes that queue on a single task, so aggregation only ever sees one
// ordered stream. Shutdown paths (Ctrl-C, empty datagram, receive error)
// all end in the same final flush, so the open episode is never lost.

use anyhow::{Context, Result};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::logging::SummarySink;
use crate::runner::StreamRunner;

/// Queue depth between the reader task and the runner loop.
const INGEST_QUEUE_CAP: usize = 1024;

/// Bind the datagram endpoint.
///
/// Binding happens up front so an unavailable port aborts startup instead
/// of surfacing mid-stream; this is the pipeline's only fatal error.
pub async fn bind(cfg: &Config) -> Result<UdpSocket> {
    let addr = cfg.listen_addr();
    UdpSocket::bind(&addr)
        .await
        .with_context(|| format!("cannot bind UDP endpoint {addr}"))
}

/// Serve until shutdown, feeding every datagram through the runner.
///
/// End-of-stream conditions: Ctrl-C, an empty datagram (the trainer's
/// goodbye), or a socket error. All of them flush the open episode before
/// returning.
pub async fn serve<S: SummarySink>(
    socket: UdpSocket,
    bufsize: usize,
    runner: &mut StreamRunner<S>,
) {
    let (tx, mut rx) = mpsc::channel::<String>(INGEST_QUEUE_CAP);

    let reader = tokio::spawn(async move {
        let mut buf = vec![0u8; bufsize.max(1)];
        loop {
            match socket.recv_from(&mut buf).await {
                // Zero-length datagram: sender is done.
                Ok((0, _)) => break,
                Ok((n, _)) => {
                    let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                    if tx.send(text).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    eprintln!("[live] recv error: {err}; treating as end of stream");
                    break;
                }
            }
        }
    });

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            chunk = rx.recv() => match chunk {
                Some(text) => runner.process_chunk(&text),
                None => break,
            },
            _ = &mut ctrl_c => {
                eprintln!("[live] shutdown requested; flushing");
                break;
            }
        }
    }

    reader.abort();
    runner.finish();
}
