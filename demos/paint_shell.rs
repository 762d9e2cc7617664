//! Line-oriented paint shell.
//!
//! Reads one JSON message per line from stdin and writes every reply as one
//! JSON line to stdout:
//!
//! ```text
//! > {"name": "PASS-URL", "url": "https://example.com"}
//! < {"name":"PAINT-REGION","value":{"width":1200,"height":800}}
//! < {"name":"PAINT-COUNT","value":14}
//! > {"name": "SEE-PAINT-AREA", "index": 3}
//! < {"name":"SEE-PAINT-AREA","value":{"left":0.0,"top":0.0,"right":1200.0,"bottom":800.0,"type":"rect"}}
//! ```
//!
//! Usage:
//!   cargo run --example paint_shell
//!   cargo run --example paint_shell -- --chrome=/usr/bin/google-chrome
//!   cargo run --example paint_shell -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::warn;

use common::Args;
use paint_timeline::{Analyzer, CaptureConfig, Driver, Result, ShellMessage, ShellReply};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let driver = Driver::builder().binary(&args.chrome).build()?;
    let analyzer = Analyzer::new(driver, CaptureConfig::default())?;

    let (replies, mut outbound) = mpsc::unbounded_channel::<ShellReply>();

    // ========================================================================
    // Writer
    // ========================================================================

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(reply) = outbound.recv().await {
            let mut line = serde_json::to_string(&reply)?;
            line.push('\n');
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        Ok::<(), paint_timeline::Error>(())
    });

    // ========================================================================
    // Reader
    // ========================================================================

    let mut handlers = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let message: ShellMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed message");
                continue;
            }
        };

        // Runs are long; queries keep being answered meanwhile.
        let analyzer = analyzer.clone();
        let replies = replies.clone();
        handlers.spawn(async move {
            analyzer.handle(message, &replies).await;
        });
    }

    // Input closed; let in-flight runs finish before the browser goes away.
    while handlers.join_next().await.is_some() {}

    analyzer.shutdown().await?;
    drop(replies);

    match writer.await {
        Ok(result) => result,
        Err(e) => Err(paint_timeline::Error::protocol(e.to_string())),
    }
}
