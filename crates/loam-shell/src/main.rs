mod session;

use std::io::{self, BufRead, Write};

use loam_db::{Handler, HandlerConfig};
use loam_store::MemoryStore;

use crate::session::Session;

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let mut config = HandlerConfig::default();
    if let Ok(version) = std::env::var("LOAM_VERSION") {
        config.version = version;
    }
    if let Some(size) = std::env::var("LOAM_MAX_BSON_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        config.max_bson_object_size = size;
    }
    let default_db = std::env::var("LOAM_DEFAULT_DB")
        .unwrap_or_else(|_| "test".to_string());

    let session = Session::new(Handler::new(MemoryStore::new(), config), default_db);
    tracing::info!(version = %session.handler().config().version, "loam-shell ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("failed to read stdin: {e}");
                std::process::exit(1);
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let reply = session.handle_line(&line);
        if let Err(e) = writeln!(stdout, "{reply}").and_then(|_| stdout.flush()) {
            tracing::error!("failed to write reply: {e}");
            std::process::exit(1);
        }
    }
}
