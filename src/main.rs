/**
 * Loads the layered configuration, applies it to a logger and writes one
 * record per level, so a configuration can be tried out from the shell.
 *
 * Usage: logconf [extra-config-file]
 */
use std::process::ExitCode;

use logconf::{config, configure, LoggerHandle};
use slog::{crit, debug, error, info, o, warn};

fn main() -> ExitCode {
    let extra = std::env::args().nth(1);
    let mut handle = LoggerHandle::new();

    let cfg = match config::load(extra.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(handle.error_logger(), "Failed to load configuration"; "error" => %e);
            return ExitCode::FAILURE;
        }
    };
    configure(&mut handle, &cfg);

    let (root, _guard) = handle.build_async();
    let logger = root.new(o!("app" => env!("CARGO_PKG_NAME")));

    debug!(logger, "Logger configured"; "level" => %handle.level(), "hooks" => handle.hooks().len());
    info!(logger, "Service started"; "port" => 8080);
    warn!(logger, "Disk usage high"; "mount" => "/var", "used_pct" => 91.5);
    error!(logger, "Upstream request failed"; "status" => 502, "retry" => true);
    crit!(logger, "Giving up");

    ExitCode::SUCCESS
}
