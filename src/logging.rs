//! ログ出力の初期化

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` があればそれを優先し、なければ `-v` で debug まで出す
pub fn init(verbose: bool) {
    let default = if verbose {
        "live_detect=debug,live_detect_common=debug,info"
    } else {
        "live_detect=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // テストなどで二重初期化された場合は無視
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
