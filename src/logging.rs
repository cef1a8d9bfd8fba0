use tracing_subscriber::EnvFilter;

/// Installs a formatted subscriber filtered by `RUST_LOG`. A second call is
/// a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dronepath=info,warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
