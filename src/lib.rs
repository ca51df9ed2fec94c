pub mod browser;
pub mod clean;
pub mod config;
pub mod error;
pub mod extract;
pub mod navigator;
pub mod paginate;
pub mod query;
pub mod run;
pub mod sink;

/// Row-major text cells as scraped, before any typing.
pub type Grid = Vec<Vec<String>>;

#[cfg(test)]
pub(crate) fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,floorsheet=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
