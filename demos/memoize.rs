//! Weak cache walkthrough
//!
//! Run with `cargo run --example memoize`. Configuration comes from the
//! `WEAK_CACHE_*` environment variables, logging from `RUST_LOG`.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weak_cache::{spawn_purge_task, CacheStore, Config, SharedCache};

/// Stand-in for an expensive load, e.g. decoding an image from disk.
fn load_image(name: &&str) -> Vec<u8> {
    info!("Decoding {}", name);
    name.bytes().cycle().take(1024).collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weak_cache=debug,memoize=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate()?;
    info!(
        "Configuration loaded: retain_capacity={}, value_ttl={:?}, purge_interval={}s",
        config.retain_capacity, config.value_ttl, config.purge_interval
    );

    // Single-owner store: the hit path ignores the second compute function.
    let mut store = CacheStore::from_config(&config);
    let pi = store.get_or_insert_with("pi", |_| 3.5_f64);
    let again = store.get_or_insert_with("pi", |_| 0.0);
    info!("pi = {}, again = {}, same value: {}", pi, again, Arc::ptr_eq(&pi, &again));

    // The image cache only keeps images alive while somebody uses them.
    let mut images = CacheStore::from_config(&config);
    let logo = images.get_or_insert_with("logo.png", load_image);
    let _ = images.get_or_insert_with("logo.png", load_image);
    drop(logo);
    let _ = images.get_or_insert_with("logo.png", load_image);
    info!("Image cache stats: {:?}", images.stats());

    // Shared cache with a purge task, used from async code.
    let shared: SharedCache<String, String> = SharedCache::from_config(&config);
    let purge = spawn_purge_task(shared.clone(), config.purge_interval)?;

    let greeting = shared
        .get_or_compute_async("greeting".to_string(), |key| async move {
            anyhow::Ok(format!("hello from {key}"))
        })
        .await?;
    info!("{}", greeting);

    match shared
        .get_or_compute_async("broken".to_string(), |_| async {
            Err(anyhow::anyhow!("backend unavailable"))
        })
        .await
    {
        Ok(value) => info!("unexpected value {}", value),
        Err(err) => warn!("{}", err),
    }

    purge.abort();
    info!("Shared cache stats: {:?}", shared.stats());
    Ok(())
}
