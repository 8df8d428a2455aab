#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging for development
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Background requests are spawned on this runtime
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    sitemap_studio::run_app()?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
