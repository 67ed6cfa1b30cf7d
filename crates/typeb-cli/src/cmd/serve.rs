use std::path::Path;
use typeb_core::paths;

pub fn run(root: &Path, port: u16) -> anyhow::Result<()> {
    paths::ensure_initialized(root)?;

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        tokio::select! {
            res = typeb_server::serve(root_buf, port) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
