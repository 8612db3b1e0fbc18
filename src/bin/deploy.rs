use khazaana::deploy::{default_pipeline, run_pipeline};
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    khazaana::init_tracing();

    let root = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::error!(error = %e, "cannot determine working directory");
            std::process::exit(1);
        }
    };

    let steps = default_pipeline(&root, &server_binary());
    if let Err(e) = run_pipeline(&steps).await {
        tracing::error!(error = %e, "deployment failed");
        std::process::exit(1);
    }
}

/// The server binary is built next to this one.
fn server_binary() -> PathBuf {
    let name = format!("khazaana{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .unwrap_or_else(|| PathBuf::from(name))
}
