use std::path::Path;
use std::process::Command;

use clipjoin_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env()?;

    println!(
        "clipjoin-selfcheck: starting with source_root={} output_root={}",
        config.source_root.display(),
        config.output_root.display()
    );
    ensure_ffmpeg(&config.ffmpeg_program)?;
    ensure_source_root(&config.source_root).await?;
    ensure_output_root(&config.output_root).await?;

    println!("clipjoin-selfcheck: ok");
    Ok(())
}

fn ensure_ffmpeg(program: &str) -> anyhow::Result<()> {
    let output = Command::new(program)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("{} not available: {}", program, e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "{} -version failed: {:?}",
            program,
            output.status
        ));
    }
    Ok(())
}

async fn ensure_source_root(path: &Path) -> anyhow::Result<()> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| anyhow::anyhow!("source root {} unreadable: {}", path.display(), e))?;

    if !metadata.is_dir() {
        return Err(anyhow::anyhow!(
            "source root {} is not a directory",
            path.display()
        ));
    }
    Ok(())
}

async fn ensure_output_root(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}
