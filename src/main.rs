use anyhow::Context;
use enginetune::config::AppConfig;
use enginetune::ga::GaManager;
use enginetune::rating::ShogiServer;
use enginetune::workshop::CsaWorkshop;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

const LOG_FILE: &str = "ga.log";
const CONFIG_FILE: &str = "enginetune.toml";

/// Duplicates every log record to stdout and the append-only run log.
struct TeeWriter {
    file: std::fs::File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stdout().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()?;
        self.file.flush()
    }
}

fn init_logging() -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(LOG_FILE)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(TeeWriter { file })))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging().context("failed to open run log")?;

    let config = if Path::new(CONFIG_FILE).exists() {
        AppConfig::load_from_file(CONFIG_FILE)
            .with_context(|| format!("failed to load {}", CONFIG_FILE))?
    } else {
        AppConfig::default()
    };
    config.validate().context("invalid configuration")?;

    let workshop = Arc::new(CsaWorkshop::new(
        config.engine.clone(),
        config.evolution.params.clone(),
    ));
    let rating = Box::new(ShogiServer::new(config.engine.clone()));

    let mut manager = GaManager::new(config.evolution, workshop, rating)?;
    manager.run()?;
    Ok(())
}
