use super::{RateTable, RatingSource};
use crate::config::EngineConfig;
use crate::error::{Result, TunerError};
use std::path::PathBuf;
use std::process::{Child, Command};

/// Rating source backed by a local shogi-server instance. Games are played
/// by the individuals connecting as CSA clients; ratings are computed from
/// the accumulated kifu records via the server's own `mk_rate` tooling.
pub struct ShogiServer {
    config: EngineConfig,
    process: Option<Child>,
}

impl ShogiServer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            process: None,
        }
    }

    fn dir(&self) -> PathBuf {
        self.config.work_dir.join("shogi-server")
    }

    /// Kifu directories are named by date, digits only.
    fn kifu_dirs(&self) -> std::io::Result<Vec<String>> {
        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(self.dir())? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir()
                && !name.is_empty()
                && name.bytes().all(|b| b.is_ascii_digit())
            {
                dirs.push(name);
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}

impl RatingSource for ShogiServer {
    fn setup(&mut self) -> Result<()> {
        let status = Command::new("git")
            .args(["clone", "--depth", "1", "--branch", "master"])
            .arg(&self.config.server_repo)
            .arg(self.dir())
            .status()
            .map_err(|e| TunerError::Rating(format!("failed to run git: {}", e)))?;
        if !status.success() {
            return Err(TunerError::Rating(format!(
                "failed to clone shogi-server: {}",
                status
            )));
        }

        let child = Command::new("ruby")
            .args(["shogi-server", "test"])
            .arg(self.config.server_port.to_string())
            .current_dir(self.dir())
            .spawn()
            .map_err(|e| TunerError::Rating(format!("failed to start shogi-server: {}", e)))?;
        self.process = Some(child);
        Ok(())
    }

    fn query(&mut self) -> Result<RateTable> {
        let dir = self.dir();
        let mut pipeline = vec![dir.join("mk_game_results").to_string_lossy().into_owned()];
        pipeline.extend(self.kifu_dirs()?);
        pipeline.push("|".to_string());
        pipeline.extend(["grep", "-v", "abnormal", "|"].map(String::from));
        pipeline.push(dir.join("mk_rate").to_string_lossy().into_owned());

        let output = Command::new("sh")
            .args(["-c", &pipeline.join(" ")])
            .current_dir(&dir)
            .output()
            .map_err(|e| TunerError::Rating(format!("failed to run mk_rate: {}", e)))?;
        if !output.status.success() {
            return Err(TunerError::Rating(format!(
                "mk_rate exited with {}",
                output.status
            )));
        }

        RateTable::parse(&String::from_utf8_lossy(&output.stdout))
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.process.take() {
            if let Err(e) = child.kill() {
                log::warn!("failed to kill shogi-server: {}", e);
            } else if let Err(e) = child.wait() {
                log::warn!("failed to wait for shogi-server: {}", e);
            }
        }
    }
}
