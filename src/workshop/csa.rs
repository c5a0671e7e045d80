use super::{WorkerHandle, Workshop};
use crate::config::{EngineConfig, Param};
use crate::error::{Result, TunerError};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Production build surface: checks the engine out of git, stamps the gene
/// values into its parameter header, compiles the CSA client and launches it
/// against the rating server.
pub struct CsaWorkshop {
    config: EngineConfig,
    params: Vec<Param>,
}

impl CsaWorkshop {
    pub fn new(config: EngineConfig, params: Vec<Param>) -> Self {
        Self { config, params }
    }

    fn dir(&self, id: &str) -> PathBuf {
        self.config.work_dir.join(id)
    }

    fn write_param_header(&self, id: &str, values: &[i32]) -> std::io::Result<()> {
        let mut contents = String::new();
        for (param, value) in self.params.iter().zip(values) {
            let _ = writeln!(contents, "#define {} {}", param.name, value);
        }
        fs::write(self.dir(id).join(&self.config.param_header), contents)
    }

    fn write_csa_ini(&self, id: &str) -> std::io::Result<()> {
        let config = &self.config;
        let mut ini = String::new();
        let _ = writeln!(ini, "[Server]");
        let _ = writeln!(ini, "Host      = {}", config.server_host);
        let _ = writeln!(ini, "Port      = {}", config.server_port);
        let _ = writeln!(ini, "Pass      = {}", config.server_password);
        let _ = writeln!(ini, "Floodgate = 1");
        let _ = writeln!(ini, "User      = {}", id);
        let _ = writeln!(ini);
        let _ = writeln!(ini, "[Search]");
        let _ = writeln!(ini, "Depth    = {}", config.search_depth);
        let _ = writeln!(ini, "Limit    = {}", config.search_limit_secs);
        let _ = writeln!(ini, "Repeat   = 1000000");
        let _ = writeln!(ini, "Worker   = 1");
        let _ = writeln!(ini, "Ponder   = 0");
        let _ = writeln!(ini, "UseBook  = 1");
        let _ = writeln!(ini, "HashMem  = {}", config.hash_mem_mb);
        let _ = writeln!(ini, "MarginMs = 500");
        let _ = writeln!(ini);
        let _ = writeln!(ini, "[KeepAlive]");
        let _ = writeln!(ini, "KeepAlive = 1");
        let _ = writeln!(ini, "KeepIdle  = 10");
        let _ = writeln!(ini, "KeepIntvl = 5");
        let _ = writeln!(ini, "KeepCnt   = 10");
        let _ = writeln!(ini);
        let _ = writeln!(ini, "[File]");
        let _ = writeln!(ini, "KifuDir   = {}", config.kifu_dir);
        fs::write(self.dir(id).join("config/csa.ini"), ini)
    }

    fn link_shared_assets(&self, id: &str) -> std::result::Result<(), String> {
        for asset in &self.config.shared_assets {
            let source = self.config.work_dir.join(asset);
            if let Err(e) = fs::metadata(&source) {
                return Err(format!("missing shared asset {}: {}", asset, e));
            }
            std::os::unix::fs::symlink(&source, self.dir(id).join(asset))
                .map_err(|e| format!("failed to link {}: {}", asset, e))?;
        }
        Ok(())
    }
}

/// Run a command to completion; a nonzero exit is an error.
fn run(mut cmd: Command, context: &str) -> std::result::Result<(), String> {
    match cmd.status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(format!("{} exited with {}", context, status)),
        Err(e) => Err(format!("{}: {}", context, e)),
    }
}

impl Workshop for CsaWorkshop {
    fn setup(&self, id: &str, values: &[i32]) -> Result<()> {
        let fail = |reason: String| TunerError::Setup {
            id: id.to_string(),
            reason,
        };

        let mut clone = Command::new("git");
        clone
            .args(["clone", "--depth", "1", "--branch", &self.config.engine_branch])
            .arg(&self.config.engine_repo)
            .arg(self.dir(id));
        run(clone, "git clone").map_err(fail)?;

        self.write_param_header(id, values)
            .map_err(|e| fail(format!("failed to write parameter header: {}", e)))?;

        let mut make = Command::new("make");
        make.arg(&self.config.make_target).current_dir(self.dir(id));
        run(make, &format!("make {}", self.config.make_target)).map_err(fail)?;

        self.link_shared_assets(id).map_err(fail)?;

        self.write_csa_ini(id)
            .map_err(|e| fail(format!("failed to write csa.ini: {}", e)))?;

        Ok(())
    }

    fn spawn(&self, id: &str) -> Result<Box<dyn WorkerHandle>> {
        let dir = self.dir(id);
        let child = Command::new(dir.join(&self.config.engine_binary))
            .arg("-s")
            .current_dir(&dir)
            .spawn()
            .map_err(|e| TunerError::Start {
                id: id.to_string(),
                reason: format!("failed to spawn {}: {}", self.config.engine_binary, e),
            })?;
        Ok(Box::new(child))
    }

    fn clean(&self, id: &str) {
        if let Err(e) = fs::remove_dir_all(self.dir(id)) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("failed to remove working area for {}: {}", id, e);
            }
        }
    }
}
