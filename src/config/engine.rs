use crate::error::TunerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build, spawn and rating-server settings shared by every individual.
///
/// `work_dir` is the root under which each individual gets its own checkout;
/// the rating server lives in a sibling directory under the same root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub work_dir: PathBuf,

    pub engine_repo: String,
    pub engine_branch: String,
    /// File inside the checkout that is rewritten with one `#define` per gene.
    pub param_header: String,
    pub make_target: String,
    /// Path of the built binary, relative to the checkout.
    pub engine_binary: String,
    /// Read-only files symlinked from `work_dir` into each checkout.
    pub shared_assets: Vec<String>,

    pub server_repo: String,
    pub server_host: String,
    pub server_port: u16,
    pub server_password: String,

    pub search_depth: u32,
    pub search_limit_secs: u32,
    pub hash_mem_mb: u32,
    pub kifu_dir: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            engine_repo: "https://github.com/sunfish-shogi/sunfish4.git".to_string(),
            engine_branch: "master".to_string(),
            param_header: "src/search/Param.hpp".to_string(),
            make_target: "csa".to_string(),
            engine_binary: "sunfish_csa".to_string(),
            shared_assets: vec!["eval.bin".to_string(), "book.bin".to_string()],
            server_repo: "git://git.pf.osdn.jp/gitroot/s/su/sunfish-shogi/shogi-server.git"
                .to_string(),
            server_host: "localhost".to_string(),
            server_port: 4081,
            server_password: "test-600-10,SunTest".to_string(),
            search_depth: 48,
            search_limit_secs: 1,
            hash_mem_mb: 128,
            kifu_dir: "out/csa_kifu".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), TunerError> {
        if self.engine_repo.is_empty() || self.server_repo.is_empty() {
            return Err(TunerError::Configuration(
                "engine_repo and server_repo must be set".to_string(),
            ));
        }
        if self.engine_binary.is_empty() {
            return Err(TunerError::Configuration(
                "engine_binary must be set".to_string(),
            ));
        }
        if self.server_port == 0 {
            return Err(TunerError::Configuration(
                "server_port must be set".to_string(),
            ));
        }
        Ok(())
    }
}
