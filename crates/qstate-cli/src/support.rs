use qstate_kernel::{EvalPolicy, FundamentalState, InspectOptions, Querier, State, StateError};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

pub const EXIT_TRUE: i32 = 0;
pub const EXIT_FALSE: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Contents of the optional `--config` TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub inspect: InspectOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json: bool,
}

pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(EXIT_ERROR);
}

pub fn load_config_or_exit(path: Option<&str>) -> CliConfig {
    let Some(path) = path else {
        return CliConfig::default();
    };
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("failed to read config {path}: {e}")));
    let config: CliConfig =
        toml::from_str(&text).unwrap_or_else(|e| fail(format!("failed to parse config {path}: {e}")));
    tracing::debug!(path, ?config, "loaded config");
    config
}

pub fn parse_policy_or_exit(policy: &str) -> EvalPolicy {
    policy.parse::<EvalPolicy>().unwrap_or_else(|e: String| fail(e))
}

pub fn parse_probes_or_exit(specs: &[String]) -> Vec<ProbeSpec> {
    specs
        .iter()
        .map(|spec| spec.parse::<ProbeSpec>().unwrap_or_else(|e: String| fail(e)))
        .collect()
}

/// What a single probe observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeKind {
    /// Environment variable set and non-empty.
    Env(String),
    /// Regular file exists.
    File(PathBuf),
    /// Directory exists.
    Dir(PathBuf),
    /// Regular file with at least one byte.
    NonEmpty(PathBuf),
}

/// One `--probe` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSpec {
    pub kind: ProbeKind,
    pub negated: bool,
}

impl FromStr for ProbeSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negated, body) = match s.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (scheme, target) = body
            .split_once(':')
            .ok_or_else(|| format!("probe must look like <kind>:<target>: {s}"))?;
        if target.is_empty() {
            return Err(format!("probe has an empty target: {s}"));
        }
        let kind = match scheme {
            "env" => ProbeKind::Env(target.to_string()),
            "file" => ProbeKind::File(PathBuf::from(target)),
            "dir" => ProbeKind::Dir(PathBuf::from(target)),
            "nonempty" => ProbeKind::NonEmpty(PathBuf::from(target)),
            _ => return Err(format!("unknown probe kind '{scheme}' in {s}")),
        };
        Ok(Self { kind, negated })
    }
}

type MetadataQuerier = Arc<Querier<Option<fs::Metadata>>>;
type EnvQuerier = Arc<Querier<Option<String>>>;

/// Builds probe states, reusing one querier per observed path or
/// variable so a single inspection reads each source once.
#[derive(Default)]
pub struct ProbeRegistry {
    metadata: HashMap<PathBuf, MetadataQuerier>,
    env: HashMap<String, EnvQuerier>,
}

impl ProbeRegistry {
    pub fn state(&mut self, spec: &ProbeSpec) -> State {
        let leaf = self.leaf(&spec.kind);
        if spec.negated {
            State::negation(leaf)
        } else {
            State::from(leaf)
        }
    }

    fn leaf(&mut self, kind: &ProbeKind) -> FundamentalState {
        match kind {
            ProbeKind::Env(var) => {
                let q = self.env_querier(var);
                FundamentalState::truthy(format!("env {var} set"), q)
            }
            ProbeKind::File(path) => {
                let q = self.metadata_querier(path);
                FundamentalState::new(format!("file {} exists", path.display()), q, |m| {
                    m.as_ref().is_some_and(fs::Metadata::is_file)
                })
            }
            ProbeKind::Dir(path) => {
                let q = self.metadata_querier(path);
                FundamentalState::new(format!("dir {} exists", path.display()), q, |m| {
                    m.as_ref().is_some_and(fs::Metadata::is_dir)
                })
            }
            ProbeKind::NonEmpty(path) => {
                let q = self.metadata_querier(path);
                FundamentalState::new(format!("file {} non-empty", path.display()), q, |m| {
                    m.as_ref().is_some_and(|m| m.is_file() && m.len() > 0)
                })
            }
        }
    }

    fn metadata_querier(&mut self, path: &Path) -> MetadataQuerier {
        let q = self.metadata.entry(path.to_path_buf()).or_insert_with(|| {
            let target = path.to_path_buf();
            Querier::new(format!("metadata {}", path.display()), move || {
                match fs::metadata(&target) {
                    Ok(meta) => Ok(Some(meta)),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .shared()
        });
        Arc::clone(q)
    }

    fn env_querier(&mut self, var: &str) -> EnvQuerier {
        let q = self.env.entry(var.to_string()).or_insert_with(|| {
            let name = var.to_string();
            Querier::infallible(format!("env {var}"), move || std::env::var(&name).ok()).shared()
        });
        Arc::clone(q)
    }
}

/// Combine probe states into the root state to inspect.
pub fn build_root(
    specs: &[ProbeSpec],
    any: bool,
    negate: bool,
    name: Option<&str>,
) -> Result<State, StateError> {
    let mut registry = ProbeRegistry::default();
    let mut leaves: Vec<State> = specs.iter().map(|spec| registry.state(spec)).collect();

    let combined = if leaves.len() == 1 {
        leaves.remove(0)
    } else if any {
        State::disjunction(leaves)?
    } else {
        State::conjunction(leaves)?
    };
    let root = if negate {
        State::negation(combined)
    } else {
        combined
    };
    Ok(match name {
        Some(name) => root.with_name(name),
        None => root,
    })
}

pub fn build_root_or_exit(
    specs: &[ProbeSpec],
    any: bool,
    negate: bool,
    name: Option<&str>,
) -> State {
    build_root(specs, any, negate, name).unwrap_or_else(|e| fail(e))
}
