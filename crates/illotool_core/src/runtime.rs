use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{ToolConfig, load_config};

pub const STATE_DIR_NAME: &str = ".illotool";
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Flag,
    Env,
    Heuristic,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Env => "env",
            Self::Heuristic => "heuristic",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub project_root: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub cwd: PathBuf,
}

impl ResolutionContext {
    pub fn from_process() -> Result<Self> {
        let cwd = env::current_dir().context("failed to read current directory")?;
        Ok(Self { cwd })
    }
}

/// Absolute locations of everything the two pipelines read or write.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub project_root: PathBuf,
    pub config_path: PathBuf,
    pub assets_dir: PathBuf,
    pub mapping_path: PathBuf,
    pub colors_report_path: PathBuf,
    pub colors_per_asset_report_path: PathBuf,
    pub root_source: ValueSource,
    pub config_source: ValueSource,
}

impl ResolvedPaths {
    pub fn diagnostics(&self) -> String {
        format!(
            "project_root={} ({})\nconfig_path={} ({})\nassets_dir={}\nmapping_path={}\ncolors_report={}\ncolors_per_asset_report={}",
            normalize_for_display(&self.project_root),
            self.root_source.as_str(),
            normalize_for_display(&self.config_path),
            self.config_source.as_str(),
            normalize_for_display(&self.assets_dir),
            normalize_for_display(&self.mapping_path),
            normalize_for_display(&self.colors_report_path),
            normalize_for_display(&self.colors_per_asset_report_path),
        )
    }

    /// Render `path` relative to the project root with `/` separators.
    /// Paths outside the root are rendered as-is.
    pub fn display_relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.project_root).unwrap_or(path);
        normalize_for_display(relative)
    }
}

/// Resolved paths plus the configuration they were derived from.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub paths: ResolvedPaths,
    pub config: ToolConfig,
}

pub fn resolve_runtime(context: &ResolutionContext, overrides: &PathOverrides) -> Result<Runtime> {
    resolve_runtime_with_lookup(context, overrides, |key| env::var(key).ok())
}

fn resolve_runtime_with_lookup<F>(
    context: &ResolutionContext,
    overrides: &PathOverrides,
    lookup_env: F,
) -> Result<Runtime>
where
    F: Fn(&str) -> Option<String>,
{
    let (project_root, root_source) = resolve_project_root(context, overrides, &lookup_env);

    let (config_path, config_source) = if let Some(path) = overrides.config.as_deref() {
        (
            absolutize(path, &project_root),
            ValueSource::Flag,
        )
    } else if let Some(value) = non_empty(lookup_env("ILLOTOOL_CONFIG")) {
        (
            absolutize(Path::new(&value), &project_root),
            ValueSource::Env,
        )
    } else {
        (
            project_root.join(STATE_DIR_NAME).join(CONFIG_FILENAME),
            ValueSource::Default,
        )
    };

    let config = load_config(&config_path)?;
    let paths = ResolvedPaths {
        assets_dir: absolutize(Path::new(config.assets_dir()), &project_root),
        mapping_path: absolutize(Path::new(config.mapping_path()), &project_root),
        colors_report_path: absolutize(
            Path::new(config.colors_report()),
            &project_root,
        ),
        colors_per_asset_report_path: absolutize(
            Path::new(config.colors_per_asset_report()),
            &project_root,
        ),
        project_root,
        config_path,
        root_source,
        config_source,
    };

    Ok(Runtime { paths, config })
}

fn resolve_project_root<F>(
    context: &ResolutionContext,
    overrides: &PathOverrides,
    lookup_env: &F,
) -> (PathBuf, ValueSource)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = overrides.project_root.as_deref() {
        return (absolutize(path, &context.cwd), ValueSource::Flag);
    }

    if let Some(value) = non_empty(lookup_env("ILLOTOOL_PROJECT_ROOT")) {
        return (
            absolutize(Path::new(&value), &context.cwd),
            ValueSource::Env,
        );
    }

    match detect_project_root_heuristic(&context.cwd) {
        Some(root) => (root, ValueSource::Heuristic),
        None => (context.cwd.clone(), ValueSource::Default),
    }
}

/// Nearest ancestor of `cwd` (inclusive) that carries a state directory.
fn detect_project_root_heuristic(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|candidate| candidate.join(STATE_DIR_NAME).is_dir())
        .map(Path::to_path_buf)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub fn normalize_for_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use tempfile::tempdir;

    use super::{PathOverrides, ResolutionContext, ValueSource, resolve_runtime_with_lookup};

    #[test]
    fn resolve_prefers_flag_over_env() {
        let temp = tempdir().expect("tempdir");
        let cwd = temp.path().join("cwd");
        let from_flag = temp.path().join("flag-root");
        fs::create_dir_all(&cwd).expect("create cwd");

        let overrides = PathOverrides {
            project_root: Some(from_flag.clone()),
            ..PathOverrides::default()
        };
        let context = ResolutionContext { cwd };
        let env = HashMap::from([(
            "ILLOTOOL_PROJECT_ROOT".to_string(),
            temp.path().join("env-root").to_string_lossy().to_string(),
        )]);

        let runtime = resolve_runtime_with_lookup(&context, &overrides, |key| env.get(key).cloned())
            .expect("resolve");
        assert_eq!(runtime.paths.project_root, from_flag);
        assert_eq!(runtime.paths.root_source, ValueSource::Flag);
        assert_eq!(
            runtime.paths.assets_dir,
            from_flag.join("illustrations")
        );
        assert_eq!(
            runtime.paths.mapping_path,
            from_flag.join("lib").join("illustrations.g.dart")
        );
    }

    #[test]
    fn resolve_uses_env_root_when_no_flag() {
        let temp = tempdir().expect("tempdir");
        let env_root = temp.path().join("env-root");
        let context = ResolutionContext {
            cwd: temp.path().to_path_buf(),
        };
        let env = HashMap::from([(
            "ILLOTOOL_PROJECT_ROOT".to_string(),
            env_root.to_string_lossy().to_string(),
        )]);

        let runtime =
            resolve_runtime_with_lookup(&context, &PathOverrides::default(), |key| {
                env.get(key).cloned()
            })
            .expect("resolve");
        assert_eq!(runtime.paths.project_root, env_root);
        assert_eq!(runtime.paths.root_source, ValueSource::Env);
        assert_eq!(runtime.paths.config_source, ValueSource::Default);
    }

    #[test]
    fn resolve_finds_state_dir_in_ancestors() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("project");
        let nested = root.join("lib").join("src");
        fs::create_dir_all(root.join(".illotool")).expect("state dir");
        fs::create_dir_all(&nested).expect("nested dir");

        let context = ResolutionContext { cwd: nested };
        let runtime = resolve_runtime_with_lookup(&context, &PathOverrides::default(), |_| None)
            .expect("resolve");
        assert_eq!(runtime.paths.project_root, root);
        assert_eq!(runtime.paths.root_source, ValueSource::Heuristic);
        assert_eq!(
            runtime.paths.config_path,
            root.join(".illotool").join("config.toml")
        );
    }

    #[test]
    fn resolve_falls_back_to_cwd_without_state_dir() {
        let temp = tempdir().expect("tempdir");
        let cwd = temp.path().join("plain");
        fs::create_dir_all(&cwd).expect("cwd");

        let context = ResolutionContext { cwd: cwd.clone() };
        let runtime = resolve_runtime_with_lookup(&context, &PathOverrides::default(), |_| None)
            .expect("resolve");
        assert_eq!(runtime.paths.project_root, cwd);
        assert_eq!(runtime.paths.root_source, ValueSource::Default);
    }

    #[test]
    fn resolve_applies_configured_paths() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("project");
        fs::create_dir_all(root.join(".illotool")).expect("state dir");
        fs::write(
            root.join(".illotool").join("config.toml"),
            "[paths]\nassets_dir = \"svg\"\ncolors_report = \"reports/colors.json\"\n",
        )
        .expect("write config");

        let context = ResolutionContext { cwd: root.clone() };
        let runtime = resolve_runtime_with_lookup(&context, &PathOverrides::default(), |_| None)
            .expect("resolve");
        assert_eq!(runtime.paths.assets_dir, root.join("svg"));
        assert_eq!(
            runtime.paths.colors_report_path,
            root.join("reports").join("colors.json")
        );
        assert_eq!(
            runtime.paths.colors_per_asset_report_path,
            root.join("colors_illustration.json")
        );
        assert_eq!(
            runtime.paths.display_relative(&runtime.paths.assets_dir.join("a.svg")),
            "svg/a.svg"
        );
    }

    #[test]
    fn resolve_reads_config_override_from_env() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("project");
        fs::create_dir_all(&root).expect("root");
        fs::write(root.join("alt.toml"), "[paths]\nmapping_path = \"gen/out.dart\"\n")
            .expect("write config");

        let context = ResolutionContext { cwd: root.clone() };
        let env = HashMap::from([("ILLOTOOL_CONFIG".to_string(), "alt.toml".to_string())]);
        let runtime =
            resolve_runtime_with_lookup(&context, &PathOverrides::default(), |key| {
                env.get(key).cloned()
            })
            .expect("resolve");
        assert_eq!(runtime.paths.config_source, ValueSource::Env);
        assert_eq!(runtime.paths.mapping_path, root.join("gen").join("out.dart"));
    }
}
