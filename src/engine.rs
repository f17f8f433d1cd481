use std::env;
use std::error::Error;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use tokio::process::Command;

pub struct ServeOpts {
    pub port: u16,
    pub host: String,
}

pub enum EngineTask {
    Generate,
    Serve(Option<ServeOpts>),
}

impl EngineTask {
    pub fn name(&self) -> &'static str {
        match self {
            EngineTask::Generate => "generate",
            EngineTask::Serve(_) => "serve",
        }
    }

    pub fn args(&self) -> Vec<String> {
        match self {
            EngineTask::Generate => vec!["build".to_string()],
            EngineTask::Serve(None) => vec!["serve".to_string()],
            EngineTask::Serve(Some(opts)) => vec![
                "serve".to_string(),
                "--port".to_string(),
                opts.port.to_string(),
                "--interface".to_string(),
                opts.host.clone(),
            ],
        }
    }
}

/// The external site engine, driven as a child process rooted at the
/// project directory. The engine's own stdio is inherited so its logging
/// reaches the operator directly.
pub struct CommandEngine {
    program: PathBuf,
    root: PathBuf,
}

impl CommandEngine {
    pub fn new(program: PathBuf, root: PathBuf) -> Self {
        CommandEngine { program, root }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub async fn init(&self) -> Result<String, Box<dyn Error>> {
        let output = Command::new(&self.program)
            .arg("--version")
            .current_dir(&self.root)
            .output()
            .await
            .map_err(|e| format!("Failed to run {}: {}", self.program.display(), e))?;
        if !output.status.success() {
            return Err(format!(
                "{} exited with {} during startup",
                self.program.display(),
                output.status
            )
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub async fn call(&self, task: EngineTask) -> Result<(), Box<dyn Error>> {
        let status = Command::new(&self.program)
            .args(task.args())
            .current_dir(&self.root)
            .status()
            .await
            .map_err(|e| format!("Failed to run {}: {}", self.program.display(), e))?;
        if !status.success() {
            return Err(format!("Engine task `{}` failed with {}", task.name(), status).into());
        }
        Ok(())
    }
}

/// The one-time available/unavailable decision: locating the binary is the
/// only way constructing the engine can fail, and a miss sends the whole
/// launch down the fallback path.
pub fn load(root: &Path, engine: &str) -> Result<CommandEngine, Box<dyn Error>> {
    let program = locate(engine)
        .ok_or_else(|| format!("Engine `{}` was not found on this system", engine))?;
    Ok(CommandEngine::new(program, root.to_path_buf()))
}

fn locate(engine: &str) -> Option<PathBuf> {
    if engine.contains(MAIN_SEPARATOR) {
        let path = PathBuf::from(engine);
        return if is_executable(&path) { Some(path) } else { None };
    }
    let path_var = env::var_os("PATH")?;
    locate_in(engine, env::split_paths(&path_var))
}

fn locate_in<I>(engine: &str, dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    dirs.into_iter()
        .map(|dir| dir.join(engine))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
