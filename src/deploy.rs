use std::path::{Path, PathBuf};
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("{step}: failed to start: {source}")]
    Spawn {
        step: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{step}: exited with status {code:?}")]
    Failed { step: String, code: Option<i32> },
}

#[derive(Debug, Clone)]
pub struct Step {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Step {
    pub fn new(name: impl Into<String>, program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Runs one step to completion with inherited stdio.
pub async fn run_step(step: &Step) -> Result<(), DeployError> {
    tracing::info!(step = %step.name, program = %step.program, args = ?step.args, cwd = %step.cwd.display(), "running");

    let status = Command::new(&step.program)
        .args(&step.args)
        .current_dir(&step.cwd)
        .status()
        .await
        .map_err(|source| DeployError::Spawn {
            step: step.name.clone(),
            source,
        })?;

    if !status.success() {
        return Err(DeployError::Failed {
            step: step.name.clone(),
            code: status.code(),
        });
    }

    tracing::info!(step = %step.name, "done");
    Ok(())
}

/// Runs steps in order and stops at the first failure.
pub async fn run_pipeline(steps: &[Step]) -> Result<(), DeployError> {
    for step in steps {
        run_step(step).await?;
    }
    Ok(())
}

/// Frontend build followed by the server itself, which then serves the built assets.
pub fn default_pipeline(root: &Path, server_bin: &Path) -> Vec<Step> {
    vec![
        Step::new("build frontend", "npm", root.join("frontend")).args(["run", "build"]),
        Step::new("start server", server_bin.to_string_lossy(), root),
    ]
}
