//! A tool for executing commands.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};

/// Represents a command executor.
///
/// The child process is spawned with `kill_on_drop`, so dropping the execution
/// future (or returning early on an interrupt or a timeout) never leaves a
/// running `yt-dlp` behind.
///
/// # Example
///
/// ```rust,no_run
/// # use std::path::PathBuf;
/// # use ytdlp_engine::executor::Executor;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = Executor {
///     executable_path: PathBuf::from("yt-dlp"),
///     timeout: None,
///     args: vec![String::from("--version")],
/// };
///
/// let output = executor.execute().await?;
/// println!("Output: {}", output.stdout);
///
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Executor {
    /// The path to the command executable.
    pub executable_path: PathBuf,
    /// The timeout for the process, if any.
    pub timeout: Option<Duration>,

    /// The arguments to pass to the command.
    pub args: Vec<String>,
}

/// Represents the output of a process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    /// The stdout of the process.
    pub stdout: String,
    /// The stderr of the process.
    pub stderr: String,
    /// The exit code of the process.
    pub code: i32,
}

impl ProcessOutput {
    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Converts a non-zero exit into [`Error::Command`], keeping stderr as the message.
    pub fn into_result(self) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }

        Err(Error::Command(format!(
            "Process failed with code {}: {}",
            self.code,
            self.stderr.trim()
        )))
    }
}

enum Stop {
    Exited(ExitStatus),
    Interrupted,
    TimedOut(Duration),
}

impl Executor {
    /// Executes the command and returns the output.
    ///
    /// # Errors
    ///
    /// This function will return an error if the command could not be executed, if it
    /// exited with a non-zero code, if the user interrupted it, or if the process timed out.
    pub async fn execute(&self) -> Result<ProcessOutput> {
        self.execute_streaming(|_| {}).await?.into_result()
    }

    /// Executes the command, handing every stdout line to `on_line` as soon as it is
    /// printed. The output is returned whatever the exit code is; use
    /// [`ProcessOutput::into_result`] to treat a non-zero exit as an error.
    ///
    /// # Arguments
    ///
    /// * `on_line` - Called once per stdout line, without the trailing newline. Bytes
    ///   that are not valid UTF-8 are replaced rather than treated as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the executable does not exist, [`Error::Cancelled`]
    /// if an interrupt signal arrives while the process runs, and [`Error::Timeout`] if
    /// the configured timeout elapses. In the last two cases the child is killed first.
    pub async fn execute_streaming<F>(&self, mut on_line: F) -> Result<ProcessOutput>
    where
        F: FnMut(&str),
    {
        #[cfg(feature = "tracing")]
        tracing::debug!("Executing command: {:?}", self);

        let mut command = tokio::process::Command::new(&self.executable_path);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        #[cfg(target_os = "windows")]
        {
            command.creation_flags(0x08000000);
        }

        command.args(&self.args);
        let mut child = command.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::NotFound(self.executable_path.display().to_string())
            }
            _ => Error::IO(e),
        })?;

        let stdout_handle = child
            .stdout
            .take()
            .ok_or_else(|| Error::Command("Failed to capture stdout".to_string()))?;
        let stderr_handle = child
            .stderr
            .take()
            .ok_or_else(|| Error::Command("Failed to capture stderr".to_string()))?;

        // stderr is drained on its own task so a chatty process cannot block on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            BufReader::new(stderr_handle)
                .read_to_end(&mut buffer)
                .await?;
            Ok::<Vec<u8>, std::io::Error>(buffer)
        });

        let mut stdout_lines = Vec::new();
        let stop = {
            let run = async {
                // yt-dlp prints in the console encoding, which is not always UTF-8
                let mut reader = BufReader::new(stdout_handle);
                let mut buffer = Vec::new();
                while reader.read_until(b'\n', &mut buffer).await? > 0 {
                    let line = String::from_utf8_lossy(&buffer)
                        .trim_end_matches(['\n', '\r'])
                        .to_string();
                    on_line(&line);
                    stdout_lines.push(line);
                    buffer.clear();
                }
                Ok::<ExitStatus, Error>(child.wait().await?)
            };

            tokio::select! {
                status = run => Stop::Exited(status?),
                Ok(()) = tokio::signal::ctrl_c() => Stop::Interrupted,
                _ = deadline(self.timeout) => Stop::TimedOut(self.timeout.unwrap_or_default()),
            }
        };

        let exit_status = match stop {
            Stop::Exited(status) => status,
            Stop::Interrupted => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Interrupted, killing {:?}", self.executable_path);

                terminate(&mut child).await;
                return Err(Error::Cancelled);
            }
            Stop::TimedOut(timeout) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Process timed out after {:?}, killing it", timeout);

                terminate(&mut child).await;
                return Err(Error::Timeout(timeout));
            }
        };

        let stderr = match stderr_task.await {
            Ok(Ok(buffer)) => buffer,
            Ok(Err(e)) => return Err(Error::IO(e)),
            Err(e) => return Err(Error::Runtime(e)),
        };

        Ok(ProcessOutput {
            stdout: stdout_lines.join("\n"),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            code: exit_status.code().unwrap_or(-1),
        })
    }
}

async fn deadline(timeout: Option<Duration>) {
    match timeout {
        Some(timeout) => tokio::time::sleep(timeout).await,
        None => std::future::pending::<()>().await,
    }
}

async fn terminate(child: &mut tokio::process::Child) {
    if let Err(_e) = child.kill().await {
        #[cfg(feature = "tracing")]
        tracing::error!("Failed to kill process: {}", _e);
    }
}
