#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tubefetch::{Orchestrator, Settings};
use ytdlp_engine::error::{Error, Result};
use ytdlp_engine::model::progress::{Progress, ProgressStatus};
use ytdlp_engine::{Engine, EngineConfig, Invocation, ProgressHook};

/// What the scripted engine does on one invocation.
pub enum Reply {
    /// Writes the named files into the output directory and succeeds.
    Write(Vec<&'static str>),
    Fail(&'static str),
    Cancel,
}

/// An engine that replays canned replies and records every invocation.
pub struct ScriptedEngine {
    dir: PathBuf,
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(String, EngineConfig)>>,
}

impl ScriptedEngine {
    pub fn new(dir: &Path, replies: Vec<Reply>) -> Self {
        Self {
            dir: dir.to_path_buf(),
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, EngineConfig)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Engine for ScriptedEngine {
    async fn invoke(
        &self,
        url: &str,
        config: &EngineConfig,
        progress: &ProgressHook<'_>,
    ) -> Result<Invocation> {
        config.validate()?;
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), config.clone()));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Write(Vec::new()));

        match reply {
            Reply::Write(names) => {
                let mut files = Vec::new();
                for name in names {
                    let path = self.dir.join(name);
                    std::fs::write(&path, name).map_err(Error::IO)?;
                    if !name.ends_with(".srt") {
                        files.push(path);
                    }
                }

                progress(&Progress::new(ProgressStatus::Downloading));
                progress(&Progress::new(ProgressStatus::Finished));
                Ok(Invocation {
                    files,
                    partial_failure: None,
                })
            }
            Reply::Fail(message) => Err(Error::Command(message.to_string())),
            Reply::Cancel => Err(Error::Cancelled),
        }
    }
}

pub fn orchestrator(dir: &Path, replies: Vec<Reply>) -> Orchestrator<ScriptedEngine> {
    Orchestrator::new(
        ScriptedEngine::new(dir, replies),
        Settings::new(dir, true),
    )
}

pub fn no_progress(_: &Progress) {}
