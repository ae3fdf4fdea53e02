// ABOUTME: Test support utilities.
// ABOUTME: Recording executors, scripted probes, descriptor fixtures and a dispatcher builder.

#![allow(dead_code)]

use async_trait::async_trait;
use deployctl::backend::{
    BackendError, BackendExecutor, BackendKind, BackendRegistry, ExecutionRequest,
};
use deployctl::deploy::Dispatcher;
use deployctl::health::{Probe, ProbeError};
use deployctl::history::{DeploymentRecord, FileHistoryStore, HistoryError, HistoryStore};
use deployctl::types::{AppName, EnvName};
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("deployctl=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// One observed backend invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub app: String,
    pub env: String,
    pub version: String,
    pub options: BTreeMap<String, String>,
}

/// Executor that records every call and succeeds or fails on demand.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<Call>>,
    fail: bool,
}

impl RecordingExecutor {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::default(),
            fail: true,
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendExecutor for RecordingExecutor {
    async fn execute(&self, request: &ExecutionRequest<'_>) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(Call {
            app: request.app.to_string(),
            env: request.env.to_string(),
            version: request.version.to_string(),
            options: request.options.clone(),
        });

        if self.fail {
            Err(BackendError::Exited {
                program: "recording".to_string(),
                exit_code: Some(1),
                stderr: "scripted failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Scripted probe response.
#[derive(Debug, Clone, Copy)]
pub enum Response {
    Status(u16),
    Refused,
    /// Never completes; only the verifier's timeout ends the attempt.
    Hang,
}

/// Probe that replays a script, then repeats `fallback` forever.
#[derive(Debug)]
pub struct ScriptedProbe {
    script: Mutex<VecDeque<Response>>,
    fallback: Response,
    attempts: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new(script: impl IntoIterator<Item = Response>, fallback: Response) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn always(response: Response) -> Arc<Self> {
        Self::new([], response)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn get(&self, endpoint: &str) -> Result<u16, ProbeError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);

        match next {
            Response::Status(status) => Ok(status),
            Response::Refused => Err(ProbeError::Connect {
                endpoint: endpoint.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            }),
            Response::Hang => std::future::pending().await,
        }
    }
}

/// History store whose writes always fail.
#[derive(Debug, Default)]
pub struct BrokenStore;

#[async_trait]
impl HistoryStore for BrokenStore {
    async fn append(&self, record: &DeploymentRecord) -> Result<PathBuf, HistoryError> {
        Err(HistoryError::Write {
            path: PathBuf::from(format!("/unwritable/{}.json", record.key())),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    async fn query(
        &self,
        _app: &AppName,
        _env: Option<&EnvName>,
        _limit: usize,
    ) -> Result<Vec<DeploymentRecord>, HistoryError> {
        Ok(Vec::new())
    }
}

/// Temporary config and history directories.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("config").join("apps")).unwrap();
        Self { dir }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    pub fn history_dir(&self) -> PathBuf {
        self.dir.path().join("history")
    }

    /// Write `config/apps/{app}.yaml`.
    pub fn write_descriptor(&self, app: &str, yaml: &str) -> PathBuf {
        let path = self.config_dir().join("apps").join(format!("{app}.yaml"));
        fs::write(&path, yaml).unwrap();
        path
    }

    /// Dispatcher with `executor` registered for every backend.
    pub async fn dispatcher(
        &self,
        executor: Arc<dyn BackendExecutor>,
        probe: Arc<dyn Probe>,
    ) -> Dispatcher {
        let mut backends = BackendRegistry::new();
        for kind in BackendKind::ALL {
            backends.register(kind, Arc::clone(&executor));
        }
        let history = FileHistoryStore::open(self.history_dir()).await.unwrap();
        Dispatcher::new(self.config_dir(), backends, Arc::new(history), probe)
    }

    /// Names of the files in the history directory.
    pub fn history_files(&self) -> Vec<String> {
        list(&self.history_dir())
    }
}

fn list(dir: &Path) -> Vec<String> {
    match fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
        Err(_) => Vec::new(),
    }
}
