use std::{
    sync::mpsc,
    thread::{
        self,
        JoinHandle,
    },
};

use tracing::{
    info,
    warn,
};

use super::NotetypeError;

/// Creates a collection backup. Runs on a worker thread.
pub trait Backup: Send + 'static {
    fn create(&self) -> Result<(), NotetypeError>;
}

impl<F> Backup for F
where
    F: Fn() -> Result<(), NotetypeError> + Send + 'static,
{
    fn create(&self) -> Result<(), NotetypeError> {
        self()
    }
}

pub enum TaskResult {
    BackupFinished(Result<(), NotetypeError>),
}

/// A background job whose outcome is handed back to the calling thread.
pub struct TaskHandle {
    receiver: mpsc::Receiver<TaskResult>,
    join_handle: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn is_finished(&self) -> bool {
        self.join_handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }

    /// Blocks until the job reports back. A job that died without reporting
    /// counts as a failed backup.
    pub fn wait(mut self) -> Result<(), NotetypeError> {
        let result = match self.receiver.recv() {
            Ok(TaskResult::BackupFinished(result)) => result,
            Err(_) => Err(NotetypeError::Backup("backup worker exited without a result".into())),
        };

        if let Some(handle) = self.join_handle.take() {
            if handle.join().is_err() {
                warn!("backup worker panicked");
            }
        }
        result
    }
}

pub fn spawn_backup<B: Backup>(backup: B) -> TaskHandle {
    let (sender, receiver) = mpsc::channel();

    let join_handle = thread::spawn(move || {
        info!("creating backup");
        let result = backup.create();
        if let Err(e) = &result {
            warn!("backup failed: {}", e);
        }
        let _ = sender.send(TaskResult::BackupFinished(result));
    });

    TaskHandle { receiver, join_handle: Some(join_handle) }
}
