use super::*;
use async_trait::async_trait;
use futures::stream::BoxStream;
use parking_lot::Mutex;

#[derive(Default)]
struct RecordingSandbox {
    commands: Mutex<Vec<Vec<String>>>,
    fail_next: Mutex<bool>,
}

#[async_trait]
impl SandboxProvider for RecordingSandbox {
    async fn ensure_running(&self) -> Result<(), SandboxError> {
        Ok(())
    }

    async fn exec_stream(
        &self,
        command: ExecCommand,
    ) -> Result<BoxStream<'static, Result<ExecLine, SandboxError>>, SandboxError> {
        self.commands.lock().push(command.cmd.clone());
        if *self.fail_next.lock() {
            return Ok(Box::pin(futures::stream::iter(vec![Err(SandboxError::ExecFailed("boom".to_string()))])));
        }
        Ok(Box::pin(futures::stream::iter(vec![Ok(ExecLine::Stdout("ok".to_string()))])))
    }

    async fn teardown(&self) {}

    async fn health_check(&self) -> Result<(), SandboxError> {
        Ok(())
    }
}

#[tokio::test]
async fn create_worktree_adds_then_pushes_the_branch() {
    let sandbox = Arc::new(RecordingSandbox::default());
    let manager = WorktreeManager::new(sandbox.clone());
    let workflow_id = WorkflowId::new();

    let path = manager.create_worktree(workflow_id, "main").await.unwrap();
    assert_eq!(path, format!("/workspace/worktrees/{workflow_id}"));

    let commands = sandbox.commands.lock();
    assert_eq!(commands.len(), 2);
    assert!(commands[0].contains(&"add".to_string()));
    assert!(commands[0].contains(&format!("origin/main")));
    assert!(commands[1].contains(&"push".to_string()));
}

#[tokio::test]
async fn ensure_repo_cloned_clones_when_probe_fails() {
    let sandbox = Arc::new(RecordingSandbox::default());
    *sandbox.fail_next.lock() = true;
    let manager = WorktreeManager::new(sandbox.clone());

    manager.ensure_repo_cloned("git@example.com:repo.git").await.unwrap();

    let commands = sandbox.commands.lock();
    assert_eq!(commands.len(), 2);
    assert!(commands[0].contains(&"test".to_string()));
    assert!(commands[1].contains(&"clone".to_string()));
}

#[tokio::test]
async fn remove_worktree_never_panics_on_failure() {
    let sandbox = Arc::new(RecordingSandbox::default());
    *sandbox.fail_next.lock() = true;
    let manager = WorktreeManager::new(sandbox.clone());

    manager.remove_worktree(WorkflowId::new()).await;
}
