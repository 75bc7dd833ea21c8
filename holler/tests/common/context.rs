use holler::AppContext;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Drives [`AppContext`] through its lifecycle in tests.
pub struct AppContextTestVehicle {
    checkpoints: Vec<Arc<AtomicBool>>,
}

impl AppContextTestVehicle {
    /// Initializes a new test vehicle.
    pub fn new() -> Self {
        Self {
            checkpoints: vec![],
        }
    }

    /// Spawns a background workload that reports in only **after** the
    /// application context terminates. Retains a checkpoint for the workload
    /// to be able to verify later whether it reported in.
    pub async fn spawn_workload(&mut self) {
        // Create a fresh checkpoint
        let checkpoint = Arc::new(AtomicBool::new(false));

        // Schedule flipping the checkpoint once the context is terminated
        tokio::spawn(Self::report_in_after_termination(checkpoint.clone()));

        // Save the checkpoint for later
        self.checkpoints.push(checkpoint);

        // Yield to the runtime to let the spawned task reach its await point
        tokio::task::yield_now().await;
    }

    async fn report_in_after_termination(checkpoint: Arc<AtomicBool>) {
        AppContext::terminated().await;

        checkpoint.store(true, Ordering::SeqCst);
    }

    /// Asserts that no previously spawned workload has reported in yet.
    pub fn assert_workloads_pending(&self) {
        for checkpoint in &self.checkpoints {
            assert!(!checkpoint.load(Ordering::SeqCst));
        }
    }

    /// Asserts that every previously spawned workload has reported in.
    pub fn assert_workloads_reported(&self) {
        for checkpoint in &self.checkpoints {
            assert!(checkpoint.load(Ordering::SeqCst));
        }
    }
}
