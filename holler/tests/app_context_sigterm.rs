mod common;

#[cfg(all(test, unix))]
mod tests {
    use crate::common::context::AppContextTestVehicle;
    use holler::AppContext;

    #[tokio::test]
    async fn sigterm() {
        // Given
        let mut vehicle = AppContextTestVehicle::new();

        // When
        vehicle.spawn_workload().await;
        vehicle.spawn_workload().await;

        // Then
        vehicle.assert_workloads_pending();

        // When
        AppContext::auto_terminate().await;
        unsafe {
            libc::raise(libc::SIGTERM);
        }
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;

        // Then
        assert!(AppContext::is_terminated());
        vehicle.assert_workloads_reported();
    }
}
