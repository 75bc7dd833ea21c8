mod common;

#[cfg(test)]
mod tests {
    use crate::common::context::AppContextTestVehicle;
    use holler::AppContext;

    #[tokio::test]
    async fn manual() {
        // Given
        let mut vehicle = AppContextTestVehicle::new();

        // When
        vehicle.spawn_workload().await;
        vehicle.spawn_workload().await;

        // Then
        assert!(AppContext::is_alive());
        vehicle.assert_workloads_pending();

        // When
        AppContext::terminate();
        tokio::task::yield_now().await;

        // Then
        assert!(AppContext::is_terminated());
        vehicle.assert_workloads_reported();
    }
}
