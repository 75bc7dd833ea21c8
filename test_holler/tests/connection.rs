#[cfg(test)]
mod tests {
    use holler::{DsnChunks, Gateway, Handle};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn reports_refused_connection_as_transient() {
        // Given
        let handle = make_unreachable_handle();

        // When
        let outcome = Gateway::connect(&handle).await;

        // Then
        let error = match outcome {
            Err(error) => error,
            Ok(_) => panic!("a broker appears to listen on a port reserved for refusal"),
        };
        assert!(error.is_transient());
        assert_eq!(error.identifier(), handle.identifier());
    }

    /// Composes a handle that points at a port where no broker listens.
    fn make_unreachable_handle() -> Handle {
        Handle::new(
            "test_unreachable",
            DsnChunks {
                host: "localhost",
                port: 1,
                user: "guest",
                password: "guest",
                vhost: "/",
            },
        )
    }
}
