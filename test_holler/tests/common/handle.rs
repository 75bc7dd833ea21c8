use holler::{DsnChunks, Handle};

/// Composes a handle for the live broker that the system tests run against.
pub fn make_broker_handle() -> Handle {
    let port = std::env::var("RABBITMQ_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5672);

    Handle::new(
        "test_rabbitmq",
        DsnChunks {
            host: "localhost",
            port,
            user: "guest",
            password: "guest",
            vhost: "/",
        },
    )
}
