mod common;

#[cfg(test)]
mod tests {
    use crate::common::handle::make_broker_handle;
    use crate::common::names::{mangle, random_token};
    use holler::{
        ConfirmationLevel, Egress, Gateway, Ingress, Publisher, StringDecoder, StringSubscriber,
        Subscriber,
    };
    use pretty_assertions::assert_eq;
    use std::any::type_name_of_val;

    #[tokio::test]
    #[ignore]
    async fn accepted() {
        // Given
        let payload = random_token();
        let queue = mangle(type_name_of_val(&accepted));
        let gateway = make_gateway().await;
        let publisher = make_publisher(&gateway, &queue, ConfirmationLevel::Accepted).await;
        let subscriber = make_subscriber(&gateway, &queue).await;

        // When
        let dispatch = publisher.publish(payload.as_str()).await.unwrap();
        let received = subscriber.receive().await.unwrap().into_payload();

        // Then
        assert_eq!(dispatch.bytes(), payload.as_bytes());
        assert_eq!(received, payload);

        // Finally
        subscriber.close().await;
        publisher.close().await;
        gateway.close().await;
    }

    #[tokio::test]
    #[ignore]
    async fn routed() {
        // Given
        let payload = random_token();
        let queue = mangle(type_name_of_val(&routed));
        let gateway = make_gateway().await;
        let publisher = make_publisher(&gateway, &queue, ConfirmationLevel::Routed).await;
        let subscriber = make_subscriber(&gateway, &queue).await;

        // When
        let dispatch = publisher.publish(payload.as_str()).await.unwrap();
        let received = subscriber.receive().await.unwrap().into_payload();

        // Then
        assert_eq!(dispatch.bytes(), payload.as_bytes());
        assert_eq!(received, payload);

        // Finally
        subscriber.close().await;
        publisher.close().await;
        gateway.close().await;
    }

    async fn make_gateway() -> Gateway {
        Gateway::connect(make_broker_handle()).await.unwrap()
    }

    async fn make_publisher(
        gateway: &Gateway,
        queue: &str,
        confirmation_level: ConfirmationLevel,
    ) -> Publisher {
        let egress = Egress::builder()
            .with_queue_named(queue)
            .with_confirmation(confirmation_level)
            .build()
            .unwrap();

        Publisher::open(gateway, egress).await.unwrap()
    }

    async fn make_subscriber(gateway: &Gateway, queue: &str) -> StringSubscriber {
        let ingress = Ingress::builder().with_queue_named(queue).build().unwrap();

        Subscriber::open(gateway, ingress, StringDecoder).await.unwrap()
    }
}
