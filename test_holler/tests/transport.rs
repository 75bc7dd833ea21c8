mod common;

#[cfg(test)]
mod tests {
    use crate::common::handle::make_broker_handle;
    use crate::common::names::{mangle, random_token};
    use holler::{
        Egress, Gateway, Ingress, Publisher, StringDecoder, StringSubscriber, Subscriber,
    };
    use pretty_assertions::assert_eq;
    use std::any::type_name_of_val;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    #[ignore]
    async fn delivers_default_greeting() {
        // Given
        let queue = mangle(type_name_of_val(&delivers_default_greeting));
        let gateway = make_gateway().await;
        let publisher = make_publisher(&gateway, &queue).await;
        let subscriber = make_subscriber(&gateway, &queue).await;

        // When
        publisher.publish("how are you?").await.unwrap();
        let received = subscriber.receive().await.unwrap().into_payload();

        // Then
        assert_eq!(received, "how are you?");

        // Finally
        subscriber.close().await;
        publisher.close().await;
        gateway.close().await;
    }

    #[tokio::test]
    #[ignore]
    async fn preserves_publication_order() {
        // Given
        let payload_a = random_token();
        let payload_b = random_token();
        let queue = mangle(type_name_of_val(&preserves_publication_order));
        let gateway = make_gateway().await;
        let publisher = make_publisher(&gateway, &queue).await;
        let subscriber = make_subscriber(&gateway, &queue).await;

        // When
        publisher.publish(payload_a.as_str()).await.unwrap();
        publisher.publish(payload_b.as_str()).await.unwrap();
        let received_a = subscriber.receive().await.unwrap().into_payload();
        let received_b = subscriber.receive().await.unwrap().into_payload();

        // Then
        assert_eq!(received_a, payload_a);
        assert_eq!(received_b, payload_b);

        // Finally
        subscriber.close().await;
        publisher.close().await;
        gateway.close().await;
    }

    #[tokio::test]
    #[ignore]
    async fn pends_on_empty_queue() {
        // Given
        let queue = mangle(type_name_of_val(&pends_on_empty_queue));
        let gateway = make_gateway().await;
        let subscriber = make_subscriber(&gateway, &queue).await;

        // When
        let outcome = timeout(Duration::from_millis(500), subscriber.receive()).await;

        // Then
        assert!(outcome.is_err());

        // Finally
        subscriber.close().await;
        gateway.close().await;
    }

    #[tokio::test]
    #[ignore]
    async fn delivers_multibyte_payloads() {
        // Given
        let payload = "¿cómo estás? πώς είσαι; 🦀";
        let queue = mangle(type_name_of_val(&delivers_multibyte_payloads));
        let gateway = make_gateway().await;
        let publisher = make_publisher(&gateway, &queue).await;
        let subscriber = make_subscriber(&gateway, &queue).await;

        // When
        publisher.publish(payload).await.unwrap();
        let received = subscriber.receive().await.unwrap().into_payload();

        // Then
        assert_eq!(received, payload);

        // Finally
        subscriber.close().await;
        publisher.close().await;
        gateway.close().await;
    }

    #[tokio::test]
    #[ignore]
    async fn consumes_each_message_at_most_once() {
        // Given
        let payload = random_token();
        let queue = mangle(type_name_of_val(&consumes_each_message_at_most_once));
        let gateway = make_gateway().await;
        let publisher = make_publisher(&gateway, &queue).await;
        let first_subscriber = make_subscriber(&gateway, &queue).await;

        // When
        publisher.publish(payload.as_str()).await.unwrap();
        let received = first_subscriber.receive().await.unwrap().into_payload();
        first_subscriber.close().await;

        // Given
        let second_subscriber = make_subscriber(&gateway, &queue).await;

        // When
        let leftover = timeout(Duration::from_millis(500), second_subscriber.receive()).await;

        // Then
        assert_eq!(received, payload);
        assert!(leftover.is_err());

        // Finally
        second_subscriber.close().await;
        publisher.close().await;
        gateway.close().await;
    }

    async fn make_gateway() -> Gateway {
        Gateway::connect(make_broker_handle()).await.unwrap()
    }

    async fn make_publisher(gateway: &Gateway, queue: &str) -> Publisher {
        let egress = Egress::builder().with_queue_named(queue).build().unwrap();

        Publisher::open(gateway, egress).await.unwrap()
    }

    async fn make_subscriber(gateway: &Gateway, queue: &str) -> StringSubscriber {
        let ingress = Ingress::builder().with_queue_named(queue).build().unwrap();

        Subscriber::open(gateway, ingress, StringDecoder).await.unwrap()
    }
}
