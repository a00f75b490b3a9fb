// SPDX-License-Identifier: MPL-2.0

//! Notification demo.
//!
//! Runs the client against an in-memory authority:
//!
//! 1. The authority pushes a topic list, which is printed
//! 2. You pick an optional topic id to subscribe to
//! 3. Subscriptions are synchronized with the authority
//! 4. A few notifications are pushed and printed with their alert type
//!
//! # Usage
//!
//! ```bash
//! cargo run --example notification_demo
//!
//! # With library logs
//! RUST_LOG=topic_notify=debug cargo run --example notification_demo
//! ```

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use topic_notify::types::{AlertType, Notification, Topic, TopicId};
use topic_notify::{AuthorityEvent, LoopbackAuthority, NotificationClient, TopicListSnapshot};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("Notification demo started");

    let authority = Arc::new(LoopbackAuthority::new());
    let client = Arc::new(NotificationClient::new(Arc::clone(&authority))?);

    let (topics_tx, mut topics_rx) = mpsc::unbounded_channel();
    client.register_topic_listener(move |snapshot| {
        println!("Topic list was updated");
        show_topics(snapshot);
        let _ = topics_tx.send(snapshot.clone());
    });
    client.register_notification_listener(on_notification);

    // Inbound side, normally fed by the transport
    let (events_tx, events_rx) = mpsc::channel(16);
    let event_loop = client.spawn_event_loop(events_rx);

    events_tx
        .send(AuthorityEvent::topic_list(vec![
            Topic::mandatory(1, "Weather"),
            Topic::optional(2, "Offers"),
            Topic::optional(3, "News"),
        ]))
        .await?;

    let Some(snapshot) = topics_rx.recv().await else {
        eprintln!("Topic listener stopped before the topic list arrived");
        return Ok(());
    };

    if let Some(topic_id) = prompt_topic_id().await? {
        match snapshot.get(topic_id) {
            Some(topic) if topic.is_optional() => {
                println!("Subscribing to optional topic '{topic_id}'");
                if let Err(e) = client.subscribe(topic_id) {
                    println!("Failed to subscribe: {e}");
                }
            }
            Some(_) => println!("Topic '{topic_id}' is mandatory, already subscribed"),
            None => println!("Topic '{topic_id}' is not in the topic list"),
        }
    }

    match client.synchronize().await {
        Ok(report) => println!("Subscriptions synchronized ({} changes)", report.change_count()),
        Err(e) => println!("Failed to sync subscriptions: {e}"),
    }

    for topic in snapshot.iter() {
        if !client.is_subscribed(topic.id()) {
            continue;
        }
        events_tx
            .send(AuthorityEvent::notification(
                topic.id(),
                Notification::alert(AlertType::Green, format!("Hello from {}", topic.name())),
            ))
            .await?;
    }
    events_tx
        .send(AuthorityEvent::notification(1, Notification::new()))
        .await?;
    events_tx
        .send(AuthorityEvent::notification(
            1,
            Notification::alert(AlertType::Red, "Storm warning"),
        ))
        .await?;

    drop(events_tx);
    event_loop.await?;
    client.shutdown().await;

    println!("Notification demo stopped");
    Ok(())
}

fn show_topics(snapshot: &TopicListSnapshot) {
    if snapshot.is_empty() {
        println!("Topic list is empty");
        return;
    }
    for topic in snapshot {
        println!("{topic}");
    }
}

fn on_notification(topic_id: TopicId, notification: &Notification) {
    let Some(body) = notification.message() else {
        println!("Error: Received notification's body is null");
        return;
    };

    println!("Notification for topic id '{topic_id}' received");
    println!("Notification body: {body}");
    match notification.alert_type() {
        Some(alert_type) => println!("Message alert type: {alert_type}"),
        None => println!("Message alert type: none"),
    }
}

async fn prompt_topic_id() -> std::io::Result<Option<TopicId>> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(b"Type topic ID in order to subscribe on one: ")
        .await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;

    match line.parse::<TopicId>() {
        Ok(topic_id) => Ok(Some(topic_id)),
        Err(_) => {
            println!("Not a topic id: {}", line.trim());
            Ok(None)
        }
    }
}
