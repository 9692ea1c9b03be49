use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::controller::TaskListController;
use super::view::TaskView;

/// Re-fetches the task list every `period` until `cancel` fires, publishing
/// the resulting view after each round. The first fetch happens one period
/// after spawning; the caller is expected to have activated the controller.
///
/// Stops on its own once every view receiver is gone.
pub fn spawn_poller(
    controller: Arc<Mutex<TaskListController>>,
    period: Duration,
    cancel: CancellationToken,
    views: watch::Sender<TaskView>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(?period, "task poller started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("task poller cancelled");
                    break;
                }
                _ = tokio::time::sleep(period) => {
                    let view = {
                        let mut controller = controller.lock().await;
                        if let Err(e) = controller.refresh().await {
                            debug!("Poll round failed: {}", e);
                        }
                        controller.view()
                    };
                    if views.send(view).is_err() {
                        debug!("No one is watching the task list, stopping poller");
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ApiConfig;
    use crate::models::Session;
    use crate::notify::MemoryNotifier;
    use mockito::Matcher;

    fn controller_for(url: &str) -> Arc<Mutex<TaskListController>> {
        let api = ApiClient::new(&ApiConfig {
            base_url: url.to_string(),
            timeout_in_ms: 2000,
        })
        .unwrap();
        Arc::new(Mutex::new(TaskListController::new(
            Arc::new(api),
            Session::new("user@example.com", "T"),
            Arc::new(MemoryNotifier::new()),
        )))
    }

    #[tokio::test]
    async fn polls_until_cancelled() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/task")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"id":1,"title":"a","description":"b","status":false}]}"#)
            .expect_at_least(2)
            .create_async()
            .await;

        let controller = controller_for(&server.url());
        let cancel = CancellationToken::new();
        let (tx, mut rx) = watch::channel(TaskView::Loading);
        let handle = spawn_poller(controller, Duration::from_millis(20), cancel.clone(), tx);

        rx.changed().await.unwrap();
        rx.changed().await.unwrap();
        assert!(matches!(*rx.borrow(), TaskView::Grid(ref cards) if cards.len() == 1));

        cancel.cancel();
        handle.await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn stops_when_nobody_listens() {
        let server = mockito::Server::new_async().await;
        let controller = controller_for(&server.url());
        let (tx, rx) = watch::channel(TaskView::Loading);
        drop(rx);

        let handle = spawn_poller(
            controller,
            Duration::from_millis(10),
            CancellationToken::new(),
            tx,
        );
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("poller should stop")
            .unwrap();
    }
}
