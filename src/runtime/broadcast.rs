//! Admin announcement fan-out

use super::traits::{ChatId, Notifier, NotifyError, RecordStore};
use crate::db::{DbError, UserId};
use crate::menu;
use crate::state_machine::Reply;
use futures::future::join_all;
use tokio::sync::Semaphore;

/// Deliveries in flight at once
pub const MAX_CONCURRENT_DELIVERIES: usize = 8;

/// Outcome of one broadcast
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: Vec<(UserId, NotifyError)>,
}

impl DeliveryReport {
    #[allow(dead_code)] // Used in tests
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed.len()
    }
}

/// Send `text` as an announcement to every distinct registered member.
///
/// A failed delivery is recorded and the rest continue. Only the member
/// lookup can fail the whole call.
pub async fn broadcast<S, N>(store: &S, notifier: &N, text: &str) -> Result<DeliveryReport, DbError>
where
    S: RecordStore + ?Sized,
    N: Notifier + ?Sized,
{
    let recipients = store.distinct_member_identities().await?;
    let announcement = Reply::markdown(menu::announcement(text));

    let permits = Semaphore::new(MAX_CONCURRENT_DELIVERIES);

    let deliveries = recipients.into_iter().map(|user| {
        let (permits, announcement) = (&permits, &announcement);
        async move {
            // Held for the duration of the send
            let _permit = permits.acquire().await;
            (user, notifier.send(ChatId::from(user), announcement).await)
        }
    });
    let results = join_all(deliveries).await;

    let mut report = DeliveryReport::default();
    for (user, result) in results {
        match result {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "Broadcast delivery failed");
                report.failed.push((user, e));
            }
        }
    }

    tracing::info!(
        delivered = report.delivered,
        failed = report.failed.len(),
        "Broadcast finished"
    );
    Ok(report)
}
