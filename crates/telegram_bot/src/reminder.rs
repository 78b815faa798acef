//! Monthly prompt to set a budget.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use engine::{LedgerStore, Period};

use crate::{error::ConversationError, transport::Messenger, ui};

const REMINDER_HOUR: u32 = 9;

/// First 09:00 local time on the first of a month strictly after `now`.
#[must_use]
pub fn next_reminder(now: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let current = Period::current(now, tz);
    for period in [current, current.next()] {
        let local = period.first_day().ok()?.and_hms_opt(REMINDER_HOUR, 0, 0)?;
        let at = tz.from_local_datetime(&local).earliest()?.with_timezone(&Utc);
        if at > now {
            return Some(at);
        }
    }
    None
}

/// Sends the reminder to every known chat without a budget for `period`.
/// Returns how many chats were reminded.
pub async fn send_reminders(
    store: &dyn LedgerStore,
    messenger: &dyn Messenger,
    period: Period,
) -> Result<usize, ConversationError> {
    let mut sent = 0;
    for chat_id in store.known_chats().await? {
        if store.budget(chat_id, period).await?.is_some() {
            continue;
        }
        if let Err(err) = messenger.send(chat_id, &ui::budget_reminder(period)).await {
            tracing::warn!(chat_id, "budget reminder not delivered: {err}");
            continue;
        }
        sent += 1;
    }
    tracing::info!(%period, sent, "budget reminders sent");
    Ok(sent)
}

pub(crate) async fn run(store: Arc<dyn LedgerStore>, messenger: Arc<dyn Messenger>, tz: Tz) {
    loop {
        let now = Utc::now();
        let Some(at) = next_reminder(now, tz) else {
            tracing::error!("cannot schedule the next budget reminder");
            return;
        };
        tracing::info!(%at, "next budget reminder scheduled");
        tokio::time::sleep((at - now).to_std().unwrap_or_default()).await;

        let period = Period::current(at, tz);
        if let Err(err) = send_reminders(store.as_ref(), messenger.as_ref(), period).await {
            tracing::error!("budget reminder failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono_tz::{Europe::Rome, UTC};

    use super::*;

    #[test]
    fn schedules_first_of_next_month() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(
            next_reminder(now, UTC),
            Some(Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn same_day_before_nine_fires_today() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 7, 59, 0).unwrap();
        // 08:59 in Rome; fires at 09:00 local (08:00 UTC).
        assert_eq!(
            next_reminder(now, Rome),
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn rolls_over_the_year() {
        let now = Utc.with_ymd_and_hms(2026, 12, 1, 9, 0, 0).unwrap();
        assert_eq!(
            next_reminder(now, UTC),
            Some(Utc.with_ymd_and_hms(2027, 1, 1, 9, 0, 0).unwrap())
        );
    }
}
