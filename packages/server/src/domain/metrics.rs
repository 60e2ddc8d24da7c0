//! Aggregate chat statistics.

use super::{DisplayName, Timestamp};

/// Statistics kept alongside the registry and updated under the same lock.
///
/// `avg_messages_per_second` and `messages_per_user` stay `None` until they can be
/// computed: the first message only seeds `last_message_time`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerMetrics {
    pub total_messages: u64,
    pub total_users: usize,
    pub last_message_time: Option<Timestamp>,
    pub cumulative_inter_arrival_millis: i64,
    pub avg_messages_per_second: Option<f64>,
    pub messages_per_user: Option<f64>,
}

impl ServerMetrics {
    /// Account for one inbound payload received at `now`.
    pub fn record_message(&mut self, now: Timestamp) {
        self.total_messages += 1;

        if let Some(previous) = self.last_message_time {
            // A clock stepping backwards contributes nothing rather than a negative gap.
            let gap = (now.value() - previous.value()).max(0);
            self.cumulative_inter_arrival_millis += gap;

            if self.cumulative_inter_arrival_millis > 0 {
                let seconds = self.cumulative_inter_arrival_millis as f64 / 1000.0;
                self.avg_messages_per_second = Some(self.total_messages as f64 / seconds);
            }
            if self.total_users > 0 {
                self.messages_per_user =
                    Some(self.total_messages as f64 / self.total_users as f64);
            }
        }

        self.last_message_time = Some(now);
    }

    /// Refresh the user count after a join or leave.
    pub fn set_total_users(&mut self, total_users: usize) {
        self.total_users = total_users;
    }

    /// Render the metrics as telemetry records.
    pub fn to_records(&self) -> Vec<String> {
        vec![
            format!("total_users: {}", self.total_users),
            format!("total_messages: {}", self.total_messages),
            format!(
                "avg_messages_per_second: {}",
                format_rate(self.avg_messages_per_second)
            ),
            format!("messages_per_user: {}", format_rate(self.messages_per_user)),
        ]
    }
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(value) => format!("{:.2}", value),
        None => "n/a".to_string(),
    }
}

/// Metrics and connected names captured in one critical section.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub metrics: ServerMetrics,
    pub users: Vec<DisplayName>,
}
