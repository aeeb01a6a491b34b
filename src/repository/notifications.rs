//! Notification records

use chrono::{DateTime, Utc};

use super::{next, Store};
use crate::{
    error::{AppError, AppResult},
    models::Notification,
};

impl Store {
    pub fn notification(&self, id: i64) -> AppResult<&Notification> {
        self.notifications
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Notification with id {} not found", id)))
    }

    /// Notifications addressed to the user, oldest first
    pub fn notifications_for(&self, user_id: i64) -> AppResult<Vec<&Notification>> {
        Ok(self
            .user(user_id)?
            .notifications
            .iter()
            .filter_map(|id| self.notifications.get(id))
            .collect())
    }

    pub(crate) fn insert_notification(
        &mut self,
        user_id: i64,
        subject: &str,
        message: String,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        self.user(user_id)?;

        let id = next(&mut self.sequences.notifications);
        self.notifications.insert(
            id,
            Notification {
                id,
                user_id,
                subject: subject.to_string(),
                message,
                created_at: now,
            },
        );
        self.user_mut(user_id)?.notifications.push(id);
        Ok(id)
    }
}
