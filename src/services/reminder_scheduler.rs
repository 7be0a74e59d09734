use anyhow::{anyhow, Result};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::services::{BookingService, EmailService};

/// Hourly tick that emails reminders for confirmed bookings starting in
/// the next 24 hours. `reminder_sent_at` keeps each booking to at most
/// one reminder.
pub struct ReminderScheduler {
    scheduler: JobScheduler,
}

impl ReminderScheduler {
    pub async fn start(db: PgPool, email: Arc<EmailService>) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create job scheduler: {}", e))?;

        let job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
            let db = db.clone();
            let email = email.clone();
            Box::pin(async move {
                if let Err(e) = send_due_reminders(db, email).await {
                    error!("booking reminder tick failed: {e}");
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create reminder job: {}", e))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to add reminder job: {}", e))?;
        scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start job scheduler: {}", e))?;

        info!("booking reminder scheduler started");
        Ok(Self { scheduler })
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| anyhow!("Failed to stop job scheduler: {}", e))?;
        Ok(())
    }
}

async fn send_due_reminders(db: PgPool, email: Arc<EmailService>) -> Result<()> {
    let bookings = BookingService::new(db, email);
    let due = bookings.due_reminders(Utc::now()).await?;
    if due.is_empty() {
        return Ok(());
    }

    info!("sending {} booking reminders", due.len());
    for booking in &due {
        if let Err(e) = bookings.send_reminder(booking).await {
            error!("reminder for booking {} failed: {e}", booking.id);
        }
    }
    Ok(())
}
