//! Payment-status classification of clients.
//!
//! Splits a client list into three disjoint buckets relative to a
//! caller-supplied local instant:
//!
//! * `due_today`: owes money and the next payment falls on today's date
//! * `overdue`: owes money and the next payment date has passed
//! * `upcoming`: next payment lies ahead
//!
//! Two comparison rules are available, see [`Granularity`].

use chrono::NaiveDateTime;
use log::debug;

use crate::error::Result;
use crate::models::Cliente;

/// How due dates are compared against the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// Calendar dates only. Every client with a parseable due date lands in
    /// exactly one bucket unless it is paid and not in the future.
    #[default]
    CalendarDay,
    /// Calendar-date equality for "today" but full-instant ordering for the
    /// "before now" and "after now" checks. A client due later today is in
    /// no bucket under this rule.
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    DueToday,
    Overdue,
    Upcoming,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientBuckets {
    pub due_today: Vec<Cliente>,
    pub overdue: Vec<Cliente>,
    pub upcoming: Vec<Cliente>,
}

impl ClientBuckets {
    pub fn len(&self) -> usize {
        self.due_today.len() + self.overdue.len() + self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Worker dashboard input: only clients that still owe money.
    pub fn active_only(clients: &[Cliente]) -> Vec<Cliente> {
        clients.iter().filter(|c| !c.is_paid()).cloned().collect()
    }
}

/// Decide the bucket for a single client. `None` means the client belongs
/// to no bucket (paid, or dropped by the mixed rule).
pub fn bucket_for(
    client: &Cliente,
    now: NaiveDateTime,
    mode: Granularity,
) -> Result<Option<Bucket>> {
    let due = client.due_at()?;
    let today = now.date();
    let due_day = due.date();
    let owes = !client.is_paid();

    let bucket = match mode {
        Granularity::CalendarDay => {
            if due_day == today {
                owes.then_some(Bucket::DueToday)
            } else if due_day < today {
                owes.then_some(Bucket::Overdue)
            } else {
                Some(Bucket::Upcoming)
            }
        }
        Granularity::Mixed => {
            if due_day == today && due < now && owes {
                Some(Bucket::DueToday)
            } else if due_day < today && owes {
                Some(Bucket::Overdue)
            } else if due_day != today && due >= now {
                Some(Bucket::Upcoming)
            } else {
                None
            }
        }
    };

    Ok(bucket)
}

/// Partition `clients` into buckets, preserving input order within each.
///
/// Fails on the first client whose due date cannot be parsed.
pub fn classify(
    clients: &[Cliente],
    now: NaiveDateTime,
    mode: Granularity,
) -> Result<ClientBuckets> {
    let mut buckets = ClientBuckets::default();

    for client in clients {
        match bucket_for(client, now, mode)? {
            Some(Bucket::DueToday) => buckets.due_today.push(client.clone()),
            Some(Bucket::Overdue) => buckets.overdue.push(client.clone()),
            Some(Bucket::Upcoming) => buckets.upcoming.push(client.clone()),
            None => debug!("client {} is in no bucket", client.id),
        }
    }

    debug!(
        "classified {} clients: {} due today, {} overdue, {} upcoming",
        clients.len(),
        buckets.due_today.len(),
        buckets.overdue.len(),
        buckets.upcoming.len()
    );

    Ok(buckets)
}
