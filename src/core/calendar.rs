//! Calendar projection
//!
//! Places requests on days. A request sits on its scheduled date; a request
//! with no scheduled date falls back to the day it was created, which mixes
//! "reported" with "planned" but keeps unscheduled work visible.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::core::authz::{Action, AuthorizationMatrix, ResourceKind};
use crate::core::directory::ResourceDirectory;
use crate::core::entity::{Priority, RecordId};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::session::Session;
use crate::entities::request::{Request, RequestQuery, RequestType, Stage};

/// One request placed on the calendar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub request_id: RecordId,
    pub title: String,
    pub date: DateTime<Utc>,
    /// False when `date` is the creation-time fallback
    pub scheduled: bool,
    pub request_type: RequestType,
    pub priority: Priority,
    pub stage: Stage,
}

impl From<&Request> for CalendarEvent {
    fn from(request: &Request) -> Self {
        Self {
            request_id: request.id,
            title: request.title.clone(),
            date: request.anchor_date(),
            scheduled: request.scheduled_date.is_some(),
            request_type: request.request_type,
            priority: request.priority,
            stage: request.stage,
        }
    }
}

/// Project requests onto the inclusive day range `start..=end`, ordered by
/// date then request id
pub fn project(requests: &[Request], start: NaiveDate, end: NaiveDate) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = requests
        .iter()
        .filter(|r| {
            let day = r.anchor_date().date_naive();
            day >= start && day <= end
        })
        .map(CalendarEvent::from)
        .collect();
    events.sort_by(|a, b| a.date.cmp(&b.date).then(a.request_id.cmp(&b.request_id)));
    events
}

pub struct CalendarProjector<'a> {
    directory: &'a dyn ResourceDirectory,
    matrix: AuthorizationMatrix,
}

impl<'a> CalendarProjector<'a> {
    pub fn new(directory: &'a dyn ResourceDirectory) -> Self {
        Self {
            directory,
            matrix: AuthorizationMatrix::standard(),
        }
    }

    /// Events the caller may see between `start` and `end`, both inclusive
    pub fn project(
        &self,
        session: &Session,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<CalendarEvent>> {
        self.matrix
            .require(session, ResourceKind::Request, Action::Read)?;
        if start > end {
            return Err(ServiceError::validation(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }

        let mut query = RequestQuery {
            from: Some(start),
            to: Some(end),
            ..Default::default()
        };
        self.matrix
            .scope(session.role, ResourceKind::Request)
            .narrow(&mut query, session);

        let requests = self.directory.requests(&query)?;
        let events = project(&requests, start, end);
        debug!(user = %session.username, %start, %end, count = events.len(), "projected calendar");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::request::Target;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn request(id: RecordId, scheduled: Option<DateTime<Utc>>, created: DateTime<Utc>) -> Request {
        Request {
            id,
            title: format!("Job {}", id),
            description: String::new(),
            target: Target::WorkCenter(1),
            request_type: RequestType::Preventive,
            priority: Priority::Low,
            stage: Stage::New,
            reporter: 1,
            technician: None,
            team: None,
            scheduled_date: scheduled,
            duration_minutes: 0,
            started_at: None,
            completed_at: None,
            created_at: created,
        }
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn test_range_is_inclusive_on_both_ends() {
        let requests = vec![
            request(1, Some(at(2024, 6, 1, 0)), at(2024, 5, 1, 0)),
            request(2, Some(at(2024, 6, 30, 23)), at(2024, 5, 1, 0)),
            request(3, Some(at(2024, 7, 1, 0)), at(2024, 5, 1, 0)),
            request(4, Some(at(2024, 5, 31, 23)), at(2024, 5, 1, 0)),
        ];
        let ids: Vec<_> = project(&requests, june(1), june(30))
            .iter()
            .map(|e| e.request_id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_created_at_fallback_only_without_schedule() {
        let requests = vec![
            // scheduled outside the window, created inside: not shown
            request(1, Some(at(2024, 8, 1, 9)), at(2024, 6, 10, 9)),
            // unscheduled, created inside: shown on its creation day
            request(2, None, at(2024, 6, 12, 9)),
        ];
        let events = project(&requests, june(1), june(30));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].request_id, 2);
        assert!(!events[0].scheduled);
    }

    #[test]
    fn test_events_sorted_by_date_then_id() {
        let requests = vec![
            request(3, Some(at(2024, 6, 5, 9)), at(2024, 5, 1, 0)),
            request(1, Some(at(2024, 6, 9, 9)), at(2024, 5, 1, 0)),
            request(2, Some(at(2024, 6, 5, 9)), at(2024, 5, 1, 0)),
        ];
        let ids: Vec<_> = project(&requests, june(1), june(30))
            .iter()
            .map(|e| e.request_id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_reversed_range_rejected() {
        let dir = crate::core::directory::SqliteDirectory::open_in_memory().unwrap();
        let session = Session::new(1, "mona", crate::entities::user::Role::Manager);
        let err = CalendarProjector::new(&dir)
            .project(&session, june(30), june(1))
            .unwrap_err();
        assert_eq!(err.kind().as_str(), "validation_error");
    }
}
