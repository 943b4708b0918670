//! Google Calendar API client.
//!
//! Low-level HTTP access to Calendar API v3: calendar metadata, the event
//! list for a time range, and patching event times.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wakeshift_core::{Attendee, CalendarEvent, EventTime, Moment, TimedSpan};

use crate::auth::CredentialProvider;
use crate::error::ProviderResult;
use crate::http;

/// Google Calendar API client.
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    api_base: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for GoogleCalendarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCalendarClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl GoogleCalendarClient {
    /// Creates a new client.
    pub fn new(
        api_base: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn calendar_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}",
            self.api_base,
            urlencoding::encode(calendar_id)
        )
    }

    /// Fetches calendar metadata.
    pub async fn get_calendar(&self, calendar_id: &str) -> ProviderResult<ApiCalendar> {
        let token = self.credentials.access_token().await?;
        let request = self
            .http_client
            .get(self.calendar_url(calendar_id))
            .bearer_auth(token);
        http::read_json(http::send(request).await?).await
    }

    /// Lists events starting in `[time_min, time_max)`, following pages.
    ///
    /// Recurring events are expanded and results are ordered by start time.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> ProviderResult<Vec<CalendarEvent>> {
        let token = self.credentials.access_token().await?;
        let url = format!("{}/events", self.calendar_url(calendar_id));

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(&url)
                .bearer_auth(&token)
                .query(&[
                    ("timeMin", time_min.to_rfc3339_opts(SecondsFormat::Secs, true)),
                    ("timeMax", time_max.to_rfc3339_opts(SecondsFormat::Secs, true)),
                    ("singleEvents", "true".to_string()),
                    ("orderBy", "startTime".to_string()),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: EventListResponse = http::read_json(http::send(request).await?).await?;
            events.extend(page.items.into_iter().filter_map(convert_event));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(calendar_id, count = events.len(), "fetched events");
        Ok(events)
    }

    /// Replaces the start and end of an event.
    pub async fn patch_event_times(
        &self,
        calendar_id: &str,
        event_id: &str,
        span: &TimedSpan,
    ) -> ProviderResult<()> {
        let token = self.credentials.access_token().await?;
        let url = format!(
            "{}/events/{}",
            self.calendar_url(calendar_id),
            urlencoding::encode(event_id)
        );
        let body = EventTimesPatch {
            start: PatchTime::from(&span.start),
            end: PatchTime::from(&span.end),
        };

        let request = self.http_client.patch(url).bearer_auth(token).json(&body);
        http::ensure_success(http::send(request).await?).await?;
        debug!(calendar_id, event_id, "patched event times");
        Ok(())
    }
}

/// Converts an API event into a [`CalendarEvent`].
///
/// Cancelled events and events without an id are dropped. Unparseable or
/// missing boundaries become `None` so that the classifier can decide.
pub(crate) fn convert_event(event: ApiEvent) -> Option<CalendarEvent> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }
    let Some(id) = event.id else {
        warn!("skipping event without id");
        return None;
    };

    let start = event.start.and_then(|t| convert_time(&id, "start", t));
    let end = event.end.and_then(|t| convert_time(&id, "end", t));

    let attendees = event
        .attendees
        .unwrap_or_default()
        .into_iter()
        // An attendee without an email is still somebody else.
        .map(|a| {
            let email = a.email.unwrap_or_default();
            if a.is_self.unwrap_or(false) {
                Attendee::myself(email)
            } else {
                Attendee::new(email)
            }
        })
        .collect();

    Some(CalendarEvent {
        id,
        title: event.summary,
        start,
        end,
        attendees,
    })
}

fn convert_time(id: &str, which: &str, time: ApiEventTime) -> Option<EventTime> {
    if let Some(dt) = time.date_time {
        return match DateTime::parse_from_rfc3339(&dt) {
            Ok(parsed) => {
                let mut moment = Moment::new(parsed.with_timezone(&Utc));
                if let Some(zone) = time.time_zone {
                    moment = moment.with_zone(zone);
                }
                Some(EventTime::DateTime(moment))
            }
            Err(e) => {
                warn!(event_id = id, "failed to parse {which} time {dt:?}: {e}");
                None
            }
        };
    }
    if let Some(date) = time.date {
        return match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
            Ok(parsed) => Some(EventTime::AllDay(parsed)),
            Err(e) => {
                warn!(event_id = id, "failed to parse {which} date {date:?}: {e}");
                None
            }
        };
    }
    None
}

/// Calendar metadata from `GET /calendars/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCalendar {
    /// The calendar id; for a primary calendar, the owner's email.
    pub id: String,
    /// Calendar name.
    #[serde(default)]
    pub summary: Option<String>,
    /// Calendar timezone.
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    start: Option<ApiEventTime>,
    end: Option<ApiEventTime>,
    status: Option<String>,
    attendees: Option<Vec<ApiAttendee>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
    time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAttendee {
    email: Option<String>,
    #[serde(rename = "self")]
    is_self: Option<bool>,
}

#[derive(Debug, Serialize)]
struct EventTimesPatch {
    start: PatchTime,
    end: PatchTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PatchTime {
    date_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

impl From<&Moment> for PatchTime {
    fn from(moment: &Moment) -> Self {
        Self {
            date_time: moment.at.to_rfc3339_opts(SecondsFormat::Secs, true),
            time_zone: moment.zone.as_ref().map(|z| z.as_str().to_string()),
        }
    }
}
