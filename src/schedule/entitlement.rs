use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

use crate::catalog::Webinar;

/// Webinars a viewer may see, soonest first.
///
/// `Empty` is a normal outcome rather than a failure: callers render a
/// fallback state for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Lineup {
    Empty,
    Scheduled(Vec<Webinar>),
}

impl Lineup {
    pub fn is_empty(&self) -> bool {
        matches!(self, Lineup::Empty)
    }

    pub fn len(&self) -> usize {
        self.webinars().len()
    }

    pub fn webinars(&self) -> &[Webinar] {
        match self {
            Lineup::Empty => &[],
            Lineup::Scheduled(webinars) => webinars,
        }
    }

    pub fn into_webinars(self) -> Vec<Webinar> {
        match self {
            Lineup::Empty => Vec::new(),
            Lineup::Scheduled(webinars) => webinars,
        }
    }
}

/// Midnight of `now`'s calendar day in `now`'s own time zone.
///
/// Where a DST transition skips midnight, the day starts at the transition
/// instant, i.e. the first local second that exists.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let tz = now.timezone();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    let local = |seconds: i64| {
        tz.from_local_datetime(&(midnight + Duration::seconds(seconds)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    };

    if let Some(start) = local(0) {
        return start;
    }

    // `now` itself exists locally, so the gap ends somewhere in between.
    let mut skipped = 0;
    let mut exists = (now.naive_local() - midnight).num_seconds() + 1;
    while exists - skipped > 1 {
        let mid = skipped + (exists - skipped) / 2;
        if local(mid).is_some() {
            exists = mid;
        } else {
            skipped = mid;
        }
    }

    local(exists).unwrap_or_else(|| now.with_timezone(&Utc))
}

/// Selects the webinars starting today or later that `viewer_package` grants
/// access to, ordered by start time. Ties keep their input order.
pub fn filter_upcoming<Tz: TimeZone>(
    webinars: &[Webinar],
    viewer_package: Option<&str>,
    now: &DateTime<Tz>,
) -> Lineup {
    let cutoff = start_of_day(now);

    let mut upcoming: Vec<Webinar> = webinars
        .iter()
        .filter(|webinar| webinar.start >= cutoff && webinar.is_open_to(viewer_package))
        .cloned()
        .collect();

    if upcoming.is_empty() {
        return Lineup::Empty;
    }

    upcoming.sort_by_key(|webinar| webinar.start);
    Lineup::Scheduled(upcoming)
}
