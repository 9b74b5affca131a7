use chrono::{Duration as DateDuration, NaiveDate, Utc};
use log::{LevelFilter, warn};
use match_discovery::tracker::DEFAULT_QUIET_WINDOW;
use match_discovery::window::DateWindow;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Length of the default trip window, in days.
const DEFAULT_TRIP_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub matches_path: Option<PathBuf>,
    pub window: DateWindow,
    pub settle_after: Duration,
}

impl AppSettings {
    /// Read settings from `MATCHMAP_*` environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), Utc::now().date_naive())
    }

    fn from_lookup<F>(lookup: F, today: NaiveDate) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let from = get("MATCHMAP_FROM")
            .and_then(|s| parse_date("MATCHMAP_FROM", &s))
            .unwrap_or(today);
        let to = get("MATCHMAP_TO")
            .and_then(|s| parse_date("MATCHMAP_TO", &s))
            .unwrap_or(from + DateDuration::days(DEFAULT_TRIP_DAYS - 1));

        let settle_after = get("MATCHMAP_SETTLE_MS")
            .and_then(|s| match s.parse::<u64>() {
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(e) => {
                    warn!("ignoring MATCHMAP_SETTLE_MS={s:?}: {e}");
                    None
                }
            })
            .unwrap_or(DEFAULT_QUIET_WINDOW);

        let log_level = get("MATCHMAP_LOG").and_then(|s| match LevelFilter::from_str(&s) {
            Ok(level) => Some(level),
            Err(_) => {
                warn!("ignoring unknown MATCHMAP_LOG level {s:?}");
                None
            }
        });

        Self {
            full_screen: false,
            log_level,
            matches_path: get("MATCHMAP_MATCHES_JSON").map(PathBuf::from),
            window: DateWindow::new(from, to),
            settle_after,
        }
    }
}

fn parse_date(key: &str, value: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("ignoring {key}={value:?}: {e}");
            None
        }
    }
}
