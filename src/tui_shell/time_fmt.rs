use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

// Server-side stamps are naive `YYYY-MM-DD HH:MM:SS`.
const SERVER_STAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const UI_STAMP: &[FormatItem<'static>] = format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Server stamp trimmed to minutes; unparseable input is shown as is.
pub(super) fn fmt_stamp(raw: &str) -> String {
    PrimitiveDateTime::parse(raw.trim(), SERVER_STAMP)
        .ok()
        .and_then(|dt| dt.format(UI_STAMP).ok())
        .unwrap_or_else(|| raw.to_string())
}

pub(super) fn clock() -> String {
    OffsetDateTime::now_utc()
        .format(format_description!("[hour]:[minute]:[second]Z"))
        .unwrap_or_else(|_| "--:--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_are_trimmed_to_minutes() {
        assert_eq!(fmt_stamp("2024-03-09 17:42:05"), "2024-03-09 17:42");
        assert_eq!(fmt_stamp("yesterday"), "yesterday");
    }
}
