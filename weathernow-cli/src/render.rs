use std::fmt::Write;

use chrono::{DateTime, Utc};
use weathernow_core::{SubmitOutcome, View, WeatherSearch};

/// Text printed after one submit.
///
/// Expired notifications are dismissed first; the ones still showing come
/// before the view. The view is printed only when a lookup actually finished,
/// so a rejected or ignored submit never repeats the previous result.
pub fn frame(search: &mut WeatherSearch, outcome: &SubmitOutcome, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    search.state_mut().dismiss_expired(now);
    for notification in search.state().active_notifications(now) {
        let _ = writeln!(out, "! {}", notification.message());
    }

    let finished = matches!(outcome, SubmitOutcome::Completed(_));
    if let Some(text) = finished.then(|| view_text(search.state().view())).flatten() {
        let _ = writeln!(out, "{text}");
    }

    out
}

pub fn view_text(view: View<'_>) -> Option<String> {
    match view {
        View::Overlay { weather, image_url } => {
            Some(format!("{weather}\nBackground: {image_url}"))
        }
        View::TextOnly { weather } => Some(weather.to_string()),
        View::Empty => None,
    }
}
