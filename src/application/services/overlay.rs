//! Render Overlay
//!
//! Shows the exact time beside synthesized messages. The time comes from the
//! hidden overlay marker on the record and is appended to the rendered node as
//! an extra child; the record and its visible content are never touched.

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde_json::{json, Map, Value};

use crate::config::{FieldStyle, OverlaySettings};
use crate::domain::{Child, Children, RenderCall, RenderNode, OVERLAY_MARKER_KEY};
use crate::shared::time::parse_instant;

/// Locales (or language prefixes) that default to a 12-hour clock.
const TWELVE_HOUR_LOCALES: &[&str] = &[
    "en", "en-us", "en-ca", "en-au", "en-nz", "en-in", "en-ph", "es-mx", "es-us", "ar", "hi",
    "bn", "ur", "ko", "fil",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Zone {
    Local,
    Fixed(FixedOffset),
}

/// Formats an instant for display according to the overlay settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFormatter {
    pattern: String,
    zone: Zone,
}

impl TimeFormatter {
    pub fn from_settings(settings: &OverlaySettings) -> Self {
        let hour12 = settings
            .hour12
            .unwrap_or_else(|| uses_twelve_hour_clock(&settings.locale));

        let zone = parse_zone(&settings.time_zone).unwrap_or_else(|| {
            tracing::warn!(time_zone = %settings.time_zone, "Unknown overlay time zone; using local time");
            Zone::Local
        });

        Self {
            pattern: build_pattern(settings.hour, settings.minute, settings.second, hour12),
            zone,
        }
    }

    /// Format a marker value, or `None` if it does not parse or nothing is
    /// configured to be shown.
    pub fn format(&self, timestamp: &str) -> Option<String> {
        if self.pattern.is_empty() {
            return None;
        }

        let instant: DateTime<Utc> = parse_instant(timestamp).ok()?;
        let text = match self.zone {
            Zone::Local => instant.with_timezone(&Local).format(&self.pattern).to_string(),
            Zone::Fixed(offset) => instant.with_timezone(&offset).format(&self.pattern).to_string(),
        };
        Some(text)
    }
}

fn uses_twelve_hour_clock(locale: &str) -> bool {
    let locale = locale.trim().to_ascii_lowercase().replace('_', "-");
    let language = locale.split('-').next().unwrap_or_default();

    TWELVE_HOUR_LOCALES.contains(&locale.as_str())
        || (language != "en" && language != "es" && TWELVE_HOUR_LOCALES.contains(&language))
}

fn parse_zone(zone: &str) -> Option<Zone> {
    let zone = zone.trim();
    match zone.to_ascii_lowercase().as_str() {
        "local" | "" => return Some(Zone::Local),
        "utc" | "z" => return FixedOffset::east_opt(0).map(Zone::Fixed),
        _ => {}
    }

    let (sign, rest) = match zone.as_bytes().first()? {
        b'+' => (1, &zone[1..]),
        b'-' => (-1, &zone[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(Zone::Fixed)
}

fn build_pattern(hour: FieldStyle, minute: FieldStyle, second: FieldStyle, hour12: bool) -> String {
    let mut fields = Vec::new();

    match (hour, hour12) {
        (FieldStyle::TwoDigit, true) => fields.push("%I"),
        (FieldStyle::TwoDigit, false) => fields.push("%H"),
        (FieldStyle::Numeric, true) => fields.push("%-I"),
        (FieldStyle::Numeric, false) => fields.push("%-H"),
        (FieldStyle::Hidden, _) => {}
    }
    // Minutes and seconds stay padded once another field precedes them.
    for (style, padded, bare) in [(minute, "%M", "%-M"), (second, "%S", "%-S")] {
        match style {
            FieldStyle::Hidden => {}
            FieldStyle::Numeric if fields.is_empty() => fields.push(bare),
            _ => fields.push(padded),
        }
    }

    let mut pattern = fields.join(":");
    if hour12 && hour != FieldStyle::Hidden {
        pattern.push_str(" %p");
    }
    pattern
}

/// Finds the overlay marker reachable from a render and appends the time.
#[derive(Debug, Clone)]
pub struct RenderOverlay {
    formatter: TimeFormatter,
}

impl RenderOverlay {
    pub fn new(formatter: TimeFormatter) -> Self {
        Self { formatter }
    }

    pub fn from_settings(settings: &OverlaySettings) -> Self {
        Self::new(TimeFormatter::from_settings(settings))
    }

    /// Search the fixed candidate locations for the overlay marker.
    pub fn find_marker(call: &RenderCall) -> Option<&str> {
        let first_arg = call.args.first().and_then(Value::as_object);
        let child_props = match &call.output.children {
            Children::Single(child) => match child.as_ref() {
                Child::Node(node) => Some(&node.props),
                Child::Text(_) => None,
            },
            _ => None,
        };

        let candidates = [
            Some(&call.output.props),
            first_arg,
            nested(&call.output.props, "message"),
            child_props,
            first_arg.and_then(|arg| nested(arg, "message")),
            first_arg.and_then(|arg| nested(arg, "record")),
        ];

        candidates.into_iter().flatten().find_map(|props| {
            own_marker(props)
                .or_else(|| nested(props, "message").and_then(own_marker))
                .or_else(|| nested(props, "record").and_then(own_marker))
        })
    }

    /// Append the formatted time to the render output.
    ///
    /// Returns false, leaving the output untouched, when there is no marker or
    /// it cannot be formatted.
    pub fn decorate(&self, call: &mut RenderCall) -> bool {
        let Some(marker) = Self::find_marker(call).map(str::to_string) else {
            return false;
        };
        let Some(text) = self.formatter.format(&marker) else {
            tracing::debug!(marker = %marker, "Overlay marker could not be formatted");
            return false;
        };

        call.output.children.push(Child::Node(time_node(text)));
        true
    }
}

fn own_marker(props: &Map<String, Value>) -> Option<&str> {
    props
        .get(OVERLAY_MARKER_KEY)
        .and_then(Value::as_str)
        .filter(|marker| !marker.is_empty())
}

fn nested<'a>(props: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    props.get(key).and_then(Value::as_object)
}

fn time_node(text: String) -> RenderNode {
    RenderNode::new("span")
        .with_prop(
            "style",
            json!({
                "marginLeft": 6,
                "fontSize": 12,
                "opacity": 0.6,
                "whiteSpace": "nowrap",
                "verticalAlign": "baseline"
            }),
        )
        .with_child(Child::Text(text))
}
