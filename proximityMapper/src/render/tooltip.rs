use crate::models::coordinate::Coordinate;
use crate::models::location_record::LocationRecord;
use crate::config::constants::PRECISION_COLUMN;

const NOT_AVAILABLE: &str = "N/A";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Hover text for a marker: a centered title, then position and coordinates
/// when known, then precision and time when a record is given.
pub fn build_tooltip(
    name: &str,
    position: Option<usize>,
    coordinate: Option<Coordinate>,
    record: Option<&LocationRecord>,
) -> String {
    let mut tooltip = format!("<center>{}</center>", escape_html(name));

    if let Some(c) = coordinate {
        if let Some(position) = position {
            tooltip.push_str(&format!("<b>Position:</b> {}<br>", position));
        }
        tooltip.push_str(&format!("<b>Lon:</b> {}<br><b>Lat:</b> {}<br>", c.lng(), c.lat()));
    }

    if let Some(record) = record {
        let precision = record
            .precision()
            .map(|p| p.to_string())
            .or_else(|| record.attribute(PRECISION_COLUMN).map(str::to_string))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let time = record.timestamp().unwrap_or(NOT_AVAILABLE);
        tooltip.push_str(&format!(
            "<b>Precision:</b> {}<br><b>Time:</b> {}",
            escape_html(&precision),
            escape_html(time)
        ));
    }

    tooltip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_only() {
        assert_eq!(build_tooltip("Test Name", None, None, None), "<center>Test Name</center>");
    }

    #[test]
    fn coordinates_without_position() {
        let c = Coordinate::new(10.0, 20.0).unwrap();
        assert_eq!(
            build_tooltip("Home", None, Some(c), None),
            "<center>Home</center><b>Lon:</b> 20<br><b>Lat:</b> 10<br>"
        );
    }

    #[test]
    fn full_record_with_defaults() {
        let c = Coordinate::new(1.5, 2.5).unwrap();
        let record = LocationRecord::located(c).with_timestamp("12:00");
        let tooltip = build_tooltip("Victim", Some(3), Some(c), Some(&record));
        assert!(tooltip.starts_with("<center>Victim</center><b>Position:</b> 3<br>"));
        assert!(tooltip.ends_with("<b>Precision:</b> N/A<br><b>Time:</b> 12:00"));
    }

    #[test]
    fn escapes_user_text() {
        let record = LocationRecord::unlocated(None).with_timestamp("<script>");
        let tooltip = build_tooltip("A & B", None, None, Some(&record));
        assert!(tooltip.contains("A &amp; B"));
        assert!(tooltip.contains("&lt;script&gt;"));
        assert!(!tooltip.contains("<script>"));
    }
}
