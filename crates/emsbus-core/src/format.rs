//! Human-readable count and duration formatting helpers.

/// Format a count with `,` thousands separators (e.g. "1,234,567").
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// "1 EMS Device", "5 EMS Devices". Zero counts are omitted (`None`)
/// rather than rendered as "0 ...".
pub fn pluralize(count: u64, noun: &str) -> Option<String> {
    match count {
        0 => None,
        1 => Some(format!("1 {noun}")),
        n => Some(format!("{} {noun}s", format_count(n))),
    }
}

/// Format seconds as "2 days 1 hour 1 minute 1 second", skipping zero
/// units. Zero seconds formats as an empty string.
pub fn format_duration_sec(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    [
        (days, "day"),
        (hours, "hour"),
        (minutes, "minute"),
        (seconds, "second"),
    ]
    .into_iter()
    .filter_map(|(n, unit)| pluralize(n, unit))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Summary line for active devices and sensors, e.g.
/// "5 EMS Devices, 2 Temperature Sensors". Zero categories are left out;
/// if every category is zero the summary is "none".
pub fn device_summary(devices: u32, sensors: u32, analog_sensors: u32) -> String {
    let parts: Vec<String> = [
        (devices, "EMS Device"),
        (sensors, "Temperature Sensor"),
        (analog_sensors, "Analog Sensor"),
    ]
    .into_iter()
    .filter_map(|(n, noun)| pluralize(u64::from(n), noun))
    .collect();

    if parts.is_empty() {
        "none".to_owned()
    } else {
        parts.join(", ")
    }
}
