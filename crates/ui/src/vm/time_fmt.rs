/// Render a playback position as `m:ss`.
///
/// Media elements report NaN or infinity before metadata arrives; those
/// render as the zero position rather than garbage.
#[must_use]
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let total = seconds as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
