/// Formats a duration in seconds as `HH:MM:SS.mmm`.
pub fn time_str(sec: f64) -> String {
    let ms = (sec * 1000f64).max(0.0);
    let hours = (ms / 3600000f64) as u64;
    let minutes = ((ms % 3600000f64) / 60000f64) as u64;
    let seconds = ((ms % 60000f64) / 1000f64) as u64;
    let milliseconds = (ms % 1000f64) as u64;

    format!(
        "{hours:0width$}:{minutes:02}:{seconds:02}.{milliseconds:03}",
        width = if hours >= 100 { 0 } else { 2 }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_durations() {
        assert_eq!(time_str(0.0), "00:00:00.000");
        assert_eq!(time_str(61.5), "00:01:01.500");
        assert_eq!(time_str(3600.0 * 123.0), "123:00:00.000");
    }
}
