use chrono::Utc;

/// Returns the current UTC wall-clock time as milliseconds since the
/// Unix epoch.
///
/// ```
/// use buslat::clock::unix_millis;
/// let now = unix_millis();
/// assert!(now > 1_500_000_000_000);
/// ```
pub fn unix_millis() -> u64 {
    // timestamp_millis is negative only before 1970, which no sane
    // wall clock reports.
    Utc::now().timestamp_millis().max(0) as u64
}
