use chrono::NaiveDate;

/// Validates a time-of-day string as zero-padded `HH:MM`. Zero-padding keeps
/// lexicographic order equal to chronological order in the store.
pub fn validate_time(value: &str, field: &str) -> Result<(), String> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[3].is_ascii_digit()
        && bytes[4].is_ascii_digit();

    if !well_formed {
        return Err(format!("{field} must be in HH:MM format"));
    }

    let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    if hour > 23 || minute > 59 {
        return Err(format!("{field} is out of range"));
    }

    Ok(())
}

/// Validates a calendar date string as `YYYY-MM-DD`.
pub fn validate_date(value: &str, field: &str) -> Result<(), String> {
    if value.len() != 10 || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err(format!("{field} must be in YYYY-MM-DD format"));
    }
    Ok(())
}

pub fn require_nonempty(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    Ok(())
}

pub fn validate_time_range(start: &str, end: &str) -> Result<(), String> {
    validate_time(start, "start_time")?;
    validate_time(end, "end_time")?;
    if end <= start {
        return Err("end_time must be after start_time".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_time() {
        assert!(validate_time("00:00", "t").is_ok());
        assert!(validate_time("23:59", "t").is_ok());
        assert!(validate_time("24:00", "t").is_err());
        assert!(validate_time("12:60", "t").is_err());
        assert!(validate_time("9:00", "t").is_err());
        assert!(validate_time("09.00", "t").is_err());
        assert!(validate_time("", "t").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2025-12-01", "date").is_ok());
        assert!(validate_date("2025-02-30", "date").is_err());
        assert!(validate_date("01-12-2025", "date").is_err());
        assert!(validate_date("2025-12-1", "date").is_err());
    }

    #[test]
    fn test_validate_time_range() {
        assert!(validate_time_range("10:00", "12:00").is_ok());
        assert!(validate_time_range("12:00", "10:00").is_err());
        assert!(validate_time_range("10:00", "10:00").is_err());
    }
}
