//! Parsing helpers shared across the MeetHub crates.

use chrono::NaiveDate;

/// Whether the string is a `YYYY-MM-DD` calendar date that actually exists.
pub fn is_valid_date(s: &str) -> bool {
    if s.len() != 10 {
        return false;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Extract a meeting date from a file name that starts with `YYYYMMDD`.
///
/// Recordings exported by capture tools commonly embed the session date as
/// a leading digit block; when present and valid it is more trustworthy
/// than the model's guess.
pub fn date_from_file_name(name: &str) -> Option<String> {
    let digits: String = name.chars().take(8).collect();
    if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let formatted = format!("{}-{}-{}", &digits[0..4], &digits[4..6], &digits[6..8]);
    is_valid_date(&formatted).then_some(formatted)
}

/// Split a free-text name list on ASCII or ideographic commas.
///
/// Empty segments are dropped; surrounding whitespace is trimmed.
pub fn split_names(input: &str) -> Vec<String> {
    input
        .split([',', '、'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Replace characters that are unsafe in folder names with `-`.
pub fn sanitize_folder_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_date() {
        assert!(is_valid_date("2026-08-06"));
        assert!(is_valid_date("2024-02-29"));
        assert!(!is_valid_date("2026-02-30"));
        assert!(!is_valid_date("2026-13-01"));
        assert!(!is_valid_date("2026/08/06"));
        assert!(!is_valid_date("not a date"));
        assert!(!is_valid_date(""));
    }

    #[test]
    fn test_date_from_file_name() {
        assert_eq!(
            date_from_file_name("20260806_board_meeting.mp4"),
            Some("2026-08-06".to_string())
        );
        assert_eq!(date_from_file_name("20261301_bad_month.mp4"), None);
        assert_eq!(date_from_file_name("board_meeting.mp4"), None);
        assert_eq!(date_from_file_name("2026.mp4"), None);
    }

    #[test]
    fn test_split_names() {
        assert_eq!(split_names("Tanaka, Suzuki"), vec!["Tanaka", "Suzuki"]);
        assert_eq!(split_names("田中、鈴木"), vec!["田中", "鈴木"]);
        assert_eq!(split_names("  solo  "), vec!["solo"]);
        assert!(split_names(" , ").is_empty());
        assert!(split_names("").is_empty());
    }

    #[test]
    fn test_sanitize_folder_name() {
        assert_eq!(sanitize_folder_name("0042_Q3: review?"), "0042_Q3- review-");
        assert_eq!(sanitize_folder_name("plain name"), "plain name");
    }
}
