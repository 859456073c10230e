use chrono::{Month, NaiveDate};

/// Insert a comma every 3 digits, counting from the right.
/// Numbers with less than 4 digits are returned as they are.
pub fn add_commas(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() < 4 {
        return digits;
    }
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Full English name of a two-digit month, "01" to "12".
pub fn month_name(month: &str) -> Option<&'static str> {
    if month.len() != 2 {
        return None;
    }
    let n: u8 = month.parse().ok()?;
    Month::try_from(n).ok().map(|m| m.name())
}

/// Title line for a frame, e.g. "September 01, 2020".
/// The day keeps its leading zero, as in the input dates.
pub fn date_title(date: NaiveDate) -> String {
    let year = date.format("%Y").to_string();
    let month = date.format("%m").to_string();
    let day = date.format("%d").to_string();
    let month = month_name(&month).map_or(month.clone(), |m| m.to_owned());
    format!("{} {}, {}", month, day, year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_commas_boundaries() {
        assert_eq!(add_commas(0), "0");
        assert_eq!(add_commas(7), "7");
        assert_eq!(add_commas(999), "999");
        assert_eq!(add_commas(1000), "1,000");
        assert_eq!(add_commas(12345), "12,345");
        assert_eq!(add_commas(999999), "999,999");
        assert_eq!(add_commas(1234567), "1,234,567");
    }

    #[test]
    fn test_month_name_is_exact() {
        assert_eq!(month_name("03"), Some("March"));
        assert_eq!(month_name("01"), Some("January"));
        assert_eq!(month_name("09"), Some("September"));
        assert_eq!(month_name("12"), Some("December"));
        let all: Vec<&str> = (1..=12)
            .map(|m| month_name(&format!("{:02}", m)).unwrap())
            .collect();
        // one name per month, never several glued together
        for name in all.iter() {
            assert_eq!(all.iter().filter(|n| name.contains(*n)).count(), 1);
        }
    }

    #[test]
    fn test_month_name_rejects_garbage() {
        assert_eq!(month_name("00"), None);
        assert_eq!(month_name("13"), None);
        assert_eq!(month_name("3"), None);
        assert_eq!(month_name("ab"), None);
    }

    #[test]
    fn test_date_title() {
        let date = NaiveDate::from_ymd_opt(2020, 9, 1).unwrap();
        assert_eq!(date_title(date), "September 01, 2020");
        let date = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
        assert_eq!(date_title(date), "March 15, 2021");
    }
}
