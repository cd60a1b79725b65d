//! Helpers for presenting exam dates the way the sources' audience reads
//! them.
//!
//! The scheduling backends report Gregorian dates, but found-slot messages
//! show them in the Iranian (Jalali) calendar with Persian digits. The
//! calendar conversion is the standard integer arithmetic; `chrono` handles
//! the parsing.

use chrono::NaiveDate;

/// Format a source-native date string as a Jalali date with Persian digits,
/// e.g. `"2024-08-06"` becomes `"۱۴۰۳/۵/۱۶"`.
///
/// Accepts anything starting with `YYYY-MM-DD` (times after the date are
/// ignored). Returns the raw input unchanged when it does not parse, so a
/// surprising source format still produces a readable message.
pub fn persian_date(raw: &str) -> String {
    let parsed = raw
        .get(..10)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
    match parsed {
        Some(date) => {
            use chrono::Datelike;
            let (jy, jm, jd) = gregorian_to_jalali(date.year(), date.month(), date.day());
            to_persian_digits(&format!("{jy}/{jm}/{jd}"))
        }
        None => raw.to_string(),
    }
}

/// Convert a Gregorian civil date to the Jalali calendar.
fn gregorian_to_jalali(gy: i32, gm: u32, gd: u32) -> (i32, u32, u32) {
    const G_DAYS_BEFORE_MONTH: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
    let gy = i64::from(gy);
    let gy2 = if gm > 2 { gy + 1 } else { gy };
    let mut days = 355_666
        + 365 * gy
        + (gy2 + 3) / 4
        - (gy2 + 99) / 100
        + (gy2 + 399) / 400
        + i64::from(gd)
        + G_DAYS_BEFORE_MONTH[(gm - 1) as usize];
    let mut jy = -1595 + 33 * (days / 12053);
    days %= 12053;
    jy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }
    let (jm, jd) = if days < 186 {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - 186) / 30, 1 + (days - 186) % 30)
    };
    (jy as i32, jm as u32, jd as u32)
}

/// Replace ASCII digits with Persian (Extended Arabic-Indic) digits.
pub fn to_persian_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '0'..='9' => {
                let offset = c as u32 - '0' as u32;
                char::from_u32('۰' as u32 + offset).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nowruz_boundaries() {
        assert_eq!(gregorian_to_jalali(2024, 3, 20), (1403, 1, 1));
        assert_eq!(gregorian_to_jalali(2025, 3, 21), (1404, 1, 1));
        assert_eq!(gregorian_to_jalali(2024, 3, 19), (1402, 12, 29));
    }

    #[test]
    fn test_mid_year_conversion() {
        // 6 August 2024 is 16 Mordad 1403.
        assert_eq!(gregorian_to_jalali(2024, 8, 6), (1403, 5, 16));
    }

    #[test]
    fn test_persian_digits() {
        assert_eq!(to_persian_digits("1403/5/16"), "۱۴۰۳/۵/۱۶");
        assert_eq!(to_persian_digits("no digits"), "no digits");
        assert_eq!(to_persian_digits(""), "");
    }

    #[test]
    fn test_persian_date_from_plain_date() {
        assert_eq!(persian_date("2024-08-06"), "۱۴۰۳/۵/۱۶");
    }

    #[test]
    fn test_persian_date_ignores_time_suffix() {
        assert_eq!(persian_date("2024-08-06 09:00:00"), "۱۴۰۳/۵/۱۶");
    }

    #[test]
    fn test_persian_date_falls_back_to_raw() {
        assert_eq!(persian_date("next Tuesday"), "next Tuesday");
        assert_eq!(persian_date(""), "");
    }
}
