//! Year/month/day disambiguation for air dates embedded in release names.

use chrono::NaiveDate;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Num { value: u32, digits: usize },
    Month(u32),
}

impl Part {
    fn parse(token: &str) -> Option<Part> {
        let lower = token.to_ascii_lowercase();
        let digits: String = lower.chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            let suffix = &lower[digits.len()..];
            if !matches!(suffix, "" | "st" | "nd" | "rd" | "th") {
                return None;
            }
            return Some(Part::Num {
                value: digits.parse().ok()?,
                digits: digits.len(),
            });
        }
        if lower.len() < 3 {
            return None;
        }
        MONTHS
            .iter()
            .position(|m| lower.starts_with(m))
            .map(|i| Part::Month(i as u32 + 1))
    }

    fn year(self) -> Option<i32> {
        match self {
            Part::Num { value, digits: 4 } => Some(value as i32),
            Part::Num { value, digits: 2 } if value > 31 => {
                Some(if value < 70 { 2000 } else { 1900 } + value as i32)
            }
            _ => None,
        }
    }

    fn number(self) -> Option<u32> {
        match self {
            Part::Num { value, .. } => Some(value),
            Part::Month(_) => None,
        }
    }
}

/// Resolve a date token such as `2010.11.23`, `23-11-2010` or `25th March 2015`.
/// Returns `None` when the year or month cannot be pinned down unambiguously.
pub fn resolve_air_date(text: &str) -> Option<NaiveDate> {
    let parts: Vec<Part> = text
        .split(|c: char| matches!(c, '.' | ' ' | '_' | '-' | '/'))
        .filter(|t| !t.is_empty())
        .map(Part::parse)
        .collect::<Option<_>>()?;
    if parts.len() != 3 {
        return None;
    }

    let year_positions: Vec<usize> = (0..3).filter(|i| parts[*i].year().is_some()).collect();
    let [year_at] = year_positions[..] else {
        return None;
    };
    let year = parts[year_at].year()?;
    let rest: Vec<Part> = (0..3).filter(|i| *i != year_at).map(|i| parts[i]).collect();

    let (month, day) = match (rest[0], rest[1]) {
        (Part::Month(m), other) | (other, Part::Month(m)) => (m, other.number()?),
        (a, b) => {
            let (a, b) = (a.number()?, b.number()?);
            if year_at == 0 {
                // Year-first dates are month-before-day unless that cannot be.
                if a <= 12 {
                    (a, b)
                } else if b <= 12 {
                    (b, a)
                } else {
                    return None;
                }
            } else if year_at == 2 {
                match (a <= 12, b <= 12) {
                    (true, true) if a == b => (a, b),
                    (true, false) => (a, b),
                    (false, true) => (b, a),
                    _ => return None,
                }
            } else {
                return None;
            }
        }
    };

    if year == 0 || month == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
