/**
 * Free-text date parsing for tag descriptions
 *
 * Tag values come in many shapes (EXIF colon dates, ISO strings, AVI
 * "Mon dd HH:MM:SS yyyy" stamps, bare years). Each string is matched
 * exactly against a fixed, ordered pattern list, once per locale.
 */

use chrono::{FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::sync::LazyLock;

/// Ordered pattern list. Order matters: several entries are prefixes or
/// variants of each other and the first exact match wins.
pub const DATE_PATTERNS: &[&str] = &[
    "yyyy:MM:dd HH:mm:ss",
    "MMM dd HH:mm:ss yyyy",
    "MMM d HH:mm:ss yyyy",
    "yyyy:MM:dd HH:mm:ss.fff",
    "yyyy:MM:dd HH:mm:ss.fffzzz",
    "yyyy:MM:dd HH:mm:ss",
    "yyyy:MM:dd HH:mm:sszzz",
    "yyyy:MM:dd HH:mm",
    "yyyy:MM:dd HH:mmzzz",
    "yyyy-MM-dd HH:mm:ss.fff",
    "yyyy-MM-dd HH:mm:ss.fffzzz",
    "yyyy-MM-dd HH:mm:ss",
    "yyyy-MM-dd HH:mm:sszzz",
    "yyyy-MM-dd HH:mm",
    "yyyy-MM-dd HH:mmzzz",
    "yyyy.MM.dd HH:mm:ss",
    "yyyy.MM.dd HH:mm:sszzz",
    "yyyy.MM.dd HH:mm",
    "yyyy.MM.dd HH:mmzzz",
    "yyyy-MM-ddTHH:mm:ss.fff",
    "yyyy-MM-ddTHH:mm:ss.fffzzz",
    "yyyy-MM-ddTHH:mm:ss.ff",
    "yyyy-MM-ddTHH:mm:ss.f",
    "yyyy-MM-ddTHH:mm:ss",
    "yyyy-MM-ddTHH:mm:sszzz",
    "yyyy-MM-ddTHH:mm",
    "yyyy-MM-ddTHH:mmzzz",
    "yyyy:MM:dd",
    "yyyy-MM-dd",
    "yyyy-MM",
    "yyyyMMdd", // as used in IPTC data
    "yyyy",
];

/// Locale conventions tried for every pattern, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    /// Period decimal separator, English month abbreviations.
    EnUs,
    /// Comma decimal separator, Spanish month abbreviations.
    EsEs,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::EnUs, Locale::EsEs];

    fn decimal_separator(self) -> char {
        match self {
            Locale::EnUs => '.',
            Locale::EsEs => ',',
        }
    }

    fn month_from_abbrev(self, abbrev: &str) -> Option<u32> {
        let abbrev = abbrev.to_lowercase();
        let names: &[&str] = match self {
            Locale::EnUs => &[
                "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
            ],
            Locale::EsEs => &[
                "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
            ],
        };
        if let Some(idx) = names.iter().position(|n| *n == abbrev) {
            return Some(idx as u32 + 1);
        }
        // es-ES abbreviates September as "sept."
        if self == Locale::EsEs && abbrev == "sept" {
            return Some(9);
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Year,
    Month,
    MonthAbbrev,
    Day2,
    Day,
    Hour,
    Minute,
    Second,
    DecimalSeparator,
    Fraction(u32),
    Offset,
    Space,
    Literal(char),
}

static COMPILED_PATTERNS: LazyLock<Vec<Vec<Token>>> =
    LazyLock::new(|| DATE_PATTERNS.iter().map(|p| compile(p)).collect());

fn compile(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let token = match (c, run) {
            ('y', _) => Token::Year,
            ('M', 3..) => Token::MonthAbbrev,
            ('M', _) => Token::Month,
            ('d', 1) => Token::Day,
            ('d', _) => Token::Day2,
            ('H', _) => Token::Hour,
            ('m', _) => Token::Minute,
            ('s', _) => Token::Second,
            ('f', n) => {
                if tokens.last() == Some(&Token::Literal('.')) {
                    tokens.pop();
                    tokens.push(Token::DecimalSeparator);
                }
                Token::Fraction(n as u32)
            }
            ('z', _) => Token::Offset,
            (' ', _) => Token::Space,
            _ => {
                tokens.push(Token::Literal(c));
                i += 1;
                continue;
            }
        };
        tokens.push(token);
        i += run;
    }

    tokens
}

#[derive(Debug, Default)]
struct Fields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: u32,
    minute: u32,
    second: u32,
    nanos: u32,
    offset_secs: Option<i32>,
}

/// Reads between `min` and `max` ASCII digits from the front of `input`.
fn take_digits(input: &mut &str, min: usize, max: usize) -> Option<u32> {
    let len = input
        .bytes()
        .take(max)
        .take_while(u8::is_ascii_digit)
        .count();
    if len < min {
        return None;
    }
    let value = input[..len].parse().ok()?;
    *input = &input[len..];
    Some(value)
}

fn take_char(input: &mut &str, expected: char) -> Option<()> {
    let rest = input.strip_prefix(expected)?;
    *input = rest;
    Some(())
}

fn take_offset(input: &mut &str) -> Option<i32> {
    let sign = match input.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    *input = &input[1..];
    let hours = take_digits(input, 2, 2)? as i32;
    let _ = take_char(input, ':');
    let minutes = take_digits(input, 2, 2).unwrap_or(0) as i32;
    if hours > 14 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

fn match_pattern(tokens: &[Token], text: &str, locale: Locale) -> Option<NaiveDateTime> {
    let mut input = text.trim();
    let mut fields = Fields::default();

    for token in tokens {
        match *token {
            Token::Year => fields.year = Some(take_digits(&mut input, 4, 4)? as i32),
            Token::Month => fields.month = Some(take_digits(&mut input, 2, 2)?),
            Token::MonthAbbrev => {
                let len = input
                    .char_indices()
                    .find(|(_, c)| !c.is_alphabetic())
                    .map_or(input.len(), |(i, _)| i);
                fields.month = Some(locale.month_from_abbrev(&input[..len])?);
                input = &input[len..];
                let _ = take_char(&mut input, '.');
            }
            Token::Day2 => fields.day = Some(take_digits(&mut input, 2, 2)?),
            Token::Day => fields.day = Some(take_digits(&mut input, 1, 2)?),
            Token::Hour => fields.hour = take_digits(&mut input, 2, 2)?,
            Token::Minute => fields.minute = take_digits(&mut input, 2, 2)?,
            Token::Second => fields.second = take_digits(&mut input, 2, 2)?,
            Token::DecimalSeparator => take_char(&mut input, locale.decimal_separator())?,
            Token::Fraction(width) => {
                let digits = take_digits(&mut input, width as usize, width as usize)?;
                fields.nanos = digits * 10u32.pow(9 - width);
            }
            Token::Offset => fields.offset_secs = Some(take_offset(&mut input)?),
            Token::Space => {
                let trimmed = input.trim_start();
                if trimmed.len() == input.len() {
                    return None;
                }
                input = trimmed;
            }
            Token::Literal(c) => take_char(&mut input, c)?,
        }
    }

    if !input.is_empty() {
        return None;
    }

    build(&fields)
}

fn build(fields: &Fields) -> Option<NaiveDateTime> {
    let year = fields.year.filter(|y| (1..=9999).contains(y))?;
    let date = NaiveDate::from_ymd_opt(year, fields.month.unwrap_or(1), fields.day.unwrap_or(1))?;
    let naive = date.and_hms_nano_opt(fields.hour, fields.minute, fields.second, fields.nanos)?;

    let date = match fields.offset_secs {
        None => naive,
        Some(secs) => {
            let offset = FixedOffset::east_opt(secs)?;
            let stamped = offset.from_local_datetime(&naive).single()?;
            stamped.with_timezone(&Local).naive_local()
        }
    };

    (!is_unset(&date)).then_some(date)
}

/// 0001-01-01 00:00:00 is what tag writers store for "no date".
fn is_unset(date: &NaiveDateTime) -> bool {
    NaiveDate::from_ymd_opt(1, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)) == Some(*date)
}

/// Parses `text` against a single pattern from the list under one locale.
pub fn parse_with(text: &str, pattern: &str, locale: Locale) -> Option<NaiveDateTime> {
    match_pattern(&compile(pattern), text, locale)
}

/// Parses a free-text date, trying every pattern for each locale in order.
///
/// Returns `None` when nothing matches. That is a normal negative result,
/// not an error.
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    if text.trim().is_empty() {
        return None;
    }

    Locale::ALL.iter().find_map(|&locale| {
        COMPILED_PATTERNS
            .iter()
            .find_map(|tokens| match_pattern(tokens, text, locale))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn utc_to_local(naive_utc: NaiveDateTime) -> NaiveDateTime {
        Utc.from_utc_datetime(&naive_utc).with_timezone(&Local).naive_local()
    }

    #[test]
    fn test_exif_colon_format() {
        assert_eq!(parse_date_text("2019:07:04 18:22:01"), Some(dt(2019, 7, 4, 18, 22, 1)));
        assert_eq!(parse_date_text("  2019:07:04 18:22:01  "), Some(dt(2019, 7, 4, 18, 22, 1)));
    }

    #[test]
    fn test_month_name_formats() {
        assert_eq!(parse_date_text("Oct 22 13:57:19 2009"), Some(dt(2009, 10, 22, 13, 57, 19)));
        assert_eq!(parse_date_text("Mar 5 08:00:00 2011"), Some(dt(2011, 3, 5, 8, 0, 0)));
        assert_eq!(parse_date_text("OCT 22 13:57:19 2009"), Some(dt(2009, 10, 22, 13, 57, 19)));
    }

    #[test]
    fn test_spanish_month_names_fall_through_to_second_locale() {
        assert_eq!(parse_date_text("ene 15 10:00:00 2012"), Some(dt(2012, 1, 15, 10, 0, 0)));
        assert_eq!(parse_date_text("ago. 03 23:59:59 2015"), Some(dt(2015, 8, 3, 23, 59, 59)));
        assert_eq!(parse_with("ene 15 10:00:00 2012", "MMM dd HH:mm:ss yyyy", Locale::EnUs), None);
    }

    #[test]
    fn test_fractions_respect_locale_decimal_separator() {
        let expected = dt(2020, 1, 15, 10, 30, 0) + chrono::Duration::milliseconds(123);
        assert_eq!(parse_date_text("2020:01:15 10:30:00.123"), Some(expected));
        assert_eq!(parse_date_text("2020-01-15 10:30:00.123"), Some(expected));
        assert_eq!(parse_date_text("2020:01:15 10:30:00,123"), Some(expected));
        assert_eq!(parse_with("2020:01:15 10:30:00,123", "yyyy:MM:dd HH:mm:ss.fff", Locale::EnUs), None);
        assert_eq!(
            parse_with("2020:01:15 10:30:00,123", "yyyy:MM:dd HH:mm:ss.fff", Locale::EsEs),
            Some(expected)
        );
    }

    #[test]
    fn test_iso_formats() {
        assert_eq!(parse_date_text("2018-05-06T07:08:09"), Some(dt(2018, 5, 6, 7, 8, 9)));
        assert_eq!(parse_date_text("2018-05-06T07:08"), Some(dt(2018, 5, 6, 7, 8, 0)));
        assert_eq!(
            parse_date_text("2018-05-06T07:08:09.12"),
            Some(dt(2018, 5, 6, 7, 8, 9) + chrono::Duration::milliseconds(120))
        );
        assert_eq!(
            parse_date_text("2018-05-06T07:08:09.5"),
            Some(dt(2018, 5, 6, 7, 8, 9) + chrono::Duration::milliseconds(500))
        );
    }

    #[test]
    fn test_offsets_convert_to_local_time() {
        let expected = utc_to_local(dt(2018, 5, 6, 5, 8, 9));
        assert_eq!(parse_date_text("2018-05-06T07:08:09+02:00"), Some(expected));
        assert_eq!(parse_date_text("2018:05:06 07:08:09+02:00"), Some(expected));
        assert_eq!(parse_date_text("2018-05-06 07:08:09+0200"), Some(expected));
    }

    #[test]
    fn test_dotted_and_date_only_formats() {
        assert_eq!(parse_date_text("2001.02.03 04:05:06"), Some(dt(2001, 2, 3, 4, 5, 6)));
        assert_eq!(parse_date_text("2001.02.03 04:05"), Some(dt(2001, 2, 3, 4, 5, 0)));
        assert_eq!(parse_date_text("2001:02:03"), Some(dt(2001, 2, 3, 0, 0, 0)));
        assert_eq!(parse_date_text("2001-02-03"), Some(dt(2001, 2, 3, 0, 0, 0)));
        assert_eq!(parse_date_text("2001-02"), Some(dt(2001, 2, 1, 0, 0, 0)));
        assert_eq!(parse_date_text("20010203"), Some(dt(2001, 2, 3, 0, 0, 0)));
        assert_eq!(parse_date_text("2001"), Some(dt(2001, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_every_pattern_parses_its_own_example() {
        let examples = [
            ("yyyy:MM:dd HH:mm:ss", "2010:11:12 13:14:15"),
            ("MMM dd HH:mm:ss yyyy", "Nov 12 13:14:15 2010"),
            ("MMM d HH:mm:ss yyyy", "Nov 2 13:14:15 2010"),
            ("yyyy-MM-dd HH:mm", "2010-11-12 13:14"),
            ("yyyy.MM.dd HH:mm:ss", "2010.11.12 13:14:15"),
            ("yyyy-MM-ddTHH:mm:ss.fff", "2010-11-12T13:14:15.016"),
            ("yyyy-MM", "2010-11"),
            ("yyyyMMdd", "20101112"),
            ("yyyy", "2010"),
        ];
        for (pattern, text) in examples {
            assert!(DATE_PATTERNS.contains(&pattern), "{pattern} missing from list");
            let direct = parse_with(text, pattern, Locale::EnUs);
            assert!(direct.is_some(), "{text} did not match {pattern}");
            assert_eq!(parse_date_text(text), direct);
        }
    }

    #[test]
    fn test_unparseable_text_is_none() {
        assert_eq!(parse_date_text(""), None);
        assert_eq!(parse_date_text("   "), None);
        assert_eq!(parse_date_text("not a date"), None);
        assert_eq!(parse_date_text("2019:13:40 25:61:61"), None);
        assert_eq!(parse_date_text("0000:00:00 00:00:00"), None);
        assert_eq!(parse_date_text("Sat, 15 Jan 2020 10:00:00 GMT"), None);
    }

    #[test]
    fn test_unset_date_is_none() {
        assert_eq!(parse_date_text("0001:01:01 00:00:00"), None);
        assert_eq!(parse_date_text("0001-01-01T00:00:00"), None);
        assert_eq!(parse_date_text("JAN 01 00:00:00 0001"), None);
        assert_eq!(parse_date_text("0001"), None);
        // any other instant in year 1 is a real value
        assert_eq!(parse_date_text("0001:01:01 00:00:01"), Some(dt(1, 1, 1, 0, 0, 1)));
    }

    #[test]
    fn test_pattern_list_order_is_stable() {
        assert_eq!(DATE_PATTERNS.len(), 32);
        assert_eq!(DATE_PATTERNS[0], "yyyy:MM:dd HH:mm:ss");
        assert_eq!(DATE_PATTERNS[31], "yyyy");
    }
}
