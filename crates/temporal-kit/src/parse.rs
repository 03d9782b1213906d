//! Canonical textual grammar: an extended ISO-8601 / RFC 9557 profile.
//!
//! ```text
//! date      = [+-]YYYYYY | YYYY, "-", MM, "-", DD
//! time      = HH, ":", MM, [":", SS, [("." | ","), 1*9DIGIT]]
//! datetime  = date, [("T" | " "), time]
//! offset    = "Z" | ("+" | "-"), HH, [[":"], MM, [[":"], SS]]
//! annots    = *("[", ["!"], (zone | "u-ca=" calendar), "]")
//! duration  = [+-], "P", [nY], [nM], [nW], [nD], ["T", [nH], [nM], [n[.f]S]]
//! ```
//!
//! The parser only checks shape. Range validation happens in the value
//! constructors so that every kind reports the same field names.

/// Raw date fields as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IsoDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Raw time fields as written. A leap second (`:60`) is read as `:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct IsoTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub nanosecond: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IsoOffset {
    /// The `Z` designator.
    Utc,
    /// A numeric offset in seconds east of UTC.
    Fixed(i32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParsedDateTime {
    pub date: Option<IsoDate>,
    pub time: Option<IsoTime>,
    pub offset: Option<IsoOffset>,
    pub zone: Option<String>,
    pub calendar: Option<String>,
}

/// Raw duration components with the leading sign already applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ParsedDuration {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub nanoseconds: i64,
}

struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_any(&mut self, set: &[u8]) -> Option<u8> {
        match self.peek() {
            Some(b) if set.contains(&b) => {
                self.pos += 1;
                Some(b)
            }
            _ => None,
        }
    }

    fn expect(&mut self, b: u8) -> Result<(), String> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", b as char)))
        }
    }

    /// Read exactly `n` ASCII digits.
    fn digits(&mut self, n: usize) -> Result<u32, String> {
        let end = self.pos + n;
        if end > self.bytes.len() || !self.bytes[self.pos..end].iter().all(u8::is_ascii_digit) {
            return Err(self.error(&format!("expected {n} digits")));
        }
        let value = self.bytes[self.pos..end]
            .iter()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
        self.pos = end;
        Ok(value)
    }

    /// Read one or more ASCII digits as an unsigned integer.
    fn number(&mut self) -> Result<i64, String> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a number"));
        }
        self.src[start..self.pos]
            .parse::<i64>()
            .map_err(|_| self.error("number too large"))
    }

    /// Read a decimal fraction of 1-9 digits as nanoseconds.
    fn fraction(&mut self) -> Result<u32, String> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let len = self.pos - start;
        if len == 0 || len > 9 {
            return Err(self.error("fraction must have 1 to 9 digits"));
        }
        let digits = &self.src[start..self.pos];
        let padded = format!("{digits:0<9}");
        padded
            .parse::<u32>()
            .map_err(|_| self.error("invalid fraction"))
    }

    fn error(&self, what: &str) -> String {
        format!("{what} at position {} in '{}'", self.pos, self.src)
    }
}

/// Parse any date, time, date-time, instant, or zoned date-time string.
pub(crate) fn parse_date_time(s: &str) -> Result<ParsedDateTime, String> {
    let mut cur = Cursor::new(s.trim());
    if cur.at_end() {
        return Err("empty string".to_string());
    }

    let mut parsed = ParsedDateTime::default();

    if looks_like_time(&cur) {
        cur.eat_any(b"Tt");
        parsed.time = Some(parse_time(&mut cur)?);
    } else {
        parsed.date = Some(parse_date(&mut cur)?);
        if cur.eat_any(b"Tt ").is_some() {
            parsed.time = Some(parse_time(&mut cur)?);
        }
    }

    if parsed.time.is_some() {
        parsed.offset = parse_offset(&mut cur)?;
    }
    parse_annotations(&mut cur, &mut parsed)?;

    if !cur.at_end() {
        return Err(cur.error("unexpected trailing characters"));
    }
    Ok(parsed)
}

fn looks_like_time(cur: &Cursor<'_>) -> bool {
    match cur.peek() {
        Some(b'T') | Some(b't') => true,
        Some(b) if b.is_ascii_digit() => {
            cur.peek_at(1).is_some_and(|b| b.is_ascii_digit()) && cur.peek_at(2) == Some(b':')
        }
        _ => false,
    }
}

fn parse_date(cur: &mut Cursor<'_>) -> Result<IsoDate, String> {
    let year = match cur.eat_any(b"+-") {
        Some(sign) => {
            let magnitude = cur.digits(6)? as i32;
            if sign == b'-' {
                if magnitude == 0 {
                    return Err(cur.error("year -000000 is not allowed"));
                }
                -magnitude
            } else {
                magnitude
            }
        }
        None => cur.digits(4)? as i32,
    };
    cur.expect(b'-')?;
    let month = cur.digits(2)?;
    cur.expect(b'-')?;
    let day = cur.digits(2)?;
    Ok(IsoDate { year, month, day })
}

fn parse_time(cur: &mut Cursor<'_>) -> Result<IsoTime, String> {
    let hour = cur.digits(2)?;
    cur.expect(b':')?;
    let minute = cur.digits(2)?;
    let mut second = 0;
    let mut nanosecond = 0;
    if cur.eat(b':') {
        second = cur.digits(2)?;
        if cur.eat_any(b".,").is_some() {
            nanosecond = cur.fraction()?;
        }
    }
    if second == 60 {
        second = 59;
    }
    Ok(IsoTime {
        hour,
        minute,
        second,
        nanosecond,
    })
}

fn parse_offset(cur: &mut Cursor<'_>) -> Result<Option<IsoOffset>, String> {
    if cur.eat_any(b"Zz").is_some() {
        return Ok(Some(IsoOffset::Utc));
    }
    let sign = match cur.eat_any(b"+-") {
        Some(b'-') => -1,
        Some(_) => 1,
        None => return Ok(None),
    };
    let hours = cur.digits(2)?;
    let mut minutes = 0;
    let mut seconds = 0;
    if cur.eat(b':') || cur.peek().is_some_and(|b| b.is_ascii_digit()) {
        minutes = cur.digits(2)?;
        if cur.eat(b':') || cur.peek().is_some_and(|b| b.is_ascii_digit()) {
            seconds = cur.digits(2)?;
        }
    }
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(cur.error("offset out of range"));
    }
    let total = (hours * 3600 + minutes * 60 + seconds) as i32;
    Ok(Some(IsoOffset::Fixed(sign * total)))
}

fn parse_annotations(cur: &mut Cursor<'_>, parsed: &mut ParsedDateTime) -> Result<(), String> {
    while cur.eat(b'[') {
        cur.eat(b'!');
        let start = cur.pos;
        while cur.peek().is_some_and(|b| b != b']') {
            cur.pos += 1;
        }
        let body = &cur.src[start..cur.pos];
        cur.expect(b']')?;

        if let Some((key, value)) = body.split_once('=') {
            if key != "u-ca" {
                return Err(format!("unsupported annotation key '{key}'"));
            }
            if parsed.calendar.replace(value.to_string()).is_some() {
                return Err("duplicate calendar annotation".to_string());
            }
        } else {
            if body.is_empty() {
                return Err("empty time zone annotation".to_string());
            }
            if parsed.calendar.is_some() || parsed.zone.replace(body.to_string()).is_some() {
                return Err("time zone annotation must come first and only once".to_string());
            }
        }
    }
    Ok(())
}

/// Parse an ISO-8601 duration such as `P1Y2M`, `-PT1.5S` or `P3W`.
pub(crate) fn parse_duration(s: &str) -> Result<ParsedDuration, String> {
    let mut cur = Cursor::new(s.trim());
    let sign: i64 = match cur.eat_any(b"+-") {
        Some(b'-') => -1,
        _ => 1,
    };
    if cur.eat_any(b"Pp").is_none() {
        return Err(cur.error("expected 'P'"));
    }

    let mut out = ParsedDuration::default();
    let mut found_any = false;
    // Designators must appear in order; `rank` remembers the last one read.
    let mut rank = 0;

    while !cur.at_end() && !matches!(cur.peek(), Some(b'T') | Some(b't')) {
        let n = cur.number()?;
        let (next_rank, slot) = match cur.peek().map(|b| b.to_ascii_uppercase()) {
            Some(b'Y') => (1, &mut out.years),
            Some(b'M') => (2, &mut out.months),
            Some(b'W') => (3, &mut out.weeks),
            Some(b'D') => (4, &mut out.days),
            _ => return Err(cur.error("expected one of Y, M, W, D")),
        };
        if next_rank <= rank {
            return Err(cur.error("duration designators out of order"));
        }
        cur.pos += 1;
        rank = next_rank;
        *slot = n;
        found_any = true;
    }

    if cur.eat_any(b"Tt").is_some() {
        let mut found_time = false;
        let mut rank = 0;
        while !cur.at_end() {
            let n = cur.number()?;
            let mut nanos = 0;
            if cur.eat_any(b".,").is_some() {
                nanos = cur.fraction()?;
                if !matches!(cur.peek(), Some(b'S') | Some(b's')) {
                    return Err(cur.error("only seconds may carry a fraction"));
                }
            }
            let (next_rank, slot) = match cur.peek().map(|b| b.to_ascii_uppercase()) {
                Some(b'H') => (1, &mut out.hours),
                Some(b'M') => (2, &mut out.minutes),
                Some(b'S') => (3, &mut out.seconds),
                _ => return Err(cur.error("expected one of H, M, S")),
            };
            if next_rank <= rank {
                return Err(cur.error("duration designators out of order"));
            }
            cur.pos += 1;
            rank = next_rank;
            *slot = n;
            out.nanoseconds = i64::from(nanos);
            found_time = true;
        }
        if !found_time {
            return Err("'T' must be followed by a time component".to_string());
        }
        found_any = true;
    }

    if !found_any {
        return Err(format!("duration has no components: '{s}'"));
    }

    if sign < 0 {
        for field in [
            &mut out.years,
            &mut out.months,
            &mut out.weeks,
            &mut out.days,
            &mut out.hours,
            &mut out.minutes,
            &mut out.seconds,
            &mut out.nanoseconds,
        ] {
            *field = -*field;
        }
    }
    Ok(out)
}

/// Render nanoseconds as a fraction with trailing zeros trimmed: `.5`, `.000001`.
pub(crate) fn fraction_suffix(nanos: u32) -> String {
    if nanos == 0 {
        return String::new();
    }
    let digits = format!("{nanos:09}");
    format!(".{}", digits.trim_end_matches('0'))
}

/// Render a year in the canonical 4-digit or signed 6-digit form.
pub(crate) fn format_year(year: i32) -> String {
    if (0..=9999).contains(&year) {
        format!("{year:04}")
    } else if year < 0 {
        format!("-{:06}", year.unsigned_abs())
    } else {
        format!("+{year:06}")
    }
}

/// Render an offset in seconds as `+HH:MM` (or `+HH:MM:SS` when needed).
pub(crate) fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    let (h, m, s) = (abs / 3600, (abs % 3600) / 60, abs % 60);
    if s == 0 {
        format!("{sign}{h:02}:{m:02}")
    } else {
        format!("{sign}{h:02}:{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date() {
        let p = parse_date_time("2023-12-25").unwrap();
        assert_eq!(
            p.date,
            Some(IsoDate {
                year: 2023,
                month: 12,
                day: 25
            })
        );
        assert!(p.time.is_none());
        assert!(p.offset.is_none());
    }

    #[test]
    fn test_parse_extended_year() {
        let p = parse_date_time("-000044-03-15").unwrap();
        assert_eq!(p.date.unwrap().year, -44);
        let p = parse_date_time("+012345-01-01").unwrap();
        assert_eq!(p.date.unwrap().year, 12345);
        assert!(parse_date_time("-000000-01-01").is_err());
    }

    #[test]
    fn test_parse_time_only() {
        let p = parse_date_time("14:30:45.123").unwrap();
        assert!(p.date.is_none());
        let t = p.time.unwrap();
        assert_eq!((t.hour, t.minute, t.second), (14, 30, 45));
        assert_eq!(t.nanosecond, 123_000_000);

        let p = parse_date_time("T09:05").unwrap();
        assert_eq!(p.time.unwrap().minute, 5);
    }

    #[test]
    fn test_parse_space_separator() {
        let p = parse_date_time("2023-12-25 14:30").unwrap();
        assert_eq!(p.time.unwrap().hour, 14);
    }

    #[test]
    fn test_parse_offsets() {
        let p = parse_date_time("2023-12-25T14:30:00Z").unwrap();
        assert_eq!(p.offset, Some(IsoOffset::Utc));
        let p = parse_date_time("2023-12-25T14:30:00-05:00").unwrap();
        assert_eq!(p.offset, Some(IsoOffset::Fixed(-18_000)));
        let p = parse_date_time("2023-12-25T14:30:00+0530").unwrap();
        assert_eq!(p.offset, Some(IsoOffset::Fixed(19_800)));
    }

    #[test]
    fn test_parse_annotations() {
        let p = parse_date_time("2023-12-25T14:30:00-05:00[America/New_York][u-ca=gregory]")
            .unwrap();
        assert_eq!(p.zone.as_deref(), Some("America/New_York"));
        assert_eq!(p.calendar.as_deref(), Some("gregory"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_date_time("").is_err());
        assert!(parse_date_time("invalid-date").is_err());
        assert!(parse_date_time("2023-1-5").is_err());
        assert!(parse_date_time("2023-12-25T").is_err());
        assert!(parse_date_time("2023-12-25x").is_err());
        assert!(parse_date_time("2023-12-25T10:00[foo=bar]").is_err());
    }

    #[test]
    fn test_parse_leap_second_reads_as_59() {
        let p = parse_date_time("2016-12-31T23:59:60Z").unwrap();
        assert_eq!(p.time.unwrap().second, 59);
    }

    #[test]
    fn test_parse_duration_full() {
        let d = parse_duration("P1Y2M3W4DT5H6M7.008S").unwrap();
        assert_eq!(d.years, 1);
        assert_eq!(d.months, 2);
        assert_eq!(d.weeks, 3);
        assert_eq!(d.days, 4);
        assert_eq!(d.hours, 5);
        assert_eq!(d.minutes, 6);
        assert_eq!(d.seconds, 7);
        assert_eq!(d.nanoseconds, 8_000_000);
    }

    #[test]
    fn test_parse_duration_negative() {
        let d = parse_duration("-PT1.5S").unwrap();
        assert_eq!(d.seconds, -1);
        assert_eq!(d.nanoseconds, -500_000_000);
    }

    #[test]
    fn test_parse_duration_month_vs_minute() {
        let d = parse_duration("P1MT1M").unwrap();
        assert_eq!(d.months, 1);
        assert_eq!(d.minutes, 1);
    }

    #[test]
    fn test_parse_duration_errors() {
        assert!(parse_duration("P").is_err());
        assert!(parse_duration("PT").is_err());
        assert!(parse_duration("1D").is_err());
        assert!(parse_duration("P1D2Y").is_err());
        assert!(parse_duration("PT1.5H").is_err());
        assert!(parse_duration("P1X").is_err());
    }

    #[test]
    fn test_fraction_suffix_trims_zeros() {
        assert_eq!(fraction_suffix(0), "");
        assert_eq!(fraction_suffix(500_000_000), ".5");
        assert_eq!(fraction_suffix(1_000), ".000001");
    }

    #[test]
    fn test_format_year_forms() {
        assert_eq!(format_year(2023), "2023");
        assert_eq!(format_year(5), "0005");
        assert_eq!(format_year(-44), "-000044");
        assert_eq!(format_year(12345), "+012345");
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(0), "+00:00");
        assert_eq!(format_offset(-18_000), "-05:00");
        assert_eq!(format_offset(19_800), "+05:30");
    }
}
