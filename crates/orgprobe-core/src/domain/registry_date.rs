use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Iso8601;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::parsing::Parsed;
use time::{Date, Month};

use crate::ValidationError;

const SHORT_FORMAT: &str = "dd.mm.yy";
const LONG_FORMAT: &str = "dd/mm/yyyy";

const SHORT_LAYOUT: &[BorrowedFormatItem<'_>] =
    format_description!("[day].[month].[year repr:last_two]");
const LONG_LAYOUT: &[BorrowedFormatItem<'_>] = format_description!("[day]/[month]/[year]");

/// Two-digit years at or above this value belong to the 1900s.
const CENTURY_PIVOT: u8 = 69;

/// Calendar date reported by a registry, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistryDate(Date);

impl RegistryDate {
    pub fn from_calendar(year: i32, month: u8, day: u8) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate {
            value: format!("{year:04}-{month:02}-{day:02}"),
            expected: "a calendar date",
        };
        let month = Month::try_from(month).map_err(|_| invalid())?;
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| invalid())
    }

    /// Parse `dd.mm.yy`, mapping `69..=99` to the 1900s and `00..=68` to the 2000s.
    pub fn parse_short(input: &str) -> Result<Self, ValidationError> {
        let invalid = || invalid_format(input, SHORT_FORMAT);
        let mut parsed = Parsed::new();
        let rest = parsed
            .parse_items(input.trim().as_bytes(), SHORT_LAYOUT)
            .map_err(|_| invalid())?;
        if !rest.is_empty() {
            return Err(invalid());
        }

        let (Some(year), Some(month), Some(day)) =
            (parsed.year_last_two(), parsed.month(), parsed.day())
        else {
            return Err(invalid());
        };
        let century = if year >= CENTURY_PIVOT { 1900 } else { 2000 };
        Date::from_calendar_date(century + i32::from(year), month, day.get())
            .map(Self)
            .map_err(|_| invalid())
    }

    /// Parse `dd/mm/yyyy`.
    pub fn parse_long(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input.trim(), LONG_LAYOUT)
            .map(Self)
            .map_err(|_| invalid_format(input, LONG_FORMAT))
    }

    pub fn into_inner(self) -> Date {
        self.0
    }
}

fn invalid_format(input: &str, expected: &'static str) -> ValidationError {
    ValidationError::InvalidDate {
        value: input.to_owned(),
        expected,
    }
}

impl Display for RegistryDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for RegistryDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RegistryDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Date::parse(&value, &Iso8601::DATE)
            .map(Self)
            .map_err(D::Error::custom)
    }
}
