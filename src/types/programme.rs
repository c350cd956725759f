// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Weekly heating programmes.
//!
//! A programme maps each weekday to an ordered sequence of setpoints. Each
//! setpoint holds until its `until` time of day; the entry with
//! `until = 24:00` terminates the usable sequence for that day. The gateway
//! numbers weekdays Saturday-first, and this module follows that numbering
//! everywhere.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValueError;
use crate::types::Temperature;

/// Maximum number of setpoints the gateway stores per day.
pub const MAX_SETPOINTS_PER_DAY: usize = 13;

/// Number of setpoints carried in a programme write frame.
pub(crate) const SETPOINTS_PER_WRITE: usize = 7;

/// A weekday in the gateway's Saturday-first week.
///
/// The wire index of `Saturday` is 0 and of `Friday` is 6. Derived ordering
/// follows the same numbering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Weekday {
    /// Index 0.
    Saturday,
    /// Index 1.
    Sunday,
    /// Index 2.
    Monday,
    /// Index 3.
    Tuesday,
    /// Index 4.
    Wednesday,
    /// Index 5.
    Thursday,
    /// Index 6.
    Friday,
}

impl Weekday {
    /// All weekdays in gateway order.
    pub const ALL: [Self; 7] = [
        Self::Saturday,
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
    ];

    /// Decodes a gateway weekday index.
    ///
    /// The decalcification field is three bits wide (0-7), one more than a
    /// week; indexes wrap back onto the Saturday-first cycle.
    #[must_use]
    pub(crate) const fn from_gateway_index(index: u8) -> Self {
        Self::ALL[(index % 7) as usize]
    }

    /// Returns the gateway's Saturday-first index (0-6).
    #[must_use]
    pub const fn gateway_index(self) -> u8 {
        self as u8
    }

    /// Returns the lowercase weekday name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "saturday" => Ok(Self::Saturday),
            "sunday" => Ok(Self::Sunday),
            "monday" => Ok(Self::Monday),
            "tuesday" => Ok(Self::Tuesday),
            "wednesday" => Ok(Self::Wednesday),
            "thursday" => Ok(Self::Thursday),
            "friday" => Ok(Self::Friday),
            _ => Err(ValueError::InvalidWeekday(s.to_string())),
        }
    }
}

impl Serialize for Weekday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// A clock time marking the end of a setpoint's validity.
///
/// Stored as minutes since midnight on the protocol's 5-minute grid.
/// `24:00` is a valid value: it is the sentinel that terminates a day's
/// setpoint sequence.
///
/// # Examples
///
/// ```
/// use maxcube_lib::types::TimeOfDay;
///
/// let t: TimeOfDay = "06:30".parse().unwrap();
/// assert_eq!(t.minutes(), 390);
/// assert_eq!(t.to_string(), "06:30");
/// assert!(TimeOfDay::END_OF_DAY.is_end_of_day());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight (`00:00`).
    pub const MIDNIGHT: Self = Self(0);

    /// The `24:00` sentinel terminating a day's setpoints.
    pub const END_OF_DAY: Self = Self(24 * 60);

    /// Creates a time of day from minutes since midnight.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TimeNotFiveMinutes`] off the 5-minute grid and
    /// [`ValueError::TimePastMidnight`] past `24:00`.
    pub fn from_minutes(minutes: u16) -> Result<Self, ValueError> {
        if minutes % 5 != 0 {
            return Err(ValueError::TimeNotFiveMinutes(minutes));
        }
        if minutes > 24 * 60 {
            return Err(ValueError::TimePastMidnight(minutes));
        }
        Ok(Self(minutes))
    }

    /// Decodes the 9-bit wire field (units of 5 minutes).
    #[must_use]
    pub(crate) const fn from_raw(five_minute_units: u16) -> Self {
        Self(five_minute_units * 5)
    }

    /// Returns the 9-bit wire field (units of 5 minutes).
    #[must_use]
    pub(crate) const fn raw(self) -> u16 {
        self.0 / 5
    }

    /// Returns minutes since midnight.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    /// Returns `true` for the `24:00` sentinel.
    #[must_use]
    pub fn is_end_of_day(self) -> bool {
        self == Self::END_OF_DAY
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hours, minutes) = s
            .split_once(':')
            .ok_or_else(|| ValueError::InvalidTimeOfDay(s.to_string()))?;
        let hours: u16 = hours
            .parse()
            .map_err(|_| ValueError::InvalidTimeOfDay(s.to_string()))?;
        let minutes: u16 = minutes
            .parse()
            .map_err(|_| ValueError::InvalidTimeOfDay(s.to_string()))?;
        if minutes >= 60 && !(hours == 24 && minutes == 0) {
            return Err(ValueError::InvalidTimeOfDay(s.to_string()));
        }
        Self::from_minutes(hours * 60 + minutes)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// One entry of a day programme: hold `temp` until `until`.
///
/// Wire format is two big-endian bytes: the top 7 bits carry the
/// temperature in half degrees, the low 9 bits the `until` time in
/// 5-minute units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Setpoint {
    /// Target temperature while this setpoint is active.
    pub temp: Temperature,
    /// End of this setpoint's validity.
    pub until: TimeOfDay,
}

impl Setpoint {
    /// Creates a setpoint.
    #[must_use]
    pub const fn new(temp: Temperature, until: TimeOfDay) -> Self {
        Self { temp, until }
    }

    /// The `{0, 00:00}` filler used to pad short programme writes.
    pub(crate) const PADDING: Self = Self {
        temp: Temperature::from_raw(0),
        until: TimeOfDay::MIDNIGHT,
    };

    /// Packs this setpoint into its two wire bytes.
    #[must_use]
    pub(crate) fn to_wire(self) -> [u8; 2] {
        let word = (u16::from(self.temp.raw()) << 9) | (self.until.raw() & 0x1FF);
        word.to_be_bytes()
    }

    /// Unpacks a setpoint from its two wire bytes.
    #[must_use]
    pub(crate) fn from_wire(bytes: [u8; 2]) -> Self {
        let word = u16::from_be_bytes(bytes);
        #[allow(clippy::cast_possible_truncation)]
        Self {
            temp: Temperature::from_raw((word >> 9) as u8),
            until: TimeOfDay::from_raw(word & 0x1FF),
        }
    }
}

impl fmt::Display for Setpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} until {}", self.temp, self.until)
    }
}

/// A weekly heating programme.
///
/// Maps weekdays to their ordered setpoint sequences. Days the gateway has
/// not reported (or a partial configuration file omits) are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Programme {
    days: BTreeMap<Weekday, Vec<Setpoint>>,
}

impl Programme {
    /// Creates an empty programme.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the setpoints of one day, empty if unknown.
    #[must_use]
    pub fn day(&self, weekday: Weekday) -> &[Setpoint] {
        self.days.get(&weekday).map_or(&[], Vec::as_slice)
    }

    /// Replaces the setpoints of one day.
    pub fn set_day(&mut self, weekday: Weekday, setpoints: Vec<Setpoint>) {
        self.days.insert(weekday, setpoints);
    }

    /// Returns `true` if no day has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Iterates over the recorded days in gateway order.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[Setpoint])> {
        self.days.iter().map(|(day, sps)| (*day, sps.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(celsius: f64, until: &str) -> Setpoint {
        Setpoint::new(
            Temperature::from_celsius(celsius).unwrap(),
            until.parse().unwrap(),
        )
    }

    #[test]
    fn weekday_indexes_are_saturday_first() {
        assert_eq!(Weekday::Saturday.gateway_index(), 0);
        assert_eq!(Weekday::Friday.gateway_index(), 6);
        assert_eq!(Weekday::from_gateway_index(6), Weekday::Friday);
        // Three-bit field values past the week wrap around.
        assert_eq!(Weekday::from_gateway_index(7), Weekday::Saturday);
    }

    #[test]
    fn weekday_ordering_matches_gateway() {
        assert!(Weekday::Saturday < Weekday::Sunday);
        assert!(Weekday::Sunday < Weekday::Monday);
        assert!(Weekday::Thursday < Weekday::Friday);
    }

    #[test]
    fn time_of_day_grid() {
        assert!(TimeOfDay::from_minutes(65).unwrap().minutes() == 65);
        assert!(TimeOfDay::from_minutes(63).is_err());
        assert!(TimeOfDay::from_minutes(1445).is_err());
        assert_eq!(TimeOfDay::END_OF_DAY.minutes(), 1440);
    }

    #[test]
    fn time_of_day_parse_and_display() {
        assert_eq!("06:30".parse::<TimeOfDay>().unwrap().minutes(), 390);
        assert_eq!("24:00".parse::<TimeOfDay>().unwrap(), TimeOfDay::END_OF_DAY);
        assert_eq!(TimeOfDay::END_OF_DAY.to_string(), "24:00");
        assert!("24:30".parse::<TimeOfDay>().is_err());
        assert!("12:61".parse::<TimeOfDay>().is_err());
        assert!("noon".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn setpoint_wire_round_trip() {
        let original = sp(21.5, "06:30");
        let bytes = original.to_wire();
        assert_eq!(Setpoint::from_wire(bytes), original);
    }

    #[test]
    fn setpoint_wire_layout() {
        // 17 degrees until 24:00: temp raw 34, time raw 288.
        let bytes = sp(17.0, "24:00").to_wire();
        assert_eq!(bytes, [0x45, 0x20]);
    }

    #[test]
    fn setpoint_serde_matches_config_format() {
        let json = serde_json::to_string(&sp(21.0, "06:30")).unwrap();
        assert_eq!(json, r#"{"temp":21.0,"until":"06:30"}"#);
    }

    #[test]
    fn programme_days_are_independent() {
        let mut prog = Programme::new();
        prog.set_day(Weekday::Monday, vec![sp(17.0, "24:00")]);
        assert_eq!(prog.day(Weekday::Monday).len(), 1);
        assert!(prog.day(Weekday::Tuesday).is_empty());
    }

    #[test]
    fn programme_deserializes_partial_weeks() {
        let json = r#"{"monday":[{"temp":17.0,"until":"24:00"}]}"#;
        let prog: Programme = serde_json::from_str(json).unwrap();
        assert_eq!(prog.day(Weekday::Monday).len(), 1);
        assert!(prog.day(Weekday::Sunday).is_empty());
    }
}
