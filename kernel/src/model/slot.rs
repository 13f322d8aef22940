use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The bookable hour-aligned time slots. The service window runs from
/// 08:00 to 21:00; there are no half-hour slots. The wire and storage
/// representation is the slot token, e.g. `"18:00-19:00"`, derived from
/// the start hour plus one hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TimeSlot {
    H08,
    H09,
    H10,
    H11,
    H12,
    H13,
    H14,
    H15,
    H16,
    H17,
    H18,
    H19,
    H20,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 13] = [
        TimeSlot::H08,
        TimeSlot::H09,
        TimeSlot::H10,
        TimeSlot::H11,
        TimeSlot::H12,
        TimeSlot::H13,
        TimeSlot::H14,
        TimeSlot::H15,
        TimeSlot::H16,
        TimeSlot::H17,
        TimeSlot::H18,
        TimeSlot::H19,
        TimeSlot::H20,
    ];

    pub fn start_hour(self) -> u8 {
        match self {
            TimeSlot::H08 => 8,
            TimeSlot::H09 => 9,
            TimeSlot::H10 => 10,
            TimeSlot::H11 => 11,
            TimeSlot::H12 => 12,
            TimeSlot::H13 => 13,
            TimeSlot::H14 => 14,
            TimeSlot::H15 => 15,
            TimeSlot::H16 => 16,
            TimeSlot::H17 => 17,
            TimeSlot::H18 => 18,
            TimeSlot::H19 => 19,
            TimeSlot::H20 => 20,
        }
    }

    pub fn from_start_hour(hour: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.start_hour() == hour)
    }

    /// The canonical slot token, `"HH:00-HH+1:00"`.
    pub fn token(self) -> String {
        let start = self.start_hour();
        format!("{:02}:00-{:02}:00", start, start + 1)
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.token() == token)
    }

    /// The instant the slot begins on the given calendar date.
    pub fn start_datetime(self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(u32::from(self.start_hour()), 0, 0)
            .expect("slot start hour is within 0..24")
            .and_utc()
    }
}

impl From<TimeSlot> for u8 {
    fn from(value: TimeSlot) -> Self {
        value.start_hour()
    }
}

impl TryFrom<u8> for TimeSlot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TimeSlot::from_start_hour(value)
            .ok_or_else(|| format!("{value} is not a bookable slot start hour"))
    }
}
