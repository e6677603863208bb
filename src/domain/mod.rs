//! Domain types for the site management backend.
//!
//! Enumerations here are persisted as their lowercase text form and travel
//! over the wire in the same form, so `as_str`, `FromStr` and serde agree.

pub mod attendance;
pub mod positions;

use chrono::{DateTime, NaiveDate};
use thiserror::Error;

/// Returned when a text value does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum! {
    /// Role claim carried by users and their tokens.
    Role, "role" {
        Admin => "admin",
        User => "user",
    }
}

text_enum! {
    EmployeeCategory, "employee category" {
        Skilled => "skilled",
        Unskilled => "unskilled",
        Supervisor => "supervisor",
        Specialist => "specialist",
    }
}

text_enum! {
    EmployeeStatus, "employee status" {
        Active => "active",
        Inactive => "inactive",
        Terminated => "terminated",
    }
}

text_enum! {
    AttendanceStatus, "attendance status" {
        Present => "present",
        Absent => "absent",
        Late => "late",
        HalfDay => "halfday",
    }
}

text_enum! {
    PaymentType, "payment type" {
        Expense => "expense",
        Income => "income",
    }
}

text_enum! {
    RecipientType, "recipient type" {
        Employee => "employee",
        Contractor => "contractor",
        Supplier => "supplier",
    }
}

text_enum! {
    PaymentCategory, "payment category" {
        Wages => "wages",
        Supplies => "supplies",
        Contract => "contract",
        Other => "other",
    }
}

text_enum! {
    PaymentMethod, "payment method" {
        Cash => "cash",
        Bank => "bank",
        Mobile => "mobile",
    }
}

text_enum! {
    PaymentStatus, "payment status" {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
    }
}

text_enum! {
    ProjectStatus, "project status" {
        NotStarted => "not_started",
        OnTrack => "on_track",
        Delayed => "delayed",
        Completed => "completed",
    }
}

text_enum! {
    SiteStatus, "site status" {
        Active => "active",
        OnHold => "on_hold",
        Completed => "completed",
    }
}

text_enum! {
    Specialization, "specialization" {
        GeneralConstruction => "general_construction",
        Electrical => "electrical",
        Plumbing => "plumbing",
        Hvac => "hvac",
        Masonry => "masonry",
        Carpentry => "carpentry",
        Roofing => "roofing",
    }
}

text_enum! {
    ContractorStatus, "contractor status" {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
}

text_enum! {
    Availability, "availability" {
        Available => "available",
        Engaged => "engaged",
        Unavailable => "unavailable",
    }
}

text_enum! {
    SupplierCategory, "supplier category" {
        BuildingMaterials => "building_materials",
        Electrical => "electrical",
        Plumbing => "plumbing",
        Tools => "tools",
        Other => "other",
    }
}

text_enum! {
    SupplierStatus, "supplier status" {
        Active => "active",
        Inactive => "inactive",
    }
}

impl Role {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Storage format for calendar days.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parses a calendar day from either `YYYY-MM-DD` or a full RFC 3339
/// timestamp. Timestamps keep the day as written in their own offset.
#[must_use]
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DAY_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

#[must_use]
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Normalizes an RFC 3339 timestamp, rejecting anything unparseable.
#[must_use]
pub fn parse_timestamp(input: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(input.trim())
        .ok()
        .map(|dt| dt.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_text_round_trips_through_from_str() {
        for status in AttendanceStatus::ALL {
            assert_eq!(status.as_str().parse::<AttendanceStatus>(), Ok(*status));
        }
        assert_eq!("halfday".parse(), Ok(AttendanceStatus::HalfDay));
    }

    #[test]
    fn unknown_variant_names_the_kind() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "invalid role: 'owner'");
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ProjectStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
        let parsed: PaymentMethod = serde_json::from_str("\"mobile\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Mobile);
    }

    #[test]
    fn parse_day_accepts_plain_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(parse_day("2024-01-10"), Some(expected));
        assert_eq!(parse_day("2024-01-10T23:30:00+03:00"), Some(expected));
        assert_eq!(parse_day("10/01/2024"), None);
        assert_eq!(format_day(expected), "2024-01-10");
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("2024-01-10T08:00:00Z").is_some());
        assert!(parse_timestamp("eight o'clock").is_none());
    }
}
