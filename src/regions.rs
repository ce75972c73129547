//! Region membership tables.
//!
//! Membership is a literal, case-sensitive match against the country names as they
//! appear in the dataset. Aliases are not resolved: both "Czechia" and
//! "Czech Republic" are listed because both spellings occur in the data, and
//! "Cyprus" belongs to EMMENA and the EU at the same time.

use crate::models::Region;

/// Eastern Mediterranean, Middle East and North Africa.
pub const EMMENA_COUNTRIES: &[&str] = &[
    "Cyprus",
    "Greece",
    "Turkey",
    "Syria",
    "Lebanon",
    "Israel",
    "Palestine",
    "Jordan",
    "Egypt",
    "Saudi Arabia",
    "United Arab Emirates",
    "Oman",
    "Qatar",
    "Bahrain",
    "Kuwait",
    "Yemen",
    "Iraq",
    "Iran",
    "Algeria",
    "Morocco",
    "Tunisia",
    "Libya",
    "Sudan",
];

/// EU member states.
pub const EU_COUNTRIES: &[&str] = &[
    "Austria",
    "Belgium",
    "Bulgaria",
    "Croatia",
    "Cyprus",
    "Czechia",
    "Czech Republic",
    "Denmark",
    "Estonia",
    "Finland",
    "France",
    "Germany",
    "Greece",
    "Hungary",
    "Ireland",
    "Italy",
    "Latvia",
    "Lithuania",
    "Luxembourg",
    "Malta",
    "Netherlands",
    "Poland",
    "Portugal",
    "Romania",
    "Slovakia",
    "Slovenia",
    "Spain",
    "Sweden",
];

/// Member list of a named region; `None` for [`Region::All`], which has no list.
pub fn members(region: Region) -> Option<&'static [&'static str]> {
    match region {
        Region::All => None,
        Region::Emmena => Some(EMMENA_COUNTRIES),
        Region::Eu => Some(EU_COUNTRIES),
    }
}

/// Does `country` belong to `region`? Always true for [`Region::All`].
pub fn belongs_to(country: &str, region: Region) -> bool {
    match members(region) {
        None => true,
        Some(list) => list.contains(&country),
    }
}
