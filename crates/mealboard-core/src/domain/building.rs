//! Building Directory - static lookup from building code to display name
//! and geographic coordinate.
//!
//! The directory is a frozen table compiled into the binary; there is no
//! mutation API. Coordinates stored here are authoritative: post creation
//! copies them into the record and ignores anything the client supplied.

use std::collections::HashMap;
use std::sync::LazyLock;

/// A campus building with its canonical pin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    pub code: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

/// Campus buildings that can host a post. A deliberate subset of the full
/// campus: entries without surveyed coordinates are left out.
static DIRECTORY: &[Building] = &[
    Building { code: "ADH", name: "Adelbert Hall", lat: 41.5050, lng: -81.6083 },
    Building { code: "AML", name: "Allen Memorial Library", lat: 41.5060, lng: -81.608 },
    Building { code: "CRH", name: "Crawford Hall", lat: 41.504780696786995, lng: -81.60967835590283 },
    Building { code: "FOR", name: "Ford Auditorium", lat: 41.50609968944791, lng: -81.60842541368149 },
    Building { code: "FRC", name: "Fribley Commons", lat: 41.50128097018468, lng: -81.60269321354278 },
    Building { code: "GUH", name: "Guilford House", lat: 41.50876841513002, lng: -81.60823050010588 },
    Building { code: "HAY", name: "Haydn Hall", lat: 41.50878618991214, lng: -81.60716367362305 },
    Building { code: "HIC", name: "Hitchcock Hall", lat: 41.51409067368143, lng: -81.60484838290454 },
    Building { code: "KSL", name: "Kelvin Smith Library", lat: 41.507354, lng: -81.609313 },
    Building { code: "LTC", name: "Leutner Commons", lat: 41.514294, lng: -81.605402 },
    Building { code: "NOD", name: "Nord Hall", lat: 41.502588, lng: -81.607652 },
    Building { code: "OLI", name: "Olin Building", lat: 41.502205, lng: -81.607843 },
    Building { code: "SEV", name: "Severance Hall", lat: 41.506601, lng: -81.610450 },
    Building { code: "THW", name: "Thwing Center", lat: 41.507115, lng: -81.608569 },
    Building { code: "TVC", name: "Tinkham Veale University Center", lat: 41.508139, lng: -81.608828 },
    Building { code: "YOS", name: "Yost Hall", lat: 41.503443, lng: -81.608943 },
];

static BY_CODE: LazyLock<HashMap<&'static str, &'static Building>> =
    LazyLock::new(|| DIRECTORY.iter().map(|b| (b.code, b)).collect());

/// Reverse lookup by building code. `None` means the code is not a valid
/// submission target.
pub fn resolve(code: &str) -> Option<&'static Building> {
    BY_CODE.get(code).copied()
}

/// Display name for read-side rendering. Falls back to the raw code for
/// unknown buildings, since the directory covers only part of campus.
pub fn display_name(code: &str) -> &str {
    match resolve(code) {
        Some(building) => building.name,
        None => code,
    }
}

/// Every directory entry, for listing endpoints.
pub fn all() -> &'static [Building] {
    DIRECTORY
}
