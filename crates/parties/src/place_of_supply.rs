//! Place-of-supply jurisdictions and their two-digit GSTIN codes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! places {
    ($($variant:ident => ($code:literal, $name:literal)),* $(,)?) => {
        /// Jurisdiction used to decide between IGST and CGST/SGST.
        ///
        /// Serialized by display name (e.g. `"Maharashtra"`).
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum PlaceOfSupply {
            $($variant),*
        }

        impl PlaceOfSupply {
            pub const ALL: &'static [PlaceOfSupply] = &[$(PlaceOfSupply::$variant),*];

            /// Two-digit code that prefixes a GSTIN registered in this jurisdiction.
            pub fn code(self) -> &'static str {
                match self {
                    $(PlaceOfSupply::$variant => $code),*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(PlaceOfSupply::$variant => $name),*
                }
            }
        }
    };
}

places! {
    JammuAndKashmir => ("01", "Jammu & Kashmir"),
    HimachalPradesh => ("02", "Himachal Pradesh"),
    Punjab => ("03", "Punjab"),
    Chandigarh => ("04", "Chandigarh"),
    Uttarakhand => ("05", "Uttarakhand"),
    Haryana => ("06", "Haryana"),
    Delhi => ("07", "Delhi"),
    Rajasthan => ("08", "Rajasthan"),
    UttarPradesh => ("09", "Uttar Pradesh"),
    Bihar => ("10", "Bihar"),
    Sikkim => ("11", "Sikkim"),
    ArunachalPradesh => ("12", "Arunachal Pradesh"),
    Nagaland => ("13", "Nagaland"),
    Manipur => ("14", "Manipur"),
    Mizoram => ("15", "Mizoram"),
    Tripura => ("16", "Tripura"),
    Meghalaya => ("17", "Meghalaya"),
    Assam => ("18", "Assam"),
    WestBengal => ("19", "West Bengal"),
    Jharkhand => ("20", "Jharkhand"),
    Odisha => ("21", "Odisha"),
    Chhattisgarh => ("22", "Chhattisgarh"),
    MadhyaPradesh => ("23", "Madhya Pradesh"),
    Gujarat => ("24", "Gujarat"),
    DamanAndDiu => ("25", "Daman & Diu"),
    DadraAndNagarHaveli => ("26", "Dadra & Nagar Haveli"),
    Maharashtra => ("27", "Maharashtra"),
    AndhraPradeshOld => ("28", "Andhra Pradesh (pre-division)"),
    Karnataka => ("29", "Karnataka"),
    Goa => ("30", "Goa"),
    Lakshadweep => ("31", "Lakshadweep"),
    Kerala => ("32", "Kerala"),
    TamilNadu => ("33", "Tamil Nadu"),
    Puducherry => ("34", "Puducherry"),
    AndamanAndNicobar => ("35", "Andaman & Nicobar Islands"),
    Telangana => ("36", "Telangana"),
    AndhraPradesh => ("37", "Andhra Pradesh (post-division)"),
    Ladakh => ("38", "Ladakh"),
    OtherTerritory => ("97", "Other Territory"),
    CentreJurisdiction => ("99", "Centre Jurisdiction"),
}

impl PlaceOfSupply {
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.iter().copied().find(|p| p.code() == code)
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Jurisdiction encoded in the first two characters of a GSTIN.
    pub fn from_gstin(gstin: &str) -> Option<Self> {
        gstin.get(..2).and_then(Self::from_code)
    }
}

impl core::fmt::Display for PlaceOfSupply {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for PlaceOfSupply {
    type Err = billbook_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .or_else(|| Self::from_code(s))
            .ok_or_else(|| billbook_core::DomainError::validation(format!("unknown place of supply: {s}")))
    }
}

impl Serialize for PlaceOfSupply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for PlaceOfSupply {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<PlaceOfSupply>` that reads blanks and unknown
/// names as "not set" instead of failing the whole record.
pub fn lenient_option<'de, D>(deserializer: D) -> Result<Option<PlaceOfSupply>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}
