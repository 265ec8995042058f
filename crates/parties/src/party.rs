use serde::{Deserialize, Serialize};

use billbook_core::{Collection, DocumentId, DomainError, DomainResult, Record, document_ref};

use crate::place_of_supply::{self, PlaceOfSupply};
use crate::tax_id;

document_ref!(
    /// Reference to a billing entity (the seller issuing invoices).
    EntityId
);

document_ref!(
    /// Reference to a customer (the buyer being invoiced).
    CustomerId
);

/// Stored entity record with its id.
pub type EntityRecord = Record<EntityId, Party>;

/// Stored customer record with its id.
pub type CustomerRecord = Record<CustomerId, Party>;

/// Which master-data collection a party belongs to.
///
/// Entities and customers share one shape but differ in which fields are
/// mandatory and what counts as a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Entity,
    Customer,
}

impl PartyKind {
    pub fn collection(self) -> Collection {
        match self {
            PartyKind::Entity => Collection::Entities,
            PartyKind::Customer => Collection::Customers,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PartyKind::Entity => "entity",
            PartyKind::Customer => "customer",
        }
    }

    /// PAN is always required for entities, and for customers only when
    /// GST-registered.
    pub fn requires_pan(self, registration: GstRegistration) -> bool {
        match self {
            PartyKind::Entity => true,
            PartyKind::Customer => registration.is_registered(),
        }
    }
}

/// GST registration flag, stored as `"Yes"` / `"No"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GstRegistration {
    #[default]
    Yes,
    No,
}

impl GstRegistration {
    pub fn is_registered(self) -> bool {
        self == GstRegistration::Yes
    }
}

impl From<bool> for GstRegistration {
    fn from(registered: bool) -> Self {
        if registered { GstRegistration::Yes } else { GstRegistration::No }
    }
}

/// Postal address. Every line is optional free text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

impl Address {
    /// `"{city}, {state} - {pincode}"`, as printed under the first address line.
    pub fn locality(&self) -> String {
        format!("{}, {} - {}", self.city, self.state, self.pincode)
    }
}

/// Entity or customer master record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub name: String,
    #[serde(default)]
    pub is_gst_registered: GstRegistration,
    // Unset optional fields are written as null so that a merge-update
    // clears a previously stored value.
    #[serde(default)]
    pub gstin: Option<String>,
    #[serde(default)]
    pub pan: Option<String>,
    #[serde(default, deserialize_with = "place_of_supply::lenient_option")]
    pub place_of_supply: Option<PlaceOfSupply>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: Address,
}

impl Party {
    pub fn new(name: impl Into<String>, registration: GstRegistration) -> Self {
        Self {
            name: name.into(),
            is_gst_registered: registration,
            gstin: None,
            pan: None,
            place_of_supply: None,
            email: String::new(),
            phone: String::new(),
            address: Address::default(),
        }
    }

    /// Read a party submitted by a client.
    ///
    /// Stricter than decoding a stored record: a place of supply that names
    /// no known jurisdiction is rejected rather than read as unset.
    pub fn from_form(value: serde_json::Value) -> DomainResult<Self> {
        match value.get("placeOfSupply") {
            None | Some(serde_json::Value::Null) => {}
            Some(serde_json::Value::String(raw)) if raw.trim().is_empty() => {}
            Some(serde_json::Value::String(raw)) => {
                raw.parse::<PlaceOfSupply>()?;
            }
            Some(other) => {
                return Err(DomainError::validation(format!(
                    "place of supply must be a jurisdiction name, got {other}"
                )));
            }
        }
        serde_json::from_value(value).map_err(|e| DomainError::validation(format!("invalid party: {e}")))
    }

    pub fn is_gst_registered(&self) -> bool {
        self.is_gst_registered.is_registered()
    }

    /// Trim free text, upper-case tax ids and derive PAN and place of supply
    /// from the GSTIN.
    ///
    /// When the GSTIN has at least 12 characters its embedded PAN replaces
    /// whatever PAN was entered; a recognised two-digit prefix likewise
    /// replaces the place of supply.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.gstin = tax_id::normalize(self.gstin.as_deref());
        self.pan = tax_id::normalize(self.pan.as_deref());

        if let Some(gstin) = self.gstin.as_deref() {
            if let Some(pan) = tax_id::pan_from_gstin(gstin) {
                self.pan = Some(pan.to_string());
            }
            if let Some(place) = PlaceOfSupply::from_gstin(gstin) {
                self.place_of_supply = Some(place);
            }
        }
    }

    /// Required-field and format checks for a party of the given kind.
    pub fn validate(&self, kind: PartyKind) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if self.email.trim().is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        if !tax_id::is_valid_email(self.email.trim()) {
            return Err(DomainError::validation("email is not a valid address"));
        }
        if self.phone.trim().is_empty() {
            return Err(DomainError::validation("phone is required"));
        }

        match self.gstin.as_deref() {
            Some(gstin) if !tax_id::is_valid_gstin(gstin) => {
                return Err(DomainError::validation(format!(
                    "GSTIN must be a {}-character GST identification number",
                    tax_id::GSTIN_LEN
                )));
            }
            None if self.is_gst_registered() => {
                return Err(DomainError::validation(
                    "GSTIN is required for a GST-registered party",
                ));
            }
            _ => {}
        }

        match self.pan.as_deref() {
            Some(pan) if !tax_id::is_valid_pan(pan) => {
                return Err(DomainError::validation(format!(
                    "PAN must be a {}-character permanent account number",
                    tax_id::PAN_LEN
                )));
            }
            None if kind.requires_pan(self.is_gst_registered) => {
                return Err(DomainError::validation(format!(
                    "PAN is required for this {}",
                    kind.label()
                )));
            }
            _ => {}
        }

        Ok(())
    }

    /// Case-insensitive substring match on the name (empty term matches all).
    pub fn matches_name(&self, term: &str) -> bool {
        let term = term.trim();
        term.is_empty() || self.name.to_lowercase().contains(&term.to_lowercase())
    }
}

/// Reject `candidate` if it collides with an existing party of the same kind.
///
/// Names are unique per collection; customers additionally need a unique
/// email. Comparisons ignore case. `exclude` skips the record being updated.
pub fn ensure_unique<'a, I>(
    kind: PartyKind,
    candidate: &Party,
    existing: I,
    exclude: Option<DocumentId>,
) -> DomainResult<()>
where
    I: IntoIterator<Item = (DocumentId, &'a Party)>,
{
    let name = candidate.name.trim().to_lowercase();
    let email = candidate.email.trim().to_lowercase();

    for (id, other) in existing {
        if Some(id) == exclude {
            continue;
        }
        if other.name.trim().to_lowercase() == name {
            return Err(DomainError::validation(format!(
                "a {} with this name already exists",
                kind.label()
            )));
        }
        if kind == PartyKind::Customer && other.email.trim().to_lowercase() == email {
            return Err(DomainError::validation(
                "a customer with this email already exists",
            ));
        }
    }
    Ok(())
}
