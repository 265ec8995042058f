//! Tax & totals calculator.
//!
//! Pure and reentrant: the same items and tax context always yield the same
//! [`Totals`]. Inputs are never rejected here; validation happens on the save
//! path before anything is persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billbook_core::money::lenient;
use billbook_parties::{Party, PlaceOfSupply};

/// GST slabs a line item may carry, in percent.
pub const GST_RATES: [u32; 5] = [0, 5, 12, 18, 28];

/// Rate applied to a freshly added line.
pub const DEFAULT_GST_RATE: u32 = 18;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
const TWO: Decimal = Decimal::TWO;

/// One billed line. Owned by its invoice.
///
/// Numeric fields accept numbers or numeric strings; anything else reads as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub rate: Decimal,
    /// Absolute amount taken off this line before tax.
    #[serde(default, deserialize_with = "lenient")]
    pub discount: Decimal,
    /// Percentage, one of [`GST_RATES`].
    #[serde(default, deserialize_with = "lenient")]
    pub gst_rate: Decimal,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: Decimal::ONE,
            rate: Decimal::ZERO,
            discount: Decimal::ZERO,
            gst_rate: Decimal::from(DEFAULT_GST_RATE),
        }
    }
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, rate: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            rate,
            ..Self::default()
        }
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_gst_rate(mut self, gst_rate: Decimal) -> Self {
        self.gst_rate = gst_rate;
        self
    }

    /// quantity × rate
    pub fn gross(&self) -> Decimal {
        self.quantity.saturating_mul(self.rate)
    }

    /// Gross less this line's own discount.
    pub fn taxable(&self) -> Decimal {
        self.gross().saturating_sub(self.discount)
    }

    pub fn gst(&self) -> Decimal {
        self.taxable().saturating_mul(self.gst_rate) / HUNDRED
    }

    pub fn has_standard_gst_rate(&self) -> bool {
        GST_RATES.iter().any(|r| Decimal::from(*r) == self.gst_rate)
    }
}

/// How the GST amount is split between the central and state components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GstSplit {
    /// Inter-state supply: the whole amount is IGST.
    #[default]
    #[serde(rename = "IGST")]
    Igst,
    /// Intra-state supply: half CGST, half SGST.
    #[serde(rename = "CGST/SGST")]
    CgstSgst,
}

impl GstSplit {
    /// Same jurisdiction on both sides means CGST/SGST; anything else,
    /// including an unknown side, means IGST.
    pub fn for_places(seller: Option<PlaceOfSupply>, buyer: Option<PlaceOfSupply>) -> Self {
        match (seller, buyer) {
            (Some(s), Some(b)) if s == b => GstSplit::CgstSgst,
            _ => GstSplit::Igst,
        }
    }
}

/// GST applicability and split mode for one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxContext {
    pub gst_applicable: bool,
    pub split: GstSplit,
}

impl Default for TaxContext {
    fn default() -> Self {
        Self {
            gst_applicable: true,
            split: GstSplit::Igst,
        }
    }
}

impl TaxContext {
    pub fn new(gst_applicable: bool, split: GstSplit) -> Self {
        Self { gst_applicable, split }
    }

    /// Derive the context from the billing entity and customer.
    ///
    /// GST applies unless the entity is known and not registered. The split
    /// falls back to IGST while either party is unresolved.
    pub fn resolve(entity: Option<&Party>, customer: Option<&Party>) -> Self {
        let gst_applicable = entity.is_none_or(Party::is_gst_registered);
        let split = match (entity, customer) {
            (Some(e), Some(c)) => GstSplit::for_places(e.place_of_supply, c.place_of_supply),
            _ => GstSplit::Igst,
        };
        Self { gst_applicable, split }
    }
}

/// Financial summary persisted alongside an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Totals {
    pub gross_total: Decimal,
    pub total_discount: Decimal,
    pub taxable_total: Decimal,
    pub total_gst: Decimal,
    pub igst: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub total: Decimal,
}

/// Compute the totals for `items` under `tax`.
pub fn compute_totals(items: &[LineItem], tax: TaxContext) -> Totals {
    let gross_total = items
        .iter()
        .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.gross()));
    let total_discount = items
        .iter()
        .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.discount));
    let taxable_total = gross_total.saturating_sub(total_discount);

    let total_gst = if tax.gst_applicable {
        items
            .iter()
            .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.gst()))
    } else {
        Decimal::ZERO
    };

    let total = taxable_total.saturating_add(total_gst);

    let (igst, cgst, sgst) = match tax.split {
        GstSplit::Igst => (total_gst, Decimal::ZERO, Decimal::ZERO),
        GstSplit::CgstSgst => {
            let half = total_gst / TWO;
            (Decimal::ZERO, half, half)
        }
    };

    Totals {
        gross_total,
        total_discount,
        taxable_total,
        total_gst,
        igst,
        cgst,
        sgst,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billbook_parties::GstRegistration;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn two_at_hundred() -> Vec<LineItem> {
        vec![LineItem::new("Widget", dec!(2), dec!(100)).with_gst_rate(dec!(18))]
    }

    fn party_in(place: Option<PlaceOfSupply>, registration: GstRegistration) -> Party {
        let mut p = Party::new("Party", registration);
        p.place_of_supply = place;
        p
    }

    #[test]
    fn inter_state_invoice_is_all_igst() {
        let totals = compute_totals(&two_at_hundred(), TaxContext::new(true, GstSplit::Igst));

        assert_eq!(totals.gross_total, dec!(200));
        assert_eq!(totals.total_discount, dec!(0));
        assert_eq!(totals.taxable_total, dec!(200));
        assert_eq!(totals.total_gst, dec!(36));
        assert_eq!(totals.total, dec!(236));
        assert_eq!(totals.igst, dec!(36));
        assert_eq!(totals.cgst, dec!(0));
        assert_eq!(totals.sgst, dec!(0));
    }

    #[test]
    fn intra_state_invoice_splits_evenly() {
        let totals = compute_totals(&two_at_hundred(), TaxContext::new(true, GstSplit::CgstSgst));

        assert_eq!(totals.cgst, dec!(18));
        assert_eq!(totals.sgst, dec!(18));
        assert_eq!(totals.igst, dec!(0));
        assert_eq!(totals.total, dec!(236));
    }

    #[test]
    fn zero_rated_line_with_discount() {
        let items = vec![
            LineItem::new("Consulting", dec!(1), dec!(1000))
                .with_discount(dec!(100))
                .with_gst_rate(dec!(0)),
        ];
        let totals = compute_totals(&items, TaxContext::default());

        assert_eq!(totals.taxable_total, dec!(900));
        assert_eq!(totals.total_gst, dec!(0));
        assert_eq!(totals.total, dec!(900));
    }

    #[test]
    fn discount_is_applied_per_line_before_tax() {
        let items = vec![
            LineItem::new("A", dec!(1), dec!(100))
                .with_discount(dec!(50))
                .with_gst_rate(dec!(28)),
            LineItem::new("B", dec!(1), dec!(100)).with_gst_rate(dec!(5)),
        ];
        let totals = compute_totals(&items, TaxContext::default());

        // 50 × 28% + 100 × 5%; pro-rating the discount would give a different figure.
        assert_eq!(totals.total_gst, dec!(19));
        assert_eq!(totals.taxable_total, dec!(150));
    }

    #[test]
    fn unregistered_entity_zero_rates_everything() {
        let totals = compute_totals(&two_at_hundred(), TaxContext::new(false, GstSplit::CgstSgst));

        assert_eq!(totals.total_gst, dec!(0));
        assert_eq!(totals.igst, dec!(0));
        assert_eq!(totals.cgst, dec!(0));
        assert_eq!(totals.sgst, dec!(0));
        assert_eq!(totals.total, dec!(200));
    }

    #[test]
    fn oversized_discount_drives_line_negative() {
        let items = vec![LineItem::new("Refund", dec!(1), dec!(10)).with_discount(dec!(25))];
        let totals = compute_totals(&items, TaxContext::default());

        assert_eq!(totals.taxable_total, dec!(-15));
        assert_eq!(totals.total_gst, dec!(-2.7));
        assert_eq!(totals.total, dec!(-17.7));
    }

    #[test]
    fn loose_json_values_coerce_to_zero() {
        let item: LineItem = serde_json::from_value(serde_json::json!({
            "description": "Loose",
            "quantity": "3",
            "rate": "abc",
            "gstRate": 12
        }))
        .unwrap();

        assert_eq!(item.quantity, dec!(3));
        assert_eq!(item.rate, dec!(0));
        assert_eq!(item.discount, dec!(0));
        assert_eq!(item.gst_rate, dec!(12));
    }

    #[test]
    fn context_follows_parties() {
        let seller = party_in(Some(PlaceOfSupply::Karnataka), GstRegistration::Yes);
        let local = party_in(Some(PlaceOfSupply::Karnataka), GstRegistration::No);
        let remote = party_in(Some(PlaceOfSupply::Kerala), GstRegistration::No);

        assert_eq!(
            TaxContext::resolve(Some(&seller), Some(&local)),
            TaxContext::new(true, GstSplit::CgstSgst)
        );
        assert_eq!(
            TaxContext::resolve(Some(&seller), Some(&remote)),
            TaxContext::new(true, GstSplit::Igst)
        );
        assert_eq!(TaxContext::resolve(Some(&seller), None).split, GstSplit::Igst);
        assert_eq!(TaxContext::resolve(None, None), TaxContext::default());

        let unregistered = party_in(Some(PlaceOfSupply::Karnataka), GstRegistration::No);
        assert!(!TaxContext::resolve(Some(&unregistered), Some(&local)).gst_applicable);
    }

    #[test]
    fn unknown_places_default_to_igst() {
        assert_eq!(GstSplit::for_places(None, None), GstSplit::Igst);
        assert_eq!(GstSplit::for_places(Some(PlaceOfSupply::Goa), None), GstSplit::Igst);
    }

    #[test]
    fn split_mode_serializes_with_display_labels() {
        assert_eq!(serde_json::to_string(&GstSplit::CgstSgst).unwrap(), "\"CGST/SGST\"");
        assert_eq!(serde_json::to_string(&GstSplit::Igst).unwrap(), "\"IGST\"");
    }

    fn line_strategy() -> impl Strategy<Value = LineItem> {
        (
            0u32..1_000,
            0u64..10_000_000,
            0u64..1_000_000,
            prop::sample::select(GST_RATES.to_vec()),
        )
            .prop_map(|(qty, rate_paise, discount_paise, gst)| LineItem {
                description: String::new(),
                quantity: Decimal::from(qty),
                rate: Decimal::new(rate_paise as i64, 2),
                discount: Decimal::new(discount_paise as i64, 2),
                gst_rate: Decimal::from(gst),
            })
    }

    fn context_strategy() -> impl Strategy<Value = TaxContext> {
        (any::<bool>(), prop_oneof![Just(GstSplit::Igst), Just(GstSplit::CgstSgst)])
            .prop_map(|(applicable, split)| TaxContext::new(applicable, split))
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: the summary identities hold exactly for any item list.
        #[test]
        fn totals_identities_hold(
            items in prop::collection::vec(line_strategy(), 1..20),
            tax in context_strategy(),
        ) {
            let t = compute_totals(&items, tax);
            prop_assert_eq!(t.total, t.taxable_total + t.total_gst);
            prop_assert_eq!(t.taxable_total, t.gross_total - t.total_discount);
            prop_assert_eq!(t.igst + t.cgst + t.sgst, t.total_gst);
        }

        /// Property: without GST nothing is taxed, whatever the per-line rates.
        #[test]
        fn no_tax_when_not_applicable(
            items in prop::collection::vec(line_strategy(), 1..20),
            split in prop_oneof![Just(GstSplit::Igst), Just(GstSplit::CgstSgst)],
        ) {
            let t = compute_totals(&items, TaxContext::new(false, split));
            prop_assert_eq!(t.total_gst, Decimal::ZERO);
            prop_assert_eq!(t.igst, Decimal::ZERO);
            prop_assert_eq!(t.cgst, Decimal::ZERO);
            prop_assert_eq!(t.sgst, Decimal::ZERO);
        }

        /// Property: the split mode decides which components carry the tax.
        #[test]
        fn split_mode_routes_tax(items in prop::collection::vec(line_strategy(), 1..20)) {
            let inter = compute_totals(&items, TaxContext::new(true, GstSplit::Igst));
            prop_assert_eq!(inter.igst, inter.total_gst);
            prop_assert_eq!(inter.cgst, Decimal::ZERO);
            prop_assert_eq!(inter.sgst, Decimal::ZERO);

            let intra = compute_totals(&items, TaxContext::new(true, GstSplit::CgstSgst));
            prop_assert_eq!(intra.cgst, intra.total_gst / Decimal::TWO);
            prop_assert_eq!(intra.sgst, intra.total_gst / Decimal::TWO);
            prop_assert_eq!(intra.igst, Decimal::ZERO);
        }

        /// Property: recomputing over unchanged input is bit-identical.
        #[test]
        fn compute_is_deterministic(
            items in prop::collection::vec(line_strategy(), 1..20),
            tax in context_strategy(),
        ) {
            let first = compute_totals(&items, tax);
            let second = compute_totals(&items, tax);
            prop_assert_eq!(first, second);
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }
}
