//! Veldexpressies met evaluatiestatus en geneste shape-velden.

use std::collections::BTreeMap;

use super::FieldName;
use super::value::Value;

/// Nog niet geëvalueerde style-expressie, zoals ontvangen van de producer.
///
/// De inhoud wordt door deze crate niet geïnterpreteerd en draagt geen
/// scalair; domeinconversies nemen hem ongewijzigd over.
#[derive(Debug, Clone, PartialEq)]
pub struct UnevaluatedExpr {
    pub raw: serde_json::Value,
}

impl UnevaluatedExpr {
    #[must_use]
    pub fn new(raw: serde_json::Value) -> Self {
        Self { raw }
    }
}

/// Veldwaarde met resolutiestatus.
#[derive(Debug, Clone, PartialEq)]
pub enum TagExpr<N> {
    /// Waarde is definitief en numeriek bruikbaar.
    Done(Value<N>),
    /// Waarde wacht op een externe berekening (bv. labelafmetingen), maar
    /// draagt al een voorlopige inhoud mee.
    Pending(Value<N>),
    /// Nog niet geëvalueerde expressie; conversie laat deze ongemoeid.
    Unevaluated(UnevaluatedExpr),
}

impl<N> TagExpr<N> {
    /// Statusdiscriminant, los van de inhoud.
    #[must_use]
    pub fn status(&self) -> ExprStatus {
        match self {
            Self::Done(_) => ExprStatus::Done,
            Self::Pending(_) => ExprStatus::Pending,
            Self::Unevaluated(_) => ExprStatus::Unevaluated,
        }
    }

    /// De gedragen waarde, indien aanwezig.
    #[must_use]
    pub fn value(&self) -> Option<&Value<N>> {
        match self {
            Self::Done(value) | Self::Pending(value) => Some(value),
            Self::Unevaluated(_) => None,
        }
    }
}

/// Resolutiestatus van een [`TagExpr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprStatus {
    Done,
    Pending,
    Unevaluated,
}

/// Genest shape-veld: shapetype plus eigenschapswoordenboek.
#[derive(Debug, Clone, PartialEq)]
pub struct GpiExpr<N> {
    /// Shapetype zoals "Circle" of "Text"; open verzameling, de renderer
    /// bepaalt de betekenis.
    pub shape: String,
    pub properties: BTreeMap<FieldName, TagExpr<N>>,
}

impl<N> GpiExpr<N> {
    #[must_use]
    pub fn new(shape: impl Into<String>) -> Self {
        Self {
            shape: shape.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Zet een eigenschap; een bestaande eigenschap wordt overschreven.
    pub fn set_property(&mut self, name: impl Into<FieldName>, expr: TagExpr<N>) {
        self.properties.insert(name.into(), expr);
    }

    #[must_use]
    pub fn property(&self, name: &FieldName) -> Option<&TagExpr<N>> {
        self.properties.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::{ExprStatus, GpiExpr, TagExpr, UnevaluatedExpr};
    use crate::state::value::Value;

    #[test]
    fn status_matches_variant() {
        let done: TagExpr<f64> = TagExpr::Done(Value::Float(1.0));
        let pending: TagExpr<f64> = TagExpr::Pending(Value::Float(2.0));
        let unevaluated: TagExpr<f64> =
            TagExpr::Unevaluated(UnevaluatedExpr::new(serde_json::Value::Null));

        assert_eq!(done.status(), ExprStatus::Done);
        assert_eq!(pending.status(), ExprStatus::Pending);
        assert_eq!(unevaluated.status(), ExprStatus::Unevaluated);
    }

    #[test]
    fn unevaluated_carries_no_value() {
        let expr: TagExpr<f64> =
            TagExpr::Unevaluated(UnevaluatedExpr::new(serde_json::Value::Null));
        assert!(expr.value().is_none());

        let done: TagExpr<f64> = TagExpr::Done(Value::Float(3.0));
        assert!(matches!(done.value(), Some(Value::Float(_))));
    }

    #[test]
    fn gpi_properties_are_keyed_by_name() {
        let mut gpi: GpiExpr<f64> = GpiExpr::new("Circle");
        gpi.set_property("r", TagExpr::Done(Value::Float(2.5)));

        assert_eq!(gpi.shape, "Circle");
        let r = gpi.property(&"r".into()).expect("property r");
        assert!(matches!(r, TagExpr::Done(Value::Float(v)) if *v == 2.5));
        assert!(gpi.property(&"center".into()).is_none());
    }
}
