//! Benoemde conversies tussen het gewone en het differentieerbare domein.
//!
//! Dit zijn de enige functies die externe samenwerkende onderdelen horen
//! aan te roepen; de mapper zelf is een intern bouwblok.

use crate::autodiff::Dual;

use super::Translation;
use super::map::{self, DiagnosticSink, LogSink, MapError};
use super::value::Value;

fn scalar_to_plain(scalar: &Dual) -> f64 {
    scalar.value()
}

fn scalar_to_differentiable(scalar: &f64) -> Dual {
    Dual::constant(*scalar)
}

/// Converteert een vertaling naar het gewone domein, t.b.v. rendering.
pub fn to_plain_domain(translation: &Translation<Dual>) -> Result<Translation<f64>, MapError> {
    to_plain_domain_with(translation, &mut LogSink)
}

/// Als [`to_plain_domain`], met een expliciete diagnostiek-sink.
pub fn to_plain_domain_with(
    translation: &Translation<Dual>,
    sink: &mut dyn DiagnosticSink,
) -> Result<Translation<f64>, MapError> {
    map::map_translation(&scalar_to_plain, translation, sink)
}

/// Converteert een vertaling naar het differentieerbare domein, zodat de
/// evaluator ermee kan rekenen.
pub fn to_differentiable_domain(
    translation: &Translation<f64>,
) -> Result<Translation<Dual>, MapError> {
    to_differentiable_domain_with(translation, &mut LogSink)
}

/// Als [`to_differentiable_domain`], met een expliciete diagnostiek-sink.
pub fn to_differentiable_domain_with(
    translation: &Translation<f64>,
    sink: &mut dyn DiagnosticSink,
) -> Result<Translation<Dual>, MapError> {
    map::map_translation(&scalar_to_differentiable, translation, sink)
}

/// Conversie van een losse waarde naar het gewone domein.
pub fn value_to_plain(value: &Value<Dual>) -> Result<Value<f64>, MapError> {
    map::map_value(&scalar_to_plain, value)
}

/// Conversie van een losse waarde naar het differentieerbare domein.
pub fn value_to_differentiable(value: &Value<f64>) -> Result<Value<Dual>, MapError> {
    map::map_value(&scalar_to_differentiable, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::expr::{GpiExpr, TagExpr};
    use crate::state::{FieldExpr, Translation};

    fn circle_translation() -> Translation<f64> {
        let mut icon: GpiExpr<f64> = GpiExpr::new("Circle");
        icon.set_property("r", TagExpr::Done(Value::Float(2.5)));
        icon.set_property("center", TagExpr::Done(Value::Pt([1.0, -1.0])));

        let mut translation = Translation::new();
        translation
            .insert_field("c1", "icon", FieldExpr::Gpi(icon))
            .expect("insert icon");
        translation
    }

    #[test]
    fn round_trip_preserves_resolved_translation() {
        let original = circle_translation();
        let differentiable = to_differentiable_domain(&original).expect("naar autodiff");
        let back = to_plain_domain(&differentiable).expect("terug naar f64");
        assert_eq!(back, original);
    }

    #[test]
    fn round_trip_preserves_circle_properties() {
        let original = circle_translation();
        let back = to_plain_domain(&to_differentiable_domain(&original).expect("heen"))
            .expect("terug");

        let field = back
            .field(&"c1".into(), &"icon".into())
            .expect("veld c1.icon");
        let FieldExpr::Gpi(icon) = field else {
            panic!("veldsoort veranderd");
        };
        assert_eq!(icon.shape, "Circle");
        let r = icon.property(&"r".into()).expect("r");
        assert!(matches!(r, TagExpr::Done(Value::Float(v)) if (v - 2.5).abs() < f64::EPSILON));
        let center = icon.property(&"center".into()).expect("center");
        assert!(matches!(center, TagExpr::Done(Value::Pt(p)) if *p == [1.0, -1.0]));
    }

    #[test]
    fn plain_scalars_become_constants() {
        let value = value_to_differentiable(&Value::Float(4.0)).expect("conversie");
        let Value::Float(dual) = value else {
            panic!("tag veranderd");
        };
        assert_eq!(dual.value(), 4.0);
        assert_eq!(dual.derivative(), 0.0);
    }

    #[test]
    fn differentiable_values_drop_their_derivative() {
        let value = value_to_plain(&Value::Float(Dual::new(3.0, 1.0))).expect("conversie");
        assert!(matches!(value, Value::Float(v) if v == 3.0));
    }
}
