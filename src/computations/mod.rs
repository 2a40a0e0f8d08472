//! Vaste bibliotheek van berekeningsfuncties over differentieerbare waarden.
//!
//! De evaluator zoekt functies op naam op en voert ze uit in het
//! differentieerbare domein; resultaten gaan daarna via de domeinconversie
//! terug naar de renderer.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;

use rand::Rng;
use rand::rng;

use crate::autodiff::Dual;
use crate::state::expr::GpiExpr;
use crate::state::value::{Color, Value, ValueError};

/// Argument van een berekening: een losse waarde of een volledige shape.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    Val(&'a Value<Dual>),
    Gpi(&'a GpiExpr<Dual>),
}

/// Fouttype voor berekeningen.
#[derive(Debug, Clone)]
pub enum ComputationError {
    /// De functienaam is niet geregistreerd.
    UnknownFunction(String),
    /// Verkeerd aantal argumenten.
    Arity {
        function: &'static str,
        expected: usize,
        got: usize,
    },
    /// Een argument had een onbruikbare vorm of inhoud.
    Argument(String),
}

impl fmt::Display for ComputationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFunction(name) => {
                write!(f, "berekeningsfunctie `{name}` niet gevonden")
            }
            Self::Arity {
                function,
                expected,
                got,
            } => write!(
                f,
                "functie `{function}` verwacht {expected} argumenten maar kreeg er {got}"
            ),
            Self::Argument(reason) => f.write_str(reason),
        }
    }
}

impl std::error::Error for ComputationError {}

impl From<ValueError> for ComputationError {
    fn from(err: ValueError) -> Self {
        Self::Argument(err.to_string())
    }
}

/// Resultaat van een berekening.
pub type ComputationResult = Result<Value<Dual>, ComputationError>;

/// Signatuur van een geregistreerde berekeningsfunctie.
pub type ComputationFn = fn(&[Arg<'_>]) -> ComputationResult;

/// Register van berekeningsfuncties op naam.
#[derive(Debug, Clone)]
pub struct ComputationRegistry {
    table: HashMap<&'static str, ComputationFn>,
}

impl Default for ComputationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputationRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut table: HashMap<&'static str, ComputationFn> = HashMap::new();
        table.insert("rgba", rgba);
        table.insert("hsva", hsva);
        table.insert("cos", cos_degrees);
        table.insert("sin", sin_degrees);
        table.insert("dot", dot);
        table.insert("lineLength", line_length);
        table.insert("len", line_length);
        table.insert("sampleColor", sample_color);
        Self { table }
    }

    /// Zoekt een functie op; onbekende namen zijn een fout.
    pub fn lookup(&self, name: &str) -> Result<ComputationFn, ComputationError> {
        self.table
            .get(name)
            .copied()
            .ok_or_else(|| ComputationError::UnknownFunction(name.to_owned()))
    }

    /// Zoekt een functie op en voert haar uit.
    pub fn compute(&self, name: &str, args: &[Arg<'_>]) -> ComputationResult {
        self.lookup(name)?(args)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.table.keys().copied()
    }
}

fn expect_arity(
    function: &'static str,
    args: &[Arg<'_>],
    expected: usize,
) -> Result<(), ComputationError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ComputationError::Arity {
            function,
            expected,
            got: args.len(),
        })
    }
}

fn float_arg(function: &'static str, args: &[Arg<'_>], index: usize) -> Result<Dual, ComputationError> {
    match args.get(index) {
        Some(Arg::Val(value)) => Ok(*value.expect_float()?),
        Some(Arg::Gpi(_)) => Err(ComputationError::Argument(format!(
            "functie `{function}` verwacht een scalair als argument {index}, geen shape"
        ))),
        None => Err(ComputationError::Argument(format!(
            "functie `{function}` mist argument {index}"
        ))),
    }
}

fn list_arg<'a>(
    function: &'static str,
    args: &[Arg<'a>],
    index: usize,
) -> Result<&'a [Dual], ComputationError> {
    match args.get(index) {
        Some(Arg::Val(value)) => Ok(value.expect_list()?),
        _ => Err(ComputationError::Argument(format!(
            "functie `{function}` verwacht een lijst als argument {index}"
        ))),
    }
}

fn str_arg<'a>(
    function: &'static str,
    args: &[Arg<'a>],
    index: usize,
) -> Result<&'a str, ComputationError> {
    match args.get(index) {
        Some(Arg::Val(value)) => Ok(value.expect_str()?),
        _ => Err(ComputationError::Argument(format!(
            "functie `{function}` verwacht tekst als argument {index}"
        ))),
    }
}

fn gpi_arg<'a>(
    function: &'static str,
    args: &[Arg<'a>],
    index: usize,
) -> Result<&'a GpiExpr<Dual>, ComputationError> {
    match args.get(index) {
        Some(Arg::Gpi(gpi)) => Ok(gpi),
        _ => Err(ComputationError::Argument(format!(
            "functie `{function}` verwacht een shape als argument {index}"
        ))),
    }
}

fn gpi_float_property(
    function: &'static str,
    gpi: &GpiExpr<Dual>,
    name: &str,
) -> Result<Dual, ComputationError> {
    let property = gpi.property(&name.into()).ok_or_else(|| {
        ComputationError::Argument(format!(
            "functie `{function}` verwacht een shape met eigenschap `{name}`"
        ))
    })?;
    let value = property.value().ok_or_else(|| {
        ComputationError::Argument(format!(
            "eigenschap `{name}` is nog niet geëvalueerd en heeft geen waarde"
        ))
    })?;
    Ok(*value.expect_float()?)
}

fn rgba(args: &[Arg<'_>]) -> ComputationResult {
    expect_arity("rgba", args, 4)?;
    let channels = [
        float_arg("rgba", args, 0)?,
        float_arg("rgba", args, 1)?,
        float_arg("rgba", args, 2)?,
        float_arg("rgba", args, 3)?,
    ];
    Ok(Value::Color(Color::Rgba(channels)))
}

fn hsva(args: &[Arg<'_>]) -> ComputationResult {
    expect_arity("hsva", args, 4)?;
    let channels = [
        float_arg("hsva", args, 0)?,
        float_arg("hsva", args, 1)?,
        float_arg("hsva", args, 2)?,
        float_arg("hsva", args, 3)?,
    ];
    Ok(Value::Color(Color::Hsva(channels)))
}

fn degrees_to_radians(degrees: Dual) -> Dual {
    degrees * Dual::constant(PI) / Dual::constant(180.0)
}

/// Cosinus; accepteert graden.
fn cos_degrees(args: &[Arg<'_>]) -> ComputationResult {
    expect_arity("cos", args, 1)?;
    let degrees = float_arg("cos", args, 0)?;
    Ok(Value::Float(degrees_to_radians(degrees).cos()))
}

/// Sinus; accepteert graden.
fn sin_degrees(args: &[Arg<'_>]) -> ComputationResult {
    expect_arity("sin", args, 1)?;
    let degrees = float_arg("sin", args, 0)?;
    Ok(Value::Float(degrees_to_radians(degrees).sin()))
}

fn dot(args: &[Arg<'_>]) -> ComputationResult {
    expect_arity("dot", args, 2)?;
    let v = list_arg("dot", args, 0)?;
    let w = list_arg("dot", args, 1)?;
    if v.len() != w.len() {
        return Err(ComputationError::Argument(format!(
            "dot verwacht lijsten van gelijke lengte, kreeg {} en {}",
            v.len(),
            w.len()
        )));
    }
    let sum = v
        .iter()
        .zip(w)
        .fold(Dual::constant(0.0), |acc, (a, b)| acc + *a * *b);
    Ok(Value::Float(sum))
}

/// Lengte van een lijnachtige shape met start- en eindpunteigenschappen.
fn line_length(args: &[Arg<'_>]) -> ComputationResult {
    expect_arity("lineLength", args, 1)?;
    let gpi = gpi_arg("lineLength", args, 0)?;
    let start_x = gpi_float_property("lineLength", gpi, "startX")?;
    let start_y = gpi_float_property("lineLength", gpi, "startY")?;
    let end_x = gpi_float_property("lineLength", gpi, "endX")?;
    let end_y = gpi_float_property("lineLength", gpi, "endY")?;
    Ok(Value::Float((end_x - start_x).hypot(end_y - start_y)))
}

/// Trekt een willekeurige kleur met de gevraagde alfa.
fn sample_color(args: &[Arg<'_>]) -> ComputationResult {
    expect_arity("sampleColor", args, 2)?;
    let alpha = float_arg("sampleColor", args, 0)?;
    let color_type = str_arg("sampleColor", args, 1)?;

    let mut rng = rng();
    match color_type {
        "rgb" => {
            let mut channels = [Dual::constant(0.0); 4];
            for channel in channels.iter_mut().take(3) {
                *channel = Dual::constant(rng.random_range(0.1..0.9));
            }
            channels[3] = alpha;
            Ok(Value::Color(Color::Rgba(channels)))
        }
        "hsv" => {
            let hue = Dual::constant(rng.random_range(0.0..360.0));
            Ok(Value::Color(Color::Hsva([
                hue,
                Dual::constant(100.0),
                Dual::constant(80.0),
                alpha,
            ])))
        }
        other => Err(ComputationError::Argument(format!(
            "onbekend kleurtype `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::expr::TagExpr;
    use crate::state::value::OpaqueValue;

    fn registry() -> ComputationRegistry {
        ComputationRegistry::new()
    }

    #[test]
    fn unknown_function_is_rejected() {
        let err = registry().compute("mystery", &[]).unwrap_err();
        assert!(matches!(
            err,
            ComputationError::UnknownFunction(ref name) if name == "mystery"
        ));
    }

    #[test]
    fn rgba_builds_a_color() {
        let channels: Vec<Value<Dual>> = [0.1, 0.2, 0.3, 1.0]
            .iter()
            .map(|c| Value::Float(Dual::constant(*c)))
            .collect();
        let args: Vec<Arg<'_>> = channels.iter().map(Arg::Val).collect();
        let result = registry().compute("rgba", &args).expect("rgba");
        let Value::Color(Color::Rgba(rgba)) = result else {
            panic!("geen RGBA-kleur");
        };
        assert_eq!(rgba[0].value(), 0.1);
        assert_eq!(rgba[3].value(), 1.0);
    }

    #[test]
    fn trig_accepts_degrees() {
        let degrees = Value::Float(Dual::constant(90.0));
        let result = registry()
            .compute("sin", &[Arg::Val(&degrees)])
            .expect("sin");
        let Value::Float(sine) = result else {
            panic!("geen scalair");
        };
        assert!((sine.value() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn dot_multiplies_pairwise() {
        let v = Value::List(vec![
            Dual::constant(1.0),
            Dual::constant(2.0),
            Dual::constant(3.0),
        ]);
        let w = Value::List(vec![
            Dual::constant(4.0),
            Dual::constant(5.0),
            Dual::constant(6.0),
        ]);
        let result = registry()
            .compute("dot", &[Arg::Val(&v), Arg::Val(&w)])
            .expect("dot");
        assert!(matches!(result, Value::Float(sum) if sum.value() == 32.0));
    }

    #[test]
    fn dot_rejects_length_mismatch() {
        let v = Value::List(vec![Dual::constant(1.0)]);
        let w = Value::List(vec![Dual::constant(1.0), Dual::constant(2.0)]);
        let err = registry()
            .compute("dot", &[Arg::Val(&v), Arg::Val(&w)])
            .unwrap_err();
        assert!(matches!(err, ComputationError::Argument(_)));
    }

    #[test]
    fn line_length_reads_shape_properties() {
        let mut line: GpiExpr<Dual> = GpiExpr::new("Arrow");
        line.set_property("startX", TagExpr::Done(Value::Float(Dual::constant(0.0))));
        line.set_property("startY", TagExpr::Done(Value::Float(Dual::constant(0.0))));
        line.set_property("endX", TagExpr::Done(Value::Float(Dual::constant(3.0))));
        line.set_property("endY", TagExpr::Done(Value::Float(Dual::constant(4.0))));

        let result = registry()
            .compute("len", &[Arg::Gpi(&line)])
            .expect("lineLength");
        assert!(matches!(result, Value::Float(d) if (d.value() - 5.0).abs() < 1e-12));
    }

    #[test]
    fn sample_color_respects_alpha_and_type() {
        let alpha = Value::Float(Dual::constant(0.5));
        let kind: Value<Dual> = Value::Opaque(OpaqueValue::Str("rgb".to_owned()));
        let result = registry()
            .compute("sampleColor", &[Arg::Val(&alpha), Arg::Val(&kind)])
            .expect("sampleColor");
        let Value::Color(Color::Rgba(channels)) = result else {
            panic!("geen RGBA-kleur");
        };
        for channel in &channels[..3] {
            assert!((0.1..0.9).contains(&channel.value()));
        }
        assert_eq!(channels[3].value(), 0.5);

        let bad: Value<Dual> = Value::Opaque(OpaqueValue::Str("cmyk".to_owned()));
        assert!(
            registry()
                .compute("sampleColor", &[Arg::Val(&alpha), Arg::Val(&bad)])
                .is_err()
        );
    }

    #[test]
    fn arity_is_checked() {
        let err = registry().compute("rgba", &[]).unwrap_err();
        assert!(matches!(
            err,
            ComputationError::Arity {
                function: "rgba",
                expected: 4,
                got: 0,
            }
        ));
    }
}
