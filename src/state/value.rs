//! Waardemodel voor shape-eigenschappen, generiek over het scalaire domein.
//!
//! Het typeparameter `N` is het numerieke payloadtype: `f64` voor het gewone
//! domein, [`crate::autodiff::Dual`] voor het differentieerbare domein.

use core::fmt;

/// Een 2D-punt of -paar in domein `N`.
pub type Pair<N> = [N; 2];

/// Kleur in RGBA- of HSVA-vorm.
#[derive(Debug, Clone, PartialEq)]
pub enum Color<N> {
    Rgba([N; 4]),
    Hsva([N; 4]),
}

/// Affiene transformatie als record van zes scalairen.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineMatrix<N> {
    pub x_scale: N,
    pub x_skew: N,
    pub y_scale: N,
    pub y_skew: N,
    pub dx: N,
    pub dy: N,
}

/// Polygoonbundel: buitenranden, gaten, bounding box en samplepunten.
///
/// De vier onderdelen hebben verschillende vormen; conversies moeten elk
/// blad precies één keer bezoeken.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon<N> {
    pub boundaries: Vec<Vec<Pair<N>>>,
    pub holes: Vec<Vec<Pair<N>>>,
    pub bbox: (Pair<N>, Pair<N>),
    pub samples: Vec<Pair<N>>,
}

/// Niet-numerieke waarden. Bewust niet generiek over `N`: deze varianten
/// dragen geen scalair en gaan ongewijzigd door elke domeinconversie heen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpaqueValue {
    Int(i64),
    Bool(bool),
    Str(String),
    File(String),
    Style(String),
}

/// Beschikbare waardetypes binnen een vertaling.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<N> {
    /// Een enkele numerieke eigenschap.
    Float(N),
    /// Een 2D-punt.
    Pt(Pair<N>),
    /// Een lijst van punten.
    PtList(Vec<Pair<N>>),
    /// Een lijst van scalairen.
    List(Vec<N>),
    /// Een paar scalairen; aparte tag naast `Pt` met dezelfde vorm.
    Tup(Pair<N>),
    /// Een lijst van lijsten van scalairen.
    LList(Vec<Vec<N>>),
    /// Een affiene matrix.
    HMatrix(AffineMatrix<N>),
    /// Een polygoonbundel.
    Polygon(Polygon<N>),
    /// Een kleur.
    Color(Color<N>),
    /// Een kleurenpalet.
    Palette(Vec<Color<N>>),
    /// Niet-numerieke passthrough-waarde.
    Opaque(OpaqueValue),
    /// Onbekende tag zoals aangetroffen op de wire. Mag een mapping nooit
    /// bereiken; de decoder bewaart de rauwe inhoud zodat niets stilletjes
    /// verloren gaat.
    Unknown {
        tag: String,
        raw: serde_json::Value,
    },
}

impl<N> Value<N> {
    /// Geeft de variantnaam terug. Wordt gebruikt in foutmeldingen.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Float(_) => ValueKind::Float,
            Self::Pt(_) => ValueKind::Pt,
            Self::PtList(_) => ValueKind::PtList,
            Self::List(_) => ValueKind::List,
            Self::Tup(_) => ValueKind::Tup,
            Self::LList(_) => ValueKind::LList,
            Self::HMatrix(_) => ValueKind::HMatrix,
            Self::Polygon(_) => ValueKind::Polygon,
            Self::Color(_) => ValueKind::Color,
            Self::Palette(_) => ValueKind::Palette,
            Self::Opaque(_) => ValueKind::Opaque,
            Self::Unknown { .. } => ValueKind::Unknown,
        }
    }

    /// Verwacht een `Float` en retourneert de scalair.
    pub fn expect_float(&self) -> Result<&N, ValueError> {
        match self {
            Self::Float(value) => Ok(value),
            _ => Err(ValueError::type_mismatch("Float", self.kind())),
        }
    }

    /// Verwacht een `Pt` en retourneert de coördinaten.
    pub fn expect_pt(&self) -> Result<&Pair<N>, ValueError> {
        match self {
            Self::Pt(point) => Ok(point),
            _ => Err(ValueError::type_mismatch("Pt", self.kind())),
        }
    }

    /// Verwacht een `List` en geeft een slice terug.
    pub fn expect_list(&self) -> Result<&[N], ValueError> {
        match self {
            Self::List(values) => Ok(values),
            _ => Err(ValueError::type_mismatch("List", self.kind())),
        }
    }

    /// Verwacht een `Color` en retourneert een verwijzing.
    pub fn expect_color(&self) -> Result<&Color<N>, ValueError> {
        match self {
            Self::Color(color) => Ok(color),
            _ => Err(ValueError::type_mismatch("Color", self.kind())),
        }
    }

    /// Verwacht een niet-numerieke tekstwaarde (`Str`).
    pub fn expect_str(&self) -> Result<&str, ValueError> {
        match self {
            Self::Opaque(OpaqueValue::Str(text)) => Ok(text),
            _ => Err(ValueError::type_mismatch("Str", self.kind())),
        }
    }
}

/// Typefout voor wanneer een `Value` naar het verkeerde type wordt
/// geconverteerd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    expected: &'static str,
    found: ValueKind,
}

impl ValueError {
    #[must_use]
    pub fn type_mismatch(expected: &'static str, found: ValueKind) -> Self {
        Self { expected, found }
    }

    /// Hulptoegang voor tests en foutafhandeling.
    #[must_use]
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    #[must_use]
    pub fn found(&self) -> ValueKind {
        self.found
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "verwachtte type `{}` maar kreeg `{}`",
            self.expected, self.found
        )
    }
}

impl std::error::Error for ValueError {}

/// Beschrijft het soort `Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Pt,
    PtList,
    List,
    Tup,
    LList,
    HMatrix,
    Polygon,
    Color,
    Palette,
    Opaque,
    Unknown,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Float => "Float",
            Self::Pt => "Pt",
            Self::PtList => "PtList",
            Self::List => "List",
            Self::Tup => "Tup",
            Self::LList => "LList",
            Self::HMatrix => "HMatrix",
            Self::Polygon => "Polygon",
            Self::Color => "Color",
            Self::Palette => "Palette",
            Self::Opaque => "Opaque",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::{OpaqueValue, Value, ValueError, ValueKind};

    #[test]
    fn expect_float_accepts_float() {
        let value = Value::Float(42.0);
        assert_eq!(*value.expect_float().unwrap(), 42.0);
    }

    #[test]
    fn expect_float_rejects_wrong_type() {
        let value: Value<f64> = Value::Pt([0.0, 0.0]);
        let err = value.expect_float().unwrap_err();
        assert_eq!(err.expected(), "Float");
        assert_eq!(err.found(), ValueKind::Pt);
    }

    #[test]
    fn expect_pt_returns_coordinates() {
        let value: Value<f64> = Value::Pt([1.0, -1.0]);
        assert_eq!(value.expect_pt().unwrap(), &[1.0, -1.0]);
    }

    #[test]
    fn expect_str_requires_opaque_text() {
        let value: Value<f64> = Value::Opaque(OpaqueValue::Str("rgb".to_owned()));
        assert_eq!(value.expect_str().unwrap(), "rgb");

        let non_text: Value<f64> = Value::Float(1.0);
        assert!(matches!(non_text.expect_str(), Err(ValueError { .. })));
    }

    #[test]
    fn unknown_values_report_their_kind() {
        let value: Value<f64> = Value::Unknown {
            tag: "Mystery".to_owned(),
            raw: serde_json::Value::Null,
        };
        assert_eq!(value.kind(), ValueKind::Unknown);
        assert_eq!(value.kind().to_string(), "Unknown");
    }
}
