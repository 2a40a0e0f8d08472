//! Structuurbehoudende mapping van waarden tussen numerieke domeinen.
//!
//! Elke functie hier reconstrueert exact dezelfde vorm (tags, ariteiten,
//! lengtes, veldverzamelingen) in het doeldomein; alleen scalaire bladeren
//! gaan door de meegegeven transformatie.

use std::collections::BTreeMap;

use thiserror::Error;

use super::expr::{GpiExpr, TagExpr};
use super::value::{AffineMatrix, Color, Pair, Polygon, Value};
use super::{FieldDict, FieldExpr, Translation};

/// Fouttype voor mappingproblemen. Beide varianten zijn fataal: de hele
/// conversie wordt afgebroken en er wordt nooit een halve vertaling
/// teruggegeven.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Een waarde droeg een tag buiten de gesloten verzameling; wijst op een
    /// schemaverschil tussen producer en deze mapper.
    #[error("onbekende waardetag `{tag}` kan niet geconverteerd worden")]
    UnrecognizedVariant { tag: String },
    /// Een veld droeg een tag buiten de twee bekende veldsoorten.
    #[error("onbekende veldtag `{tag}` op veld `{path}`")]
    UnknownFieldTag { path: String, tag: String },
}

/// Niet-fatale diagnostiek die tijdens een mapping kan optreden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapDiagnostic {
    /// Een veld bevatte een niet-geëvalueerde expressie; het is onveranderd
    /// overgenomen. De aanroeper converteerde te vroeg in de pipeline.
    UnevaluatedExpression { path: String },
}

/// Ontvanger voor niet-fatale diagnostiek tijdens een mapping.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: MapDiagnostic);
}

/// Standaard-sink die diagnostiek naar het logkanaal schrijft.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: MapDiagnostic) {
        match &diagnostic {
            MapDiagnostic::UnevaluatedExpression { path } => {
                log::warn!(
                    "veld `{path}` bevat een niet-geëvalueerde expressie; conversie neemt het ongewijzigd over"
                );
            }
        }
    }
}

/// Sink die alle diagnostiek verzamelt; bedoeld voor tests en voor callers
/// die het aantal anomalieën willen kennen.
#[derive(Debug, Default, Clone)]
pub struct CollectSink {
    pub diagnostics: Vec<MapDiagnostic>,
}

impl DiagnosticSink for CollectSink {
    fn report(&mut self, diagnostic: MapDiagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

fn map_pair<N, M>(transform: &impl Fn(&N) -> M, pair: &Pair<N>) -> Pair<M> {
    [transform(&pair[0]), transform(&pair[1])]
}

fn map_pair_list<N, M>(transform: &impl Fn(&N) -> M, pairs: &[Pair<N>]) -> Vec<Pair<M>> {
    pairs.iter().map(|pair| map_pair(transform, pair)).collect()
}

fn map_pair_llist<N, M>(
    transform: &impl Fn(&N) -> M,
    lists: &[Vec<Pair<N>>],
) -> Vec<Vec<Pair<M>>> {
    lists.iter().map(|pairs| map_pair_list(transform, pairs)).collect()
}

fn map_quad<N, M>(transform: &impl Fn(&N) -> M, quad: &[N; 4]) -> [M; 4] {
    [
        transform(&quad[0]),
        transform(&quad[1]),
        transform(&quad[2]),
        transform(&quad[3]),
    ]
}

fn map_color<N, M>(transform: &impl Fn(&N) -> M, color: &Color<N>) -> Color<M> {
    match color {
        Color::Rgba(channels) => Color::Rgba(map_quad(transform, channels)),
        Color::Hsva(channels) => Color::Hsva(map_quad(transform, channels)),
    }
}

fn map_matrix<N, M>(transform: &impl Fn(&N) -> M, matrix: &AffineMatrix<N>) -> AffineMatrix<M> {
    AffineMatrix {
        x_scale: transform(&matrix.x_scale),
        x_skew: transform(&matrix.x_skew),
        y_scale: transform(&matrix.y_scale),
        y_skew: transform(&matrix.y_skew),
        dx: transform(&matrix.dx),
        dy: transform(&matrix.dy),
    }
}

fn map_polygon<N, M>(transform: &impl Fn(&N) -> M, polygon: &Polygon<N>) -> Polygon<M> {
    Polygon {
        boundaries: map_pair_llist(transform, &polygon.boundaries),
        holes: map_pair_llist(transform, &polygon.holes),
        bbox: (
            map_pair(transform, &polygon.bbox.0),
            map_pair(transform, &polygon.bbox.1),
        ),
        samples: map_pair_list(transform, &polygon.samples),
    }
}

/// Converteert een waarde vormbehoudend naar het doeldomein.
///
/// De transformatie moet totaal zijn: elke scalair die de waarde kan
/// bevatten gaat er precies één keer doorheen. Niet-numerieke varianten
/// worden ongewijzigd gekopieerd.
pub fn map_value<N, M, F>(transform: &F, value: &Value<N>) -> Result<Value<M>, MapError>
where
    F: Fn(&N) -> M,
{
    match value {
        Value::Float(scalar) => Ok(Value::Float(transform(scalar))),
        Value::Pt(point) => Ok(Value::Pt(map_pair(transform, point))),
        Value::PtList(points) => Ok(Value::PtList(map_pair_list(transform, points))),
        Value::List(scalars) => Ok(Value::List(scalars.iter().map(transform).collect())),
        Value::Tup(pair) => Ok(Value::Tup(map_pair(transform, pair))),
        Value::LList(lists) => Ok(Value::LList(
            lists
                .iter()
                .map(|scalars| scalars.iter().map(transform).collect())
                .collect(),
        )),
        Value::HMatrix(matrix) => Ok(Value::HMatrix(map_matrix(transform, matrix))),
        Value::Polygon(polygon) => Ok(Value::Polygon(map_polygon(transform, polygon))),
        Value::Color(color) => Ok(Value::Color(map_color(transform, color))),
        Value::Palette(colors) => Ok(Value::Palette(
            colors.iter().map(|color| map_color(transform, color)).collect(),
        )),
        Value::Opaque(opaque) => Ok(Value::Opaque(opaque.clone())),
        Value::Unknown { tag, .. } => Err(MapError::UnrecognizedVariant { tag: tag.clone() }),
    }
}

/// Converteert een veldexpressie; de resolutiestatus blijft behouden.
///
/// `path` benoemt het veld (bv. `c1.icon.r`) in diagnostiek.
pub fn map_tag_expr<N, M, F>(
    transform: &F,
    expr: &TagExpr<N>,
    path: &str,
    sink: &mut dyn DiagnosticSink,
) -> Result<TagExpr<M>, MapError>
where
    F: Fn(&N) -> M,
{
    match expr {
        TagExpr::Done(value) => Ok(TagExpr::Done(map_value(transform, value)?)),
        TagExpr::Pending(value) => Ok(TagExpr::Pending(map_value(transform, value)?)),
        TagExpr::Unevaluated(inner) => {
            sink.report(MapDiagnostic::UnevaluatedExpression {
                path: path.to_owned(),
            });
            Ok(TagExpr::Unevaluated(inner.clone()))
        }
    }
}

/// Converteert een genest shape-veld; shapetype en eigenschapsverzameling
/// blijven identiek.
pub fn map_gpi_expr<N, M, F>(
    transform: &F,
    expr: &GpiExpr<N>,
    path: &str,
    sink: &mut dyn DiagnosticSink,
) -> Result<GpiExpr<M>, MapError>
where
    F: Fn(&N) -> M,
{
    let mut properties = BTreeMap::new();
    for (name, property) in &expr.properties {
        let property_path = format!("{path}.{name}");
        let mapped = map_tag_expr(transform, property, &property_path, sink)?;
        properties.insert(name.clone(), mapped);
    }
    Ok(GpiExpr {
        shape: expr.shape.clone(),
        properties,
    })
}

/// Converteert een volledige vertaling naar het doeldomein.
///
/// Entiteitsnamen, veldnamen, veldsoorten en statustags blijven exact
/// behouden; de bronvertaling wordt nooit gewijzigd. Fatale fouten breken
/// de hele conversie af.
pub fn map_translation<N, M, F>(
    transform: &F,
    translation: &Translation<N>,
    sink: &mut dyn DiagnosticSink,
) -> Result<Translation<M>, MapError>
where
    F: Fn(&N) -> M,
{
    let mut entities = BTreeMap::new();
    for (entity, fields) in translation.entities() {
        let mut mapped_fields: FieldDict<M> = BTreeMap::new();
        for (field, expr) in fields {
            let path = format!("{entity}.{field}");
            let mapped = match expr {
                FieldExpr::Simple(inner) => {
                    FieldExpr::Simple(map_tag_expr(transform, inner, &path, sink)?)
                }
                FieldExpr::Gpi(inner) => {
                    FieldExpr::Gpi(map_gpi_expr(transform, inner, &path, sink)?)
                }
                FieldExpr::Unknown { tag, .. } => {
                    return Err(MapError::UnknownFieldTag {
                        path,
                        tag: tag.clone(),
                    });
                }
            };
            mapped_fields.insert(field.clone(), mapped);
        }
        entities.insert(entity.clone(), mapped_fields);
    }
    Ok(Translation::from_entities(entities))
}
