//! Parser voor het JSON-stateformaat van het externe decodeproces.
//!
//! Het formaat is een getagde boom: een `trMap`-object met per entiteit een
//! veldenobject, velden met tag `FExpr` (losse waarde) of `FGPI` (geneste
//! shape), statussen `Done`/`Pending`/`OptEval` en waardetags `FloatV` t/m
//! `StyleV`. Onbekende waarde- en veldtags worden bewaard als
//! `Unknown`-dragers zodat niets stilletjes verloren gaat; de mapper wijst
//! ze later luidkeels af.

use serde_json::{Map, Value as Json, json};
use thiserror::Error;

use crate::state::expr::{GpiExpr, TagExpr, UnevaluatedExpr};
use crate::state::value::{AffineMatrix, Color, OpaqueValue, Pair, Polygon, Value};
use crate::state::{FieldExpr, Translation, TranslationError};

/// Result type voor parsing van state-documenten.
pub type ParseResult<T> = Result<T, ParseError>;

/// Beschrijft fouten tijdens het parsen.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Het document is geen geldige JSON.
    #[error("JSON parsefout: {0}")]
    Json(#[from] serde_json::Error),
    /// Het document heeft niet de verwachte structuur.
    #[error("ongeldige structuur: {0}")]
    Structure(String),
    /// Een expressiestatus buiten {Done, Pending, OptEval}.
    #[error("onbekende statustag `{tag}` op veld `{path}`")]
    Status { path: String, tag: String },
    /// De vertaling bevat een inconsistente verwijzing.
    #[error("ongeldige vertaling: {0}")]
    Translation(String),
}

impl From<TranslationError> for ParseError {
    fn from(err: TranslationError) -> Self {
        Self::Translation(err.to_string())
    }
}

/// Leest een state-document en converteert het naar een [`Translation`] in
/// het gewone domein.
pub fn parse_str(input: &str) -> ParseResult<Translation<f64>> {
    log::debug!("Start parsing state-document");
    let document: Json = serde_json::from_str(input)?;
    let tr_map = document
        .get("trMap")
        .and_then(Json::as_object)
        .ok_or_else(|| ParseError::Structure("geen `trMap`-object gevonden".to_owned()))?;
    log::debug!("Found {} entities", tr_map.len());

    let mut translation = Translation::new();
    for (entity, fields) in tr_map {
        let fields = fields.as_object().ok_or_else(|| {
            ParseError::Structure(format!("entiteit `{entity}` is geen object"))
        })?;
        for (field, node) in fields {
            let path = format!("{entity}.{field}");
            let expr = decode_field_expr(node, &path)?;
            translation.insert_field(entity.as_str(), field.as_str(), expr)?;
        }
    }
    Ok(translation)
}

fn tagged(node: &Json, path: &str) -> ParseResult<(String, Json)> {
    let object = node
        .as_object()
        .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen getagd object")))?;
    let tag = object
        .get("tag")
        .and_then(Json::as_str)
        .ok_or_else(|| ParseError::Structure(format!("`{path}` mist een `tag`-veld")))?;
    let contents = object.get("contents").cloned().unwrap_or(Json::Null);
    Ok((tag.to_owned(), contents))
}

fn decode_field_expr(node: &Json, path: &str) -> ParseResult<FieldExpr<f64>> {
    let (tag, contents) = tagged(node, path)?;
    match tag.as_str() {
        "FExpr" => Ok(FieldExpr::Simple(decode_tag_expr(&contents, path)?)),
        "FGPI" => Ok(FieldExpr::Gpi(decode_gpi(&contents, path)?)),
        _ => Ok(FieldExpr::Unknown {
            tag,
            raw: node.clone(),
        }),
    }
}

fn decode_gpi(contents: &Json, path: &str) -> ParseResult<GpiExpr<f64>> {
    let parts = contents
        .as_array()
        .filter(|parts| parts.len() == 2)
        .ok_or_else(|| {
            ParseError::Structure(format!("`{path}` is geen [shapetype, eigenschappen]-paar"))
        })?;
    let shape = parts[0]
        .as_str()
        .ok_or_else(|| ParseError::Structure(format!("`{path}` heeft geen shapetype")))?;
    let properties = parts[1].as_object().ok_or_else(|| {
        ParseError::Structure(format!("`{path}` heeft geen eigenschappenobject"))
    })?;

    let mut gpi = GpiExpr::new(shape);
    for (name, property) in properties {
        let property_path = format!("{path}.{name}");
        gpi.set_property(name.as_str(), decode_tag_expr(property, &property_path)?);
    }
    Ok(gpi)
}

fn decode_tag_expr(node: &Json, path: &str) -> ParseResult<TagExpr<f64>> {
    let (tag, contents) = tagged(node, path)?;
    match tag.as_str() {
        "Done" => Ok(TagExpr::Done(decode_value(&contents, path)?)),
        "Pending" => Ok(TagExpr::Pending(decode_value(&contents, path)?)),
        "OptEval" => Ok(TagExpr::Unevaluated(UnevaluatedExpr::new(contents))),
        _ => Err(ParseError::Status {
            path: path.to_owned(),
            tag,
        }),
    }
}

/// Decodeert één getagde waarde. Onbekende tags worden als
/// [`Value::Unknown`] bewaard.
pub fn decode_value(node: &Json, path: &str) -> ParseResult<Value<f64>> {
    let (tag, contents) = tagged(node, path)?;
    match tag.as_str() {
        "FloatV" => Ok(Value::Float(decode_scalar(&contents, path)?)),
        "PtV" => Ok(Value::Pt(decode_pair(&contents, path)?)),
        "PtListV" => Ok(Value::PtList(decode_pair_list(&contents, path)?)),
        "ListV" => Ok(Value::List(decode_scalar_list(&contents, path)?)),
        "TupV" => Ok(Value::Tup(decode_pair(&contents, path)?)),
        "LListV" => {
            let lists = contents
                .as_array()
                .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen lijst")))?
                .iter()
                .map(|list| decode_scalar_list(list, path))
                .collect::<ParseResult<_>>()?;
            Ok(Value::LList(lists))
        }
        "HMatrixV" => Ok(Value::HMatrix(decode_matrix(&contents, path)?)),
        "PolygonV" => Ok(Value::Polygon(decode_polygon(&contents, path)?)),
        "ColorV" => Ok(Value::Color(decode_color(&contents, path)?)),
        "PaletteV" => {
            let colors = contents
                .as_array()
                .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen palet")))?
                .iter()
                .map(|color| decode_color(color, path))
                .collect::<ParseResult<_>>()?;
            Ok(Value::Palette(colors))
        }
        "IntV" => {
            let int = contents
                .as_i64()
                .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen geheel getal")))?;
            Ok(Value::Opaque(OpaqueValue::Int(int)))
        }
        "BoolV" => {
            let flag = contents
                .as_bool()
                .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen boolean")))?;
            Ok(Value::Opaque(OpaqueValue::Bool(flag)))
        }
        "StrV" => Ok(Value::Opaque(OpaqueValue::Str(decode_text(
            &contents, path,
        )?))),
        "FileV" => Ok(Value::Opaque(OpaqueValue::File(decode_text(
            &contents, path,
        )?))),
        "StyleV" => Ok(Value::Opaque(OpaqueValue::Style(decode_text(
            &contents, path,
        )?))),
        _ => Ok(Value::Unknown {
            tag,
            raw: node.clone(),
        }),
    }
}

fn decode_text(node: &Json, path: &str) -> ParseResult<String> {
    node.as_str()
        .map(str::to_owned)
        .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen tekst")))
}

fn decode_scalar(node: &Json, path: &str) -> ParseResult<f64> {
    node.as_f64()
        .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen numerieke waarde")))
}

fn decode_pair(node: &Json, path: &str) -> ParseResult<Pair<f64>> {
    let parts = node
        .as_array()
        .filter(|parts| parts.len() == 2)
        .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen paar")))?;
    Ok([
        decode_scalar(&parts[0], path)?,
        decode_scalar(&parts[1], path)?,
    ])
}

fn decode_scalar_list(node: &Json, path: &str) -> ParseResult<Vec<f64>> {
    node.as_array()
        .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen lijst")))?
        .iter()
        .map(|entry| decode_scalar(entry, path))
        .collect()
}

fn decode_pair_list(node: &Json, path: &str) -> ParseResult<Vec<Pair<f64>>> {
    node.as_array()
        .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen puntenlijst")))?
        .iter()
        .map(|entry| decode_pair(entry, path))
        .collect()
}

fn decode_pair_llist(node: &Json, path: &str) -> ParseResult<Vec<Vec<Pair<f64>>>> {
    node.as_array()
        .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen lijst van puntenlijsten")))?
        .iter()
        .map(|entry| decode_pair_list(entry, path))
        .collect()
}

fn matrix_entry(object: &Map<String, Json>, key: &str, path: &str) -> ParseResult<f64> {
    let node = object
        .get(key)
        .ok_or_else(|| ParseError::Structure(format!("`{path}` mist matrixveld `{key}`")))?;
    decode_scalar(node, path)
}

fn decode_matrix(node: &Json, path: &str) -> ParseResult<AffineMatrix<f64>> {
    let object = node
        .as_object()
        .ok_or_else(|| ParseError::Structure(format!("`{path}` is geen matrixrecord")))?;
    Ok(AffineMatrix {
        x_scale: matrix_entry(object, "xScale", path)?,
        x_skew: matrix_entry(object, "xSkew", path)?,
        y_scale: matrix_entry(object, "yScale", path)?,
        y_skew: matrix_entry(object, "ySkew", path)?,
        dx: matrix_entry(object, "dx", path)?,
        dy: matrix_entry(object, "dy", path)?,
    })
}

fn decode_polygon(node: &Json, path: &str) -> ParseResult<Polygon<f64>> {
    let parts = node
        .as_array()
        .filter(|parts| parts.len() == 4)
        .ok_or_else(|| {
            ParseError::Structure(format!("`{path}` is geen 4-delige polygoonbundel"))
        })?;
    let bbox = parts[2]
        .as_array()
        .filter(|corners| corners.len() == 2)
        .ok_or_else(|| ParseError::Structure(format!("`{path}` heeft geen bounding box")))?;
    Ok(Polygon {
        boundaries: decode_pair_llist(&parts[0], path)?,
        holes: decode_pair_llist(&parts[1], path)?,
        bbox: (
            decode_pair(&bbox[0], path)?,
            decode_pair(&bbox[1], path)?,
        ),
        samples: decode_pair_list(&parts[3], path)?,
    })
}

fn decode_color(node: &Json, path: &str) -> ParseResult<Color<f64>> {
    let (tag, contents) = tagged(node, path)?;
    let channels = contents
        .as_array()
        .filter(|channels| channels.len() == 4)
        .ok_or_else(|| ParseError::Structure(format!("`{path}` heeft geen vier kleurkanalen")))?;
    let mut decoded = [0.0; 4];
    for (slot, channel) in decoded.iter_mut().zip(channels) {
        *slot = decode_scalar(channel, path)?;
    }
    match tag.as_str() {
        "RGBA" => Ok(Color::Rgba(decoded)),
        "HSVA" => Ok(Color::Hsva(decoded)),
        _ => Err(ParseError::Structure(format!(
            "`{path}` heeft onbekende kleurtag `{tag}`"
        ))),
    }
}

/// Codeert een vertaling in het gewone domein terug naar het wire-formaat.
pub fn to_json_string(translation: &Translation<f64>) -> ParseResult<String> {
    Ok(serde_json::to_string(&encode_translation(translation))?)
}

fn encode_translation(translation: &Translation<f64>) -> Json {
    let mut tr_map = Map::new();
    for (entity, fields) in translation.entities() {
        let mut encoded_fields = Map::new();
        for (field, expr) in fields {
            encoded_fields.insert(field.0.clone(), encode_field_expr(expr));
        }
        tr_map.insert(entity.0.clone(), Json::Object(encoded_fields));
    }
    json!({ "trMap": tr_map })
}

fn encode_field_expr(expr: &FieldExpr<f64>) -> Json {
    match expr {
        FieldExpr::Simple(inner) => json!({ "tag": "FExpr", "contents": encode_tag_expr(inner) }),
        FieldExpr::Gpi(gpi) => {
            let mut properties = Map::new();
            for (name, property) in &gpi.properties {
                properties.insert(name.0.clone(), encode_tag_expr(property));
            }
            json!({ "tag": "FGPI", "contents": [gpi.shape, properties] })
        }
        FieldExpr::Unknown { raw, .. } => raw.clone(),
    }
}

fn encode_tag_expr(expr: &TagExpr<f64>) -> Json {
    match expr {
        TagExpr::Done(value) => json!({ "tag": "Done", "contents": encode_value(value) }),
        TagExpr::Pending(value) => json!({ "tag": "Pending", "contents": encode_value(value) }),
        TagExpr::Unevaluated(inner) => json!({ "tag": "OptEval", "contents": inner.raw }),
    }
}

fn encode_pair(pair: &Pair<f64>) -> Json {
    json!([pair[0], pair[1]])
}

fn encode_pair_list(pairs: &[Pair<f64>]) -> Json {
    Json::Array(pairs.iter().map(encode_pair).collect())
}

fn encode_pair_llist(lists: &[Vec<Pair<f64>>]) -> Json {
    Json::Array(lists.iter().map(|pairs| encode_pair_list(pairs)).collect())
}

fn encode_color(color: &Color<f64>) -> Json {
    match color {
        Color::Rgba(channels) => json!({ "tag": "RGBA", "contents": channels }),
        Color::Hsva(channels) => json!({ "tag": "HSVA", "contents": channels }),
    }
}

/// Codeert één waarde naar het getagde wire-formaat.
pub fn encode_value(value: &Value<f64>) -> Json {
    match value {
        Value::Float(scalar) => json!({ "tag": "FloatV", "contents": scalar }),
        Value::Pt(point) => json!({ "tag": "PtV", "contents": encode_pair(point) }),
        Value::PtList(points) => json!({ "tag": "PtListV", "contents": encode_pair_list(points) }),
        Value::List(scalars) => json!({ "tag": "ListV", "contents": scalars }),
        Value::Tup(pair) => json!({ "tag": "TupV", "contents": encode_pair(pair) }),
        Value::LList(lists) => json!({ "tag": "LListV", "contents": lists }),
        Value::HMatrix(matrix) => json!({
            "tag": "HMatrixV",
            "contents": {
                "xScale": matrix.x_scale,
                "xSkew": matrix.x_skew,
                "yScale": matrix.y_scale,
                "ySkew": matrix.y_skew,
                "dx": matrix.dx,
                "dy": matrix.dy,
            }
        }),
        Value::Polygon(polygon) => json!({
            "tag": "PolygonV",
            "contents": [
                encode_pair_llist(&polygon.boundaries),
                encode_pair_llist(&polygon.holes),
                [encode_pair(&polygon.bbox.0), encode_pair(&polygon.bbox.1)],
                encode_pair_list(&polygon.samples),
            ]
        }),
        Value::Color(color) => json!({ "tag": "ColorV", "contents": encode_color(color) }),
        Value::Palette(colors) => json!({
            "tag": "PaletteV",
            "contents": Json::Array(colors.iter().map(encode_color).collect()),
        }),
        Value::Opaque(OpaqueValue::Int(int)) => json!({ "tag": "IntV", "contents": int }),
        Value::Opaque(OpaqueValue::Bool(flag)) => json!({ "tag": "BoolV", "contents": flag }),
        Value::Opaque(OpaqueValue::Str(text)) => json!({ "tag": "StrV", "contents": text }),
        Value::Opaque(OpaqueValue::File(file)) => json!({ "tag": "FileV", "contents": file }),
        Value::Opaque(OpaqueValue::Style(style)) => json!({ "tag": "StyleV", "contents": style }),
        Value::Unknown { raw, .. } => raw.clone(),
    }
}
