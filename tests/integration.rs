use diagram_engine::Engine;
use diagram_engine::state::convert;
use diagram_engine::state::expr::{ExprStatus, TagExpr};
use diagram_engine::state::map::{CollectSink, MapDiagnostic, MapError, map_translation};
use diagram_engine::state::value::Value;
use diagram_engine::state::{FieldExpr, Translation};
use diagram_engine::parse::state_json;

const CIRCLE_STATE: &str = r#"{
    "trMap": {
        "c1": {
            "name": { "tag": "FExpr", "contents": { "tag": "Done", "contents": { "tag": "StrV", "contents": "c1" } } },
            "icon": { "tag": "FGPI", "contents": ["Circle", {
                "r": { "tag": "Done", "contents": { "tag": "FloatV", "contents": 2.5 } },
                "center": { "tag": "Done", "contents": { "tag": "PtV", "contents": [1.0, -1.0] } },
                "color": { "tag": "Done", "contents": { "tag": "ColorV", "contents": { "tag": "RGBA", "contents": [0.1, 0.2, 0.3, 1.0] } } }
            }] }
        }
    }
}"#;

#[test]
fn engine_initializes() {
    let engine = Engine::new();
    assert!(!engine.is_initialized());
    assert_eq!(engine.entity_count(), 0);
}

#[test]
fn engine_loads_and_renders_a_state() {
    let mut engine = Engine::new();
    engine.load_state(CIRCLE_STATE).expect("load state");
    assert!(engine.is_initialized());
    assert_eq!(engine.entity_count(), 1);

    // De renderversie moet dezelfde vertaling beschrijven als de invoer.
    let rendered = engine.render_state().expect("render state");
    let reparsed = state_json::parse_str(&rendered).expect("reparse");
    let original = state_json::parse_str(CIRCLE_STATE).expect("parse original");
    assert_eq!(reparsed, original);
}

#[test]
fn engine_summarizes_shapes() {
    let mut engine = Engine::new();
    engine.load_state(CIRCLE_STATE).expect("load state");

    let summary = engine.native_summary().expect("summary");
    assert_eq!(summary.entities, 1);
    assert_eq!(summary.fields, 2);
    assert_eq!(summary.shapes.len(), 1);
    assert_eq!(summary.shapes[0].entity, "c1");
    assert_eq!(summary.shapes[0].field, "icon");
    assert_eq!(summary.shapes[0].shape, "Circle");
    assert_eq!(summary.shapes[0].properties, 3);
}

#[test]
fn engine_computes_in_the_differentiable_domain() {
    let engine = Engine::new();
    let result = engine
        .compute(
            "rgba",
            r#"[
                { "tag": "FloatV", "contents": 0.1 },
                { "tag": "FloatV", "contents": 0.2 },
                { "tag": "FloatV", "contents": 0.3 },
                { "tag": "FloatV", "contents": 1.0 }
            ]"#,
        )
        .expect("rgba");
    let decoded: serde_json::Value = serde_json::from_str(&result).expect("json");
    assert_eq!(
        decoded,
        serde_json::json!({ "tag": "ColorV", "contents": { "tag": "RGBA", "contents": [0.1, 0.2, 0.3, 1.0] } })
    );
}

#[test]
fn engine_computes_over_a_loaded_shape() {
    let state = r#"{
        "trMap": {
            "a1": {
                "icon": { "tag": "FGPI", "contents": ["Arrow", {
                    "startX": { "tag": "Done", "contents": { "tag": "FloatV", "contents": 0.0 } },
                    "startY": { "tag": "Done", "contents": { "tag": "FloatV", "contents": 0.0 } },
                    "endX": { "tag": "Done", "contents": { "tag": "FloatV", "contents": 3.0 } },
                    "endY": { "tag": "Done", "contents": { "tag": "FloatV", "contents": 4.0 } }
                }] }
            }
        }
    }"#;
    let mut engine = Engine::new();
    engine.load_state(state).expect("load state");

    let result = engine
        .compute("lineLength", r#"["a1.icon"]"#)
        .expect("lineLength");
    let decoded: serde_json::Value = serde_json::from_str(&result).expect("json");
    assert_eq!(
        decoded,
        serde_json::json!({ "tag": "FloatV", "contents": 5.0 })
    );
}

#[test]
fn full_round_trip_preserves_names_statuses_and_values() {
    let translation = state_json::parse_str(CIRCLE_STATE).expect("parse");
    let differentiable = convert::to_differentiable_domain(&translation).expect("heen");
    let back = convert::to_plain_domain(&differentiable).expect("terug");
    assert_eq!(back, translation);
}

#[test]
fn unevaluated_fields_survive_conversion_with_one_diagnostic() {
    let state = r#"{
        "trMap": {
            "t1": {
                "label": { "tag": "FExpr", "contents": { "tag": "OptEval", "contents": { "op": "labelWidth" } } },
                "size": { "tag": "FExpr", "contents": { "tag": "Done", "contents": { "tag": "FloatV", "contents": 12.0 } } }
            }
        }
    }"#;
    let translation = state_json::parse_str(state).expect("parse");

    let mut sink = CollectSink::default();
    let differentiable =
        convert::to_differentiable_domain_with(&translation, &mut sink).expect("conversie");

    assert_eq!(
        sink.diagnostics,
        [MapDiagnostic::UnevaluatedExpression {
            path: "t1.label".to_owned()
        }]
    );
    let label = differentiable
        .field(&"t1".into(), &"label".into())
        .expect("label veld");
    let FieldExpr::Simple(expr) = label else {
        panic!("label is geen simpel veld");
    };
    assert_eq!(expr.status(), ExprStatus::Unevaluated);
}

#[test]
fn mystery_tags_abort_without_partial_result() {
    let state = r#"{
        "trMap": {
            "c1": {
                "good": { "tag": "FExpr", "contents": { "tag": "Done", "contents": { "tag": "FloatV", "contents": 1.0 } } },
                "weird": { "tag": "FExpr", "contents": { "tag": "Done", "contents": { "tag": "Mystery", "contents": 9.0 } } }
            }
        }
    }"#;
    let translation = state_json::parse_str(state).expect("parse tolereert onbekende waardetags");

    let mut sink = CollectSink::default();
    let result = map_translation(&|x: &f64| *x, &translation, &mut sink);
    assert!(matches!(
        result,
        Err(MapError::UnrecognizedVariant { ref tag }) if tag == "Mystery"
    ));
}

#[test]
fn pending_values_keep_their_status_through_the_pipeline() {
    let state = r#"{
        "trMap": {
            "t1": {
                "w": { "tag": "FExpr", "contents": { "tag": "Pending", "contents": { "tag": "FloatV", "contents": 0.0 } } }
            }
        }
    }"#;
    let translation = state_json::parse_str(state).expect("parse");
    let differentiable = convert::to_differentiable_domain(&translation).expect("heen");
    let back = convert::to_plain_domain(&differentiable).expect("terug");

    let FieldExpr::Simple(expr) = back.field(&"t1".into(), &"w".into()).expect("veld w") else {
        panic!("w is geen simpel veld");
    };
    assert_eq!(expr.status(), ExprStatus::Pending);
    assert!(matches!(expr.value(), Some(Value::Float(v)) if *v == 0.0));
}

#[test]
fn translations_can_be_built_programmatically_and_rendered() {
    let mut translation: Translation<f64> = Translation::new();
    translation
        .insert_field(
            "e1",
            "x",
            FieldExpr::Simple(TagExpr::Done(Value::Float(42.0))),
        )
        .expect("insert");

    let encoded = state_json::to_json_string(&translation).expect("encode");
    let reparsed = state_json::parse_str(&encoded).expect("reparse");
    assert_eq!(reparsed, translation);
}
