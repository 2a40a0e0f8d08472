#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod autodiff;
pub mod computations;
pub mod parse;
pub mod state;

use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

use autodiff::Dual;
use computations::{Arg, ComputationRegistry};
use parse::state_json;
use state::convert;
use state::expr::GpiExpr;
use state::value::Value;
use state::{FieldExpr, Translation};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    log::set_logger(&DEFAULT_LOGGER).expect("error initializing logger");
    log::set_max_level(LevelFilter::Debug);
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Compacte beschrijving van de geladen state, voor de host-UI.
#[derive(Debug, Clone, Serialize)]
pub struct StateSummary {
    pub entities: usize,
    pub fields: usize,
    pub shapes: Vec<ShapeSummary>,
}

/// Eén shape-veld binnen de samenvatting.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeSummary {
    pub entity: String,
    pub field: String,
    pub shape: String,
    pub properties: usize,
}

/// Engine-facade rond de conversiepipeline.
///
/// De host levert een state-document in het gewone domein aan; bij het laden
/// wordt het meteen naar het differentieerbare domein geconverteerd zodat de
/// evaluator ermee kan rekenen. Voor rendering gaat de state weer terug naar
/// het gewone domein.
#[wasm_bindgen]
#[derive(Default)]
pub struct Engine {
    plain: Option<Translation<f64>>,
    differentiable: Option<Translation<Dual>>,
    registry: ComputationRegistry,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Engine {
        Engine::default()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.plain.is_some()
    }

    /// Laadt een state-document (JSON) en converteert het direct naar het
    /// differentieerbare domein.
    pub fn load_state(&mut self, json: &str) -> Result<(), JsError> {
        let translation =
            state_json::parse_str(json).map_err(|err| JsError::new(&err.to_string()))?;
        debug_log!(
            "state geladen: {} entiteiten, {} velden",
            translation.entity_count(),
            translation.field_count()
        );
        let differentiable = convert::to_differentiable_domain(&translation)
            .map_err(|err| JsError::new(&err.to_string()))?;
        self.plain = Some(translation);
        self.differentiable = Some(differentiable);
        Ok(())
    }

    /// Codeert de huidige state in het gewone domein, als JSON voor de
    /// renderer.
    pub fn render_state(&self) -> Result<String, JsError> {
        let differentiable = self
            .differentiable
            .as_ref()
            .ok_or_else(|| JsError::new("geen state geladen"))?;
        let plain = convert::to_plain_domain(differentiable)
            .map_err(|err| JsError::new(&err.to_string()))?;
        state_json::to_json_string(&plain).map_err(|err| JsError::new(&err.to_string()))
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.plain.as_ref().map_or(0, Translation::entity_count)
    }

    /// Entiteitsnamen van de geladen state, als JS-array.
    pub fn entity_names(&self) -> Result<JsValue, JsError> {
        let plain = self
            .plain
            .as_ref()
            .ok_or_else(|| JsError::new("geen state geladen"))?;
        let names: Vec<String> = plain.entity_names().map(|name| name.0.clone()).collect();
        serde_wasm_bindgen::to_value(&names).map_err(|err| JsError::new(&err.to_string()))
    }

    /// Samenvatting van de geladen state, als JS-object.
    pub fn summary(&self) -> Result<JsValue, JsError> {
        let summary = self
            .native_summary()
            .ok_or_else(|| JsError::new("geen state geladen"))?;
        serde_wasm_bindgen::to_value(&summary).map_err(|err| JsError::new(&err.to_string()))
    }

    /// Voert een berekeningsfunctie uit in het differentieerbare domein en
    /// geeft het resultaat terug in het gewone domein, als getagde JSON.
    ///
    /// `args` is een JSON-array; elk element is ofwel een getagde waarde in
    /// het gewone domein, ofwel een `"entiteit.veld"`-verwijzing naar een
    /// shape in de geladen state.
    pub fn compute(&self, name: &str, args: &str) -> Result<String, JsError> {
        let specs: Vec<serde_json::Value> =
            serde_json::from_str(args).map_err(|err| JsError::new(&err.to_string()))?;

        let mut resolved: Vec<ArgSpec> = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            if let Some(path) = spec.as_str() {
                resolved.push(ArgSpec::ShapePath(path.to_owned()));
            } else {
                let path = format!("arg {index}");
                let plain = state_json::decode_value(spec, &path)
                    .map_err(|err| JsError::new(&err.to_string()))?;
                let differentiable = convert::value_to_differentiable(&plain)
                    .map_err(|err| JsError::new(&err.to_string()))?;
                resolved.push(ArgSpec::Val(differentiable));
            }
        }

        let mut call_args: Vec<Arg<'_>> = Vec::with_capacity(resolved.len());
        for spec in &resolved {
            match spec {
                ArgSpec::Val(value) => call_args.push(Arg::Val(value)),
                ArgSpec::ShapePath(path) => call_args.push(Arg::Gpi(self.resolve_gpi(path)?)),
            }
        }

        let result = self
            .registry
            .compute(name, &call_args)
            .map_err(|err| JsError::new(&err.to_string()))?;
        let plain =
            convert::value_to_plain(&result).map_err(|err| JsError::new(&err.to_string()))?;
        serde_json::to_string(&state_json::encode_value(&plain))
            .map_err(|err| JsError::new(&err.to_string()))
    }
}

enum ArgSpec {
    Val(Value<Dual>),
    ShapePath(String),
}

impl Engine {
    /// Samenvatting zonder de JS-grens over te gaan; ook bruikbaar in
    /// native context.
    #[must_use]
    pub fn native_summary(&self) -> Option<StateSummary> {
        let plain = self.plain.as_ref()?;
        let mut shapes = Vec::new();
        for (entity, fields) in plain.entities() {
            for (field, expr) in fields {
                if let FieldExpr::Gpi(gpi) = expr {
                    shapes.push(ShapeSummary {
                        entity: entity.to_string(),
                        field: field.to_string(),
                        shape: gpi.shape.clone(),
                        properties: gpi.properties.len(),
                    });
                }
            }
        }
        Some(StateSummary {
            entities: plain.entity_count(),
            fields: plain.field_count(),
            shapes,
        })
    }

    fn resolve_gpi(&self, path: &str) -> Result<&GpiExpr<Dual>, JsError> {
        let differentiable = self
            .differentiable
            .as_ref()
            .ok_or_else(|| JsError::new("geen state geladen"))?;
        let (entity, field) = path
            .split_once('.')
            .ok_or_else(|| JsError::new(&format!("`{path}` is geen `entiteit.veld`-pad")))?;
        match differentiable.field(&entity.into(), &field.into()) {
            Some(FieldExpr::Gpi(gpi)) => Ok(gpi),
            Some(_) => Err(JsError::new(&format!("`{path}` is geen shape-veld"))),
            None => Err(JsError::new(&format!("veld `{path}` niet gevonden"))),
        }
    }
}
