//! Canonical feature mapping
//!
//! Plan-prediction requests arrive in one of two dialects:
//!
//! - **coded**: `{objetivo, dificultad, limitacion, tiempo, frecuencia}` as integer codes
//! - **descriptive**: `{goal, experience, minutes, sex, age}` as free-form values
//!
//! Both are reconciled into a [`CanonicalFeatures`] vector. Resolution is total:
//! missing or malformed fields fall back to defaults and never produce an error.
//! Each field records where its value came from ([`FieldSource`]) so fallbacks
//! stay visible in logs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_OBJETIVO: i64 = 1;
pub const DEFAULT_DIFICULTAD: i64 = 1;
pub const DEFAULT_LIMITACION: i64 = 4;
pub const DEFAULT_TIEMPO: i64 = 2;
pub const DEFAULT_FRECUENCIA: i64 = 3;

/// Feature names in model column order
pub const FEATURE_NAMES: [&str; 5] = ["objetivo", "dificultad", "limitacion", "tiempo", "frecuencia"];

/// Wire form of a plan-prediction request.
///
/// Fields of both dialects are accepted; anything else in the payload is
/// dropped during deserialization. `experience` and `minutes` take
/// precedence over their camelCase spellings when both are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuery {
    pub objetivo: Option<Value>,
    pub dificultad: Option<Value>,
    pub limitacion: Option<Value>,
    pub tiempo: Option<Value>,
    pub frecuencia: Option<Value>,

    pub goal: Option<Value>,
    pub experience: Option<Value>,
    #[serde(rename = "experienceLevel")]
    pub experience_level: Option<Value>,
    pub minutes: Option<Value>,
    #[serde(rename = "minutesAvailable")]
    pub minutes_available: Option<Value>,
    pub sex: Option<Value>,
    pub age: Option<Value>,
}

/// First non-null value of two spellings of the same field
fn either_spelling(preferred: Option<Value>, other: Option<Value>) -> Option<Value> {
    preferred.filter(|v| !v.is_null()).or(other)
}

/// Integer-coded dialect
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodedFields {
    pub objetivo: Option<Value>,
    pub dificultad: Option<Value>,
    pub limitacion: Option<Value>,
    pub tiempo: Option<Value>,
    pub frecuencia: Option<Value>,
}

impl CodedFields {
    fn is_empty(&self) -> bool {
        self.objetivo.is_none()
            && self.dificultad.is_none()
            && self.limitacion.is_none()
            && self.tiempo.is_none()
            && self.frecuencia.is_none()
    }
}

/// Descriptive dialect
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptiveFields {
    pub goal: Option<Value>,
    pub experience: Option<Value>,
    pub minutes: Option<Value>,
    pub sex: Option<Value>,
    pub age: Option<Value>,
}

impl DescriptiveFields {
    fn is_empty(&self) -> bool {
        self.goal.is_none()
            && self.experience.is_none()
            && self.minutes.is_none()
            && self.sex.is_none()
            && self.age.is_none()
    }
}

/// A request classified by the dialect(s) it carries
#[derive(Debug, Clone, PartialEq)]
pub enum RequestShape {
    Empty,
    Coded(CodedFields),
    Descriptive(DescriptiveFields),
    Mixed {
        coded: CodedFields,
        descriptive: DescriptiveFields,
    },
}

impl RequestShape {
    pub fn kind(&self) -> &'static str {
        match self {
            RequestShape::Empty => "empty",
            RequestShape::Coded(_) => "coded",
            RequestShape::Descriptive(_) => "descriptive",
            RequestShape::Mixed { .. } => "mixed",
        }
    }

    fn parts(&self) -> (Option<&CodedFields>, Option<&DescriptiveFields>) {
        match self {
            RequestShape::Empty => (None, None),
            RequestShape::Coded(c) => (Some(c), None),
            RequestShape::Descriptive(d) => (None, Some(d)),
            RequestShape::Mixed { coded, descriptive } => (Some(coded), Some(descriptive)),
        }
    }
}

impl From<RawQuery> for RequestShape {
    fn from(raw: RawQuery) -> Self {
        let coded = CodedFields {
            objetivo: raw.objetivo,
            dificultad: raw.dificultad,
            limitacion: raw.limitacion,
            tiempo: raw.tiempo,
            frecuencia: raw.frecuencia,
        };
        let descriptive = DescriptiveFields {
            goal: raw.goal,
            experience: either_spelling(raw.experience, raw.experience_level),
            minutes: either_spelling(raw.minutes, raw.minutes_available),
            sex: raw.sex,
            age: raw.age,
        };

        match (coded.is_empty(), descriptive.is_empty()) {
            (true, true) => RequestShape::Empty,
            (false, true) => RequestShape::Coded(coded),
            (true, false) => RequestShape::Descriptive(descriptive),
            (false, false) => RequestShape::Mixed { coded, descriptive },
        }
    }
}

/// The five integer attributes consumed by the plan models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalFeatures {
    pub objetivo: i64,
    pub dificultad: i64,
    pub limitacion: i64,
    pub tiempo: i64,
    pub frecuencia: i64,
}

impl Default for CanonicalFeatures {
    fn default() -> Self {
        Self {
            objetivo: DEFAULT_OBJETIVO,
            dificultad: DEFAULT_DIFICULTAD,
            limitacion: DEFAULT_LIMITACION,
            tiempo: DEFAULT_TIEMPO,
            frecuencia: DEFAULT_FRECUENCIA,
        }
    }
}

impl CanonicalFeatures {
    /// Resolve a raw request; never fails
    pub fn from_raw(raw: RawQuery) -> Self {
        FeatureMapper::resolve(&RequestShape::from(raw)).features
    }

    /// Values in [`FEATURE_NAMES`] order
    pub fn as_array(&self) -> [i64; 5] {
        [
            self.objetivo,
            self.dificultad,
            self.limitacion,
            self.tiempo,
            self.frecuencia,
        ]
    }
}

/// Where a resolved field value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    /// Explicit integer code
    Coded,
    /// Derived from a descriptive field
    Derived,
    /// Nothing supplied, default used
    Defaulted,
    /// A value was supplied but could not be coerced; default substituted
    Recovered,
}

/// A value together with its provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coerced<T> {
    pub value: T,
    pub source: FieldSource,
}

impl<T> Coerced<T> {
    fn new(value: T, source: FieldSource) -> Self {
        Self { value, source }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, FieldSource::Defaulted | FieldSource::Recovered)
    }
}

/// Result of resolving a request
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub features: CanonicalFeatures,
    pub sources: [FieldSource; 5],
}

impl Resolution {
    /// Names of fields whose supplied value was unusable
    pub fn recovered_fields(&self) -> Vec<&'static str> {
        FEATURE_NAMES
            .iter()
            .zip(self.sources.iter())
            .filter(|(_, s)| **s == FieldSource::Recovered)
            .map(|(n, _)| *n)
            .collect()
    }
}

/// Coerce a JSON value to an integer the way a lenient form parser would:
/// integers pass, finite floats truncate, numeric strings parse, booleans map to 0/1.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Parse-or-default: absent values report `Defaulted`, unusable ones `Recovered`
pub fn parse_int_or(value: Option<&Value>, default: i64) -> Coerced<i64> {
    match value {
        None | Some(Value::Null) => Coerced::new(default, FieldSource::Defaulted),
        Some(v) => match parse_int(v) {
            Some(n) => Coerced::new(n, FieldSource::Coded),
            None => Coerced::new(default, FieldSource::Recovered),
        },
    }
}

/// Goal text to `objetivo` code
pub fn map_goal(goal: &str) -> i64 {
    let goal = goal.to_lowercase();
    if goal.contains("mus") {
        2
    } else if goal.contains("hiit") || goal.contains("cardio") {
        3
    } else if goal.contains("recomp") {
        4
    } else {
        1
    }
}

/// Experience text to `dificultad` code
pub fn map_experience(experience: &str) -> i64 {
    let experience = experience.to_lowercase();
    if experience.contains("avan") {
        3
    } else if experience.contains("inter") {
        2
    } else {
        1
    }
}

/// Minutes available to the `tiempo` bucket (1=<20, 2=20-29, 3=30-44, 4=45+)
pub fn minutes_to_bucket(minutes: i64) -> i64 {
    match minutes {
        m if m < 20 => 1,
        m if m < 30 => 2,
        m if m < 45 => 3,
        _ => 4,
    }
}

/// Reconciles either request dialect into [`CanonicalFeatures`]
pub struct FeatureMapper;

impl FeatureMapper {
    /// Resolve every field; explicit codes win over descriptive values, which win over defaults
    pub fn resolve(shape: &RequestShape) -> Resolution {
        let (coded, descriptive) = shape.parts();
        let no_codes = CodedFields::default();
        let no_text = DescriptiveFields::default();
        let c = coded.unwrap_or(&no_codes);
        let d = descriptive.unwrap_or(&no_text);

        let objetivo = Self::resolve_text(
            c.objetivo.as_ref(),
            d.goal.as_ref(),
            map_goal,
            DEFAULT_OBJETIVO,
        );
        let dificultad = Self::resolve_text(
            c.dificultad.as_ref(),
            d.experience.as_ref(),
            map_experience,
            DEFAULT_DIFICULTAD,
        );
        let limitacion = parse_int_or(c.limitacion.as_ref(), DEFAULT_LIMITACION);
        let tiempo = Self::resolve_tiempo(c.tiempo.as_ref(), d.minutes.as_ref());
        let frecuencia = parse_int_or(c.frecuencia.as_ref(), DEFAULT_FRECUENCIA);

        let resolution = Resolution {
            features: CanonicalFeatures {
                objetivo: objetivo.value,
                dificultad: dificultad.value,
                limitacion: limitacion.value,
                tiempo: tiempo.value,
                frecuencia: frecuencia.value,
            },
            sources: [
                objetivo.source,
                dificultad.source,
                limitacion.source,
                tiempo.source,
                frecuencia.source,
            ],
        };

        let recovered = resolution.recovered_fields();
        if !recovered.is_empty() {
            tracing::debug!(fields = ?recovered, "substituted defaults for unparseable fields");
        }
        tracing::debug!(
            dialect = shape.kind(),
            features = ?resolution.features,
            sources = ?resolution.sources,
            "resolved canonical features"
        );

        resolution
    }

    fn resolve_text(
        code: Option<&Value>,
        text: Option<&Value>,
        map: fn(&str) -> i64,
        default: i64,
    ) -> Coerced<i64> {
        if let Some(v) = code.filter(|v| !v.is_null()) {
            return parse_int_or(Some(v), default);
        }
        match text {
            None | Some(Value::Null) => Coerced::new(default, FieldSource::Defaulted),
            Some(Value::String(s)) if s.is_empty() => Coerced::new(default, FieldSource::Defaulted),
            Some(Value::String(s)) => Coerced::new(map(s), FieldSource::Derived),
            Some(_) => Coerced::new(default, FieldSource::Recovered),
        }
    }

    fn resolve_tiempo(code: Option<&Value>, minutes: Option<&Value>) -> Coerced<i64> {
        if let Some(v) = code.filter(|v| !v.is_null()) {
            return parse_int_or(Some(v), DEFAULT_TIEMPO);
        }
        let minutes = parse_int_or(minutes, DEFAULT_TIEMPO);
        match minutes.source {
            FieldSource::Coded => Coerced::new(minutes_to_bucket(minutes.value), FieldSource::Derived),
            _ => minutes,
        }
    }
}
