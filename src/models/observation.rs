// src/models/observation.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// A numeric measurement as sent by the client.
///
/// Clients are not consistent about types, so anything is accepted here
/// and coercion to `f64` happens during feature mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measurement {
    Number(f64),
    Text(String),
    Other(JsonValue),
}

impl Measurement {
    /// The finite numeric value, if the measurement has one.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Measurement::Number(n) => *n,
            Measurement::Text(s) => s.trim().parse::<f64>().ok()?,
            Measurement::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for Measurement {
    fn from(value: f64) -> Self {
        Measurement::Number(value)
    }
}

/// The numeric fields of a [`SiteObservation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservationField {
    Temperatura,
    HumedadRelativa,
    IntensidadLuminica,
    Ph,
    HumedadSuelo,
    CarbonoOrganico,
    NitrogenoTotal,
    FosforoSoluble,
    AguaPorcentual,
    Nacl,
    Cd,
    Al,
}

impl ObservationField {
    /// Field name on the wire.
    pub fn key(self) -> &'static str {
        match self {
            ObservationField::Temperatura => "temperatura",
            ObservationField::HumedadRelativa => "humedadRelativa",
            ObservationField::IntensidadLuminica => "intensidadLuminica",
            ObservationField::Ph => "pH",
            ObservationField::HumedadSuelo => "humedadSuelo",
            ObservationField::CarbonoOrganico => "carbonoOrganico",
            ObservationField::NitrogenoTotal => "nitrogenoTotal",
            ObservationField::FosforoSoluble => "fosforoSoluble",
            ObservationField::AguaPorcentual => "aguaPorcentual",
            ObservationField::Nacl => "nacl",
            ObservationField::Cd => "cd",
            ObservationField::Al => "al",
        }
    }
}

/// Raw body of a prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivo: Option<String>,
    pub temperatura: Measurement,
    pub humedad_relativa: Measurement,
    pub intensidad_luminica: Measurement,
    #[serde(rename = "pH")]
    pub ph: Measurement,
    pub humedad_suelo: Measurement,
    pub carbono_organico: Measurement,
    pub nitrogeno_total: Measurement,
    pub fosforo_soluble: Measurement,
    #[serde(deserialize_with = "deserialize_free_text")]
    pub textura_suelo: String,
    pub agua_porcentual: Measurement,
    pub nacl: Measurement,
    pub cd: Measurement,
    pub al: Measurement,
}

impl SiteObservation {
    pub fn measurement(&self, field: ObservationField) -> &Measurement {
        match field {
            ObservationField::Temperatura => &self.temperatura,
            ObservationField::HumedadRelativa => &self.humedad_relativa,
            ObservationField::IntensidadLuminica => &self.intensidad_luminica,
            ObservationField::Ph => &self.ph,
            ObservationField::HumedadSuelo => &self.humedad_suelo,
            ObservationField::CarbonoOrganico => &self.carbono_organico,
            ObservationField::NitrogenoTotal => &self.nitrogeno_total,
            ObservationField::FosforoSoluble => &self.fosforo_soluble,
            ObservationField::AguaPorcentual => &self.agua_porcentual,
            ObservationField::Nacl => &self.nacl,
            ObservationField::Cd => &self.cd,
            ObservationField::Al => &self.al,
        }
    }
}

// Texture is a category label; numbers and other scalars are kept as their text.
fn deserialize_free_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => s,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    })
}
