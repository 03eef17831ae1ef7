//! Form and query payloads.
//!
//! Field names match the HTML forms. Missing fields deserialize as empty
//! strings so that coercion, not extraction, decides what is acceptable.
//! Write endpoints take either a urlencoded form or a JSON object with the
//! same field names; JSON numbers are read as their decimal text.

use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Body extractor accepting `application/json` or a urlencoded form.
#[derive(Debug)]
pub(crate) struct FormOrJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned + Send + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_json(&req) {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        }
    }
}

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

/// Accept a string, a number or null as field text.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(text)) => text,
        Some(Scalar::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

/// `POST /insert`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct InsertForm {
    #[serde(rename = "Name", default, deserialize_with = "scalar_text")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub co2: String,
}

/// `POST /`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FindForm {
    #[serde(default, deserialize_with = "scalar_text")]
    pub model: String,
}

/// `POST /edit`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct EditForm {
    #[serde(rename = "updateId", default, deserialize_with = "scalar_text")]
    pub id: String,
    #[serde(rename = "updateModelValue", default, deserialize_with = "scalar_text")]
    pub model: String,
    #[serde(rename = "updateCO2Value", default, deserialize_with = "scalar_text")]
    pub co2: String,
}

/// Query string accepted by `GET /`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct IndexQuery {
    #[serde(default)]
    pub error: Option<String>,
}
