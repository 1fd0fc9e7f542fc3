use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const TRUST_ANCHOR: &str = "https://ta.example.com";
pub const CERTIFIED_MARK: &str = "https://ta.example.com/trust-marks/certified";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrustMark {
    pub id: String,
    pub trust_mark: String,
    pub iat: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    pub sub: String,
    pub entity_types: Vec<String>,
    pub metadata: Value,
    #[serde(default)]
    pub trust_marks: Vec<TrustMark>,
}

impl Entity {
    fn mark(&self, id: &str) -> Option<&TrustMark> {
        self.trust_marks.iter().find(|tm| tm.id == id)
    }
}

/// Read-only registry contents served by the mock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registry {
    pub trust_anchor: String,
    pub entities: Vec<Entity>,
    pub historical_keys: Value,
}

impl Registry {
    fn entity(&self, sub: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.sub == sub)
    }

    /// A small federation: one provider, one relying party, one
    /// intermediate. Provider and relying party hold `CERTIFIED_MARK`.
    pub fn fixture() -> Self {
        let certified = |sub: &str, iat: i64| TrustMark {
            id: CERTIFIED_MARK.to_string(),
            trust_mark: format!("eyJhbGciOiJSUzI1NiJ9.{}.sig", sub.trim_start_matches("https://")),
            iat,
        };
        Self {
            trust_anchor: TRUST_ANCHOR.to_string(),
            entities: vec![
                Entity {
                    sub: "https://op.example.com".to_string(),
                    entity_types: vec!["openid_provider".to_string()],
                    metadata: json!({
                        "openid_provider": { "issuer": "https://op.example.com" }
                    }),
                    trust_marks: vec![certified("https://op.example.com", 1_700_000_000)],
                },
                Entity {
                    sub: "https://rp.example.com".to_string(),
                    entity_types: vec!["openid_relying_party".to_string()],
                    metadata: json!({
                        "openid_relying_party": { "client_name": "Example RP" }
                    }),
                    trust_marks: vec![certified("https://rp.example.com", 1_700_000_100)],
                },
                Entity {
                    sub: "https://ia.example.com".to_string(),
                    entity_types: vec!["federation_entity".to_string()],
                    metadata: json!({
                        "federation_entity": { "organization_name": "Example Intermediate" }
                    }),
                    trust_marks: Vec::new(),
                },
            ],
            historical_keys: json!({
                "keys": [
                    { "kty": "RSA", "kid": "2023-key", "n": "0vx7", "e": "AQAB", "exp": 1_700_000_000 }
                ]
            }),
        }
    }
}

pub type Db = Arc<Registry>;

pub fn app() -> Router {
    app_with(Registry::fixture())
}

pub fn app_with(registry: Registry) -> Router {
    let db: Db = Arc::new(registry);
    Router::new()
        .route("/list", get(list))
        .route("/fetch", get(fetch))
        .route("/resolve", get(resolve))
        .route("/trust-mark", get(trust_mark))
        .route("/trust-mark-status", get(trust_mark_status))
        .route("/trust-mark-list", get(trust_mark_list))
        .route("/historical-keys", get(historical_keys))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Clients send absent optional parameters as the text `null`.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| v != "null")
}

async fn list(
    State(db): State<Db>,
    Query(criteria): Query<Vec<(String, String)>>,
) -> Json<Vec<String>> {
    let keep = |entity: &Entity| {
        criteria.iter().all(|(key, value)| match key.as_str() {
            "entity_type" => entity.entity_types.iter().any(|t| t == value),
            "trust_marked" => (value == "true") == !entity.trust_marks.is_empty(),
            "trust_mark_id" => entity.mark(value).is_some(),
            _ => true,
        })
    };
    Json(
        db.entities
            .iter()
            .filter(|e| keep(e))
            .map(|e| e.sub.clone())
            .collect(),
    )
}

#[derive(Deserialize)]
struct FetchParams {
    sub: String,
}

async fn fetch(
    State(db): State<Db>,
    Query(params): Query<FetchParams>,
) -> Result<Json<Value>, StatusCode> {
    let entity = db.entity(&params.sub).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({
        "iss": db.trust_anchor,
        "sub": entity.sub,
        "metadata": entity.metadata,
    })))
}

#[derive(Deserialize)]
struct ResolveParams {
    sub: String,
    anchor: String,
    #[serde(rename = "type")]
    entity_type: Option<String>,
}

async fn resolve(
    State(db): State<Db>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<Value>, StatusCode> {
    if params.anchor != db.trust_anchor {
        return Err(StatusCode::NOT_FOUND);
    }
    let entity = db.entity(&params.sub).ok_or(StatusCode::NOT_FOUND)?;
    let metadata = match present(params.entity_type) {
        Some(entity_type) => {
            let only = entity.metadata.get(&entity_type).ok_or(StatusCode::NOT_FOUND)?;
            let mut filtered = serde_json::Map::new();
            filtered.insert(entity_type, only.clone());
            Value::Object(filtered)
        }
        None => entity.metadata.clone(),
    };
    let trust_marks: Vec<&TrustMark> = entity.trust_marks.iter().collect();
    Ok(Json(json!({
        "iss": db.trust_anchor,
        "sub": entity.sub,
        "metadata": metadata,
        "trust_marks": trust_marks,
    })))
}

#[derive(Deserialize)]
struct TrustMarkParams {
    sub: String,
    trust_mark_id: String,
}

async fn trust_mark(
    State(db): State<Db>,
    Query(params): Query<TrustMarkParams>,
) -> Result<Json<TrustMark>, StatusCode> {
    db.entity(&params.sub)
        .and_then(|e| e.mark(&params.trust_mark_id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
struct TrustMarkStatusParams {
    sub: String,
    trust_mark_id: String,
    trust_mark: String,
    iat: Option<String>,
}

async fn trust_mark_status(
    State(db): State<Db>,
    Query(params): Query<TrustMarkStatusParams>,
) -> Result<Json<Value>, StatusCode> {
    let iat = match present(params.iat) {
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| StatusCode::BAD_REQUEST)?),
        None => None,
    };
    let active = db
        .entity(&params.sub)
        .and_then(|e| e.mark(&params.trust_mark_id))
        .is_some_and(|tm| tm.trust_mark == params.trust_mark && iat.is_none_or(|t| t == tm.iat));
    Ok(Json(json!({ "active": active })))
}

#[derive(Deserialize)]
struct TrustMarkListParams {
    trust_mark_id: String,
    sub: Option<String>,
}

async fn trust_mark_list(
    State(db): State<Db>,
    Query(params): Query<TrustMarkListParams>,
) -> Json<Vec<String>> {
    let sub = present(params.sub);
    Json(
        db.entities
            .iter()
            .filter(|e| e.mark(&params.trust_mark_id).is_some())
            .filter(|e| sub.as_ref().is_none_or(|s| *s == e.sub))
            .map(|e| e.sub.clone())
            .collect(),
    )
}

async fn historical_keys(State(db): State<Db>) -> Json<Value> {
    Json(db.historical_keys.clone())
}
