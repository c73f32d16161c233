pub mod analytics;
pub mod enhance;
pub mod health;
pub mod notes;

use crate::state::AppState;
use axum::Router;

pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(enhance::routes(state.clone()))
        .merge(notes::routes(state.clone()))
        .merge(analytics::routes(state))
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use crate::state::AppState;
    use axum::{
        body::Body,
        http::{HeaderName, Request},
        response::Response,
    };
    use http_body_util::BodyExt;
    use notably::{
        notes::InMemoryNoteStore,
        providers::{configs::OpenAiProviderConfig, openai::OpenAiProvider},
        relay::Relay,
    };
    use serde_json::Value;
    use std::sync::Arc;

    pub const USER_HEADER: &str = "x-user-id";

    pub fn state_for(host: &str, api_key: Option<&str>) -> AppState {
        let config = OpenAiProviderConfig {
            host: host.to_string(),
            api_key: api_key.map(String::from),
            model: "gpt-4o-mini".to_string(),
        };
        let provider = OpenAiProvider::new(config).unwrap();
        AppState::new(
            Relay::new(Box::new(provider)),
            Arc::new(InMemoryNoteStore::new()),
            HeaderName::from_static(USER_HEADER),
        )
    }

    pub fn json_request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header(USER_HEADER, user);
        }
        let body = match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        };
        builder.body(body).unwrap()
    }

    pub async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    pub async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }
}
