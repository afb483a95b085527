use axum::{
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::shelter::AnimalShelter;

pub mod routes;

/// Server state
pub struct AppState {
    pub shelter: Mutex<AnimalShelter>,
}

impl AppState {
    pub fn new(shelter: AnimalShelter) -> Arc<Self> {
        Arc::new(Self {
            shelter: Mutex::new(shelter),
        })
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/categories", get(routes::list_categories))
        .route("/animals", get(routes::list_animals).post(routes::create_animal))
        .route("/stats", get(routes::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, shelter: AnimalShelter) -> anyhow::Result<()> {
    let app = create_router(AppState::new(shelter));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("Starting server on {}", addr);
    println!("{} Server running at http://{}", crate::ui::Icons::GLOBE, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AnimalRecord;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn seeded_state() -> Arc<AppState> {
        let shelter = AnimalShelter::in_memory().unwrap();
        for (name, breed, sex, age) in [
            ("Luna", "Labrador Retriever Mix", "Intact Female", 52.0),
            ("Ghost", "Alaskan Malamute", "Intact Male", 80.0),
            ("Tank", "Rottweiler", "Intact Male", 300.0),
            ("Biscuit", "Beagle", "Neutered Male", 40.0),
        ] {
            let record = AnimalRecord::new()
                .with("name", name)
                .with("breed", breed)
                .with("sex_upon_outcome", sex)
                .with("age_upon_outcome_in_weeks", age);
            assert!(shelter.create(&record).unwrap());
        }
        AppState::new(shelter)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn names(body: &Value) -> Vec<&str> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["name"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_list_animals_defaults_to_all() {
        let app = create_router(seeded_state());
        let (status, body) = send(app, get_request("/animals")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body), vec!["Luna", "Ghost", "Tank", "Biscuit"]);
        assert!(body["columns"].as_array().unwrap().contains(&Value::from("name")));
    }

    #[tokio::test]
    async fn test_list_animals_by_category() {
        let state = seeded_state();

        let (_, water) = send(create_router(state.clone()), get_request("/animals?category=water")).await;
        assert_eq!(names(&water), vec!["Luna"]);

        let (_, mountain) = send(create_router(state.clone()), get_request("/animals?category=Mountain")).await;
        assert_eq!(names(&mountain), vec!["Ghost"]);

        let (_, disaster) = send(create_router(state), get_request("/animals?category=Disaster")).await;
        assert_eq!(names(&disaster), vec!["Tank"]);
    }

    #[tokio::test]
    async fn test_list_animals_limit() {
        let app = create_router(seeded_state());
        let (status, body) = send(app, get_request("/animals?limit=2")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body), vec!["Luna", "Ghost"]);
    }

    #[tokio::test]
    async fn test_unknown_category_is_bad_request() {
        let app = create_router(seeded_state());
        let (status, body) = send(app, get_request("/animals?category=Desert")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Desert"));
    }

    #[tokio::test]
    async fn test_create_animal() {
        let state = seeded_state();
        let request = Request::builder()
            .method("POST")
            .uri("/animals")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": "Pepper", "breed": "Newfoundland"}"#))
            .unwrap();

        let (status, body) = send(create_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["acknowledged"], true);

        let (_, stats) = send(create_router(state), get_request("/stats")).await;
        assert_eq!(stats["records"], 5);
    }

    #[tokio::test]
    async fn test_create_animal_rejects_empty_and_non_object() {
        for payload in ["{}", "[1, 2]"] {
            let request = Request::builder()
                .method("POST")
                .uri("/animals")
                .header("content-type", "application/json")
                .body(Body::from(payload))
                .unwrap();
            let (status, body) = send(create_router(seeded_state()), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_list_categories() {
        let app = create_router(seeded_state());
        let (status, body) = send(app, get_request("/categories")).await;

        assert_eq!(status, StatusCode::OK);
        let categories = body.as_array().unwrap();
        assert_eq!(categories.len(), 4);
        assert_eq!(categories[0]["category"], "All");
        assert!(categories[0]["sex"].is_null());
        assert_eq!(categories[1]["label"], "Water Rescue");
        assert_eq!(categories[1]["sex"], "Intact Female");
        assert_eq!(categories[2]["min_age_weeks"], 26.0);
    }
}
