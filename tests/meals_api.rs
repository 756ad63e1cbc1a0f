use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use dietlog::{AppState, Config, repositories::memory::InMemoryMealStore};
use serde_json::{Value, json};
use tower::ServiceExt;

// Shared test context
struct TestContext {
    app: Router,
}

impl TestContext {
    fn new() -> Self {
        let state = AppState::with_store(Arc::new(InMemoryMealStore::new()), Config::default());
        Self {
            app: dietlog::router(state),
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        session: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header(header::COOKIE, format!("session_id={}", session));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Creates a meal and returns the session token minted for it.
    async fn create_with_new_session(&self, meal: Value) -> String {
        let response = self.send("POST", "/", None, Some(meal)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        session_from(&response).expect("session cookie not set on first create")
    }

    async fn meals(&self, session: &str) -> Vec<Value> {
        let response = self.send("GET", "/", Some(session), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await["meals"].as_array().unwrap().clone()
    }
}

fn lunch() -> Value {
    json!({
        "name": "Lunch",
        "description": "chicken+rice",
        "date": "2024-01-01T12:00:00Z",
        "is_diet": true
    })
}

fn session_from(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| {
            cookie
                .split(';')
                .next()
                .and_then(|pair| pair.trim().strip_prefix("session_id="))
                .map(str::to_string)
        })
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_mints_session_and_lists_meal() {
        let context = TestContext::new();

        let response = context.send("POST", "/", None, Some(lunch())).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Path=/"));
        assert!(set_cookie.contains("Max-Age=604800"));
        assert!(set_cookie.contains("HttpOnly"));

        let session = session_from(&response).unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());

        let meals = context.meals(&session).await;
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0]["name"], "Lunch");
        assert_eq!(meals[0]["description"], "chicken+rice");
        assert_eq!(meals[0]["is_diet"], true);
        assert_eq!(meals[0]["session_id"], session.as_str());
    }

    #[tokio::test]
    async fn create_with_existing_session_does_not_mint() {
        let context = TestContext::new();
        let session = context.create_with_new_session(lunch()).await;

        let response = context.send("POST", "/", Some(&session), Some(lunch())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(session_from(&response).is_none());

        assert_eq!(context.meals(&session).await.len(), 2);
    }

    #[tokio::test]
    async fn create_rejects_bad_shapes() {
        let context = TestContext::new();

        let bad_payloads = [
            json!({"name": "Lunch", "description": "x", "date": "yesterday", "is_diet": true}),
            json!({"name": "Lunch", "description": "x", "date": "2024-01-01T12:00:00", "is_diet": true}),
            json!({"name": "Lunch", "description": "x", "date": "2024-01-01T12:00:00Z", "is_diet": "yes"}),
            json!({"name": "", "description": "x", "date": "2024-01-01T12:00:00Z", "is_diet": true}),
            json!({"description": "x", "date": "2024-01-01T12:00:00Z", "is_diet": true}),
        ];

        for payload in bad_payloads {
            let response = context.send("POST", "/", None, Some(payload.clone())).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "accepted {}", payload);
            assert!(session_from(&response).is_none());
        }
    }

    #[tokio::test]
    async fn session_routes_require_cookie() {
        let context = TestContext::new();
        let id = uuid::Uuid::new_v4();

        for (method, uri) in [
            ("GET", "/".to_string()),
            ("GET", "/summary".to_string()),
            ("GET", format!("/{}", id)),
            ("DELETE", format!("/{}", id)),
        ] {
            let response = context.send(method, &uri, None, None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", method, uri);
        }

        let response = context.send("PUT", &format!("/{}", id), None, Some(json!({}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_by_id_returns_collection() {
        let context = TestContext::new();
        let session = context.create_with_new_session(lunch()).await;
        let id = context.meals(&session).await[0]["id"].as_str().unwrap().to_string();

        let response = context.send("GET", &format!("/{}", id), Some(&session), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["meal"].as_array().unwrap().len(), 1);
        assert_eq!(body["meal"][0]["id"], id.as_str());

        let missing = uuid::Uuid::new_v4();
        let response = context.send("GET", &format!("/{}", missing), Some(&session), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"meal": []}));
    }

    #[tokio::test]
    async fn malformed_id_is_rejected() {
        let context = TestContext::new();
        let session = context.create_with_new_session(lunch()).await;

        for method in ["GET", "DELETE"] {
            let response = context.send(method, "/not-a-uuid", Some(&session), None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let response = context
            .send("PUT", "/not-a-uuid", Some(&session), Some(json!({"is_diet": false})))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_flips_is_diet_to_false() {
        let context = TestContext::new();
        let session = context.create_with_new_session(lunch()).await;
        let id = context.meals(&session).await[0]["id"].as_str().unwrap().to_string();

        let response = context
            .send("PUT", &format!("/{}", id), Some(&session), Some(json!({"is_diet": false})))
            .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let response = context.send("GET", &format!("/{}", id), Some(&session), None).await;
        let body = json_body(response).await;
        assert_eq!(body["meal"][0]["is_diet"], false);
        assert_eq!(body["meal"][0]["name"], "Lunch");
    }

    #[tokio::test]
    async fn empty_update_changes_nothing() {
        let context = TestContext::new();
        let session = context.create_with_new_session(lunch()).await;
        let before = context.meals(&session).await;
        let id = before[0]["id"].as_str().unwrap().to_string();

        let response = context
            .send("PUT", &format!("/{}", id), Some(&session), Some(json!({})))
            .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        assert_eq!(context.meals(&session).await, before);
    }

    #[tokio::test]
    async fn update_overwrites_supplied_fields() {
        let context = TestContext::new();
        let session = context.create_with_new_session(lunch()).await;
        let id = context.meals(&session).await[0]["id"].as_str().unwrap().to_string();

        let response = context
            .send(
                "PUT",
                &format!("/{}", id),
                Some(&session),
                Some(json!({"name": "Dinner", "description": ""})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let meal = context.meals(&session).await[0].clone();
        assert_eq!(meal["name"], "Dinner");
        assert_eq!(meal["description"], "");
        assert_eq!(meal["is_diet"], true);
    }

    #[tokio::test]
    async fn update_rejects_empty_name() {
        let context = TestContext::new();
        let session = context.create_with_new_session(lunch()).await;
        let id = context.meals(&session).await[0]["id"].as_str().unwrap().to_string();

        let response = context
            .send("PUT", &format!("/{}", id), Some(&session), Some(json!({"name": ""})))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(context.meals(&session).await[0]["name"], "Lunch");
    }

    #[tokio::test]
    async fn foreign_session_cannot_update_or_delete() {
        let context = TestContext::new();
        let owner = context.create_with_new_session(lunch()).await;
        let intruder = context.create_with_new_session(lunch()).await;
        let id = context.meals(&owner).await[0]["id"].as_str().unwrap().to_string();

        let response = context
            .send("PUT", &format!("/{}", id), Some(&intruder), Some(json!({"is_diet": false})))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "meal not found"}));

        let response = context.send("DELETE", &format!("/{}", id), Some(&intruder), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "meal not found"}));

        let response = context.send("GET", &format!("/{}", id), Some(&intruder), None).await;
        assert_eq!(json_body(response).await, json!({"meal": []}));

        let meals = context.meals(&owner).await;
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0]["is_diet"], true);
        assert_eq!(context.meals(&intruder).await.len(), 1);
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let context = TestContext::new();
        let session = context.create_with_new_session(lunch()).await;
        let id = context.meals(&session).await[0]["id"].as_str().unwrap().to_string();

        let response = context.send("DELETE", &format!("/{}", id), Some(&session), None).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(context.meals(&session).await.is_empty());

        let response = context.send("DELETE", &format!("/{}", id), Some(&session), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "meal not found"}));
    }

    #[tokio::test]
    async fn summary_counts_session_meals() {
        let context = TestContext::new();
        let session = context.create_with_new_session(lunch()).await;
        for is_diet in [false, true] {
            let mut meal = lunch();
            meal["is_diet"] = json!(is_diet);
            let response = context.send("POST", "/", Some(&session), Some(meal)).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = context.send("GET", "/summary", Some(&session), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "summary": {
                    "totalMeals": 3,
                    "totalMealsInDiet": 2,
                    "totalOffDietMeals": 1,
                    "adherenceRatio": 1
                }
            })
        );
    }

    #[tokio::test]
    async fn summary_for_empty_session_is_zero() {
        let context = TestContext::new();
        let session = uuid::Uuid::new_v4().to_string();

        let response = context.send("GET", "/summary", Some(&session), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let summary = &json_body(response).await["summary"];
        assert_eq!(summary["totalMeals"], 0);
        assert_eq!(summary["totalMealsInDiet"], 0);
        assert_eq!(summary["totalOffDietMeals"], 0);
        assert_eq!(summary["adherenceRatio"], 0);
    }
}
