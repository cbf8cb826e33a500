use crate::{
    routes::students::{delete_student, get_student, get_students, post_student, put_student},
    state::StudentsState,
};
use axum::{Router, routing::get};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub mod students;

const MAX_BODY_BYTES: usize = 64 * 1024;
const COLLECTION_PATHS: [&str; 2] = ["/Students", "/students"];

pub fn router(state: StudentsState) -> Router {
    COLLECTION_PATHS
        .into_iter()
        .fold(Router::new(), |router, path| {
            router
                .route(path, get(get_students).post(post_student))
                .route(
                    &format!("{path}/{{id}}"),
                    get(get_student).put(put_student).delete(delete_student),
                )
        })
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{Student, StudentStore, memory::MemoryStudentStore},
        error::{StudentsError, StudentsResult},
    };
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app() -> Router {
        router(StudentsState::with_store(Arc::new(MemoryStudentStore::new())))
    }

    /// A store whose database has gone away.
    #[derive(Debug)]
    struct FailingStore;

    fn pool_closed<T>() -> StudentsResult<T> {
        Err(StudentsError::MakeQuery {
            source: sqlx::Error::PoolClosed,
        })
    }

    #[async_trait]
    impl StudentStore for FailingStore {
        async fn list(&self) -> StudentsResult<Vec<Student>> {
            pool_closed()
        }

        async fn get_by_id(&self, _id: Uuid) -> StudentsResult<Option<Student>> {
            pool_closed()
        }

        async fn add(&self, _student: Student) -> StudentsResult<Student> {
            pool_closed()
        }

        async fn update(&self, _student: Student) -> StudentsResult<Option<Student>> {
            pool_closed()
        }

        async fn remove(&self, _id: Uuid) -> StudentsResult<bool> {
            pool_closed()
        }

        async fn close(&self) {}
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create(app: &Router, first: &str, last: &str, program: Option<&str>) -> Student {
        let response = send(
            app,
            "POST",
            "/Students",
            Some(json!({"FirstName": first, "LastName": last, "Program": program})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        serde_json::from_value(body_json(response).await).unwrap()
    }

    #[tokio::test]
    async fn created_student_can_be_fetched() {
        let app = app();

        let response = send(
            &app,
            "POST",
            "/Students",
            Some(json!({"FirstName": "Ada", "LastName": "Lovelace", "Program": "Maths"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
        let created: Student = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(location, format!("/Students/{}", created.id));

        let response = send(&app, "GET", &location, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let fetched: Student = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.first_name, "Ada");
        assert_eq!(fetched.last_name, "Lovelace");
        assert_eq!(fetched.program.as_deref(), Some("Maths"));
    }

    #[tokio::test]
    async fn missing_names_are_rejected_and_not_stored() {
        let app = app();

        for body in [
            json!({"LastName": "Lovelace"}),
            json!({"FirstName": "Ada", "Program": "Maths"}),
            json!({"FirstName": "", "LastName": "Lovelace"}),
            json!({"FirstName": null, "LastName": "Lovelace"}),
        ] {
            let response = send(&app, "POST", "/Students", Some(body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let response = send(&app, "GET", "/Students", None).await;
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn broken_json_is_a_bad_request() {
        let app = app();

        let request = Request::builder()
            .method("POST")
            .uri("/Students")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"FirstName\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, "GET", "/Students/not-a-uuid", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_contains_everything_created() {
        let app = app();
        let mut created = vec![
            create(&app, "Ada", "Lovelace", None).await,
            create(&app, "Grace", "Hopper", Some("Navy")).await,
            create(&app, "Alan", "Turing", Some("Maths")).await,
        ];

        let response = send(&app, "GET", "/Students", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let mut listed: Vec<Student> = serde_json::from_value(body_json(response).await).unwrap();

        created.sort_by_key(|student| student.id);
        listed.sort_by_key(|student| student.id);
        assert_eq!(listed, created);
    }

    #[tokio::test]
    async fn update_overwrites_every_field() {
        let app = app();
        let student = create(&app, "Ada", "Lovelace", Some("Maths")).await;
        let uri = format!("/Students/{}", student.id);

        let response = send(
            &app,
            "PUT",
            &uri,
            Some(json!({"FirstName": "Augusta", "LastName": "King"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, "GET", &uri, None).await;
        assert_eq!(
            body_json(response).await,
            json!({
                "id": student.id,
                "firstName": "Augusta",
                "lastName": "King",
                "program": null,
            })
        );
    }

    #[tokio::test]
    async fn deleted_student_is_gone() {
        let app = app();
        let student = create(&app, "Ada", "Lovelace", None).await;
        let uri = format!("/Students/{}", student.id);

        let response = send(&app, "DELETE", &uri, None).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());

        let response = send(&app, "GET", &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, Value::Null);
    }

    #[tokio::test]
    async fn unknown_ids_do_not_touch_other_students() {
        let app = app();
        let kept = create(&app, "Ada", "Lovelace", Some("Maths")).await;
        let ghost = format!("/Students/{}", Uuid::new_v4());

        let response = send(
            &app,
            "PUT",
            &ghost,
            Some(json!({"FirstName": "Nobody", "LastName": "Here"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, "DELETE", &ghost, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, "GET", &ghost, None).await;
        assert_eq!(body_json(response).await, Value::Null);

        let response = send(&app, "GET", "/Students", None).await;
        let listed: Vec<Student> = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(listed, vec![kept]);
    }

    #[tokio::test]
    async fn original_casing_of_paths_and_keys_is_accepted() {
        let app = app();

        let response = send(
            &app,
            "POST",
            "/students",
            Some(json!({"firstname": "Ada", "lastname": "Lovelace", "PROGRAM": "Maths"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["firstName"], "Ada");
        assert_eq!(created["lastName"], "Lovelace");
        assert_eq!(created["program"], "Maths");

        let id = created["id"].as_str().unwrap();
        let response = send(&app, "GET", &format!("/students/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, created);

        let response = send(&app, "GET", "/students", None).await;
        assert_eq!(body_json(response).await, json!([created]));
    }

    #[tokio::test]
    async fn update_with_missing_names_changes_nothing() {
        let app = app();
        let student = create(&app, "Ada", "Lovelace", Some("Maths")).await;
        let uri = format!("/Students/{}", student.id);

        for body in [
            json!({"FirstName": "  ", "LastName": "King"}),
            json!({"LastName": "King", "Program": "Engines"}),
        ] {
            let response = send(&app, "PUT", &uri, Some(body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let response = send(&app, "GET", &uri, None).await;
        let fetched: Student = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(fetched, student);
    }

    #[tokio::test]
    async fn storage_errors_are_internal_server_errors() {
        let app = router(StudentsState::with_store(Arc::new(FailingStore)));
        let uri = format!("/Students/{}", Uuid::new_v4());
        let body = json!({"FirstName": "Ada", "LastName": "Lovelace"});

        for (method, uri, body) in [
            ("GET", "/Students", None),
            ("GET", uri.as_str(), None),
            ("POST", "/Students", Some(body.clone())),
            ("PUT", uri.as_str(), Some(body)),
            ("DELETE", uri.as_str(), None),
        ] {
            let response = send(&app, method, uri, body).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");

            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(bytes, "Error making SQL query");
        }
    }

    #[tokio::test]
    async fn oversized_body_without_length_is_too_large() {
        let app = app();
        let body = json!({
            "FirstName": "Ada",
            "LastName": "Lovelace",
            "Program": "x".repeat(MAX_BODY_BYTES),
        });

        let request = Request::builder()
            .method("POST")
            .uri("/Students")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        assert!(request.headers().get(header::CONTENT_LENGTH).is_none());

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
