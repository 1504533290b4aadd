use fleet_common::DroneState;
use serde_json::json;

use crate::common::{TestApp, drone_body, medication, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn registered_drone_is_listed_with_its_cargo() {
        let app = TestApp::spawn().await;

        let mut body = drone_body("DRN-001", 400, 80, "IDLE");
        body["medications"] = json!([
            medication("Aspirin", "ASP_100", 100),
            medication("Ibuprofen-200", "IBU_200", 150),
        ]);
        let res = app.post(routes::DRONES, &body).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["serial_number"], "DRN-001");

        let list = app.get(routes::DRONES).await;
        assert_eq!(list.status, 200);
        let drones = list.body.as_array().unwrap();
        assert_eq!(drones.len(), 1);
        assert_eq!(drones[0]["model"], "Middleweight");
        assert_eq!(drones[0]["state"], "IDLE");
        assert_eq!(drones[0]["battery_level"], 80);
        assert_eq!(drones[0]["medications"].as_array().unwrap().len(), 2);
        assert_eq!(drones[0]["medications"][0]["code"], "ASP_100");
    }

    #[tokio::test]
    async fn duplicate_serial_is_rejected_and_keeps_the_first_drone() {
        let app = TestApp::spawn().await;
        app.register_drone("DRN-DUP", 300, 70, "IDLE").await;

        let res = app
            .post(routes::DRONES, &drone_body("DRN-DUP", 500, 10, "LOADED"))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "SERIAL_NUMBER_TAKEN");
        assert_eq!(app.battery_level("DRN-DUP").await, 70);
        assert_eq!(app.available_serials().await, vec!["DRN-DUP"]);
    }

    #[tokio::test]
    async fn serial_is_trimmed_before_storing() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::DRONES, &drone_body("  DRN-PAD  ", 100, 50, "IDLE"))
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["serial_number"], "DRN-PAD");
        assert_eq!(app.battery_level("DRN-PAD").await, 50);
    }

    #[tokio::test]
    async fn serial_with_slash_is_addressable_when_encoded() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::DRONES, &drone_body("DRN/7", 100, 64, "IDLE"))
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["serial_number"], "DRN/7");

        assert_eq!(app.battery_level("DRN%2F7").await, 64);
        let res = app
            .post(
                &routes::load("DRN%2F7"),
                &json!([medication("Aspirin", "ASP_1", 10)]),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["serial_number"], "DRN/7");
    }

    #[tokio::test]
    async fn storage_failure_on_initial_cargo_leaves_no_drone() {
        let app = TestApp::spawn().await;
        app.fail_inserts("fail_cargo", "medication", "NEW.code = 'FAIL_2'")
            .await;

        let mut body = drone_body("DRN-ROLLBACK", 400, 80, "IDLE");
        body["medications"] = json!([
            medication("Aspirin", "ASP_1", 10),
            medication("Insulin", "FAIL_2", 10),
        ]);
        let res = app.post(routes::DRONES, &body).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.error_code(), "INTERNAL_ERROR");
        assert!(app.available_serials().await.is_empty());
        let res = app.get(&routes::drone("DRN-ROLLBACK")).await;
        assert_eq!(res.status, 404);

        app.drop_trigger("fail_cargo").await;
        body["medications"] = json!([medication("Aspirin", "ASP_1", 10)]);
        let res = app.post(routes::DRONES, &body).await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn out_of_range_fields_are_reported_by_name() {
        let app = TestApp::spawn().await;

        let mut body = drone_body("DRN-BAD", 501, 50, "IDLE");
        let res = app.post(routes::DRONES, &body).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "weight_limit");

        body["weight_limit"] = json!(100);
        body["battery_capacity"] = json!(40);
        let res = app.post(routes::DRONES, &body).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "battery_level");

        assert!(app.available_serials().await.is_empty());
    }

    #[tokio::test]
    async fn invalid_medication_is_reported_with_its_index() {
        let app = TestApp::spawn().await;

        let mut body = drone_body("DRN-MED", 500, 50, "IDLE");
        body["medications"] = json!([
            medication("Aspirin", "ASP_100", 10),
            medication("Bad Name!", "BAD_1", 10),
        ]);
        let res = app.post(routes::DRONES, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "medications[1].name");
    }

    #[tokio::test]
    async fn initial_cargo_over_limit_is_rejected() {
        let app = TestApp::spawn().await;

        let mut body = drone_body("DRN-HEAVY", 200, 50, "IDLE");
        body["medications"] = json!([
            medication("Aspirin", "ASP_100", 150),
            medication("Insulin", "INS_1", 60),
        ]);
        let res = app.post(routes::DRONES, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "WEIGHT_LIMIT_EXCEEDED");
        assert!(app.available_serials().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_model_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let mut body = drone_body("DRN-X", 100, 50, "IDLE");
        body["model"] = json!("Featherweight");
        let res = app.post(routes::DRONES, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.post_raw(routes::DRONES, "{\"serial_number\": ").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
    }
}

mod available_drones {
    use super::*;

    #[tokio::test]
    async fn loading_drones_are_excluded() {
        let app = TestApp::spawn().await;
        app.register_drone("DRN-A", 100, 80, "IDLE").await;
        app.register_drone("DRN-B", 100, 80, "LOADING").await;
        app.register_drone("DRN-C", 100, 80, "RETURNING").await;

        assert_eq!(app.available_serials().await, vec!["DRN-A", "DRN-C"]);
    }

    #[tokio::test]
    async fn empty_fleet_lists_nothing() {
        let app = TestApp::spawn().await;
        let res = app.get(routes::DRONES).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!([]));
    }
}

mod battery_level {
    use super::*;

    #[tokio::test]
    async fn returns_a_bare_integer() {
        let app = TestApp::spawn().await;
        app.insert_drone_row("DRN-LOW", 100, 100, 12, DroneState::Idle)
            .await;

        let res = app.get(&routes::drone("DRN-LOW")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text.trim(), "12");
    }

    #[tokio::test]
    async fn unknown_drone_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app.get(&routes::drone("NOPE")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.error_code(), "NOT_FOUND");
    }
}

mod medications {
    use super::*;

    #[tokio::test]
    async fn lists_cargo_in_insertion_order() {
        let app = TestApp::spawn().await;
        let mut body = drone_body("DRN-M", 500, 90, "IDLE");
        body["medications"] = json!([
            medication("Zinc", "ZNC_1", 5),
            medication("Aspirin", "ASP_1", 5),
        ]);
        assert_eq!(app.post(routes::DRONES, &body).await.status, 201);

        let res = app.get(&routes::medications("DRN-M")).await;

        assert_eq!(res.status, 200);
        let names: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Zinc", "Aspirin"]);
    }

    #[tokio::test]
    async fn drone_without_cargo_has_empty_list() {
        let app = TestApp::spawn().await;
        app.register_drone("DRN-EMPTY", 100, 90, "IDLE").await;

        assert_eq!(app.medication_count("DRN-EMPTY").await, 0);
    }

    #[tokio::test]
    async fn unknown_drone_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app.get(&routes::medications("NOPE")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.error_code(), "NOT_FOUND");
    }
}

mod event_logs {
    use super::*;

    #[tokio::test]
    async fn new_drone_has_no_readings() {
        let app = TestApp::spawn().await;
        app.register_drone("DRN-E", 100, 90, "IDLE").await;

        let res = app.get(&routes::events("DRN-E")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!([]));
    }

    #[tokio::test]
    async fn unknown_drone_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app.get(&routes::events("NOPE")).await;

        assert_eq!(res.status, 404);
    }
}

mod api_docs {
    use super::*;

    #[tokio::test]
    async fn openapi_document_lists_drone_routes() {
        let app = TestApp::spawn().await;
        let res = app.get("/api-docs/openapi.json").await;

        assert_eq!(res.status, 200);
        let paths = res.body["paths"].as_object().expect("paths object");
        assert!(paths.contains_key("/api/v1/drones/{serial}/load"));
        assert!(paths.contains_key("/api/v1/drones/{serial}/medications"));
    }
}
