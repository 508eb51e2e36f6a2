//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use scheduler_core::{
    Ack, ApiError, Appointment, AppointmentClient, AppointmentQuery, HttpMethod, HttpRequest,
    HttpResponse, NewTask, Task, TaskPatch,
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> AppointmentClient {
    AppointmentClient::new(BASE_URL)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "HEAD" => HttpMethod::Head,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> Vec<serde_json::Value> {
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn str_field<'a>(case: &'a serde_json::Value, key: &str) -> &'a str {
    case[key].as_str().unwrap_or_else(|| panic!("missing string field {key}"))
}

fn input<T: DeserializeOwned>(case: &serde_json::Value) -> T {
    serde_json::from_value(case["input"].clone()).unwrap()
}

fn assert_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(str_field(expected, "method")), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", str_field(expected, "path")), "{name}: path");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let pair = h.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let actual: serde_json::Value =
                serde_json::from_str(req.body.as_deref().expect("request body")).unwrap();
            assert_eq!(&actual, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: unexpected body"),
    }
}

fn response(case: &serde_json::Value) -> HttpResponse {
    let r = &case["response"];
    HttpResponse {
        status: r["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: r["body"].as_str().unwrap().to_string(),
    }
}

/// Compare a parse outcome against either `expected` or `expected_error`.
fn assert_parsed<T>(name: &str, case: &serde_json::Value, result: Result<T, ApiError>)
where
    T: DeserializeOwned + PartialEq + Debug,
{
    if let Some(err) = case.get("expected_error") {
        match result {
            Err(ApiError::Http { status, message, .. }) => {
                assert_eq!(u64::from(status), err["status"].as_u64().unwrap(), "{name}: status");
                assert_eq!(message, str_field(err, "message"), "{name}: message");
            }
            other => panic!("{name}: expected HTTP error, got {other:?}"),
        }
    } else {
        let expected: T = serde_json::from_value(case["expected"].clone()).unwrap();
        assert_eq!(result.unwrap(), expected, "{name}: parsed value");
    }
}

#[test]
fn appointment_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/appointments.json")) {
        let name = str_field(&case, "name");
        match str_field(&case, "operation") {
            "create" => {
                let appointment: Appointment = input(&case);
                let req = c.build_create_appointment(&appointment).unwrap();
                assert_request(name, &req, &case["expected_request"]);
                assert_parsed(name, &case, c.parse_create_appointment(response(&case)));
            }
            "get" => {
                let req = c.build_get_appointment(str_field(&case, "id"));
                assert_request(name, &req, &case["expected_request"]);
                assert_parsed(name, &case, c.parse_get_appointment(response(&case)));
            }
            "list" => {
                let req = c.build_list_appointments(&AppointmentQuery::default());
                assert_request(name, &req, &case["expected_request"]);
                assert_parsed::<Vec<Appointment>>(name, &case, c.parse_list_appointments(response(&case)));
            }
            "delete" => {
                let all = case["all_recurring"].as_bool().unwrap();
                let req = c.build_delete_appointment(str_field(&case, "id"), all);
                assert_request(name, &req, &case["expected_request"]);
                assert_parsed::<Ack>(name, &case, c.parse_delete_appointment(response(&case)));
            }
            other => panic!("{name}: unknown operation {other}"),
        }
    }
}

#[test]
fn task_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/tasks.json")) {
        let name = str_field(&case, "name");
        let appointment_id = str_field(&case, "appointment_id");
        match str_field(&case, "operation") {
            "add" => {
                let task: NewTask = input(&case);
                let req = c.build_add_task(appointment_id, &task).unwrap();
                assert_request(name, &req, &case["expected_request"]);
                assert_parsed::<Task>(name, &case, c.parse_add_task(response(&case)));
            }
            "update" => {
                let patch: TaskPatch = input(&case);
                let req = c
                    .build_update_task(appointment_id, str_field(&case, "task_id"), &patch)
                    .unwrap();
                assert_request(name, &req, &case["expected_request"]);
                assert_parsed::<Task>(name, &case, c.parse_update_task(response(&case)));
            }
            "delete" => {
                let req = c.build_delete_task(appointment_id, str_field(&case, "task_id"));
                assert_request(name, &req, &case["expected_request"]);
                assert_parsed::<Ack>(name, &case, c.parse_delete_task(response(&case)));
            }
            other => panic!("{name}: unknown operation {other}"),
        }
    }
}
