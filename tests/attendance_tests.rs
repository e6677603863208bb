mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{TestApp, assert_hours, spawn_app};

const TODAY: &str = "2024-01-10";

struct Fixture {
    app: TestApp,
    token: String,
    site_id: i64,
    employee_id: i64,
}

async fn fixture() -> Fixture {
    let app = spawn_app(TODAY).await;
    let token = app.admin_token().await;
    let project_id = app.create_project(&token).await;
    let site_id = app.create_site(&token, project_id).await;
    let employee_id = app
        .create_employee(&token, "Evans", "ID-001", Some(site_id))
        .await;
    Fixture {
        app,
        token,
        site_id,
        employee_id,
    }
}

impl Fixture {
    async fn record(&self, date: &str, status: &str, hours: f64) -> (StatusCode, Value) {
        self.app
            .request(
                "POST",
                "/api/attendance",
                Some(&self.token),
                Some(json!({
                    "employeeId": self.employee_id,
                    "siteId": self.site_id,
                    "date": date,
                    "status": status,
                    "hours": hours,
                })),
            )
            .await
    }

    async fn rows_for(&self, date: &str) -> Vec<Value> {
        let uri = format!(
            "/api/attendance?employeeId={}&siteId={}&startDate={date}&endDate={date}",
            self.employee_id, self.site_id
        );
        let (status, body) = self.app.request("GET", &uri, Some(&self.token), None).await;
        assert_eq!(status, StatusCode::OK);
        body["data"].as_array().unwrap().clone()
    }

    async fn employee(&self) -> Value {
        self.app.employee(&self.token, self.employee_id).await
    }
}

#[tokio::test]
async fn test_new_employee_starts_absent_with_no_hours() {
    let f = fixture().await;
    let employee = f.employee().await;
    assert_eq!(employee["present"], false);
    assert_hours(&employee["hours"], 0.0);
}

#[tokio::test]
async fn test_recording_twice_for_today_replaces_hours() {
    let f = fixture().await;

    let (status, body) = f.record(TODAY, "present", 8.0).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "present");
    assert_eq!(body["data"]["employee"]["name"], "Evans");
    assert_eq!(body["data"]["site"]["name"], "Block A");

    let employee = f.employee().await;
    assert_eq!(employee["present"], true);
    assert_hours(&employee["hours"], 8.0);

    let (status, body) = f.record(TODAY, "late", 5.0).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "late");
    assert_hours(&body["data"]["hours"], 5.0);

    let rows = f.rows_for(TODAY).await;
    assert_eq!(rows.len(), 1);
    assert_hours(&rows[0]["hours"], 5.0);

    let employee = f.employee().await;
    assert_eq!(employee["present"], false);
    assert_hours(&employee["hours"], 5.0);
}

#[tokio::test]
async fn test_present_then_absent_scenario() {
    let f = fixture().await;

    f.record(TODAY, "present", 8.0).await;
    let employee = f.employee().await;
    assert_eq!(employee["present"], true);
    assert_hours(&employee["hours"], 8.0);

    f.record(TODAY, "absent", 0.0).await;
    assert_eq!(f.rows_for(TODAY).await.len(), 1);

    let employee = f.employee().await;
    assert_eq!(employee["present"], false);
    assert_hours(&employee["hours"], 0.0);
}

#[tokio::test]
async fn test_past_dates_do_not_touch_the_aggregate() {
    let f = fixture().await;

    let (status, _) = f.record("2024-01-09", "present", 9.0).await;
    assert_eq!(status, StatusCode::CREATED);

    let employee = f.employee().await;
    assert_eq!(employee["present"], false);
    assert_hours(&employee["hours"], 0.0);
}

#[tokio::test]
async fn test_delete_reverses_only_todays_hours() {
    let f = fixture().await;

    let (_, today_row) = f.record(TODAY, "present", 8.0).await;
    let (_, past_row) = f.record("2024-01-09", "present", 6.0).await;
    let today_id = today_row["data"]["id"].as_i64().unwrap();
    let past_id = past_row["data"]["id"].as_i64().unwrap();

    let (status, _) = f
        .app
        .request(
            "DELETE",
            &format!("/api/attendance/{past_id}"),
            Some(&f.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_hours(&f.employee().await["hours"], 8.0);

    let (status, _) = f
        .app
        .request(
            "DELETE",
            &format!("/api/attendance/{today_id}"),
            Some(&f.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_hours(&f.employee().await["hours"], 0.0);

    let (status, _) = f
        .app
        .request(
            "GET",
            &format!("/api/attendance/{today_id}"),
            Some(&f.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_merges_and_syncs_aggregate() {
    let f = fixture().await;
    let (_, row) = f.record(TODAY, "present", 8.0).await;
    let id = row["data"]["id"].as_i64().unwrap();

    let (status, body) = f
        .app
        .request(
            "PUT",
            &format!("/api/attendance/{id}"),
            Some(&f.token),
            Some(json!({ "hours": 10.0, "notes": "overtime" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "present");
    assert_eq!(body["data"]["notes"], "overtime");
    assert_hours(&body["data"]["hours"], 10.0);

    let employee = f.employee().await;
    assert_eq!(employee["present"], true);
    assert_hours(&employee["hours"], 10.0);

    let (status, _) = f
        .app
        .request(
            "PUT",
            &format!("/api/attendance/{id}"),
            Some(&f.token),
            Some(json!({ "hours": -1.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bulk_isolates_malformed_records() {
    let f = fixture().await;
    let (_, existing) = f.record("2024-01-08", "present", 7.0).await;
    let existing_id = existing["data"]["id"].as_i64().unwrap();

    let records = json!([
        {
            "employeeId": f.employee_id,
            "siteId": f.site_id,
            "date": TODAY,
            "status": "present",
            "hours": 8.0,
        },
        {
            "employeeId": f.employee_id,
            "siteId": f.site_id,
            "date": "not-a-date",
            "status": "present",
        },
        {
            "employeeId": f.employee_id,
            "siteId": f.site_id,
            "date": "2024-01-08",
            "status": "absent",
            "hours": 0.0,
        },
        { "id": existing_id, "notes": "corrected" },
    ]);

    let (status, body) = f
        .app
        .request(
            "POST",
            "/api/attendance/bulk",
            Some(&f.token),
            Some(json!({ "records": records })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let outcome = &body["data"];
    assert_eq!(outcome["created"], 1);
    assert_eq!(outcome["updated"], 2);
    assert_eq!(outcome["failed"], 1);
    assert_eq!(outcome["errors"][0]["record"]["date"], "not-a-date");
    assert!(outcome["errors"][0]["error"].is_string());

    assert_hours(&f.employee().await["hours"], 8.0);
}

#[tokio::test]
async fn test_bulk_rejects_empty_batch() {
    let f = fixture().await;
    let (status, body) = f
        .app
        .request(
            "POST",
            "/api/attendance/bulk",
            Some(&f.token),
            Some(json!({ "records": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No records provided");
}

#[tokio::test]
async fn test_record_validates_references_and_fields() {
    let f = fixture().await;

    let (status, _) = f
        .app
        .request(
            "POST",
            "/api/attendance",
            Some(&f.token),
            Some(json!({
                "employeeId": 9999,
                "siteId": f.site_id,
                "date": TODAY,
                "status": "present",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = f
        .app
        .request(
            "POST",
            "/api/attendance",
            Some(&f.token),
            Some(json!({
                "employeeId": f.employee_id,
                "siteId": f.site_id,
                "date": TODAY,
                "status": "sleeping",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = f
        .app
        .request(
            "POST",
            "/api/attendance",
            Some(&f.token),
            Some(json!({ "siteId": f.site_id, "date": TODAY, "status": "present" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summary_counts_statuses_in_range() {
    let f = fixture().await;
    let second = f
        .app
        .create_employee(&f.token, "Wanjiku", "ID-002", Some(f.site_id))
        .await;

    f.record("2024-01-08", "present", 8.0).await;
    f.record("2024-01-09", "absent", 0.0).await;
    f.record(TODAY, "present", 8.0).await;
    f.app
        .request(
            "POST",
            "/api/attendance",
            Some(&f.token),
            Some(json!({
                "employeeId": second,
                "siteId": f.site_id,
                "date": "2024-01-09",
                "status": "late",
                "hours": 6.0,
            })),
        )
        .await;

    let (status, body) = f
        .app
        .request(
            "GET",
            "/api/attendance/summary?startDate=2024-01-08&endDate=2024-01-09",
            Some(&f.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let counts = body["data"].as_array().unwrap();
    let count_of = |name: &str| {
        counts
            .iter()
            .find(|c| c["status"] == name)
            .and_then(|c| c["count"].as_i64())
            .unwrap_or(0)
    };
    assert_eq!(count_of("present"), 1);
    assert_eq!(count_of("absent"), 1);
    assert_eq!(count_of("late"), 1);

    let (status, _) = f
        .app
        .request(
            "GET",
            "/api/attendance/summary?startDate=2024-01-09",
            Some(&f.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let f = fixture().await;
    f.record("2024-01-08", "present", 8.0).await;
    f.record("2024-01-09", "absent", 0.0).await;

    let (status, body) = f
        .app
        .request(
            "GET",
            "/api/attendance?status=absent",
            Some(&f.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["date"], "2024-01-09");
}

#[tokio::test]
async fn test_employee_attendance_shortcut_goes_through_ledger() {
    let f = fixture().await;

    let (status, body) = f
        .app
        .request(
            "PATCH",
            &format!("/api/employees/{}/attendance", f.employee_id),
            Some(&f.token),
            Some(json!({ "present": true, "hours": 6.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["present"], true);
    assert_hours(&body["data"]["hours"], 6.0);

    let rows = f.rows_for(TODAY).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "present");

    let (_, body) = f
        .app
        .request(
            "PATCH",
            &format!("/api/employees/{}/attendance", f.employee_id),
            Some(&f.token),
            Some(json!({ "present": false, "hours": 0.0 })),
        )
        .await;
    assert_eq!(body["data"]["present"], false);
    assert_hours(&body["data"]["hours"], 0.0);
    assert_eq!(f.rows_for(TODAY).await.len(), 1);
}

#[tokio::test]
async fn test_concurrent_records_for_one_key_create_once() {
    let f = fixture().await;

    let ((s1, _), (s2, _), (s3, _)) = tokio::join!(
        f.record(TODAY, "present", 8.0),
        f.record(TODAY, "present", 6.0),
        f.record(TODAY, "present", 4.0),
    );
    let statuses = [s1, s2, s3];
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1,
        "{statuses:?}"
    );
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::OK).count(),
        2,
        "{statuses:?}"
    );

    let rows = f.rows_for(TODAY).await;
    assert_eq!(rows.len(), 1);

    let employee = f.employee().await;
    assert_eq!(employee["present"], true);
    assert_hours(&employee["hours"], rows[0]["hours"].as_f64().unwrap());
}

#[tokio::test]
async fn test_deleting_site_releases_todays_hours() {
    let f = fixture().await;
    f.record(TODAY, "present", 8.0).await;
    f.record("2024-01-09", "present", 6.0).await;

    let (status, _) = f
        .app
        .request(
            "DELETE",
            &format!("/api/sites/{}", f.site_id),
            Some(&f.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = f
        .app
        .request(
            "GET",
            &format!("/api/attendance?employeeId={}", f.employee_id),
            Some(&f.token),
            None,
        )
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_hours(&f.employee().await["hours"], 0.0);
}

#[tokio::test]
async fn test_deleting_project_releases_hours_on_all_its_sites() {
    let f = fixture().await;
    let (_, site) = f
        .app
        .request("GET", &format!("/api/sites/{}", f.site_id), Some(&f.token), None)
        .await;
    let project_id = site["data"]["projectId"].as_i64().unwrap();
    let second_site = f.app.create_site(&f.token, project_id).await;

    f.record(TODAY, "present", 8.0).await;
    f.app
        .request(
            "POST",
            "/api/attendance",
            Some(&f.token),
            Some(json!({
                "employeeId": f.employee_id,
                "siteId": second_site,
                "date": TODAY,
                "status": "present",
                "hours": 3.0,
            })),
        )
        .await;
    assert_hours(&f.employee().await["hours"], 11.0);

    let (status, _) = f
        .app
        .request(
            "DELETE",
            &format!("/api/projects/{project_id}"),
            Some(&f.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = f
        .app
        .request("GET", &format!("/api/sites/{second_site}"), Some(&f.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_hours(&f.employee().await["hours"], 0.0);
}

#[tokio::test]
async fn test_deleting_other_site_keeps_hours() {
    let f = fixture().await;
    let (_, site) = f
        .app
        .request("GET", &format!("/api/sites/{}", f.site_id), Some(&f.token), None)
        .await;
    let project_id = site["data"]["projectId"].as_i64().unwrap();
    let empty_site = f.app.create_site(&f.token, project_id).await;

    f.record(TODAY, "present", 8.0).await;

    let (status, _) = f
        .app
        .request(
            "DELETE",
            &format!("/api/sites/{empty_site}"),
            Some(&f.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_hours(&f.employee().await["hours"], 8.0);
    assert_eq!(f.rows_for(TODAY).await.len(), 1);
}
