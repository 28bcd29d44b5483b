//! Weekly-plan and reminder stage against mock widget back-ends.

mod common;

use aula_core::{WeekSlot, Weekday};
use aula_providers::AulaClient;
use common::{mount_portal, mount_tokens, mount_widgets};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "Bearer widget-token";

fn task(day: &str) -> Value {
    json!({
        "kuvertnavn": "Emilie Hansen",
        "ugedag": day,
        "hold": [{"navn": "2A"}],
        "title": format!("Opgave {day}"),
        "erFaerdig": false,
        "opgaveType": "Lektie",
        "afleveringsdato": "/Date(1700000000000+0100)/",
        "ugenummer": 46
    })
}

fn task_list(days: &[&str]) -> Value {
    json!({"opgaver": days.iter().map(|d| task(d)).collect::<Vec<_>>()})
}

async fn weekly_client(server: &MockServer, widgets: &[&str]) -> (AulaClient, TempDir) {
    mount_portal(server).await;
    mount_widgets(server, widgets).await;
    mount_tokens(server).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::config(server, dir.path());
    config.weekly_plans = true;
    (common::client(config), dir)
}

fn task_mock(body: Value) -> Mock {
    Mock::given(method("GET"))
        .and(path("/minuddannelse/opgaveliste"))
        .and(header("Authorization", TOKEN))
        .and(query_param("sessionUUID", "900"))
        .and(query_param("childFilter", "501,502"))
        .and(query_param("institutionFilter", "751001"))
        .and(query_param("placement", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
}

async fn mount_letters(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/minuddannelse/ugebrev"))
        .and(header("Authorization", TOKEN))
        .and(query_param("assuranceLevel", "2"))
        .and(query_param("childFilter", "501,502"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"personer": [{
            "navn": "Emilie Hansen",
            "institutioner": [{"ugebreve": [{"indhold": "<p>Ugebrev</p>"}]}]
        }]})))
        .mount(server)
        .await;
}

async fn mount_reminders(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/systematic/reminders/v1"))
        .and(header("Aula-Authorization", TOKEN))
        .and(header("zone", "Europe/Copenhagen"))
        .and(query_param("children", "501"))
        .and(query_param("children", "502"))
        .and(query_param("institutions", "751001"))
        .and(query_param("sessionId", common::USERNAME))
        .and(query_param("widgetVersion", "1.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"userName": "Karla Hansen", "teamReminders": [{
                "dueDate": "2022-11-30T23:00:00Z",
                "subjectName": "Dansk",
                "createdBy": "Christina",
                "reminderText": "Læs kapitel 2."
            }]},
            {"userName": "Emilie Hansen", "teamReminders": []}
        ])))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_weekly_stage_fills_both_weeks() {
    let server = MockServer::start().await;
    let (mut client, _dir) = weekly_client(&server, &["0030", "0029", "0062"]).await;
    task_mock(task_list(&["Mandag", "Tirsdag"])).mount(&server).await;
    mount_letters(&server).await;
    mount_reminders(&server).await;

    let snapshot = client.refresh().await.unwrap();

    for slot in WeekSlot::BOTH {
        let emilie = snapshot.tasks_of("101", slot).unwrap();
        assert_eq!(emilie.len(), 2);
        let tuesday = &emilie.day(Weekday::Tirsdag)[0];
        assert_eq!(tuesday.title, "Opgave Tirsdag");
        assert_eq!(tuesday.due, "14-11-2023 22:13");
        assert!(snapshot.tasks_of("102", slot).unwrap().is_empty());
        assert_eq!(snapshot.weekly_letter_of("101", slot), Some("<p>Ugebrev</p>"));
    }

    assert_eq!(
        snapshot.reminders_of("102"),
        Some("<h3>Wednesday 30. November</h3><b>Dansk</b><br>af Christina<br><br>Læs kapitel 2\\.<br><br>")
    );
    assert_eq!(snapshot.reminders_of("101"), Some("Emilie har ingen påmindelser."));
    assert!(snapshot.has_widget("0030"));
    assert_eq!(client.widgets().len(), 3);
}

#[tokio::test]
async fn test_task_buckets_reset_between_cycles() {
    let server = MockServer::start().await;
    let (mut client, _dir) = weekly_client(&server, &["0030"]).await;
    task_mock(task_list(&["Mandag", "Tirsdag", "Onsdag", "Torsdag", "Fredag"]))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    task_mock(task_list(&["Mandag", "Tirsdag"])).mount(&server).await;

    let first = client.refresh().await.unwrap().clone();
    assert_eq!(first.tasks_of("101", WeekSlot::ThisWeek).unwrap().len(), 5);

    let second = client.refresh().await.unwrap();
    for slot in WeekSlot::BOTH {
        let emilie = second.tasks_of("101", slot).unwrap();
        assert_eq!(emilie.day(Weekday::Mandag).len(), 1);
        assert_eq!(emilie.day(Weekday::Tirsdag).len(), 1);
        assert!(emilie.day(Weekday::Onsdag).is_empty());
        assert!(emilie.day(Weekday::Torsdag).is_empty());
        assert!(emilie.day(Weekday::Fredag).is_empty());
    }
}

#[tokio::test]
async fn test_failing_source_is_isolated() {
    let server = MockServer::start().await;
    let (mut client, _dir) = weekly_client(&server, &["0029", "0062"]).await;
    Mock::given(method("GET"))
        .and(path("/minuddannelse/ugebrev"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_reminders(&server).await;

    let snapshot = client.refresh().await.unwrap();

    assert!(snapshot.weekly_letters.get(WeekSlot::ThisWeek).is_empty());
    assert!(snapshot.weekly_letters.get(WeekSlot::NextWeek).is_empty());
    assert_eq!(snapshot.reminders.len(), 2);
}

#[tokio::test]
async fn test_meebook_plans_go_to_letters() {
    let server = MockServer::start().await;
    let (mut client, _dir) = weekly_client(&server, &["0004"]).await;
    Mock::given(method("GET"))
        .and(path("/meebook/relatedweekplan/all"))
        .and(header("authorization", TOKEN))
        .and(header("sessionuuid", common::USERNAME))
        .and(header("x-version", "1.0"))
        .and(query_param("childFilter[]", "502"))
        .and(query_param("institutionFilter[]", "751001"))
        .and(query_param("userProfile", "guardian"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "name": "Karla Hansen",
            "weekPlan": [
                {"date": "mandag 28. nov.", "tasks": [
                    {"pill": "Dansk", "author": "Maja", "content": "Læs 2. kapitel"}
                ]},
                {"date": "tirsdag 29. nov.", "tasks": []}
            ]
        }])))
        .expect(2)
        .mount(&server)
        .await;

    let snapshot = client.refresh().await.unwrap();

    assert_eq!(
        snapshot.weekly_letter_of("102", WeekSlot::ThisWeek),
        Some("<h3>mandag 28. nov.</h3><b>Dansk</b><br>Maja<br><br>Læs 2\\. kapitel<br><br><h3>tirsdag 29. nov.</h3>-")
    );
    assert!(snapshot.tasks.get(WeekSlot::ThisWeek).is_empty());
}

#[tokio::test]
async fn test_widgets_not_enabled_are_skipped() {
    let server = MockServer::start().await;
    let (mut client, _dir) = weekly_client(&server, &["0062"]).await;
    mount_reminders(&server).await;
    task_mock(task_list(&["Mandag"])).expect(0).mount(&server).await;

    let snapshot = client.refresh().await.unwrap();

    assert!(snapshot.tasks.get(WeekSlot::ThisWeek).is_empty());
    assert_eq!(snapshot.reminders.len(), 2);
}

#[tokio::test]
async fn test_widgets_are_discovered_once() {
    let server = MockServer::start().await;
    mount_portal(&server).await;
    mount_tokens(&server).await;
    Mock::given(method("GET"))
        .and(path(common::api_path(common::VERSION)))
        .and(query_param("method", "profiles.getProfileContext"))
        .and(wiremock::matchers::query_param_is_missing("portalrole"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::ok(json!({
            "moduleWidgetConfiguration": {"widgetConfigurations": [
                {"widget": {"widgetId": "0029", "name": "Ugebrev"}}
            ]}
        }))))
        .expect(1)
        .mount(&server)
        .await;
    mount_letters(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = common::config(&server, dir.path());
    config.weekly_plans = true;
    let mut client = common::client(config);
    client.refresh().await.unwrap();
    client.refresh().await.unwrap();

    assert_eq!(client.snapshot().weekly_letter_of("101", WeekSlot::NextWeek), Some("<p>Ugebrev</p>"));
}
