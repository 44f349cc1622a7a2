//! Integration tests for security alerts, dashboards, and eviction notices.

mod helpers;

use fleethub_entity::security::AlertKind;

#[tokio::test]
async fn test_end_to_end_eviction_scenario() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;

    let t1 = app.login(&user, "198.51.100.1").await;
    let t2 = app.login(&user, "198.51.100.2").await;
    let t3 = app.login(&user, "198.51.100.3").await;

    // Three distinct addresses is already past the threshold of two.
    let alerts = app.manager.monitor().detect(user.id).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::MultipleLocations);
    assert_eq!(app.manager.list_active(user.id).await.unwrap().len(), 3);

    let t4 = app
        .manager
        .issue_session(&user, "198.51.100.4", "FleetHub-Web/2.0")
        .await
        .unwrap();
    assert_eq!(t4.evicted, vec![t1.session.id]);

    let mut active: Vec<_> = app
        .manager
        .list_active(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    active.sort();
    let mut expected = vec![t2.session.id, t3.session.id, t4.session.id];
    expected.sort();
    assert_eq!(active, expected);

    let notices = app.notifier.wait_for(1).await;
    assert_eq!(notices.len(), 1);
    let notice = &notices[0];
    assert_eq!(notice.user_id, user.id);
    assert_eq!(notice.evicted_session_ids, vec![t1.session.id]);
    assert_eq!(notice.new_session_id, t4.session.id);
    assert_eq!(notice.source_address, "198.51.100.4");
    assert_eq!(notice.client_descriptor, "FleetHub-Web/2.0");
}

#[tokio::test]
async fn test_no_notice_without_eviction() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;

    app.login(&user, "198.51.100.1").await;
    app.login(&user, "198.51.100.1").await;

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(app.notifier.notices().await.is_empty());
}

#[tokio::test]
async fn test_dashboard_composes_views() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;

    let first = app.login(&user, "198.51.100.1").await;
    app.login(&user, "198.51.100.1").await;
    app.manager.revoke_session(first.session.id).await.unwrap();
    app.login(&user, "198.51.100.2").await;

    let dashboard = app.manager.dashboard(user.id).await.unwrap();

    assert_eq!(dashboard.metrics.active_sessions, 2);
    assert_eq!(dashboard.metrics.total_sessions, 3);
    assert_eq!(dashboard.metrics.unique_addresses, 2);
    assert_eq!(dashboard.active_sessions.len(), 2);
    assert_eq!(dashboard.recent_history.len(), 3);
    assert!(dashboard.alerts.is_empty());
    assert!(dashboard.warnings.approaching_limit);
    assert!(!dashboard.warnings.has_security_concerns);
}

#[tokio::test]
async fn test_dashboard_does_not_mutate() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;
    app.login(&user, "198.51.100.1").await;

    let before = app.manager.list_active(user.id).await.unwrap();
    app.manager.dashboard(user.id).await.unwrap();
    app.manager.monitor().metrics(user.id).await.unwrap();
    let after = app.manager.list_active(user.id).await.unwrap();

    assert_eq!(before, after);
}

#[tokio::test]
async fn test_too_many_devices_with_raised_cap() {
    let mut config = helpers::test_config();
    config.session.max_sessions_per_user = 10;
    let app = helpers::TestApp::with_config(config);
    let user = app.create_user("driver@fleet.example").await;

    for _ in 0..6 {
        app.login(&user, "198.51.100.1").await;
    }

    let alerts = app.manager.monitor().detect(user.id).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::TooManyDevices);
}
