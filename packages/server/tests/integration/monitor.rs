use fleet_common::{DroneState, MonitorConfig};
use fleet_server::monitor::BatteryMonitor;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sea_orm::{EntityTrait, PaginatorTrait};

use fleet_server::entity::event_log;

use crate::common::{TestApp, routes};

fn test_config() -> MonitorConfig {
    MonitorConfig {
        enabled: true,
        interval_secs: 1,
        max_retries: 2,
        retry_base_ms: 1,
        retry_max_ms: 5,
        seed: None,
    }
}

fn monitor(app: &TestApp, seed: u64) -> BatteryMonitor {
    BatteryMonitor::with_rng(
        app.db.clone(),
        app.locks.clone(),
        test_config(),
        StdRng::seed_from_u64(seed),
    )
}

async fn event_count(app: &TestApp) -> u64 {
    event_log::Entity::find()
        .count(&app.db)
        .await
        .expect("count event logs")
}

mod battery_check {
    use super::*;

    #[tokio::test]
    async fn every_tick_logs_one_reading_per_drone() {
        let app = TestApp::spawn().await;
        app.insert_drone_row("drone1", 500, 100, 85, DroneState::Idle)
            .await;
        app.insert_drone_row("drone2", 500, 98, 50, DroneState::Idle)
            .await;
        let monitor = monitor(&app, 2024);

        for _ in 0..5 {
            let report = monitor
                .check_battery_levels()
                .await
                .expect("battery check");
            assert!(report.is_complete());
            assert_eq!(report.updated.len(), 2);
        }

        assert_eq!(event_count(&app).await, 10);

        for (serial, capacity) in [("drone1", 100), ("drone2", 98)] {
            let level = app.battery_level(serial).await;
            assert!((0..=capacity).contains(&level), "{serial} at {level}");

            let res = app.get(&routes::events(serial)).await;
            assert_eq!(res.status, 200);
            let events = res.body.as_array().unwrap();
            assert_eq!(events.len(), 5);
            for event in events {
                let reading = event["battery_level"].as_i64().unwrap();
                assert!((0..=capacity).contains(&reading));
            }
            assert_eq!(events[4]["battery_level"].as_i64().unwrap(), level);
        }
    }

    #[tokio::test]
    async fn empty_fleet_is_a_no_op() {
        let app = TestApp::spawn().await;

        let report = monitor(&app, 1)
            .check_battery_levels()
            .await
            .expect("battery check");

        assert!(report.is_complete());
        assert!(report.updated.is_empty());
        assert_eq!(event_count(&app).await, 0);
    }

    #[tokio::test]
    async fn same_seed_gives_same_readings() {
        let first = TestApp::spawn().await;
        let second = TestApp::spawn().await;
        for app in [&first, &second] {
            app.insert_drone_row("DRN-A", 100, 100, 60, DroneState::Idle)
                .await;
            app.insert_drone_row("DRN-B", 100, 70, 10, DroneState::Delivering)
                .await;
        }

        let a = monitor(&first, 99).check_battery_levels().await.unwrap();
        let b = monitor(&second, 99).check_battery_levels().await.unwrap();

        assert_eq!(a.updated, b.updated);
    }

    #[tokio::test]
    async fn drone_missing_at_update_time_is_skipped() {
        let app = TestApp::spawn().await;

        let report = monitor(&app, 3)
            .check_drones(&["DRN-GHOST".to_string()], 1)
            .await;

        assert_eq!(report.skipped, vec!["DRN-GHOST".to_string()]);
        assert!(report.failed.is_empty());
        assert_eq!(event_count(&app).await, 0);
    }
}

mod failure_isolation {
    use super::*;

    async fn block_audit_for(app: &TestApp, serial: &str) {
        app.fail_inserts(
            "block_audit",
            "event_log",
            &format!("NEW.drone_serial = '{serial}'"),
        )
        .await;
    }

    #[tokio::test]
    async fn failing_drone_is_retried_without_touching_the_others() {
        let app = TestApp::spawn().await;
        app.insert_drone_row("DRN-FAULTY", 500, 100, 40, DroneState::Idle)
            .await;
        app.insert_drone_row("DRN-OK", 500, 100, 70, DroneState::Idle)
            .await;
        block_audit_for(&app, "DRN-FAULTY").await;

        let report = monitor(&app, 8).run_with_retry().await;

        assert!(!report.is_complete());
        assert_eq!(report.attempts, 3);
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].serial, "DRN-OK");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].serial, "DRN-FAULTY");
        let attempts: Vec<u8> = report.failed[0]
            .history
            .iter()
            .map(|a| a.attempt)
            .collect();
        assert_eq!(attempts, vec![1, 2, 3]);

        // The failed update rolled back along with its audit record.
        assert_eq!(app.battery_level("DRN-FAULTY").await, 40);
        let res = app.get(&routes::events("DRN-FAULTY")).await;
        assert_eq!(res.body.as_array().unwrap().len(), 0);
        let res = app.get(&routes::events("DRN-OK")).await;
        assert_eq!(res.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn drone_recovers_once_the_fault_clears() {
        let app = TestApp::spawn().await;
        app.insert_drone_row("DRN-FAULTY", 500, 100, 40, DroneState::Idle)
            .await;
        block_audit_for(&app, "DRN-FAULTY").await;
        let monitor = monitor(&app, 13);

        let report = monitor.check_drones(&["DRN-FAULTY".to_string()], 1).await;
        assert_eq!(report.failed.len(), 1);

        app.drop_trigger("block_audit").await;
        let report = monitor.check_drones(&["DRN-FAULTY".to_string()], 1).await;

        assert!(report.is_complete());
        assert_eq!(report.updated.len(), 1);
        assert_eq!(event_count(&app).await, 1);
    }

    #[tokio::test]
    async fn default_policy_retries_three_times_after_the_first_run() {
        let app = TestApp::spawn().await;
        app.insert_drone_row("DRN-FAULTY", 500, 100, 40, DroneState::Idle)
            .await;
        block_audit_for(&app, "DRN-FAULTY").await;
        let config = MonitorConfig {
            retry_base_ms: 1,
            retry_max_ms: 5,
            ..Default::default()
        };
        let monitor = BatteryMonitor::with_rng(
            app.db.clone(),
            app.locks.clone(),
            config,
            StdRng::seed_from_u64(21),
        );

        let report = monitor.run_with_retry().await;

        assert_eq!(report.attempts, 4);
        let attempts: Vec<u8> = report.failed[0]
            .history
            .iter()
            .map(|a| a.attempt)
            .collect();
        assert_eq!(attempts, vec![1, 2, 3, 4]);
        assert_eq!(app.battery_level("DRN-FAULTY").await, 40);
    }
}
