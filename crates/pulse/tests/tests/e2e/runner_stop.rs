//! End-to-end test: the runner ticks on its interval and stops on request.

use std::time::Duration;

use pulse_monitor::{MonitorConfig, MonitorRunner};
use pulse_tests::{standard_composites, Harness};

#[tokio::test(start_paused = true)]
async fn runner_stops_and_returns_monitor() {
    let mut config = MonitorConfig::new("harness", standard_composites());
    config.tick_rate_hz = 4.0;
    let harness = Harness::with_config(config, 0.9).unwrap();

    let runner = MonitorRunner::new(harness.monitor);
    let stop = runner.stop_handle();
    let mut status = runner.status_handle();
    let task = tokio::spawn(runner.run());

    assert!(status.changed().await);
    assert_eq!(status.get_status().tick, 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    stop.stop();
    let monitor = task.await.unwrap();

    let ticks = monitor.status().tick;
    assert!((8..=10).contains(&ticks), "unexpected tick count {}", ticks);
    assert!(monitor.status().active_issues.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_takes_effect_at_next_tick() {
    let harness = Harness::new(0.9).unwrap();
    let runner = MonitorRunner::new(harness.monitor);
    let stop = runner.stop_handle();
    let status = runner.status_handle();
    let task = tokio::spawn(runner.run());

    tokio::time::sleep(Duration::from_millis(3500)).await;
    stop.stop();
    let monitor = task.await.unwrap();

    // Every completed tick was published.
    assert_eq!(status.get_status().tick, monitor.status().tick);
    assert_eq!(monitor.status().tick, 4);
}
