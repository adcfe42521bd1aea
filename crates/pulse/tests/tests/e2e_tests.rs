#[path = "e2e/steady_state.rs"]
mod steady_state;

#[path = "e2e/drop_and_recover.rs"]
mod drop_and_recover;

#[path = "e2e/source_failures.rs"]
mod source_failures;

#[path = "e2e/issue_lifecycle.rs"]
mod issue_lifecycle;

#[path = "e2e/event_queue.rs"]
mod event_queue;

#[path = "e2e/runner_stop.rs"]
mod runner_stop;
