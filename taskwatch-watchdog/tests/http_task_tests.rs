//! The HTTP-backed task polled from a plain thread, as the schedule does.

use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;
use taskwatch_client::SchedulerClient;
use taskwatch_core::domain::task::{TaskResult, TaskStatus};
use taskwatch_watchdog::{
    DEFAULT_FETCH_TIMEOUT, HttpTask, Interrupt, RemoteTask, WaitConfig, WaitError,
    wait_for_completion,
};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn finished_body() -> serde_json::Value {
    json!({
        "id": "T:77",
        "state": "completed",
        "finished": true,
        "result": "pass",
        "worker": { "name": "lab-03" }
    })
}

#[test]
fn fetch_status_blocks_on_runtime() {
    let runtime = Runtime::new().unwrap();
    let server = runtime.block_on(MockServer::start());

    runtime.block_on(
        Mock::given(method("GET"))
            .and(path("/api/tasks/T:77"))
            .respond_with(ResponseTemplate::new(200).set_body_json(finished_body()))
            .mount(&server),
    );

    let task = HttpTask::new(
        SchedulerClient::new(server.uri()),
        "T:77",
        runtime.handle().clone(),
    );

    assert_eq!(task.id(), "T:77");
    let info = task.fetch_status().unwrap();
    assert_eq!(info.state, TaskStatus::Completed);
    assert_eq!(info.result, Some(TaskResult::Pass));
}

#[test]
fn server_errors_surface_as_fetch_errors() {
    let runtime = Runtime::new().unwrap();
    let server = runtime.block_on(MockServer::start());

    runtime.block_on(
        Mock::given(method("GET"))
            .and(path("/api/tasks/T:77"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server),
    );

    let task = HttpTask::new(
        SchedulerClient::new(server.uri()),
        "T:77",
        runtime.handle().clone(),
    );

    let err = task.fetch_status().unwrap_err();
    assert!(format!("{:#}", err).contains("T:77"));
    assert!(format!("{:#}", err).contains("503"));
}

#[test]
fn waiter_survives_transient_server_errors() {
    let runtime = Runtime::new().unwrap();
    let server = runtime.block_on(MockServer::start());

    runtime.block_on(async {
        Mock::given(method("GET"))
            .and(path("/api/tasks/T:77"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/tasks/T:77"))
            .respond_with(ResponseTemplate::new(200).set_body_json(finished_body()))
            .mount(&server)
            .await;
    });

    let task = HttpTask::new(
        SchedulerClient::new(server.uri()),
        "T:77",
        runtime.handle().clone(),
    );

    let config = WaitConfig::new(Duration::ZERO, Duration::from_millis(5))
        .with_recheck_interval(Duration::from_millis(10));
    let completion = wait_for_completion(task, TaskStatus::New, &config, &Interrupt::new()).unwrap();

    assert_eq!(completion.result(), Some(TaskResult::Pass));
    assert_eq!(completion.stats.failed, 2);
    assert_eq!(completion.info.worker.unwrap().name, "lab-03");
}

fn mount_slow_task(runtime: &Runtime, server: &MockServer, delay: Duration) {
    runtime.block_on(
        Mock::given(method("GET"))
            .and(path("/api/tasks/T:9"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(finished_body())
                    .set_delay(delay),
            )
            .mount(server),
    );
}

#[test]
fn fetch_status_gives_up_after_timeout() {
    let runtime = Runtime::new().unwrap();
    let server = runtime.block_on(MockServer::start());
    mount_slow_task(&runtime, &server, Duration::from_secs(4));

    let task = HttpTask::new(SchedulerClient::new(server.uri()), "T:9", runtime.handle().clone())
        .with_timeout(Duration::from_millis(100));

    let started = Instant::now();
    let err = task.fetch_status().unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(format!("{:#}", err).contains("Timed out"));
    assert!(format!("{:#}", err).contains("T:9"));
}

#[test]
fn default_fetch_timeout_is_bounded() {
    let runtime = Runtime::new().unwrap();
    let task = HttpTask::new(
        SchedulerClient::new("http://localhost:8080"),
        "T:9",
        runtime.handle().clone(),
    );
    assert_eq!(task.timeout(), DEFAULT_FETCH_TIMEOUT);
}

#[test]
fn interrupt_is_not_held_up_by_unanswered_fetch() {
    let runtime = Runtime::new().unwrap();
    let server = runtime.block_on(MockServer::start());
    mount_slow_task(&runtime, &server, Duration::from_secs(4));

    let task = HttpTask::new(SchedulerClient::new(server.uri()), "T:9", runtime.handle().clone())
        .with_timeout(Duration::from_millis(200));

    let interrupt = Interrupt::new();
    {
        let interrupt = interrupt.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            interrupt.trigger();
        });
    }

    let config = WaitConfig::new(Duration::ZERO, Duration::from_millis(50))
        .with_recheck_interval(Duration::from_millis(10));

    let started = Instant::now();
    let result = wait_for_completion(task, TaskStatus::Queued, &config, &interrupt);
    let elapsed = started.elapsed();

    assert!(matches!(
        result,
        Err(WaitError::Abandoned {
            last_status: TaskStatus::Queued,
            ..
        })
    ));
    assert!(elapsed < Duration::from_secs(2), "abandon took {:?}", elapsed);
}
