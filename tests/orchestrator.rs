// tests/orchestrator.rs
#![cfg(unix)]

use std::time::{Duration, Instant};

use execwrap::config::{ExecutionRequest, build_request, normalize};
use execwrap::errors::ExecwrapError;
use execwrap::exec::{
    ExecutionResult, ExecutionState, Orchestrator, ResultHandle, TerminalState,
};
use execwrap::exit_code;
use execwrap_test_utils::builders::RunOptionsBuilder;
use execwrap_test_utils::{init_tracing, with_timeout};

fn request(builder: RunOptionsBuilder) -> ExecutionRequest {
    build_request(normalize(&builder.build()).unwrap()).unwrap()
}

async fn run_sync(builder: RunOptionsBuilder) -> ExecutionResult {
    let launch = Orchestrator::new(request(builder)).launch().await.unwrap();
    match launch.handle {
        ResultHandle::Completed(result) => result,
        ResultHandle::Background(_) => panic!("expected a synchronous result"),
    }
}

#[tokio::test]
async fn stdout_lines_are_captured_in_order() {
    init_tracing();

    let result = with_timeout(run_sync(
        RunOptionsBuilder::new("sh").argument("-c 'for i in 1 2 3 4 5; do echo line$i; done'"),
    ))
    .await;

    assert_eq!(result.stdout(), ["line1", "line2", "line3", "line4", "line5"]);
    assert!(result.stderr().is_empty());
    assert_eq!(result.terminal_state(), Some(TerminalState::TerminatedNormally));
    assert_eq!(result.exit_code(), Some(0));
    assert!(!result.timed_out());
}

#[tokio::test]
async fn stdout_and_stderr_are_kept_apart() {
    init_tracing();

    let result = with_timeout(run_sync(
        RunOptionsBuilder::new("sh").argument("-c 'echo out; echo err 1>&2; echo out2'"),
    ))
    .await;

    assert_eq!(result.stdout(), ["out", "out2"]);
    assert_eq!(result.stderr(), ["err"]);
}

#[tokio::test]
async fn large_output_does_not_stall_the_child() {
    init_tracing();

    // Far more than a pipe buffer holds.
    let result = with_timeout(run_sync(
        RunOptionsBuilder::new("sh")
            .argument("-c 'i=0; while [ $i -lt 20000 ]; do echo \"line $i\"; i=$((i+1)); done'")
            .verbosity(execwrap::types::Verbosity::Normal),
    ))
    .await;

    assert_eq!(result.stdout().len(), 20000);
    assert_eq!(result.stdout()[0], "line 0");
    assert_eq!(result.stdout()[19999], "line 19999");
}

#[tokio::test]
async fn result_is_finalized_with_timestamps_and_pid() {
    init_tracing();

    let launch = with_timeout(Orchestrator::new(request(RunOptionsBuilder::new("true"))).launch())
        .await
        .unwrap();
    let pid = launch.process_id;
    let result = match launch.handle {
        ResultHandle::Completed(result) => result,
        ResultHandle::Background(_) => panic!("expected a synchronous result"),
    };

    assert!(result.is_finalized());
    assert_eq!(
        result.state(),
        ExecutionState::Finalized(TerminalState::TerminatedNormally)
    );
    assert_eq!(result.process_id(), Some(pid));
    assert_eq!(result.execution_id(), launch.execution_id);
    let (start, end) = (result.started_at().unwrap(), result.ended_at().unwrap());
    assert!(start <= end);
}

#[tokio::test]
async fn non_zero_exit_code_is_reported() {
    init_tracing();

    let result = with_timeout(run_sync(RunOptionsBuilder::new("sh").argument("-c 'exit 7'"))).await;

    assert_eq!(result.terminal_state(), Some(TerminalState::TerminatedNormally));
    assert_eq!(result.exit_code(), Some(7));
    assert_eq!(exit_code::for_result(&result), 7);
}

#[tokio::test]
async fn timeout_kills_the_child_and_records_the_sentinel() {
    init_tracing();

    let started = Instant::now();
    let result = with_timeout(run_sync(
        RunOptionsBuilder::new("sleep").argument("5").timeout_ms(200),
    ))
    .await;

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(result.terminal_state(), Some(TerminalState::TerminatedByTimeout));
    assert!(result.timed_out());
    assert_eq!(result.exit_code(), Some(exit_code::TIMEOUT));
    assert_eq!(exit_code::for_result(&result), exit_code::TIMEOUT);
}

#[tokio::test]
async fn output_before_timeout_is_kept() {
    init_tracing();

    let result = with_timeout(run_sync(
        RunOptionsBuilder::new("sh")
            .argument("-c 'echo before; exec sleep 5'")
            .timeout_ms(500),
    ))
    .await;

    assert_eq!(result.terminal_state(), Some(TerminalState::TerminatedByTimeout));
    assert_eq!(result.stdout(), ["before"]);
}

#[tokio::test]
async fn generous_timeout_does_not_affect_a_quick_program() {
    init_tracing();

    let result = with_timeout(run_sync(
        RunOptionsBuilder::new("sh").argument("-c 'exit 3'").timeout_ms(5000),
    ))
    .await;

    assert_eq!(result.terminal_state(), Some(TerminalState::TerminatedNormally));
    assert_eq!(result.exit_code(), Some(3));
    assert!(!result.timed_out());
}

#[tokio::test]
async fn missing_program_fails_to_launch() {
    init_tracing();

    let err = Orchestrator::new(request(RunOptionsBuilder::new(
        "execwrap-definitely-not-a-real-program",
    )))
    .launch()
    .await
    .unwrap_err();

    match err {
        ExecwrapError::Execution(msg) => {
            assert!(msg.contains("execwrap-definitely-not-a-real-program"))
        }
        other => panic!("expected Execution error, got {other:?}"),
    }
}

#[tokio::test]
async fn asynchronous_launch_returns_before_the_child_terminates() {
    init_tracing();

    let started = Instant::now();
    let launch = with_timeout(
        Orchestrator::new(request(
            RunOptionsBuilder::new("sleep").argument("1").asynchronous(),
        ))
        .launch(),
    )
    .await
    .unwrap();
    assert!(started.elapsed() < Duration::from_millis(800));
    assert!(launch.process_id > 0);

    let task = match launch.handle {
        ResultHandle::Background(task) => task,
        ResultHandle::Completed(_) => panic!("expected a background task"),
    };
    assert!(!task.is_finished());
    assert_eq!(task.execution_id(), launch.execution_id);

    let result = with_timeout(task.join()).await.unwrap();
    assert_eq!(result.terminal_state(), Some(TerminalState::TerminatedNormally));
    assert_eq!(result.exit_code(), Some(0));
}

#[tokio::test]
async fn asynchronous_launch_of_an_instant_program() {
    init_tracing();

    let launch = with_timeout(
        Orchestrator::new(request(RunOptionsBuilder::new("true").asynchronous())).launch(),
    )
    .await
    .unwrap();

    let ResultHandle::Background(task) = launch.handle else {
        panic!("expected a background task");
    };
    let result = with_timeout(task.join()).await.unwrap();
    assert!(result.is_finalized());
}

#[tokio::test]
async fn asynchronous_run_still_honours_the_timeout() {
    init_tracing();

    let launch = with_timeout(
        Orchestrator::new(request(
            RunOptionsBuilder::new("sleep")
                .argument("5")
                .timeout_ms(200)
                .asynchronous(),
        ))
        .launch(),
    )
    .await
    .unwrap();

    let ResultHandle::Background(task) = launch.handle else {
        panic!("expected a background task");
    };
    let result = with_timeout(task.join()).await.unwrap();
    assert_eq!(result.terminal_state(), Some(TerminalState::TerminatedByTimeout));
}

#[tokio::test]
async fn every_launch_gets_its_own_execution_id() {
    let a = Orchestrator::new(request(RunOptionsBuilder::new("true")));
    let b = Orchestrator::new(request(RunOptionsBuilder::new("true")));
    assert_ne!(a.execution_id(), b.execution_id());
}

#[tokio::test]
async fn output_is_captured_while_the_process_id_file_is_written() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let launch = with_timeout(
        Orchestrator::new(request(
            RunOptionsBuilder::new("sh")
                .argument("-c 'echo early'")
                .timeout_ms(5000)
                .asynchronous()
                .outputs_in(dir.path()),
        ))
        .launch(),
    )
    .await
    .unwrap();

    // The process-id file is complete by the time launch returns.
    let pid_lines = execwrap_test_utils::read_lines(&dir.path().join("pid.txt")).unwrap();
    assert_eq!(pid_lines, [launch.process_id.to_string()]);

    let ResultHandle::Background(task) = launch.handle else {
        panic!("expected a background task");
    };
    let result = with_timeout(task.join()).await.unwrap();
    assert_eq!(result.stdout(), ["early"]);
    assert_eq!(result.terminal_state(), Some(TerminalState::TerminatedNormally));
}
