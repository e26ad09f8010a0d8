// tests/exit_codes.rs

use uuid::Uuid;

use execwrap::errors::ExecwrapError;
use execwrap::exec::{ExecutionResult, ExecutionState, TerminalLatch, TerminalState, Termination};
use execwrap::exit_code;
use execwrap::types::WaitingPolicy;

#[test]
fn sentinels_are_distinct_and_out_of_the_ordinary_range() {
    let sentinels = [
        exit_code::NO_PROGRAM_EXECUTED,
        exit_code::FATAL_ERROR,
        exit_code::TIMEOUT,
        exit_code::PARSING_ERROR,
        exit_code::LAUNCHED_ASYNC,
    ];
    for (i, a) in sentinels.iter().enumerate() {
        assert!(i64::from(*a) >= (1_i64 << 31) - 1_000_000);
        for b in &sentinels[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn errors_map_to_their_sentinels() {
    assert_eq!(
        exit_code::for_error(&ExecwrapError::Configuration("x".into())),
        exit_code::NO_PROGRAM_EXECUTED
    );
    assert_eq!(
        exit_code::for_error(&ExecwrapError::Decoding("x".into())),
        exit_code::NO_PROGRAM_EXECUTED
    );
    assert_eq!(
        exit_code::for_error(&ExecwrapError::Parsing("x".into())),
        exit_code::PARSING_ERROR
    );
    assert_eq!(
        exit_code::for_error(&ExecwrapError::Execution("x".into())),
        exit_code::FATAL_ERROR
    );
    assert_eq!(
        exit_code::for_error(&ExecwrapError::Other(anyhow::anyhow!("boom"))),
        exit_code::FATAL_ERROR
    );
}

#[test]
fn asynchronous_launch_always_reports_the_launch_sentinel() {
    let failed = ExecutionResult::failed(Uuid::new_v4());
    assert_eq!(
        exit_code::for_launch(WaitingPolicy::Asynchronous, None),
        exit_code::LAUNCHED_ASYNC
    );
    assert_eq!(
        exit_code::for_launch(WaitingPolicy::Asynchronous, Some(&failed)),
        exit_code::LAUNCHED_ASYNC
    );
    assert_eq!(
        exit_code::for_launch(WaitingPolicy::Synchronous, Some(&failed)),
        exit_code::FATAL_ERROR
    );
}

#[test]
fn failed_result_is_empty_and_final() {
    let id = Uuid::new_v4();
    let result = ExecutionResult::failed(id);

    assert_eq!(result.execution_id(), id);
    assert_eq!(result.state(), ExecutionState::Finalized(TerminalState::Failed));
    assert_eq!(result.process_id(), None);
    assert!(result.stdout().is_empty());
    assert!(result.stderr().is_empty());
    assert_eq!(exit_code::for_result(&result), exit_code::FATAL_ERROR);
}

#[test]
fn latch_honours_only_the_first_termination() {
    let latch = TerminalLatch::new();
    let watchdog_side = latch.clone();

    assert!(latch.try_set(Termination {
        state: TerminalState::TerminatedNormally,
        exit_code: Some(0),
    }));
    assert!(!watchdog_side.try_set(Termination {
        state: TerminalState::TerminatedByTimeout,
        exit_code: Some(exit_code::TIMEOUT),
    }));

    assert_eq!(
        watchdog_side.get(),
        Some(Termination {
            state: TerminalState::TerminatedNormally,
            exit_code: Some(0),
        })
    );
}

#[test]
fn latch_race_has_exactly_one_winner() {
    for _ in 0..50 {
        let latch = TerminalLatch::new();
        let handles: Vec<_> = [TerminalState::TerminatedNormally, TerminalState::TerminatedByTimeout]
            .into_iter()
            .map(|state| {
                let latch = latch.clone();
                std::thread::spawn(move || latch.try_set(Termination { state, exit_code: None }))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
