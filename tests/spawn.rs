// tests/spawn.rs

use execwrap::config::{ExecutionRequest, build_request, normalize};
use execwrap::exec::spawn::{build_command, password_for_stdin};
use execwrap_test_utils::builders::RunOptionsBuilder;

fn request_as(user: Option<&str>, password: Option<&str>) -> ExecutionRequest {
    let mut options = RunOptionsBuilder::new("whoami").build();
    options.user = user.map(str::to_string);
    options.password = password.map(str::to_string);
    build_request(normalize(&options).unwrap()).unwrap()
}

#[test]
fn no_credentials_means_nothing_on_stdin() {
    let request = request_as(None, Some("hunter2"));
    assert_eq!(password_for_stdin(&request), None);
}

#[test]
fn user_without_password_means_nothing_on_stdin() {
    let request = request_as(Some("builder"), None);
    assert_eq!(password_for_stdin(&request), None);
}

#[cfg(unix)]
#[test]
fn password_is_only_fed_to_the_elevation_program() {
    let request = request_as(Some("builder"), Some("hunter2"));

    assert_eq!(password_for_stdin(&request), Some("hunter2"));

    let command = build_command(&request);
    let std_command = command.as_std();
    assert_eq!(std_command.get_program(), "sudo");
    let args: Vec<_> = std_command.get_args().collect();
    assert_eq!(args, ["-S", "-u", "builder", "--", "whoami"]);
}

#[cfg(not(unix))]
#[test]
fn password_is_never_fed_to_the_program_itself() {
    let request = request_as(Some("builder"), Some("hunter2"));

    assert_eq!(password_for_stdin(&request), None);
    assert_eq!(build_command(&request).as_std().get_program(), "whoami");
}

#[cfg(unix)]
#[test]
fn arguments_keep_their_backslashes() {
    let options = RunOptionsBuilder::new("echo").argument(r"C:\path").build();
    let request = build_request(normalize(&options).unwrap()).unwrap();

    let command = build_command(&request);
    let args: Vec<_> = command.as_std().get_args().collect();
    assert_eq!(args, [r"C:\path"]);
}
