// tests/persist.rs

use tempfile::tempdir;

use execwrap::persist::append_lines;
use execwrap_test_utils::read_lines;

#[tokio::test]
async fn appends_lines_and_creates_parents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("x").join("y").join("out.txt");

    let written = append_lines(&path, &["one".to_string(), "two".to_string()])
        .await
        .unwrap();
    append_lines(&path, &["three".to_string()]).await.unwrap();

    assert!(written.is_absolute());
    assert_eq!(read_lines(&path).unwrap(), ["one", "two", "three"]);
}

#[tokio::test]
async fn writes_utf8_without_byte_order_mark() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.txt");

    append_lines(&path, &["grüße".to_string()]).await.unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(!bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    assert_eq!(bytes, "grüße\n".as_bytes());
}

#[tokio::test]
async fn no_lines_still_creates_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.txt");

    append_lines(&path, &[]).await.unwrap();

    assert!(path.exists());
    assert_eq!(std::fs::read(&path).unwrap().len(), 0);
}

#[tokio::test]
async fn writing_to_a_directory_fails() {
    let dir = tempdir().unwrap();
    assert!(append_lines(dir.path(), &["x".to_string()]).await.is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn one_failing_output_file_does_not_block_the_others() {
    use execwrap::run;
    use execwrap_test_utils::builders::RunOptionsBuilder;

    let dir = tempdir().unwrap();
    let mut options = RunOptionsBuilder::new("echo")
        .argument("hi")
        .outputs_in(dir.path())
        .build();
    // A directory cannot be appended to.
    options.stdout_file = Some(dir.path().display().to_string());

    let outcome = run(execwrap::invocation::Invocation::RunFromArgs(options)).await;

    assert_eq!(outcome.exit_code, 0);
    assert_eq!(read_lines(&dir.path().join("exitcode.txt")).unwrap(), ["0"]);
    assert!(read_lines(&dir.path().join("stderr.txt")).unwrap().is_empty());
    assert!(dir.path().join("stderr.txt").exists());
}
