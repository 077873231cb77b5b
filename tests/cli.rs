use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use indoc::indoc;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::ChildStdout;
use tokio::process::Command;

const SCOUT: &str = env!("CARGO_BIN_EXE_scout");

/// A stand-in for `g++` which "compiles" a shell script by copying it into place.
const FAKE_COMPILER: &str = indoc! {r#"
    #!/bin/sh
    cp "$3" "$2"
    chmod +x "$2"
"#};

fn write_executable(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn scout(dir: &Path) -> Command {
    let mut command = Command::new(SCOUT);
    command
        .current_dir(dir)
        .env_remove("SCOUT_COMPILER")
        .env("RUST_BACKTRACE", "0")
        .env("NO_COLOR", "1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command
}

/// Read lines from `stdout` until one contains `needle`, returning every line read.
async fn read_until(
    stdout: &mut tokio::io::Lines<BufReader<ChildStdout>>,
    needle: &str,
) -> Vec<String> {
    let mut seen = Vec::new();
    let result = tokio::time::timeout(Duration::from_secs(20), async {
        while let Some(line) = stdout.next_line().await.unwrap() {
            let found = line.contains(needle);
            seen.push(line);
            if found {
                return;
            }
        }
    })
    .await;
    assert!(
        result.is_ok() && seen.last().map_or(false, |line| line.contains(needle)),
        "never saw {needle:?}; saw:\n{}",
        seen.join("\n")
    );
    seen
}

/// Read every line written to `stdout` over the next `duration`.
async fn read_for(
    stdout: &mut tokio::io::Lines<BufReader<ChildStdout>>,
    duration: Duration,
) -> Vec<String> {
    let mut seen = Vec::new();
    let _ = tokio::time::timeout(duration, async {
        while let Some(line) = stdout.next_line().await.unwrap() {
            seen.push(line);
        }
    })
    .await;
    seen
}

fn stdout_lines(child: &mut Child) -> tokio::io::Lines<BufReader<ChildStdout>> {
    BufReader::new(child.stdout.take().unwrap()).lines()
}

/// Test that `scout` without a file argument reports the error and exits without watching.
#[tokio::test]
async fn missing_argument() {
    let dir = tempfile::tempdir().unwrap();
    let output = scout(dir.path()).output().await.unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No filename passed"), "{stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Watching"), "{stdout}");
}

/// Test that an empty file argument is treated like a missing one.
#[tokio::test]
async fn empty_argument() {
    let dir = tempfile::tempdir().unwrap();
    let output = scout(dir.path()).arg("").output().await.unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No filename passed"), "{stderr}");
}

/// Test that watching a file which doesn't exist is fatal.
#[tokio::test]
async fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = scout(dir.path()).arg("nope.cpp").output().await.unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to watch `nope.cpp`"), "{stderr}");
}

/// Test that a change compiles and runs the program, printing its output after "Running".
#[tokio::test]
async fn compiles_and_runs_on_change() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = dir.path().join("fake-cc");
    write_executable(&compiler, FAKE_COMPILER);
    let source = dir.path().join("demo.cpp");
    std::fs::write(&source, "#!/bin/sh\necho 'first version'\n").unwrap();

    let mut child = scout(dir.path())
        .arg("--compiler")
        .arg(&compiler)
        .arg("demo.cpp")
        .spawn()
        .unwrap();
    let mut stdout = stdout_lines(&mut child);

    read_until(&mut stdout, "Watching process started for file demo.cpp").await;

    std::fs::write(&source, "#!/bin/sh\necho 'hello from demo'\n").unwrap();

    let seen = read_until(&mut stdout, "hello from demo").await;
    let position = |needle: &str| {
        seen.iter()
            .position(|line| line.contains(needle))
            .unwrap_or_else(|| panic!("never saw {needle:?}; saw:\n{}", seen.join("\n")))
    };
    let change = position("Change detected in demo.cpp");
    let compiled = position("Compiled demo.cpp");
    let running = position("Running demo.cpp");
    let output = position("hello from demo");
    assert!(change < compiled, "{seen:?}");
    assert!(compiled < running, "{seen:?}");
    assert!(running < output, "{seen:?}");
    assert!(dir.path().join("demo").is_file());

    child.kill().await.unwrap();
}

/// Test that a failed compile with no earlier build reports that the program couldn't start,
/// and that the watcher keeps going afterwards.
#[tokio::test]
async fn failed_compile_without_binary_keeps_watching() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = dir.path().join("fake-cc");
    write_executable(
        &compiler,
        indoc! {r#"
            #!/bin/sh
            if grep -q error "$3"; then
                echo "$3:1:1: error: expected ';'" >&2
                exit 1
            fi
            cp "$3" "$2"
            chmod +x "$2"
        "#},
    );
    let source = dir.path().join("demo.cpp");
    std::fs::write(&source, "#!/bin/sh\necho 'not yet'\n").unwrap();

    let mut child = scout(dir.path())
        .arg("--compiler")
        .arg(&compiler)
        .arg("--debounce")
        .arg("100ms")
        .arg("demo.cpp")
        .spawn()
        .unwrap();
    let mut stdout = stdout_lines(&mut child);

    read_until(&mut stdout, "Watching process started").await;

    std::fs::write(&source, "this has an error\n").unwrap();
    let seen = read_until(&mut stdout, "Failed to start").await;
    assert!(
        seen.iter().any(|line| line.contains("Compiler output detected")),
        "{seen:?}"
    );
    assert!(
        seen.iter().any(|line| line.contains("error: expected ';'")),
        "{seen:?}"
    );

    // Wait out the debounce window, then fix the program.
    tokio::time::sleep(Duration::from_millis(500)).await;
    std::fs::write(&source, "#!/bin/sh\necho 'fixed it'\n").unwrap();
    read_until(&mut stdout, "fixed it").await;

    child.kill().await.unwrap();
}

/// Test that changes arriving while a slow compile is running don't start more runs once it
/// finishes.
#[tokio::test]
async fn slow_compile_runs_once_per_burst() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = dir.path().join("slow-cc");
    write_executable(
        &compiler,
        indoc! {r#"
            #!/bin/sh
            sleep 2
            cp "$3" "$2"
            chmod +x "$2"
        "#},
    );
    let source = dir.path().join("demo.cpp");
    std::fs::write(&source, "#!/bin/sh\necho 'v0'\n").unwrap();

    let mut child = scout(dir.path())
        .arg("--compiler")
        .arg(&compiler)
        .arg("demo.cpp")
        .spawn()
        .unwrap();
    let mut stdout = stdout_lines(&mut child);

    read_until(&mut stdout, "Watching process started").await;

    std::fs::write(&source, "#!/bin/sh\necho 'v1'\n").unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    std::fs::write(&source, "#!/bin/sh\necho 'v2'\n").unwrap();

    let mut seen = read_until(&mut stdout, "v2").await;
    // Long enough for another slow compile to finish, if one was started.
    seen.extend(read_for(&mut stdout, Duration::from_secs(4)).await);

    let changes = seen
        .iter()
        .filter(|line| line.contains("Change detected"))
        .count();
    assert_eq!(changes, 1, "{seen:?}");

    child.kill().await.unwrap();
}

/// Test that the session settings are logged at debug level.
#[tokio::test]
async fn debug_logs_session_settings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("demo.cpp"), "int main() {}\n").unwrap();

    let mut child = scout(dir.path())
        .arg("--log-filter")
        .arg("scout=debug")
        .arg("demo.cpp")
        .spawn()
        .unwrap();
    let mut stdout = stdout_lines(&mut child);

    let seen = read_until(&mut stdout, "debounce=").await;
    assert!(seen.iter().any(|line| line.contains("Watch session configured")), "{seen:?}");
    assert!(seen.iter().any(|line| line.contains("compiler=g++")), "{seen:?}");
    assert!(seen.last().unwrap().contains("debounce=1s 500ms"), "{seen:?}");

    child.kill().await.unwrap();
}
