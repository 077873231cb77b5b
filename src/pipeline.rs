//! The build-and-run pipeline: compile the watched file, then run whatever the compiler produced.
//!
//! The program is run whether or not the compiler succeeded. After a failed compile that means a
//! stale program from an earlier build is run, or, if there never was a successful build, the run
//! fails with a [`SpawnFailure`].

use std::io::Write;
use std::process::ExitStatus;

use camino::Utf8Path;
use tokio::process::Command;
use tracing::instrument;

use crate::error::SpawnFailure;
use crate::target::WatchTarget;
use crate::CommandExt;

/// The captured output of a finished process.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Standard output, decoded lossily as UTF-8.
    pub stdout: String,
    /// Standard error, decoded lossily as UTF-8.
    pub stderr: String,
    /// How the process exited.
    pub status: ExitStatus,
}

impl ProcessResult {
    /// Run `command` to completion, capturing its output.
    async fn capture(command: &mut Command) -> Result<Self, SpawnFailure> {
        let command_display = command.display();
        tracing::debug!(command = %command_display, "Starting process");
        let output = command
            .output()
            .await
            .map_err(|source| SpawnFailure {
                command: command_display.clone(),
                source,
            })?;
        let result = Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status,
        };
        tracing::debug!(command = %command_display, status = %result.status, "Process exited");
        Ok(result)
    }

    /// Did the process write anything at all?
    pub fn has_output(&self) -> bool {
        !self.stdout.is_empty() || !self.stderr.is_empty()
    }
}

/// Compiles and runs a [`WatchTarget`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    compiler: String,
}

impl Pipeline {
    /// Create a pipeline which compiles with the given compiler program, like `g++`.
    pub fn new(compiler: impl Into<String>) -> Self {
        Self {
            compiler: compiler.into(),
        }
    }

    /// The compiler program.
    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    fn compile_command(&self, target: &WatchTarget) -> Command {
        let mut command = Command::new(&self.compiler);
        command
            .arg("-o")
            .arg(target.output().as_std_path())
            .arg(target.source().as_std_path());
        command
    }

    fn run_command(&self, target: &WatchTarget) -> Command {
        Command::new(target.run_path().as_std_path())
    }

    /// Compile the target, then run it, waiting for both to finish.
    ///
    /// Fails only if the compiler can't be started. If the compiled program can't be started,
    /// that's recorded in the returned [`PipelineRun`].
    #[instrument(skip_all, level = "debug", fields(source = %target.source()))]
    pub async fn run_once(&self, target: &WatchTarget) -> Result<PipelineRun, SpawnFailure> {
        let compile = ProcessResult::capture(&mut self.compile_command(target)).await?;
        if !compile.status.success() {
            tracing::debug!(status = %compile.status, "Compiler failed; running the program anyway");
        }
        let run = ProcessResult::capture(&mut self.run_command(target)).await;
        Ok(PipelineRun {
            target: target.clone(),
            compile,
            run,
        })
    }
}

/// The results of one compile-then-run cycle.
#[derive(Debug)]
pub struct PipelineRun {
    /// The target that was built.
    pub target: WatchTarget,
    /// The compiler's output.
    pub compile: ProcessResult,
    /// The program's output, or why it couldn't be started.
    pub run: Result<ProcessResult, SpawnFailure>,
}

/// One line (or block) of console output describing a [`PipelineRun`].
#[derive(Debug)]
pub enum ReportLine<'a> {
    /// The compiler finished.
    Compiled(&'a Utf8Path),
    /// The compiler wrote something, which follows as [`ReportLine::Output`].
    CompilerOutputDetected,
    /// The program was run; its output follows.
    Running(&'a Utf8Path),
    /// Captured process output, shown verbatim.
    Output(&'a str),
    /// The program couldn't be started.
    RunFailed(&'a SpawnFailure),
}

impl<'a> ReportLine<'a> {
    /// Write this line to the console. Status lines are logged; process output is printed as-is.
    pub fn emit(&self) {
        match self {
            ReportLine::Compiled(source) => tracing::info!("Compiled {source}"),
            ReportLine::CompilerOutputDetected => tracing::warn!("Compiler output detected"),
            ReportLine::Running(source) => tracing::info!(running = true, "Running {source}"),
            ReportLine::Output(text) => print_verbatim(text),
            ReportLine::RunFailed(err) => tracing::error!("{err}: {}", err.source),
        }
    }
}

fn print_verbatim(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let result = if text.ends_with('\n') {
        stdout.write_all(text.as_bytes())
    } else {
        writeln!(stdout, "{text}")
    };
    if let Err(err) = result.and_then(|()| stdout.flush()) {
        tracing::debug!("Failed to write process output: {err}");
    }
}

impl PipelineRun {
    /// The console output for this run, in order.
    ///
    /// Compiler output comes before the "running" line and program output after it. Within each,
    /// stdout comes before stderr, and empty streams are skipped.
    pub fn report(&self) -> Vec<ReportLine<'_>> {
        let source = self.target.source();
        let mut lines = vec![ReportLine::Compiled(source)];

        if self.compile.has_output() {
            lines.push(ReportLine::CompilerOutputDetected);
            push_output(&mut lines, &self.compile);
        }

        lines.push(ReportLine::Running(source));
        match &self.run {
            Ok(run) => push_output(&mut lines, run),
            Err(err) => lines.push(ReportLine::RunFailed(err)),
        }

        lines
    }

    /// Write the report for this run to the console.
    pub fn emit(&self) {
        for line in self.report() {
            line.emit();
        }
    }
}

fn push_output<'a>(lines: &mut Vec<ReportLine<'a>>, result: &'a ProcessResult) {
    for stream in [&result.stdout, &result.stderr] {
        if !stream.is_empty() {
            lines.push(ReportLine::Output(stream));
        }
    }
}
