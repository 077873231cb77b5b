//! `scout` watches a C++ source file and recompiles and reruns it whenever it changes.

use clap::Parser;
use miette::WrapErr;
use scout::cli;
use scout::install_tracing;
use scout::run_watcher;
use scout::Pipeline;
use scout::WatchTarget;
use scout::WatcherOpts;

// One thread: the pipeline blocks the watch loop until the compiled program exits.
#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    miette::set_panic_hook();
    let opts = cli::Opts::parse();
    opts.init();
    install_tracing(&opts.logging.log_filter)?;

    let target = WatchTarget::resolve(opts.file.as_deref())?;
    let pipeline = Pipeline::new(&opts.compiler);

    run_watcher(target, pipeline, WatcherOpts::from_cli(&opts))
        .await
        .wrap_err("File watcher failed")?;

    Ok(())
}
