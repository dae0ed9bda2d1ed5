use {
    clap::Parser,
    contract_deployer::arguments::Arguments,
    std::process::ExitCode,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Arguments::try_parse() {
        Ok(args) => args,
        // `--help` and `--version` print to stdout and exit successfully.
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };
    observe::tracing::initialize(&observe::Config::new(
        &args.log_filter,
        args.log_stderr_threshold.into_level(),
        args.log_json,
    ));
    tracing::info!("running contract deployer with validated arguments:\n{}", args);
    contract_deployer::start(args).await
}
