// Copyright (c) James Kassemi, SC, US. All rights reserved.
mod cli;
mod render;

use std::{env, process, sync::Arc, time::Duration};

use cli::{CliError, Command};
use config::ConfigError;
use core_types::{AppConfig, PollIndex};
use poll_engine::{ActionOrchestrator, ActionReport, EngineError, SessionStore};
use poll_registry::PollRegistry;
use rpc_source::{RpcSetupError, RpcStack};
use thiserror::Error;

const STATUS_PRINT_INTERVAL_SECS: u64 = 30;

fn main() {
    if let Err(err) = run() {
        eprintln!("polls failed: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let command = cli::parse(env::args().skip(1))?;
    let config = AppConfig::load()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;
    runtime.block_on(execute(command, config))
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Usage(#[from] CliError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Rpc(#[from] RpcSetupError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed to start runtime: {0}")]
    Runtime(std::io::Error),
    #[error("failed while waiting for shutdown signal: {0}")]
    Signal(std::io::Error),
    #[error("poll {0} not found")]
    UnknownPoll(PollIndex),
}

async fn execute(command: Command, config: AppConfig) -> Result<(), AppError> {
    rpc_source::verify_chain(&config).await?;
    let stack = RpcStack::from_config(&config)?;
    let registry = PollRegistry::from_config(Arc::clone(&stack.reader), &config.registry);
    let engine = ActionOrchestrator::new(registry, stack.writer, stack.tracker, stack.signer)
        .with_session_store(SessionStore::new(&config.session.state_path));

    if command.is_mutating() {
        let account = engine.resume_or_connect().await?;
        println!("wallet: {}", account.short());
    }
    engine.refresh().await?;

    match command {
        Command::List => print_list(&engine),
        Command::Show { poll } => print_poll(&engine, poll)?,
        Command::Create { title, candidates } => {
            let report = engine.create_poll(&title, &candidates).await?;
            print_report(&report);
            print_list(&engine);
        }
        Command::Vote { poll, candidate } => {
            let report = engine.vote(poll, candidate).await?;
            print_report(&report);
            print_poll(&engine, poll)?;
        }
        Command::End { poll } => {
            let report = engine.end_poll(poll).await?;
            print_report(&report);
            print_poll(&engine, poll)?;
        }
        Command::Watch => watch(&engine, &config).await?,
    }
    Ok(())
}

fn print_list(engine: &ActionOrchestrator) {
    let view = engine.view();
    println!("{}", render::header(&view));
    for poll in view.polls() {
        println!("{}", render::poll_line(poll, &view));
    }
}

fn print_poll(engine: &ActionOrchestrator, poll: PollIndex) -> Result<(), AppError> {
    let view = engine.view();
    let target = view
        .snapshot
        .poll(poll)
        .ok_or(AppError::UnknownPoll(poll))?;
    println!("{}", render::poll_detail(target, &view));
    Ok(())
}

fn print_report(report: &ActionReport) {
    println!("{}", render::report_line(report));
}

async fn watch(engine: &ActionOrchestrator, config: &AppConfig) -> Result<(), AppError> {
    let refresher = engine
        .registry()
        .spawn_refresh_loop(config.registry.refresh_interval());
    println!(
        "Refreshing every {}s; press Ctrl+C to stop.",
        config.registry.refresh_interval().as_secs()
    );
    print_list(engine);
    let mut ticker = tokio::time::interval(Duration::from_secs(STATUS_PRINT_INTERVAL_SECS));
    ticker.tick().await;
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                refresher.abort();
                signal.map_err(AppError::Signal)?;
                println!("Shutdown signal received; stopping.");
                return Ok(());
            }
            _ = ticker.tick() => {
                print_list(engine);
                let status = engine.registry().status_handle().snapshot();
                if status.errors.is_empty() {
                    println!("{status}");
                } else {
                    eprintln!("{status}");
                }
            }
        }
    }
}
