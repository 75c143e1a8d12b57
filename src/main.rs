#[macro_use]
extern crate log;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use buslat::bus::{BusError, MessageBus, NatsBus};
use buslat::configuration::Configuration;
use buslat::publisher::Publisher;
use buslat::shutdown::ShutdownCoordinator;
use buslat::subscriber::{self, LatencySampler};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = Configuration::parse();
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("configuration valid, starting");

    match run(args).await {
        Ok(()) => {
            info!("done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Configuration) -> Result<(), BusError> {
    let bus: Arc<dyn MessageBus> =
        Arc::new(NatsBus::connect(&args.server, &args.creds).await?);
    info!("connected to {}", args.server);

    let coordinator = ShutdownCoordinator::new();
    coordinator.bind_signals();

    let mut subscriber_task = None;
    if args.subscribe {
        info!("--sub provided, starting listener on {}", args.subject);
        let subscription = bus.subscribe(&args.subject).await?;
        bus.flush().await?;
        subscriber_task = Some(tokio::spawn(subscriber::run(
            subscription,
            Arc::new(LatencySampler),
            coordinator.handle(),
        )));
    }

    let mut publisher_task = None;
    if args.publish {
        info!(
            "--pub provided, starting publish loop on {} every {}s",
            args.subject, args.interval
        );
        let publisher = Publisher::new(
            args.subject.clone(),
            Duration::from_secs(args.interval),
            args.on_publish_error,
        );
        let bus = Arc::clone(&bus);
        let shutdown = coordinator.handle();
        let coordinator = coordinator.clone();
        publisher_task = Some(tokio::spawn(async move {
            let result = publisher.run(bus, shutdown).await;
            if result.is_err() {
                // An aborted publish loop takes the process down too.
                coordinator.trigger();
            }
            result
        }));
    }

    let mut main_wait = coordinator.handle();
    main_wait.cancelled().await;
    info!("shutting down");

    if let Some(task) = publisher_task {
        match task.await {
            Ok(result) => result?,
            Err(e) => error!("publisher task failed: {}", e),
        }
    }
    if let Some(task) = subscriber_task {
        if let Err(e) = task.await {
            error!("subscriber task failed: {}", e);
        }
    }

    Ok(())
}
