use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use notifwd::cli::Args;
use notifwd::payload::PlistDecoder;
use notifwd::providers::PushProvider;
use notifwd::resolver::MdfindResolver;
use notifwd::scheduler::{Poller, Scheduler};
use notifwd::store::{self, NotificationStore};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Application error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.into_config()?;
    init_logging(config.silent);

    if !config.silent {
        print_banner();
    }

    let provider = config.provider.create_provider()?;

    let db_path = match &config.database {
        Some(path) => path.clone(),
        None => store::default_store_path().await?,
    };
    let notification_store = NotificationStore::open(&db_path).await?;

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    if config.send_test_on_startup {
        send_startup_test(provider.as_ref()).await;
    }

    let mut poller = Poller::new(
        notification_store,
        Box::new(PlistDecoder),
        Box::new(MdfindResolver::new()),
    );
    poller.capture_baseline().await?;

    Scheduler::new(poller, provider, config.period, cancel)
        .run()
        .await?;

    Ok(())
}

/// Forward ctrl-c into the cancellation token.
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            cancel.cancel();
        }
    });
}

/// Send one test notification through the configured provider. A rejected
/// test is a warning, not a startup failure; the credentials were already
/// validated and the provider may just be briefly unreachable.
async fn send_startup_test(provider: &dyn PushProvider) {
    match provider.send_test().await {
        Ok(response) if response.is_success() => {
            info!(provider = provider.name(), "Test notification delivered");
        }
        Ok(response) => {
            warn!(
                provider = provider.name(),
                status = response.status,
                body = %response.body,
                "Test notification rejected"
            );
        }
        Err(e) => {
            warn!(provider = provider.name(), "Test notification failed: {e}");
        }
    }
}

fn init_logging(silent: bool) {
    let filter = if silent {
        EnvFilter::new("error")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn print_banner() {
    println!(
        r"
  _   _       _   _  __             _
 | \ | | ___ | |_(_)/ _|_      ____| |
 |  \| |/ _ \| __| | |_\ \ /\ / / _` |
 | |\  | (_) | |_| |  _|\ V  V / (_| |
 |_| \_|\___/ \__|_|_|   \_/\_/ \__,_|
"
    );
    println!(
        "notifwd v{} - macOS notification forwarder",
        env!("CARGO_PKG_VERSION")
    );
    println!();
}
