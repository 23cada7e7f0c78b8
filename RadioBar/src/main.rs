//! RadioBar: interactive streaming-radio console client

mod player_mpv;

use player_mpv::MpvPlayer;
use rbevents::{EventDispatcher, ShellLauncher};
use rbproto::{HttpTransport, RequestExecutor, RestCodec};
use rbsession::{persist, CrosstermInput, NoopHotkeys, Session};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = rbconfig::get_config();

    println!(
        "Welcome to RadioBar ({})!",
        env!("CARGO_PKG_VERSION")
    );
    println!("Press ? for a list of commands.");

    // ========== Collaborators, leaves first ==========

    let codec = RestCodec::new(config.get_device());
    let transport = HttpTransport::new(config.get_base_url(), config.get_timeout_secs() as u64)?;
    let executor = RequestExecutor::new(Box::new(codec), Box::new(transport));

    let dispatcher = EventDispatcher::new(
        config.get_event_command(),
        config.get_event_subscriptions(),
        Box::new(ShellLauncher),
    );

    let player = MpvPlayer::new(config.get_player_command());

    let mut session = Session::new(
        config.clone(),
        executor,
        dispatcher,
        Box::new(player),
        Box::new(CrosstermInput),
        Box::new(NoopHotkeys),
    );

    // ========== Previous run's state ==========

    let state_path = config.state_file_path();
    if let Some(state) = persist::read_state(&state_path) {
        info!(
            station = state.station_id.as_deref().unwrap_or("-"),
            history = state.history.len(),
            "restored previous session state"
        );
        session.preload_state(state);
    }

    // ========== Session ==========

    let run_result = session.run().await;

    // write the state file even when the session aborted early
    let state = session.snapshot_state();
    if let Err(e) = persist::write_state(&state_path, &state) {
        warn!(path = %state_path.display(), error = %e, "failed to write state file");
    }

    run_result?;
    Ok(())
}
