use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::data::DataInput;
use crate::error::NetworkError;
use crate::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::terminator::Terminator;
use crate::train::train_config::{RunType, TrainConfig};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Loads `data` into `network` and runs epochs until the run ends. Returns the
/// statistics of the last completed epoch, `None` if none completed.
///
/// # Arguments
/// - `network`    — modified in place; its topology is built on the first run
/// - `data`       — rows for this run; replaces the rows of any previous run
/// - `terminator` — stopping policy checked after every training epoch
/// - `config`     — run type, optional progress channel, optional stop flag
///
/// # Termination
/// A `Test` run always stops after one epoch. A `Train` run stops when:
/// - `terminator` fires, **or**
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// A `Train` run with an unset terminator and no stop flag does not end.
///
/// # Errors
/// Returns the build error if `data` cannot be loaded; no epoch runs then.
pub fn train_loop(
    network: &mut Network,
    data: &dyn DataInput,
    terminator: &Terminator,
    config: &TrainConfig,
) -> Result<Option<EpochStats>, NetworkError> {
    network.prepare(data)?;
    info!(
        "{}: {:?} run over {} rows",
        network.info().name,
        config.run_type,
        data.train_size()
    );

    let mut last = None;

    loop {
        if stop_requested(&config.stop_flag) {
            break;
        }

        // ── One full pass over the rows ───────────────────────────────────
        let stats = network.run_epoch(config.run_type)?;
        debug!(
            "epoch {}: error {:.6}, accuracy {:.2}%",
            stats.epoch, stats.total_error, stats.accuracy
        );
        if let Some(c) = &stats.classification {
            debug!(
                "epoch {}: false alarm {:.2}%, recall {:.2}%, f1 {:.2}%",
                stats.epoch, c.false_alarm, c.recall, c.f1
            );
        }

        let (epoch, accuracy) = (stats.epoch, stats.accuracy);
        last = Some(stats.clone());

        // ── Emit progress ─────────────────────────────────────────────────
        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop.
            if tx.send(stats).is_err() {
                break;
            }
        }

        if config.run_type == RunType::Test {
            break;
        }

        // ── Stopping policy ───────────────────────────────────────────────
        if terminator.triggered(unix_seconds(), epoch, accuracy) {
            break;
        }
    }

    if let Some(stats) = &last {
        info!(
            "{}: finished at epoch {} with accuracy {:.2}%",
            network.info().name,
            stats.epoch,
            stats.accuracy
        );
    }
    Ok(last)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(flag: &Option<Arc<AtomicBool>>) -> bool {
    flag.as_ref().map_or(false, |f| f.load(Ordering::Relaxed))
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
