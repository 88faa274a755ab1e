use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use super::api::ApiClient;
use super::error::ClientError;
use super::viewer::{Frame, Viewer};
use crate::roster::SatelliteDescriptor;

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub base_url: String,
    pub poll_interval: Duration,
    pub frame_interval: Duration,
    pub request_timeout: Duration,
    pub debug: bool,
}

type FetchResult = (u64, Result<crate::positions::PositionsResponse, ClientError>);

/// Marks a poll as outstanding; the flag clears when the guard is dropped,
/// including when the fetch task panics.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn try_start(flag: &Arc<AtomicBool>) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(Self(flag.clone()))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Polls the service and drives a [`Viewer`] until Ctrl-C.
///
/// A poll tick is skipped while the previous request is still out. Results
/// are handed to the render loop, which applies them on its next frame.
pub async fn watch(options: WatchOptions) -> Result<(), ClientError> {
    let client = ApiClient::new(&options.base_url, options.request_timeout)?;

    let roster = match client.satellites().await {
        Ok(roster) => roster,
        Err(e) => {
            log::error!("Failed to load satellites: {}", e);
            Vec::new()
        }
    };
    log::info!("Watching {} satellites at {}", roster.len(), options.base_url);

    let mut viewer = Viewer::new();
    let in_flight = Arc::new(AtomicBool::new(false));
    let (tx, mut rx) = mpsc::channel::<FetchResult>(4);
    let mut sequence = 0u64;

    let mut poll = interval(options.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frames = interval(options.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = poll.tick() => {
                let Some(guard) = InFlight::try_start(&in_flight) else {
                    log::debug!("Previous fetch still in flight, skipping poll");
                    continue;
                };
                sequence += 1;
                let seq = sequence;
                let client = client.clone();
                let tx = tx.clone();
                let debug = options.debug;
                tokio::spawn(async move {
                    let result = client.positions(debug).await;
                    drop(guard);
                    let _ = tx.send((seq, result)).await;
                });
            }
            Some((seq, result)) = rx.recv() => match result {
                Ok(response) => {
                    if options.debug {
                        if let Some(raw) = &response.raw {
                            log::info!("Server debug/raw details: {}", raw);
                        }
                    }
                    viewer.submit(seq, response);
                }
                Err(ClientError::Payload(e)) => {
                    log::warn!("Invalid /api/positions payload: {}", e);
                    viewer.report_error("invalid positions response");
                }
                Err(e) => {
                    log::error!("Fetching positions failed: {}", e);
                    viewer.report_error(&e);
                }
            },
            _ = frames.tick() => {
                let frame = viewer.frame();
                if frame.applied.is_some() {
                    print_frame(&roster, &viewer, &frame);
                }
            }
            _ = &mut shutdown => {
                log::info!("Stopping watch");
                break;
            }
        }
    }

    Ok(())
}

fn print_frame(roster: &[SatelliteDescriptor], viewer: &Viewer, frame: &Frame) {
    println!("{}", viewer.status());
    if let Some(report) = &frame.applied {
        if !report.removed.is_empty() {
            println!("  removed: {:?}", report.removed);
        }
    }

    for sat in roster {
        match frame.items.iter().find(|item| item.id == sat.id) {
            Some(item) => println!(
                "  {:>6} {:<20} x={:>8.1} y={:>8.1} z={:>8.1} r={:.1}{}",
                item.id,
                item.label,
                item.world_position.x,
                item.world_position.y,
                item.world_position.z,
                item.sphere_radius,
                if item.occluded { " (behind globe)" } else { "" }
            ),
            None => println!("  {:>6} {:<20} -", sat.id, sat.display_name),
        }
    }
}
