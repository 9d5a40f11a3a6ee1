use crate::channel::HandoffReceiver;
use crate::mapping::{map_event, NoteRange, PixelCommand};
use crate::note::{note_name, InputEvent};
use crate::transport::LedTransport;

/// Map one event and push it to the strip: `set_pixel`, then `refresh`.
///
/// Transport failures are logged and swallowed. The refresh is attempted even
/// when the write failed, so every event ends with a commit.
pub fn render_event<L: LedTransport + ?Sized>(
    strip: &mut L,
    event: &InputEvent,
    range: &NoteRange,
) -> PixelCommand {
    let cmd = map_event(event, range);
    log::debug!(
        "{} {:?} vel {} -> pixel {} {:?}",
        note_name(event.note()),
        event.kind(),
        event.velocity(),
        cmd.index,
        cmd.color
    );

    if let Err(e) = strip.set_pixel(cmd.index, cmd.color) {
        log::warn!("Failed to set pixel {}: {}", cmd.index, e);
    }
    if let Err(e) = strip.refresh() {
        log::warn!("Failed to refresh LED strip: {}", e);
    }
    cmd
}

/// Drain the hand-off queue onto the strip until every sender is gone.
pub async fn run_renderer<L: LedTransport>(
    mut rx: HandoffReceiver,
    mut strip: L,
    range: NoteRange,
) -> L {
    log::info!(
        "Renderer started, notes {}..={} over {} LEDs",
        range.low_note,
        range.high_note,
        range.strip_length
    );
    while let Some(event) = rx.receive().await {
        render_event(&mut strip, &event, &range);
    }
    log::info!("Renderer stopped");
    strip
}
