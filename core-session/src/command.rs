//! Inbound transport commands.

use bridge_traits::media::MediaDescription;
use bridge_traits::playback::RepeatMode;
use serde::{Deserialize, Serialize};

/// Command from an external controller (lock screen, headset, assistant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum TransportCommand {
    Prepare,
    Play,
    Pause,
    Stop,
    SkipNext,
    SkipPrev,
    SeekTo(u64),
    /// Reserved; accepted and ignored.
    AddQueueItem(MediaDescription),
    /// Reserved; accepted and ignored.
    RemoveQueueItem(MediaDescription),
    PlayFromMediaId(String),
    SetRepeatMode(RepeatMode),
}

impl TransportCommand {
    pub fn name(&self) -> &'static str {
        match self {
            TransportCommand::Prepare => "prepare",
            TransportCommand::Play => "play",
            TransportCommand::Pause => "pause",
            TransportCommand::Stop => "stop",
            TransportCommand::SkipNext => "skip_next",
            TransportCommand::SkipPrev => "skip_prev",
            TransportCommand::SeekTo(_) => "seek_to",
            TransportCommand::AddQueueItem(_) => "add_queue_item",
            TransportCommand::RemoveQueueItem(_) => "remove_queue_item",
            TransportCommand::PlayFromMediaId(_) => "play_from_media_id",
            TransportCommand::SetRepeatMode(_) => "set_repeat_mode",
        }
    }
}
