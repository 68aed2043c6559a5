use std::path::PathBuf;

use clap::Parser;
use relay_core::room::RoomType;

#[derive(Parser, Debug, Default)]
#[command(version)]
pub struct Cli {
    /// Id of the room to open. Defaults to `[room]` in config.toml.
    #[arg(long = "room", value_name = "ROOM_ID")]
    pub room_id: Option<String>,

    /// Name of the room, shown in the header and placeholder.
    #[arg(long = "room-name")]
    pub room_name: Option<String>,

    /// Room type: `c`/`channel`, `p`/`private`, `d`/`direct` or
    /// `l`/`livechat`.
    #[arg(long = "room-type")]
    pub room_type: Option<RoomType>,

    /// Reply in this thread instead of the main room.
    #[arg(long = "thread", value_name = "THREAD_ID")]
    pub thread_id: Option<String>,

    /// Open the composer editing this message. Drafts are not touched.
    #[arg(long = "edit", value_name = "MESSAGE_ID")]
    pub edit: Option<String>,

    /// Compose the caption of a file share; typing notifications are off.
    #[arg(long = "sharing", default_value_t = false)]
    pub sharing: bool,

    /// Read configuration from this file instead of `<relay home>/config.toml`.
    #[arg(long = "config", short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}
