//! Addresses understood by the engine's OSC plugin.

/// Request: project name (string).
pub const GET_PROJECT: &str = "/get/project";
/// Request: player location `x, y, z`.
pub const GET_LOCATION: &str = "/get/location";
/// Command: teleport to `x, y, z`.
pub const SET_LOCATION: &str = "/set/location";
/// Request: player rotation, replied as `roll, pitch, yaw`.
pub const GET_ROTATION: &str = "/get/rotation";
/// Command: set rotation, sent as `pitch, roll, yaw`.
pub const SET_ROTATION: &str = "/set/rotation";
/// Command: move along the facing direction; negative moves backwards.
pub const MOVE_FORWARD: &str = "/move/forward";
pub const ROTATE_LEFT: &str = "/rotate/left";
pub const ROTATE_RIGHT: &str = "/rotate/right";
/// Command: `"WxH"` string.
pub const SET_RESOLUTION: &str = "/set/resolution";
/// Command: screenshot path, forward slashes only.
pub const SAVE_IMAGE: &str = "/save/image";
/// Command: return to the start location.
pub const RESET: &str = "/reset";
/// Command: run a console command string.
pub const CONSOLE: &str = "/console";
/// Command: toggle between the camera that shows the robot and the one that
/// does not.
pub const SWITCH_VIEW: &str = "/switch/view";
/// Command: scalability level `0..=4`.
pub const QUALITY: &str = "/quality";

/// Addresses whose commands are answered with exactly one reply.
pub const REQUESTS: [&str; 3] = [GET_PROJECT, GET_LOCATION, GET_ROTATION];

/// Returns `true` if `address` expects a reply.
#[must_use]
pub fn expects_reply(address: &str) -> bool {
    REQUESTS.contains(&address)
}
