//! Clients for the services the bot depends on.
//!
//! Each external collaborator (Twitch, the replay parser, the map renderer) sits
//! behind a narrow trait so modules can be exercised with fakes.

pub mod map_image;
pub mod remote;
pub mod replay;
pub mod twitch;

#[cfg(test)]
mod test;
