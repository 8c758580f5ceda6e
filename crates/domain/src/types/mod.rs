//! Common data types used throughout the engine

pub mod bot;
pub mod credential;
pub mod meeting;
pub mod state;

pub use bot::{BotDetails, BotProbe, BotRecord};
pub use credential::{Credential, OauthGrant};
pub use meeting::Meeting;
pub use state::UserSyncState;
