//! One [`GameFinder`](crate::GameFinder) per store.

mod discord;
mod epic;
mod gog;
mod microsoft;
mod steam;

pub use discord::DiscordFinder;
pub use epic::EpicGamesFinder;
pub use gog::GogFinder;
pub use microsoft::MicrosoftFinder;
pub use steam::SteamFinder;
