use super::Region;

pub mod nbs;

pub use nbs::NbsScraper;

pub const REGION: Region = Region {
    name: "slovakia",
    emoji: "🇸🇰",
};
