mod page;
mod rescue;
mod service;

pub use page::{Page, PageMetadata};
pub use rescue::{RescueProfile, RescueStats, profile_for};
pub use service::AnimalShelter;
