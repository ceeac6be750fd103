//! Route target pages. Markup is intentionally thin; the interesting
//! behavior sits in the guards wrapped around these in `app`.

pub mod landing;
pub mod login;
pub mod orders;
pub mod profile;
pub mod profile_sp;
