mod credits;
mod home;

pub use credits::CreditsPage;
pub use home::HomePage;
