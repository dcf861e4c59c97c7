mod bindings;
mod catalog;
mod components;
mod error;
mod handoff;
mod scripts;
mod session;
mod settings;
mod status;
mod transaction;
mod widget;

pub use bindings::{DATA_GLOBAL, ON_AUTHORIZE_GLOBAL};
pub use catalog::*;
pub use components::*;
pub use error::*;
pub use handoff::*;
pub use scripts::*;
pub use session::*;
pub use settings::*;
pub use status::*;
pub use transaction::*;
pub use widget::*;
