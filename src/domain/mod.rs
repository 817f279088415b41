mod capture;
mod card;
mod filter;
mod keys;
mod marks;
mod names;
mod order;
mod state;
mod types;

pub use capture::*;
pub use card::*;
pub use filter::*;
pub use keys::*;
pub use marks::*;
pub use names::*;
pub use order::*;
pub use state::*;
pub use types::*;
