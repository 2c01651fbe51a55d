pub mod commands;
pub mod events;
pub mod reducer;
pub mod store;

pub use commands::AppCommand;
pub use events::DomainEvent;
pub use reducer::reduce;
pub use store::AppStore;
