//! Operation resolution.
//!
//! At build time a capability's declarations are compiled into a
//! [`DispatchTable`] keyed by operation name. At call time the table picks
//! exactly one declaration for the supplied arguments, following the
//! configured [`CreationStrategy`].

mod strategy;
mod table;

pub use strategy::CreationStrategy;
pub use table::DispatchTable;
