pub mod shutdown;
pub mod startup;

pub use startup::AppContext;
