//! Request execution: the transactional executor and the dispatcher that
//! drives it.

pub mod dispatcher;
pub mod executor;

pub use dispatcher::Dispatcher;
pub use executor::{execute_call, FunctionCall};
