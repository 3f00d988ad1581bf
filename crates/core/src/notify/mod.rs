pub mod bus;
pub mod types;

pub use bus::{drain, ToastBus};
pub use types::{Level, Notifier, Toast};
