pub mod alert;
pub mod telegram;

pub use alert::AlertFormatter;
pub use telegram::{Notifier, TelegramNotifier};
