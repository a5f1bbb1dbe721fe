pub mod poller;
pub mod snapshot;
pub mod source;

pub use poller::{PollState, Poller, PollerSettings};
pub use snapshot::{TokenBalanceEntry, TransactionSnapshot};
pub use source::{RpcTransactionSource, TransactionSource};
