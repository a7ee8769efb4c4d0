//! A life-event ledger and the views derived from it.
//!
//! Events are misfortunes or good fortunes with a 1–20 magnitude; good
//! fortunes can be shared with friends, each weighted by a relationship
//! coefficient. From the log the crate derives a direct balance, a
//! two-for-one debt forecast, each friend's network contribution and a
//! ratio-health verdict. All derivations are pure folds over a snapshot;
//! [`Ledger`] owns the snapshot and writes it through to a
//! [`KeyValueStore`].
//!
//! ```
//! use lifefold::{DebtStatus, Ledger, MemoryStore, Polarity};
//!
//! let mut ledger = Ledger::open(MemoryStore::new());
//! ledger.add_event(Polarity::Negative, 8, "laptop died", &[]).unwrap();
//! ledger.add_event(Polarity::Negative, 4, "parking ticket", &[]).unwrap();
//!
//! assert_eq!(ledger.debt().status, DebtStatus::NeedPositive);
//! assert_eq!(ledger.direct_balance(), -12);
//!
//! // Reopening the same store restores the log.
//! let store = ledger.close().unwrap();
//! let ledger = Ledger::open(store);
//! assert_eq!(ledger.events().len(), 2);
//! ```

mod balance;
mod debt;
mod error;
mod event;
mod friend;
mod ledger;
mod network;
pub mod oracle;
mod ratio;
mod snapshot;
mod store;
pub mod view;

pub use balance::{BalancePoint, compute_direct_balance, compute_timeline};
pub use debt::{DebtState, DebtStatus, compute_debt};
pub use error::{PersistError, StoreError, ValidationError};
pub use event::{EventId, LifeEvent, MAX_MAGNITUDE, MIN_MAGNITUDE, Polarity, now_millis};
pub use friend::{Friend, FriendId, MAX_COEFFICIENT, MIN_COEFFICIENT};
pub use ledger::{DEFAULT_EVENTS_KEY, DEFAULT_FRIENDS_KEY, Ledger, LedgerBuilder};
pub use network::{
    FriendContribution, NetworkEffect, compute_network_effect, compute_network_multiplier,
};
pub use ratio::{RatioStatus, THEORETICAL_RATIO, compute_ratio_status};
pub use snapshot::{Snapshot, Summary};
pub use store::{FileStore, KeyValueStore, LOCK_FILE, MemoryStore};
pub use view::{ReduceFn, Tally};
