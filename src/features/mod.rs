mod persistence;
mod routes;
mod savings;
mod store;
mod ui;
mod wallet;

pub use self::{
    persistence::{FileStorage, MemoryStorage, PersistedState, Storage, StorageError, StorageResult},
    routes::{guard, resolve, Navigation, Route},
    savings::{GroupId, NewGroup, SavingsError, SavingsGroup, SavingsResult, SavingsState},
    store::{Store, StoreState, SubscriptionId, STORE_KEY},
    ui::{Notification, NotificationId, NotificationLevel, UiState, UnknownLevel},
    wallet::{Network, UnknownNetwork, WalletState},
};
