use rust_decimal::Decimal;

use super::{
    persistence::{MemoryStorage, PersistedState, Storage},
    savings::{GroupId, NewGroup, SavingsGroup, SavingsResult, SavingsState},
    ui::{Notification, NotificationId, NotificationLevel, UiState},
    wallet::{Network, WalletState},
};

/// Storage key the persisted partition lives under unless configured otherwise.
pub const STORE_KEY: &str = "stellar-save-store";

/// The three slices side by side. Every operation replaces exactly one of
/// these fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreState {
    pub wallet: WalletState,
    pub savings: SavingsState,
    pub ui: UiState,
}

impl StoreState {
    fn hydrate(persisted: PersistedState) -> Self {
        Self {
            wallet: persisted.wallet,
            savings: SavingsState::from_parts(persisted.groups, persisted.active_group_id),
            ui: UiState::default(),
        }
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            wallet: self.wallet.clone(),
            groups: self.savings.groups().to_vec(),
            active_group_id: self.savings.active_group_id().cloned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreState)>;

/// This owns the application state. Consumers read through the projections
/// and change it only through the slice operations below; each one commits,
/// notifies interested subscribers, then writes the persisted partition.
pub struct Store {
    state: StoreState,
    storage: Box<dyn Storage>,
    key: String,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Store {
    /// Open a store backed by `storage`, seeding it from whatever was stored
    /// under `key`. Missing or corrupt payloads give the default state.
    pub fn open(storage: impl Storage + 'static, key: impl Into<String>) -> Self {
        let key = key.into();

        let persisted = match storage.get_item(&key) {
            Ok(Some(payload)) => PersistedState::from_json(&payload).unwrap_or_else(|e| {
                warn!("Discarding corrupt stored state under {key}: {e}");
                PersistedState::default()
            }),
            Ok(None) => {
                info!("No stored state under {key}, starting fresh");
                PersistedState::default()
            }
            Err(e) => {
                warn!("Unable to read stored state under {key}: {e}");
                PersistedState::default()
            }
        };

        debug!(
            "Hydrated {key}: {} group(s), wallet connected: {}",
            persisted.groups.len(),
            persisted.wallet.is_connected()
        );

        Self {
            state: StoreState::hydrate(persisted),
            storage: Box::new(storage),
            key,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new(), STORE_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn wallet(&self) -> &WalletState {
        &self.state.wallet
    }

    pub fn groups(&self) -> &[SavingsGroup] {
        self.state.savings.groups()
    }

    pub fn active_group_id(&self) -> Option<&GroupId> {
        self.state.savings.active_group_id()
    }

    pub fn notifications(&self) -> &[Notification] {
        self.state.ui.notifications()
    }

    pub fn is_mobile_menu_open(&self) -> bool {
        self.state.ui.is_mobile_menu_open()
    }

    /// Register `on_change` to run after any commit that changes the value
    /// returned by `project`.
    pub fn subscribe<T, P, F>(&mut self, project: P, mut on_change: F) -> SubscriptionId
    where
        T: PartialEq + 'static,
        P: Fn(&StoreState) -> T + 'static,
        F: FnMut(&T) + 'static,
    {
        let mut last = project(&self.state);
        let listener: Listener = Box::new(move |state| {
            let next = project(state);
            if next != last {
                on_change(&next);
                last = next;
            }
        });

        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn connect_wallet(&mut self, address: impl Into<String>) {
        let address = address.into();
        self.commit("connect_wallet", |state| {
            state.wallet = state.wallet.connect(address)
        });
    }

    pub fn disconnect_wallet(&mut self) {
        self.commit("disconnect_wallet", |state| {
            state.wallet = state.wallet.disconnect()
        });
    }

    pub fn set_network(&mut self, network: Network) {
        self.commit("set_network", |state| {
            state.wallet = state.wallet.with_network(network)
        });
    }

    pub fn add_group(&mut self, group: NewGroup) -> GroupId {
        let (savings, id) = self.state.savings.add_group(group);
        self.commit("add_group", |state| state.savings = savings);
        id
    }

    /// Unknown ids are ignored and the total is floored at zero.
    pub fn contribute_to_group(&mut self, id: &GroupId, amount: Decimal) {
        self.commit("contribute_to_group", |state| {
            state.savings = state.savings.contribute_to_group(id, amount)
        });
    }

    /// Like [`Store::contribute_to_group`], but reports an unknown id instead
    /// of ignoring it. Nothing is committed on error.
    pub fn try_contribute_to_group(&mut self, id: &GroupId, amount: Decimal) -> SavingsResult<()> {
        let savings = self.state.savings.try_contribute_to_group(id, amount)?;
        self.commit("contribute_to_group", |state| state.savings = savings);
        Ok(())
    }

    pub fn set_active_group(&mut self, id: Option<GroupId>) {
        self.commit("set_active_group", |state| {
            state.savings = state.savings.set_active_group(id)
        });
    }

    pub fn reset_savings(&mut self) {
        self.commit("reset_savings", |state| {
            state.savings = state.savings.reset()
        });
    }

    pub fn add_notification(
        &mut self,
        message: impl Into<String>,
        level: NotificationLevel,
    ) -> NotificationId {
        let (ui, id) = self.state.ui.add_notification(message, level);
        self.commit("add_notification", |state| state.ui = ui);
        id
    }

    pub fn dismiss_notification(&mut self, id: &NotificationId) {
        self.commit("dismiss_notification", |state| {
            state.ui = state.ui.dismiss_notification(id)
        });
    }

    pub fn clear_notifications(&mut self) {
        self.commit("clear_notifications", |state| {
            state.ui = state.ui.clear_notifications()
        });
    }

    pub fn toggle_mobile_menu(&mut self) {
        self.commit("toggle_mobile_menu", |state| {
            state.ui = state.ui.toggle_mobile_menu()
        });
    }

    fn commit(&mut self, action: &str, apply: impl FnOnce(&mut StoreState)) {
        apply(&mut self.state);
        debug!("{action} committed");

        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state);
        }

        self.persist();
    }

    /// Best effort: a failed write is logged and the in-memory state stands.
    fn persist(&self) {
        let written = self
            .state
            .persisted()
            .to_json()
            .and_then(|payload| self.storage.set_item(&self.key, &payload));

        if let Err(e) = written {
            warn!("Failed to persist {}: {e}", self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::persistence::{StorageError, StorageResult};
    use rust_decimal_macros::dec;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn reopen(storage: &MemoryStorage) -> Store {
        Store::open(storage.clone(), STORE_KEY)
    }

    #[test]
    fn group_scenario_with_clamp() {
        let mut store = Store::in_memory();
        let id = store.add_group(NewGroup::new("Alpha", dec!(100)));

        assert_eq!(store.groups().len(), 1);
        assert_eq!(store.groups()[0].current_amount(), dec!(0));
        assert_eq!(store.groups()[0].target_amount(), dec!(100));

        store.contribute_to_group(&id, dec!(150));
        assert_eq!(store.groups()[0].current_amount(), dec!(150));

        store.contribute_to_group(&id, dec!(-500));
        assert_eq!(store.groups()[0].current_amount(), dec!(0));
    }

    #[test]
    fn wallet_scenario() {
        let mut store = Store::in_memory();
        store.connect_wallet("GADDRESS123");
        assert_eq!(store.wallet().address(), Some("GADDRESS123"));
        assert!(store.wallet().is_connected());

        store.disconnect_wallet();
        assert_eq!(store.wallet().address(), None);
        assert!(!store.wallet().is_connected());
    }

    #[test]
    fn notification_scenario() {
        let mut store = Store::in_memory();
        let first = store.add_notification("Saved!", NotificationLevel::Success);
        let second = store.add_notification("Oops", NotificationLevel::Error);

        let ids: Vec<_> = store.notifications().iter().map(|n| n.id().clone()).collect();
        assert_eq!(ids, vec![first.clone(), second.clone()]);

        store.dismiss_notification(&first);
        assert_eq!(store.notifications().len(), 1);
        assert_eq!(store.notifications()[0].id(), &second);
    }

    #[test]
    fn contribute_to_missing_group_on_empty_list() {
        let mut store = Store::in_memory();
        store.contribute_to_group(&GroupId::from("nonexistent-id"), dec!(50));
        assert!(store.groups().is_empty());
    }

    #[test]
    fn try_contribute_commits_nothing_on_error() {
        let mut store = Store::in_memory();
        let fired = Rc::new(RefCell::new(0));
        let counter = fired.clone();
        store.subscribe(|s| s.clone(), move |_| *counter.borrow_mut() += 1);

        assert!(store
            .try_contribute_to_group(&GroupId::from("nonexistent-id"), dec!(50))
            .is_err());
        assert_eq!(*fired.borrow(), 0);

        let id = store.add_group(NewGroup::new("Alpha", dec!(10)));
        assert!(store.try_contribute_to_group(&id, dec!(4)).is_ok());
        assert_eq!(store.groups()[0].current_amount(), dec!(4));
        assert_eq!(*fired.borrow(), 2);
    }

    #[test]
    fn ui_mutation_leaves_other_slices_unchanged() {
        let mut store = Store::in_memory();
        store.connect_wallet("GADDRESS123");
        let id = store.add_group(NewGroup::new("Alpha", dec!(100)));
        store.set_active_group(Some(id));
        let before = store.state().clone();

        store.toggle_mobile_menu();
        store.add_notification("hello", NotificationLevel::Info);

        assert_eq!(store.state().wallet, before.wallet);
        assert_eq!(store.state().savings, before.savings);
        assert!(store.is_mobile_menu_open());
    }

    #[test]
    fn savings_mutation_leaves_other_slices_unchanged() {
        let mut store = Store::in_memory();
        store.connect_wallet("GADDRESS123");
        store.toggle_mobile_menu();
        let before = store.state().clone();

        store.add_group(NewGroup::new("Alpha", dec!(100)));
        store.reset_savings();

        assert_eq!(store.state().wallet, before.wallet);
        assert_eq!(store.state().ui, before.ui);
    }

    #[test]
    fn wallet_mutation_leaves_other_slices_unchanged() {
        let mut store = Store::in_memory();
        let id = store.add_group(NewGroup::new("Alpha", dec!(100)));
        store.set_active_group(Some(id));
        store.add_notification("hello", NotificationLevel::Info);
        store.toggle_mobile_menu();
        let before = store.state().clone();

        store.connect_wallet("GADDRESS123");
        store.set_network(Network::Mainnet);
        store.disconnect_wallet();

        assert_eq!(store.state().savings, before.savings);
        assert_eq!(store.state().ui, before.ui);
        assert_eq!(store.wallet().network(), Network::Mainnet);
    }

    #[test]
    fn wallet_flag_matches_address_throughout() {
        let mut store = Store::in_memory();
        let check = |store: &Store| {
            assert_eq!(store.wallet().is_connected(), store.wallet().address().is_some())
        };

        check(&store);
        store.connect_wallet("GA");
        check(&store);
        store.set_network(Network::Mainnet);
        check(&store);
        store.connect_wallet("GB");
        check(&store);
        store.disconnect_wallet();
        check(&store);
        store.disconnect_wallet();
        check(&store);
    }

    #[test]
    fn reload_restores_partition_and_resets_ui() {
        let storage = MemoryStorage::new();
        let mut store = reopen(&storage);

        store.connect_wallet("GADDRESS123");
        store.set_network(Network::Mainnet);
        let id = store.add_group(NewGroup::new("Alpha", dec!(100)));
        store.contribute_to_group(&id, dec!(42.5));
        store.set_active_group(Some(id.clone()));
        store.add_notification("not persisted", NotificationLevel::Warning);
        store.toggle_mobile_menu();

        let expected = store.state().persisted();
        let reloaded = reopen(&storage);

        assert_eq!(reloaded.state().persisted(), expected);
        assert_eq!(reloaded.active_group_id(), Some(&id));
        assert_eq!(reloaded.groups()[0].current_amount(), dec!(42.5));
        assert!(reloaded.notifications().is_empty());
        assert!(!reloaded.is_mobile_menu_open());
    }

    #[test]
    fn reload_keeps_extreme_and_high_precision_amounts() {
        let storage = MemoryStorage::new();
        let mut store = reopen(&storage);

        let big = store.add_group(NewGroup::new("Big", dec!(100)));
        let precise = store.add_group(NewGroup::new("Precise", dec!(0.000000000000000000001)));
        store.contribute_to_group(&big, Decimal::MAX);
        store.contribute_to_group(&big, Decimal::MAX);
        store.contribute_to_group(&precise, dec!(1234567890.123456789012));

        let expected = store.state().persisted();
        let reloaded = reopen(&storage);

        assert_eq!(reloaded.groups().len(), 2);
        assert_eq!(reloaded.groups()[0].current_amount(), Decimal::MAX);
        assert_eq!(
            reloaded.groups()[1].current_amount(),
            dec!(1234567890.123456789012)
        );
        assert_eq!(
            reloaded.groups()[1].target_amount(),
            dec!(0.000000000000000000001)
        );
        assert_eq!(reloaded.state().persisted(), expected);
    }

    #[test]
    fn dangling_active_group_survives_reload() {
        let storage = MemoryStorage::new();
        let mut store = reopen(&storage);
        store.set_active_group(Some(GroupId::from("gone")));

        let reloaded = reopen(&storage);
        assert_eq!(reloaded.active_group_id(), Some(&GroupId::from("gone")));
        assert!(reloaded.state().savings.active_group().is_none());
    }

    #[test]
    fn corrupt_payload_falls_back_to_defaults() {
        let storage = MemoryStorage::new();
        storage.set_item(STORE_KEY, "{ definitely not json").unwrap();

        let store = reopen(&storage);
        assert_eq!(store.state(), &StoreState::default());
    }

    #[test]
    fn stale_ui_fields_in_payload_are_ignored() {
        let storage = MemoryStorage::new();
        storage
            .set_item(
                STORE_KEY,
                r#"{"wallet":{"address":"GA","network":"testnet","isConnected":true},
                    "groups":[],"activeGroupId":null,
                    "notifications":[{"id":"n","message":"stale","level":"info"}],
                    "isMobileMenuOpen":true}"#,
            )
            .unwrap();

        let store = reopen(&storage);
        assert_eq!(store.wallet().address(), Some("GA"));
        assert!(store.notifications().is_empty());
        assert!(!store.is_mobile_menu_open());
    }

    #[test]
    fn subscribers_fire_only_on_projection_change() {
        let mut store = Store::in_memory();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = seen.clone();
        store.subscribe(
            |s| s.wallet.is_connected(),
            move |connected| log.borrow_mut().push(*connected),
        );

        store.toggle_mobile_menu();
        store.add_group(NewGroup::new("Alpha", dec!(1)));
        store.connect_wallet("GA");
        store.connect_wallet("GB");
        store.disconnect_wallet();

        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = Store::in_memory();
        let fired = Rc::new(RefCell::new(0));

        let counter = fired.clone();
        let id = store.subscribe(
            |s| s.ui.is_mobile_menu_open(),
            move |_| *counter.borrow_mut() += 1,
        );

        store.toggle_mobile_menu();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.toggle_mobile_menu();

        assert_eq!(*fired.borrow(), 1);
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read denied",
            )))
        }

        fn set_item(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "write denied",
            )))
        }

        fn remove_item(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn storage_failures_do_not_interrupt_mutations() {
        let mut store = Store::open(FailingStorage, STORE_KEY);
        assert_eq!(store.state(), &StoreState::default());

        let id = store.add_group(NewGroup::new("Alpha", dec!(100)));
        store.contribute_to_group(&id, dec!(5));
        assert_eq!(store.groups()[0].current_amount(), dec!(5));
    }
}
