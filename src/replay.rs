//! Batch replay of store actions from CSV, one action per row:
//!
//! ```text
//! action, arg, amount, level
//! connect, GADDRESS123, ,
//! add_group, Alpha, 100,
//! contribute, Alpha, 150,
//! notify, Saved!, , success
//! ```

use std::io;

use rust_decimal::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::features::{GroupId, Network, NewGroup, NotificationLevel, Store, UnknownNetwork};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Connect,
    Disconnect,
    Network,
    AddGroup,
    Contribute,
    /// An empty `arg` clears the active group
    Select,
    Reset,
    Notify,
    ClearNotifications,
    ToggleMenu,
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("{0:?} requires an argument")]
    MissingArgument(ActionType),

    #[error("{0:?} requires an amount")]
    MissingAmount(ActionType),

    #[error("No savings group matches {0}")]
    UnknownGroup(String),

    #[error("Invalid input - {0}")]
    Network(#[from] UnknownNetwork),

    #[error("Unreadable row - {0}")]
    Csv(#[from] csv::Error),
}

pub type ReplayResult<T> = Result<T, ReplayError>;

#[derive(Deserialize, Debug, Clone)]
pub struct Action {
    #[serde(rename = "action")]
    action_type: ActionType,

    /// Address, network, group name or id, or message depending on the action
    arg: Option<String>,

    amount: Option<Decimal>,

    level: Option<NotificationLevel>,
}

impl Action {
    pub fn apply(&self, store: &mut Store) -> ReplayResult<()> {
        match self.action_type {
            ActionType::Connect => store.connect_wallet(self.arg()?),
            ActionType::Disconnect => store.disconnect_wallet(),
            ActionType::Network => store.set_network(self.arg()?.parse::<Network>()?),
            ActionType::AddGroup => {
                let id = store.add_group(NewGroup::new(self.arg()?, self.amount()?));
                debug!("Created group {id}");
            }
            ActionType::Contribute => {
                let key = self.arg()?;
                let id = find_group(store, key)
                    .ok_or_else(|| ReplayError::UnknownGroup(key.to_string()))?;
                store.contribute_to_group(&id, self.amount()?);
            }
            ActionType::Select => {
                let id = self
                    .arg
                    .as_deref()
                    .map(|arg| find_group(store, arg).unwrap_or_else(|| GroupId::from(arg)));
                store.set_active_group(id);
            }
            ActionType::Reset => store.reset_savings(),
            ActionType::Notify => {
                store.add_notification(self.arg()?, self.level.unwrap_or_default());
            }
            ActionType::ClearNotifications => store.clear_notifications(),
            ActionType::ToggleMenu => store.toggle_mobile_menu(),
        };
        Ok(())
    }

    fn arg(&self) -> ReplayResult<&str> {
        self.arg
            .as_deref()
            .filter(|arg| !arg.is_empty())
            .ok_or(ReplayError::MissingArgument(self.action_type))
    }

    fn amount(&self) -> ReplayResult<Decimal> {
        self.amount
            .ok_or(ReplayError::MissingAmount(self.action_type))
    }
}

/// Resolve `key` as a group id first, then as the first group with that name.
pub fn find_group(store: &Store, key: &str) -> Option<GroupId> {
    let groups = store.groups();
    groups
        .iter()
        .find(|group| group.id().as_str() == key)
        .or_else(|| groups.iter().find(|group| group.name() == key))
        .map(|group| group.id().clone())
}

/// Apply every row of `reader` in order. Bad rows are logged and skipped.
/// Returns the number of rows applied.
pub fn replay<R: io::Read>(reader: R, store: &mut Store) -> usize {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut applied = 0;
    for (row, result) in rdr.deserialize::<Action>().enumerate() {
        match result.map_err(ReplayError::from).and_then(|action| action.apply(store)) {
            Ok(()) => applied += 1,
            Err(e) => warn!("Skipping row {}: {e}", row + 1),
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SESSION: &str = "\
action, arg, amount, level
connect, GADDRESS123, ,
network, mainnet, ,
add_group, Alpha, 100,
add_group, Beta, 50,
contribute, Alpha, 150,
contribute, Alpha, -500,
contribute, Beta, 20,
select, Beta, ,
notify, Saved!, , success
notify, Heads up, ,
toggle_menu, , ,
";

    #[test]
    fn replays_a_session() {
        let mut store = Store::in_memory();
        assert_eq!(replay(SESSION.as_bytes(), &mut store), 11);

        assert_eq!(store.wallet().address(), Some("GADDRESS123"));
        assert_eq!(store.wallet().network(), Network::Mainnet);
        assert_eq!(store.groups()[0].current_amount(), dec!(0));
        assert_eq!(store.groups()[1].current_amount(), dec!(20));
        assert_eq!(
            store.state().savings.active_group().map(|g| g.name()),
            Some("Beta")
        );

        let levels: Vec<_> = store.notifications().iter().map(|n| n.level()).collect();
        assert_eq!(levels, vec![NotificationLevel::Success, NotificationLevel::Info]);
        assert!(store.is_mobile_menu_open());
    }

    #[test]
    fn bad_rows_are_skipped() {
        let data = "\
action, arg, amount, level
contribute, Ghost, 10,
add_group, , 10,
add_group, Alpha, ,
network, devnet, ,
teleport, x, ,
add_group, Alpha, 10,
";
        let mut store = Store::in_memory();
        assert_eq!(replay(data.as_bytes(), &mut store), 1);
        assert_eq!(store.groups().len(), 1);
        assert_eq!(store.wallet().network(), Network::Testnet);
    }

    #[test]
    fn select_accepts_unknown_ids_and_clears() {
        let data = "\
action, arg, amount, level
select, some-id, ,
";
        let mut store = Store::in_memory();
        replay(data.as_bytes(), &mut store);
        assert_eq!(store.active_group_id(), Some(&GroupId::from("some-id")));

        replay("action,arg\nselect,\n".as_bytes(), &mut store);
        assert_eq!(store.active_group_id(), None);
    }

    #[test]
    fn find_group_prefers_id_over_name() {
        let mut store = Store::in_memory();
        let first = store.add_group(NewGroup::new("Alpha", dec!(1)));
        let second = store.add_group(NewGroup::new(first.as_str(), dec!(1)));

        assert_eq!(find_group(&store, first.as_str()), Some(first.clone()));
        assert_eq!(find_group(&store, "Alpha"), Some(first));
        assert_eq!(find_group(&store, second.as_str()), Some(second));
        assert_eq!(find_group(&store, "missing"), None);
    }
}
