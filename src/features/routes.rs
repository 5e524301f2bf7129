use std::fmt;

use super::{savings::GroupId, store::Store, wallet::WalletState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Dashboard,
    Groups,
    CreateGroup,
    GroupDetail(GroupId),
    Profile,
    Settings,
    NotFound,
}

impl Route {
    /// Map a path onto the route table. Unknown paths become `NotFound`.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim().trim_end_matches('/');
        if !trimmed.is_empty() && !trimmed.starts_with('/') {
            return Route::NotFound;
        }
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["dashboard"] => Route::Dashboard,
            ["groups"] => Route::Groups,
            ["groups", "create"] => Route::CreateGroup,
            ["groups", id] if !id.is_empty() => Route::GroupDetail(GroupId::from(*id)),
            ["profile"] => Route::Profile,
            ["settings"] => Route::Settings,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Groups => "/groups".to_string(),
            Route::CreateGroup => "/groups/create".to_string(),
            Route::GroupDetail(id) => format!("/groups/{id}"),
            Route::Profile => "/profile".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::NotFound => "*".to_string(),
        }
    }

    /// The dashboard and group pages need a connected wallet. Profile and
    /// settings are reachable without one.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::Groups | Route::CreateGroup | Route::GroupDetail(_)
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

/// The only thing routing reads from the store is the connected flag.
pub fn guard(route: Route, wallet: &WalletState) -> Navigation {
    if route.is_protected() && !wallet.is_connected() {
        return Navigation::Redirect(Route::Home);
    }
    Navigation::Render(route)
}

/// Guard `path`, then send group pages for unknown ids to `NotFound`.
pub fn resolve(path: &str, store: &Store) -> Navigation {
    match guard(Route::parse(path), store.wallet()) {
        Navigation::Render(Route::GroupDetail(id)) if store.state().savings.group(&id).is_none() => {
            Navigation::Render(Route::NotFound)
        }
        navigation => navigation,
    }
}
