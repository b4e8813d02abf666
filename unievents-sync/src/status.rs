//! User-facing offline state.

/// Where the coordinator is in its offline/online cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    /// No connection. Writes are queued, reads come from the cache.
    Offline,
    /// Connected with queued writes still to replay (or parked).
    OnlinePending,
    /// Connected with an empty queue. Writes go straight to the server.
    OnlineClean,
}

impl ConnectivityState {
    pub fn is_online(&self) -> bool {
        !matches!(self, ConnectivityState::Offline)
    }
}

/// Banner shown above event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBanner {
    Hidden,
    ViewingCachedData { has_offline_data: bool },
    UnsyncedChanges { pending: usize },
}

impl StatusBanner {
    pub fn from_state(state: ConnectivityState, has_offline_data: bool, pending: usize) -> Self {
        match state {
            ConnectivityState::Offline => StatusBanner::ViewingCachedData { has_offline_data },
            ConnectivityState::OnlinePending if pending > 0 => {
                StatusBanner::UnsyncedChanges { pending }
            }
            _ => StatusBanner::Hidden,
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, StatusBanner::Hidden)
    }

    pub fn title(&self) -> Option<&'static str> {
        match self {
            StatusBanner::Hidden => None,
            StatusBanner::ViewingCachedData { .. } => Some("You're viewing cached data"),
            StatusBanner::UnsyncedChanges { .. } => Some("You have unsynchronized changes"),
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            StatusBanner::Hidden => None,
            StatusBanner::ViewingCachedData {
                has_offline_data: true,
            } => Some("You're currently offline. Showing previously loaded events."),
            StatusBanner::ViewingCachedData {
                has_offline_data: false,
            } => Some("You're currently offline. Some content may not be available."),
            StatusBanner::UnsyncedChanges { .. } => {
                Some("Changes made while offline need to be synchronized.")
            }
        }
    }

    /// Whether a manual "Sync Now" action applies.
    pub fn can_sync(&self) -> bool {
        matches!(self, StatusBanner::UnsyncedChanges { .. })
    }
}
