use std::sync::Arc;

use crate::positions::{Observer, PositionCache};
use crate::roster::Roster;

#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<Roster>,
    pub positions: Arc<PositionCache>,
    pub default_observer: Observer,
}
