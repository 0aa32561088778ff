//! Process-wide UI preferences.
//!
//! One [`Preferences`] per process. Readers take a snapshot with
//! [`Preferences::current`] or hold a [`watch::Receiver`] from
//! [`Preferences::subscribe`] and wake on change. Setters only notify when the
//! value actually changes, so subscribers never see redundant updates.
//!
//! Only the dark-mode flag is persisted (`pref_dark_mode`); tab-bar
//! visibility is per-session.

use anyhow::Result;
use gita_core::store::KvStore;
use log::debug;
use tokio::sync::watch;

pub const DARK_MODE_KEY: &str = "pref_dark_mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiPrefs {
    pub dark_mode: bool,
    pub tab_bar_visible: bool,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            dark_mode: false,
            tab_bar_visible: true,
        }
    }
}

pub struct Preferences {
    tx: watch::Sender<UiPrefs>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new(UiPrefs::default())
    }
}

impl Preferences {
    pub fn new(initial: UiPrefs) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Restore persisted preferences. Anything but `"true"` is light mode.
    pub async fn load(store: &dyn KvStore) -> Result<Self> {
        let dark_mode = store.get(DARK_MODE_KEY).await?.as_deref() == Some("true");
        Ok(Self::new(UiPrefs {
            dark_mode,
            ..UiPrefs::default()
        }))
    }

    pub async fn save(&self, store: &dyn KvStore) -> Result<()> {
        let value = if self.current().dark_mode { "true" } else { "false" };
        store.set(DARK_MODE_KEY, value).await
    }

    pub fn current(&self) -> UiPrefs {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiPrefs> {
        self.tx.subscribe()
    }

    fn update(&self, f: impl FnOnce(&mut UiPrefs)) -> bool {
        let changed = self.tx.send_if_modified(|prefs| {
            let before = *prefs;
            f(prefs);
            *prefs != before
        });
        if changed {
            debug!("preferences changed: {:?}", self.current());
        }
        changed
    }

    /// Returns whether the value changed.
    pub fn set_dark_mode(&self, on: bool) -> bool {
        self.update(|p| p.dark_mode = on)
    }

    pub fn toggle_theme(&self) -> bool {
        self.update(|p| p.dark_mode = !p.dark_mode)
    }

    pub fn set_tab_bar_visible(&self, visible: bool) -> bool {
        self.update(|p| p.tab_bar_visible = visible)
    }
}
