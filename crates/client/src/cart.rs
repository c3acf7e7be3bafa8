//! Per-user shopping cart.
//!
//! The [`CartStore`] holds the authoritative in-memory cart for the active
//! session and mirrors it to durable storage under `cart:<userId>` on every
//! mutation. Carts are strictly per-user: switching identities swaps the
//! whole line list for the new user's persisted copy, never merges.
//!
//! Products can carry a wholesale price tier. Once the cart holds
//! [`WHOLESALE_MIN_ITEMS`] items, every line with a wholesale price charges
//! it instead of retail; dropping back below the threshold restores retail.
//! Repricing happens on every line mutation, so the total is always
//! consistent with the active tier.
//!
//! Storage faults are non-fatal. A failed read falls back to an empty cart;
//! a failed write is logged and the in-memory state stands, so a storage
//! problem never blocks the UI action that triggered the mutation.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use jacaranda_core::{Price, UserId, VariantId};

use crate::models::CartLine;
use crate::storage::{Storage, keys};

/// Item count at which wholesale pricing kicks in.
pub const WHOLESALE_MIN_ITEMS: u32 = 5;

/// The cart for the active session.
///
/// Cheap to clone; all clones share the same state. Mutations are applied
/// synchronously in call order, so derived values (total, item count) are
/// never stale relative to the line list.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Arc<dyn Storage>,
    state: Mutex<CartState>,
}

#[derive(Default)]
struct CartState {
    /// Insertion order is display order.
    lines: Vec<CartLine>,
    /// Whether the cart panel is showing.
    open: bool,
    /// The user whose persisted cart is loaded; `None` means transient.
    user: Option<UserId>,
}

impl CartStore {
    /// Create an unloaded cart store.
    ///
    /// Until [`CartStore::activate`] is called with a user, mutations are
    /// permitted but transient - nothing is persisted.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage,
                state: Mutex::new(CartState::default()),
            }),
        }
    }

    /// Switch the cart to `user`'s persisted copy, or to an empty transient
    /// cart when `user` is `None`.
    ///
    /// The previous user's in-memory lines are discarded wholesale; their
    /// persisted copy stays on disk for a future session. A corrupted or
    /// unreadable stored value is treated as an empty cart.
    pub fn activate(&self, user: Option<&UserId>) {
        let lines = user.map_or_else(Vec::new, |id| self.load_lines(id));
        let mut state = self.lock();
        state.user = user.cloned();
        state.lines = lines;
        state.open = false;
        reprice(&mut state);
    }

    /// Add a line to the cart and open the cart panel.
    ///
    /// If a line for the same variant already exists, its quantity grows by
    /// the new line's quantity; otherwise the line is appended at the end.
    pub fn add_line(&self, line: CartLine) {
        let mut state = self.lock();
        if let Some(existing) = state
            .lines
            .iter_mut()
            .find(|l| l.variant_id == line.variant_id)
        {
            existing.quantity += line.quantity;
        } else {
            state.lines.push(line);
        }
        state.open = true;
        reprice(&mut state);
        self.persist(&state);
    }

    /// Remove the line for `variant_id`; no-op if absent.
    pub fn remove_line(&self, variant_id: &VariantId) {
        let mut state = self.lock();
        state.lines.retain(|l| &l.variant_id != variant_id);
        reprice(&mut state);
        self.persist(&state);
    }

    /// Overwrite the quantity of the line for `variant_id`.
    ///
    /// A quantity of zero removes the line, matching
    /// [`CartStore::remove_line`].
    pub fn set_quantity(&self, variant_id: &VariantId, quantity: u32) {
        let mut state = self.lock();
        if quantity == 0 {
            state.lines.retain(|l| &l.variant_id != variant_id);
        } else if let Some(line) = state
            .lines
            .iter_mut()
            .find(|l| &l.variant_id == variant_id)
        {
            line.quantity = quantity;
        }
        reprice(&mut state);
        self.persist(&state);
    }

    /// Empty the cart and close the cart panel.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.lines.clear();
        state.open = false;
        self.persist(&state);
    }

    /// Toggle the cart panel.
    pub fn toggle(&self) {
        let mut state = self.lock();
        state.open = !state.open;
    }

    /// Snapshot of the current lines, in display order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().lines.clone()
    }

    /// Sum over lines of unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lock().lines.iter().map(CartLine::subtotal).sum()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lock().lines.iter().map(|l| l.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().lines.is_empty()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Whether the wholesale price tier is currently active.
    #[must_use]
    pub fn wholesale_active(&self) -> bool {
        wholesale_active(&self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CartState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_lines(&self, user: &UserId) -> Vec<CartLine> {
        let key = keys::cart(user);
        match self.inner.storage.read(&key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                warn!(%key, %error, "stored cart is not parseable, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(%key, %error, "failed to read stored cart, starting empty");
                Vec::new()
            }
        }
    }

    /// Mirror the full line list to storage for the active user.
    ///
    /// With no active user the cart is transient and nothing is written.
    fn persist(&self, state: &CartState) {
        let Some(user) = &state.user else {
            return;
        };
        let key = keys::cart(user);
        match serde_json::to_string(&state.lines) {
            Ok(raw) => {
                if let Err(error) = self.inner.storage.write(&key, &raw) {
                    warn!(%key, %error, "failed to persist cart, keeping in-memory state");
                }
            }
            Err(error) => warn!(%key, %error, "failed to serialize cart"),
        }
    }
}

fn wholesale_active(state: &CartState) -> bool {
    state.lines.iter().map(|l| l.quantity).sum::<u32>() >= WHOLESALE_MIN_ITEMS
}

/// Re-select the charged price tier for every line.
fn reprice(state: &mut CartState) {
    let wholesale = wholesale_active(state);
    for line in &mut state.lines {
        line.reprice(wholesale);
    }
}
