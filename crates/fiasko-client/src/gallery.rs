use crate::client::{ApiClient, ApiError};
use fiasko_common::models::exhibit::{CreatePostRequest, Exhibit};
use uuid::Uuid;

/// Which feed the gallery is showing: the public museum or the owner's
/// attic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryMode {
    Museum,
    Attic,
}

/// Handle for an in-flight fetch. Applying a ticket older than the store's
/// current generation is a no-op, which is what discards a stale response
/// when the mode changes while its fetch is still on the wire.
#[derive(Debug, Clone, Copy)]
pub struct FetchTicket {
    generation: u64,
    mode: GalleryMode,
}

/// Client-side cache of the currently displayed exhibits. Single writer:
/// mutated only when a network operation has completed, and only through
/// the `apply_*` methods, which are pure in (previous state, server
/// response).
#[derive(Debug, Default)]
pub struct GalleryStore {
    mode: GalleryMode,
    items: Vec<Exhibit>,
    active_item: Option<Exhibit>,
    generation: u64,
}

impl Default for GalleryMode {
    fn default() -> Self {
        GalleryMode::Museum
    }
}

impl GalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> GalleryMode {
        self.mode
    }

    pub fn items(&self) -> &[Exhibit] {
        &self.items
    }

    pub fn active_item(&self) -> Option<&Exhibit> {
        self.active_item.as_ref()
    }

    /// Switch to `mode` and start a fetch for its feed. Invalidates every
    /// earlier ticket.
    pub fn begin_fetch(&mut self, mode: GalleryMode) -> FetchTicket {
        self.mode = mode;
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
            mode,
        }
    }

    /// Replace the cached items wholesale with a completed fetch. Returns
    /// false, leaving state untouched, when the ticket is stale.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, items: Vec<Exhibit>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale fetch for {:?} (generation {} != {})",
                ticket.mode,
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.items = items;
        true
    }

    /// Fold a freshly created exhibit into the cache. The server's echoed
    /// exhibit is ground truth for this one item; it is prepended only when
    /// it belongs in the active feed -- a private creation must not surface
    /// in the museum.
    pub fn apply_created(&mut self, exhibit: Exhibit) {
        if self.mode == GalleryMode::Museum && !exhibit.is_public {
            return;
        }
        self.items.insert(0, exhibit);
    }

    /// Patch the toggled exhibit in place by id, both in the item list and
    /// in the open detail view. In the museum an exhibit that just went
    /// private is dropped instead, so the public cache never shows it.
    pub fn apply_toggled(&mut self, exhibit: &Exhibit) {
        if self.mode == GalleryMode::Museum && !exhibit.is_public {
            self.items.retain(|e| e.post_id != exhibit.post_id);
        } else if let Some(entry) = self
            .items
            .iter_mut()
            .find(|e| e.post_id == exhibit.post_id)
        {
            *entry = exhibit.clone();
        }
        if let Some(active) = &mut self.active_item {
            if active.post_id == exhibit.post_id {
                *active = exhibit.clone();
            }
        }
    }

    /// Open the detail view for a cached exhibit
    pub fn open_detail(&mut self, post_id: Uuid) {
        self.active_item = self.items.iter().find(|e| e.post_id == post_id).cloned();
    }

    pub fn close_detail(&mut self) {
        self.active_item = None;
    }

    /// Drop all cached state, e.g. on login or logout. Bumps the generation
    /// so fetches still in flight for the previous identity cannot land.
    pub fn reset(&mut self) {
        self.items.clear();
        self.active_item = None;
        self.generation += 1;
    }

    // ── Network-driven wrappers ──

    /// Fetch the feed for `mode` and apply it. A failed read is logged and
    /// leaves the previous cache untouched.
    pub async fn refresh(&mut self, api: &ApiClient, mode: GalleryMode) {
        let ticket = self.begin_fetch(mode);
        let result = match mode {
            GalleryMode::Museum => api.fetch_public().await,
            GalleryMode::Attic => api.fetch_mine().await,
        };
        match result {
            Ok(items) => {
                self.apply_fetch(ticket, items);
            }
            Err(e) => tracing::warn!("Fetch failed, keeping cached items: {}", e),
        }
    }

    /// Submit a new exhibit. The prepend happens only after the server
    /// confirms; a failure changes nothing and is returned for the UI to
    /// display.
    pub async fn create(
        &mut self,
        api: &ApiClient,
        req: &CreatePostRequest,
    ) -> Result<Exhibit, ApiError> {
        let exhibit = api.create_post(req).await?;
        self.apply_created(exhibit.clone());
        Ok(exhibit)
    }

    /// Flip visibility of one exhibit and patch the cache from the
    /// server's echoed state.
    pub async fn toggle(&mut self, api: &ApiClient, post_id: Uuid) -> Result<Exhibit, ApiError> {
        let exhibit = api.toggle_visibility(post_id).await?;
        self.apply_toggled(&exhibit);
        Ok(exhibit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fiasko_common::models::exhibit::Author;

    fn sample(title: &str, is_public: bool) -> Exhibit {
        Exhibit {
            post_id: Uuid::new_v4(),
            title: title.to_string(),
            content: "the story".to_string(),
            display_item: serde_json::json!({"type": "painting", "color": "#800020"}),
            is_public,
            author: Author {
                username: "alice".to_string(),
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_fetch_replaces_items_wholesale() {
        let mut store = GalleryStore::new();
        let ticket = store.begin_fetch(GalleryMode::Museum);
        assert!(store.apply_fetch(ticket, vec![sample("a", true), sample("b", true)]));
        assert_eq!(store.items().len(), 2);

        let ticket = store.begin_fetch(GalleryMode::Museum);
        assert!(store.apply_fetch(ticket, vec![sample("c", true)]));
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].title, "c");
    }

    #[test]
    fn test_stale_fetch_is_discarded() {
        let mut store = GalleryStore::new();

        // Museum fetch goes out, then the user switches to the attic before
        // it lands
        let museum_ticket = store.begin_fetch(GalleryMode::Museum);
        let attic_ticket = store.begin_fetch(GalleryMode::Attic);

        // The slow museum response must not clobber the attic view
        assert!(!store.apply_fetch(museum_ticket, vec![sample("stale", true)]));
        assert!(store.items().is_empty());
        assert_eq!(store.mode(), GalleryMode::Attic);

        assert!(store.apply_fetch(attic_ticket, vec![sample("fresh", false)]));
        assert_eq!(store.items()[0].title, "fresh");
    }

    #[test]
    fn test_created_prepends_in_attic() {
        let mut store = GalleryStore::new();
        let ticket = store.begin_fetch(GalleryMode::Attic);
        store.apply_fetch(ticket, vec![sample("old", true)]);

        store.apply_created(sample("new", false));
        assert_eq!(store.items().len(), 2);
        assert_eq!(store.items()[0].title, "new");
    }

    #[test]
    fn test_private_creation_does_not_enter_museum() {
        let mut store = GalleryStore::new();
        let ticket = store.begin_fetch(GalleryMode::Museum);
        store.apply_fetch(ticket, vec![sample("public", true)]);

        store.apply_created(sample("attic only", false));
        assert_eq!(store.items().len(), 1);

        store.apply_created(sample("for everyone", true));
        assert_eq!(store.items().len(), 2);
        assert_eq!(store.items()[0].title, "for everyone");
    }

    #[test]
    fn test_toggled_patches_entry_in_place() {
        let mut store = GalleryStore::new();
        let ticket = store.begin_fetch(GalleryMode::Attic);
        let first = sample("first", false);
        let second = sample("second", true);
        store.apply_fetch(ticket, vec![first.clone(), second]);

        let mut toggled = first.clone();
        toggled.is_public = true;
        store.apply_toggled(&toggled);

        // Same position, flipped flag
        assert_eq!(store.items()[0].post_id, first.post_id);
        assert!(store.items()[0].is_public);
        assert_eq!(store.items().len(), 2);
    }

    #[test]
    fn test_toggled_to_private_leaves_museum_cache() {
        let mut store = GalleryStore::new();
        let ticket = store.begin_fetch(GalleryMode::Museum);
        let shown = sample("shown", true);
        store.apply_fetch(ticket, vec![shown.clone(), sample("other", true)]);

        let mut toggled = shown.clone();
        toggled.is_public = false;
        store.apply_toggled(&toggled);

        assert_eq!(store.items().len(), 1);
        assert!(store.items().iter().all(|e| e.post_id != shown.post_id));
    }

    #[test]
    fn test_toggled_patches_open_detail_view() {
        let mut store = GalleryStore::new();
        let ticket = store.begin_fetch(GalleryMode::Attic);
        let item = sample("details", false);
        store.apply_fetch(ticket, vec![item.clone()]);
        store.open_detail(item.post_id);

        let mut toggled = item.clone();
        toggled.is_public = true;
        store.apply_toggled(&toggled);

        assert!(store.active_item().unwrap().is_public);
    }

    #[test]
    fn test_close_detail() {
        let mut store = GalleryStore::new();
        let ticket = store.begin_fetch(GalleryMode::Attic);
        let item = sample("details", false);
        store.apply_fetch(ticket, vec![item.clone()]);

        store.open_detail(item.post_id);
        assert!(store.active_item().is_some());
        store.close_detail();
        assert!(store.active_item().is_none());
    }

    #[test]
    fn test_reset_invalidates_inflight_fetches() {
        let mut store = GalleryStore::new();
        let ticket = store.begin_fetch(GalleryMode::Attic);
        store.apply_fetch(ticket, vec![sample("mine", false)]);

        // Identity change: a fetch from before the reset must not land
        let stale = store.begin_fetch(GalleryMode::Attic);
        store.reset();
        assert!(!store.apply_fetch(stale, vec![sample("old identity", false)]));
        assert!(store.items().is_empty());
    }
}
