//! Per-view state: one record store plus the filter state the user edits.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use blotter_core::filter::matching_indices;
use blotter_core::{
    count_by, CategoryCounts, CategoryField, Error, FilterState, FilterSummary, Record, Result,
    Selection,
};

use crate::refresh::{spawn_auto_refresh, RefreshHandle};
use crate::store::{LoadOutcome, RecordStore, StoreSnapshot};

/// Everything a records view owns besides the records themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "F: Serialize",
    deserialize = "F: CategoryField + Deserialize<'de>"
))]
pub struct ViewState<F> {
    #[serde(default)]
    pub filter: FilterState<F>,
    /// Record opened in the detail panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<String>,
}

impl<F: CategoryField> Default for ViewState<F> {
    fn default() -> Self {
        Self {
            filter: FilterState::new(),
            selected_id: None,
        }
    }
}

/// Filter result over one store snapshot.
#[derive(Debug, Clone)]
pub struct FilteredView<R> {
    snapshot: StoreSnapshot<R>,
    indices: Vec<usize>,
    filtered: bool,
}

impl<R: Record> FilteredView<R> {
    fn new(snapshot: StoreSnapshot<R>, state: &FilterState<R::Field>) -> Self {
        let indices = matching_indices(&snapshot.records, state);
        Self {
            snapshot,
            indices,
            filtered: state.is_filtered(),
        }
    }

    /// Surviving records, in store order.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.indices.iter().map(|&i| &self.snapshot.records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The snapshot the view was computed from.
    pub fn snapshot(&self) -> &StoreSnapshot<R> {
        &self.snapshot
    }

    pub fn summary(&self) -> FilterSummary {
        FilterSummary::new(self.snapshot.len(), self.len(), self.filtered)
    }

    /// Breakdown of the surviving records by one field.
    pub fn count_by(&self, field: R::Field) -> CategoryCounts {
        count_by(self.iter(), field)
    }

    pub fn to_vec(&self) -> Vec<R> {
        self.iter().cloned().collect()
    }
}

/// A mounted records view.
pub struct RecordView<R: Record> {
    store: Arc<RecordStore<R>>,
    state: ViewState<R::Field>,
    refresh: Option<RefreshHandle>,
}

impl<R: Record> RecordView<R> {
    pub fn new(store: Arc<RecordStore<R>>) -> Self {
        Self {
            store,
            state: ViewState::default(),
            refresh: None,
        }
    }

    /// Reset the filter to its defaults and load the collection.
    pub async fn mount(&mut self) -> LoadOutcome {
        info!(subsystem = "view", collection = %R::KIND, "Mounting view");
        self.state = ViewState::default();
        self.store.load().await
    }

    /// Mount, then keep reloading every `interval` until unmounted.
    pub async fn mount_with_refresh(&mut self, interval: Duration) -> LoadOutcome {
        let outcome = self.mount().await;
        self.refresh = Some(spawn_auto_refresh(self.store.clone(), interval));
        outcome
    }

    /// Stop any timed refresh and drop the view state.
    pub async fn unmount(mut self) -> Result<()> {
        info!(subsystem = "view", collection = %R::KIND, "Unmounting view");
        match self.refresh.take() {
            Some(handle) => handle.shutdown().await,
            None => Ok(()),
        }
    }

    /// Manual refresh.
    pub async fn refresh(&self) -> LoadOutcome {
        self.store.refresh().await
    }

    pub fn store(&self) -> &Arc<RecordStore<R>> {
        &self.store
    }

    pub fn state(&self) -> &ViewState<R::Field> {
        &self.state
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.refresh.as_ref().is_some_and(|h| h.is_running())
    }

    // =========================================================================
    // INPUT EVENTS
    // =========================================================================

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.filter.set_query(query);
    }

    pub fn select(&mut self, field: R::Field, selection: Selection) {
        self.state.filter.select(field, selection);
    }

    /// Select by field name, as typed by a user.
    pub fn select_by_name(&mut self, field: &str, value: &str) -> Result<()> {
        let parsed = R::Field::from_name(field).ok_or_else(|| {
            let known: Vec<&str> = R::Field::all().iter().map(|f| f.name()).collect();
            Error::InvalidInput(format!(
                "unknown {} filter '{}' (expected one of: {})",
                R::KIND,
                field,
                known.join(", ")
            ))
        })?;
        if !parsed.is_known_value(value) && value != blotter_core::defaults::SELECTION_ALL {
            debug!(field, value, "Selecting undocumented category value");
        }
        self.select(parsed, Selection::parse(value));
        Ok(())
    }

    pub fn reset_filters(&mut self) {
        self.state.filter.reset();
    }

    pub fn open(&mut self, id: impl Into<String>) {
        self.state.selected_id = Some(id.into());
    }

    pub fn close(&mut self) {
        self.state.selected_id = None;
    }

    // =========================================================================
    // PROJECTIONS
    // =========================================================================

    /// Recompute the filtered view from the current store snapshot.
    pub async fn filtered(&self) -> FilteredView<R> {
        FilteredView::new(self.store.snapshot().await, &self.state.filter)
    }

    pub async fn summary(&self) -> FilterSummary {
        self.filtered().await.summary()
    }

    /// The opened record, if it is still in the store.
    pub async fn selected(&self) -> Option<R> {
        let id = self.state.selected_id.as_deref()?;
        self.store
            .records()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RecordSource;
    use async_trait::async_trait;
    use blotter_core::{Case, CaseField};

    struct FixedSource(Vec<Case>);

    #[async_trait]
    impl RecordSource<Case> for FixedSource {
        async fn fetch_all(&self) -> Result<Vec<Case>> {
            Ok(self.0.clone())
        }
    }

    fn case(id: &str, status: &str, desc: &str) -> Case {
        Case {
            id: id.into(),
            status: Some(status.into()),
            description: Some(desc.into()),
            ..Default::default()
        }
    }

    fn view() -> RecordView<Case> {
        let source = FixedSource(vec![
            case("1", "OPEN", "bank theft"),
            case("2", "CLOSED", "car theft"),
        ]);
        RecordView::new(Arc::new(RecordStore::new(Arc::new(source))))
    }

    #[tokio::test]
    async fn test_filtered_view_and_summary() {
        let mut view = view();
        view.mount().await;

        assert_eq!(view.summary().await.describe("crimes"), "Showing 2 of 2 crimes");

        view.select(CaseField::Status, Selection::value("CLOSED"));
        let filtered = view.filtered().await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.iter().next().map(|c| c.id.as_str()), Some("2"));
        assert_eq!(
            filtered.summary().describe("crimes"),
            "Showing 1 of 2 crimes (filtered)"
        );

        view.set_query("bank");
        assert!(view.filtered().await.is_empty());

        view.reset_filters();
        assert_eq!(view.filtered().await.len(), 2);
    }

    #[tokio::test]
    async fn test_select_by_name() {
        let mut view = view();
        view.mount().await;
        view.select_by_name("status", "OPEN").unwrap();
        assert_eq!(view.filtered().await.len(), 1);

        view.select_by_name("status", "all").unwrap();
        assert_eq!(view.filtered().await.len(), 2);

        let err = view.select_by_name("threat_level", "HIGH").unwrap_err();
        assert!(err.to_string().contains("crime_type"));
    }

    #[tokio::test]
    async fn test_mount_resets_state() {
        let mut view = view();
        view.set_query("car");
        view.open("2");
        view.mount().await;
        assert_eq!(view.state(), &ViewState::default());
        assert!(view.selected().await.is_none());
    }

    #[tokio::test]
    async fn test_selected_record() {
        let mut view = view();
        view.mount().await;
        view.open("2");
        assert_eq!(view.selected().await.map(|c| c.id), Some("2".to_string()));
        view.open("404");
        assert!(view.selected().await.is_none());
        view.close();
        assert!(view.state().selected_id.is_none());
    }

    #[test]
    fn test_view_state_serde() {
        let mut state: ViewState<CaseField> = ViewState::default();
        state.filter.set_query("bank");
        state.selected_id = Some("7".into());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["filter"]["query"], "bank");
        assert_eq!(json["selected_id"], "7");

        let back: ViewState<CaseField> = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    /// Returns one more case on every call.
    #[derive(Default)]
    struct GrowingSource {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl RecordSource<Case> for GrowingSource {
        async fn fetch_all(&self) -> Result<Vec<Case>> {
            let n = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            Ok((0..n).map(|i| case(&i.to_string(), "OPEN", "theft")).collect())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_with_refresh_reloads_until_unmounted() {
        use std::sync::atomic::Ordering;

        let source = Arc::new(GrowingSource::default());
        let store = Arc::new(RecordStore::new(source.clone() as Arc<dyn RecordSource<Case>>));
        let mut view = RecordView::new(store.clone());

        let outcome = view.mount_with_refresh(Duration::from_secs(30)).await;
        assert_eq!(outcome, LoadOutcome::Applied { count: 1 });
        assert!(view.is_auto_refreshing());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(view.filtered().await.len(), 2);

        view.unmount().await.unwrap();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.records().await.len(), 2);
    }
}
