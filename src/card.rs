//! Launch cards: interaction state and the gated launch flow

use crate::client::{LaunchRequest, ModelApi};
use crate::descriptor::{CardProfile, ModelDescriptor};
use crate::events::{ConsoleEvent, ConsoleEvents};
use crate::gate::LaunchGate;
use crate::metrics;
use crate::navigate::{Navigator, running_models_page};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Caption shown while hovering an unselected card
pub const LAUNCH_CAPTION: &str = "Click with mouse to launch the model";

/// Shared collaborators handed to every card on a page
#[derive(Clone)]
pub struct ConsoleContext {
    /// Base URL of the serving API, without a trailing slash
    pub base_url: String,
    pub gate: Arc<LaunchGate>,
    pub api: Arc<dyn ModelApi>,
    pub events: ConsoleEvents,
    pub navigator: Arc<dyn Navigator>,
}

/// Per-card construction options
#[derive(Debug, Clone)]
pub struct CardOptions {
    /// Rendered card height in pixels
    pub card_height: u32,
    /// Whether the descriptor came from a user-supplied registration
    pub is_custom: bool,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            card_height: 270,
            is_custom: false,
        }
    }
}

/// Which face of the card is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Description,
    Parameters,
}

/// State of the launch control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchControl {
    Ready,
    Busy,
}

/// Result of a launch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The server accepted the request
    Launched { model_uid: String },
    /// Another console call held the gate; nothing was sent
    Busy,
    /// The card's registration is deleted; nothing was sent
    Unavailable,
    /// The request failed; the message was surfaced on the event channel
    Failed { message: String },
}

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// This card variant or registration does not offer deletion
    Unsupported,
    /// The registration was already deleted
    AlreadyDeleted,
    Deleted,
    Failed { message: String },
}

/// Per-card counters
#[derive(Debug, Clone, Default)]
pub struct CardStats {
    pub launch_attempts: u32,
    pub last_launch_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Default)]
struct CardState {
    uid_input: String,
    hover: bool,
    selected: bool,
    custom_deleted: bool,
}

/// One launchable model, drawn as a flip card
///
/// The description panel shows the catalog entry; clicking flips to the
/// parameter panel where an optional model UID can be entered before
/// launching. Every card on a page shares one [`ConsoleContext`].
pub struct LaunchCard {
    descriptor: ModelDescriptor,
    profile: CardProfile,
    options: CardOptions,
    context: ConsoleContext,
    state: RwLock<CardState>,
    stats: RwLock<CardStats>,
}

impl LaunchCard {
    pub fn new(
        descriptor: ModelDescriptor,
        profile: CardProfile,
        context: ConsoleContext,
        options: CardOptions,
    ) -> Self {
        Self {
            descriptor,
            profile,
            options,
            context,
            state: RwLock::new(CardState::default()),
            stats: RwLock::new(CardStats::default()),
        }
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    pub fn profile(&self) -> CardProfile {
        self.profile
    }

    pub fn card_height(&self) -> u32 {
        self.options.card_height
    }

    pub fn is_custom(&self) -> bool {
        self.options.is_custom
    }

    // ========================================================================
    // Interaction State
    // ========================================================================

    pub async fn hover_enter(&self) {
        self.state.write().await.hover = true;
    }

    pub async fn hover_leave(&self) {
        self.state.write().await.hover = false;
    }

    /// Flip to the parameter panel
    ///
    /// Returns whether the click did anything; already-selected and deleted
    /// cards ignore clicks.
    pub async fn click(&self) -> bool {
        let mut state = self.state.write().await;
        if state.selected || state.custom_deleted {
            return false;
        }
        state.selected = true;
        true
    }

    /// Flip back to the description panel
    ///
    /// Always succeeds. An in-flight launch is unaffected; only a new click
    /// and launch can follow.
    pub async fn undo(&self) {
        self.state.write().await.selected = false;
    }

    pub async fn set_uid_input(&self, input: impl Into<String>) {
        self.state.write().await.uid_input = input.into();
    }

    pub async fn uid_input(&self) -> String {
        self.state.read().await.uid_input.clone()
    }

    pub async fn is_selected(&self) -> bool {
        self.state.read().await.selected
    }

    pub async fn is_deleted(&self) -> bool {
        self.state.read().await.custom_deleted
    }

    pub async fn panel(&self) -> Panel {
        if self.state.read().await.selected {
            Panel::Parameters
        } else {
            Panel::Description
        }
    }

    // ========================================================================
    // Rendering Rules
    // ========================================================================

    /// Chip labels on the description panel, in render order
    pub async fn chips(&self) -> Vec<String> {
        let state = self.state.read().await;
        crate::view::chip_labels(&self.descriptor, self.options.is_custom, state.custom_deleted)
    }

    /// Instructional caption, visible while hovering the description panel
    pub async fn caption(&self) -> Option<&'static str> {
        let state = self.state.read().await;
        if state.hover && !state.selected {
            Some(LAUNCH_CAPTION)
        } else {
            None
        }
    }

    /// Stat rows for the description panel, per the card's profile
    pub fn stat_entries(&self) -> Vec<(&'static str, Option<u32>)> {
        self.profile
            .stat_fields
            .iter()
            .map(|field| (field.label(), self.descriptor.stat(*field)))
            .collect()
    }

    /// Launch control state; busy whenever any console call is in flight
    pub fn launch_control(&self) -> LaunchControl {
        if self.context.gate.is_busy() {
            LaunchControl::Busy
        } else {
            LaunchControl::Ready
        }
    }

    pub async fn stats(&self) -> CardStats {
        self.stats.read().await.clone()
    }

    // ========================================================================
    // API Flows
    // ========================================================================

    /// Fire the launch request for this card
    ///
    /// The gate is claimed before anything touches the network and held
    /// until the call settles, so a `Busy` outcome means nothing was sent.
    pub async fn launch(&self) -> LaunchOutcome {
        if self.state.read().await.custom_deleted {
            return LaunchOutcome::Unavailable;
        }

        let Some(_permit) = self.context.gate.try_acquire() else {
            tracing::debug!(
                model = %self.descriptor.model_name,
                "Launch skipped, console busy"
            );
            return LaunchOutcome::Busy;
        };

        let request = {
            let state = self.state.read().await;
            LaunchRequest::new(
                &state.uid_input,
                &self.descriptor.model_name,
                self.profile.kind,
            )
        };

        {
            let mut stats = self.stats.write().await;
            stats.launch_attempts += 1;
            stats.last_launch_at = Some(chrono::Utc::now());
        }
        metrics::record_launch_attempt(self.profile.kind.as_str());

        tracing::info!(
            model = %request.model_name,
            model_uid = %request.model_uid,
            model_type = %request.model_type,
            "Launching model"
        );

        match self.context.api.launch_model(&request).await {
            Ok(()) => {
                let destination = running_models_page(&self.context.base_url);
                if let Err(e) = self.context.navigator.open(&destination) {
                    tracing::warn!(
                        error = %e,
                        url = %destination,
                        "Failed to open running models page"
                    );
                }

                self.context.events.emit(ConsoleEvent::LaunchCompleted {
                    model_uid: request.model_uid.clone(),
                    model_name: request.model_name,
                });

                LaunchOutcome::Launched {
                    model_uid: request.model_uid,
                }
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(
                    model = %request.model_name,
                    error = %message,
                    "Launch failed"
                );
                metrics::record_launch_failure(self.profile.kind.as_str());
                self.context.events.report_error(message.clone());

                LaunchOutcome::Failed { message }
            }
        }
        // _permit drops here, reopening the gate
    }

    /// Remove this card's custom registration
    ///
    /// Independent of [`click`](Self::click): invoking it never flips the
    /// panel, since the delete control sits inside the clickable card
    /// surface. Does not touch the launch gate.
    pub async fn delete_custom_registration(&self) -> DeleteOutcome {
        if !self.profile.supports_custom_delete || !self.options.is_custom {
            return DeleteOutcome::Unsupported;
        }

        if self.state.read().await.custom_deleted {
            return DeleteOutcome::AlreadyDeleted;
        }

        match self
            .context
            .api
            .unregister_model(self.profile.kind, &self.descriptor.model_name)
            .await
        {
            Ok(()) => {
                // Mark the deletion only after the server confirmed it
                self.state.write().await.custom_deleted = true;
                metrics::record_registration_deleted(self.profile.kind.as_str());

                tracing::info!(
                    model = %self.descriptor.model_name,
                    "Custom registration deleted"
                );
                self.context.events.emit(ConsoleEvent::RegistrationDeleted {
                    model_name: self.descriptor.model_name.clone(),
                });

                DeleteOutcome::Deleted
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(
                    model = %self.descriptor.model_name,
                    error = %message,
                    "Failed to delete custom registration"
                );
                self.context.events.report_error(message.clone());

                DeleteOutcome::Failed { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mocks::MockModelApi;
    use crate::descriptor::ModelKind;
    use crate::navigate::mocks::RecordingNavigator;
    use std::time::Duration;
    use uuid::Uuid;

    fn descriptor(name: &str) -> ModelDescriptor {
        ModelDescriptor {
            model_name: name.to_string(),
            language: vec!["en".to_string(), "zh".to_string()],
            is_cached: false,
            dimensions: Some(768),
            max_tokens: Some(512),
        }
    }

    struct Harness {
        api: Arc<MockModelApi>,
        navigator: Arc<RecordingNavigator>,
        context: ConsoleContext,
    }

    fn harness() -> Harness {
        let api = Arc::new(MockModelApi::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let context = ConsoleContext {
            base_url: "http://127.0.0.1:9997".to_string(),
            gate: Arc::new(LaunchGate::new()),
            api: api.clone(),
            events: ConsoleEvents::new(),
            navigator: navigator.clone(),
        };
        Harness {
            api,
            navigator,
            context,
        }
    }

    fn embedding_card(context: &ConsoleContext) -> LaunchCard {
        LaunchCard::new(
            descriptor("bge-small-en"),
            CardProfile::embedding(),
            context.clone(),
            CardOptions::default(),
        )
    }

    fn custom_embedding_card(context: &ConsoleContext) -> LaunchCard {
        LaunchCard::new(
            descriptor("custom-embed"),
            CardProfile::embedding(),
            context.clone(),
            CardOptions {
                is_custom: true,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_click_flips_once_per_cycle() {
        let h = harness();
        let card = embedding_card(&h.context);

        assert_eq!(card.panel().await, Panel::Description);
        assert!(card.click().await);
        assert_eq!(card.panel().await, Panel::Parameters);

        // Repeated clicks are ignored until undo
        assert!(!card.click().await);
        assert!(card.is_selected().await);

        card.undo().await;
        assert_eq!(card.panel().await, Panel::Description);
        assert!(card.click().await);
    }

    #[tokio::test]
    async fn test_undo_always_clears_selection() {
        let h = harness();
        let card = embedding_card(&h.context);

        card.undo().await;
        assert!(!card.is_selected().await);

        card.click().await;
        card.undo().await;
        assert!(!card.is_selected().await);
    }

    #[tokio::test]
    async fn test_caption_visible_only_while_hovering_unselected() {
        let h = harness();
        let card = embedding_card(&h.context);

        assert_eq!(card.caption().await, None);

        card.hover_enter().await;
        assert_eq!(card.caption().await, Some(LAUNCH_CAPTION));

        card.click().await;
        assert_eq!(card.caption().await, None);

        card.undo().await;
        assert_eq!(card.caption().await, Some(LAUNCH_CAPTION));

        card.hover_leave().await;
        assert_eq!(card.caption().await, None);
    }

    #[tokio::test]
    async fn test_chips_follow_descriptor_and_state() {
        let h = harness();

        let card = embedding_card(&h.context);
        assert_eq!(card.chips().await, vec!["en", "zh"]);

        let cached = LaunchCard::new(
            ModelDescriptor {
                is_cached: true,
                ..descriptor("bge-large-zh")
            },
            CardProfile::embedding(),
            h.context.clone(),
            CardOptions::default(),
        );
        assert_eq!(cached.chips().await, vec!["en", "zh", "Cached"]);
    }

    #[tokio::test]
    async fn test_stat_entries_per_profile() {
        let h = harness();

        let embedding = embedding_card(&h.context);
        assert_eq!(
            embedding.stat_entries(),
            vec![("dimensions", Some(768)), ("max tokens", Some(512))]
        );

        let rerank = LaunchCard::new(
            ModelDescriptor {
                model_name: "bge-reranker-base".to_string(),
                language: vec!["en".to_string()],
                is_cached: false,
                dimensions: None,
                max_tokens: None,
            },
            CardProfile::rerank(),
            h.context.clone(),
            CardOptions::default(),
        );
        assert!(rerank.stat_entries().is_empty());
    }

    #[tokio::test]
    async fn test_launch_uses_trimmed_uid() {
        let h = harness();
        let card = embedding_card(&h.context);

        card.click().await;
        card.set_uid_input("  my-model  ").await;

        let outcome = card.launch().await;
        assert_eq!(
            outcome,
            LaunchOutcome::Launched {
                model_uid: "my-model".to_string()
            }
        );

        let request = h.api.last_launch().await.unwrap();
        assert_eq!(request.model_uid, "my-model");
        assert_eq!(request.model_name, "bge-small-en");
        assert_eq!(request.model_type, "embedding");
    }

    #[tokio::test]
    async fn test_launch_generates_time_based_uid_for_blank_input() {
        let h = harness();
        let card = embedding_card(&h.context);

        card.click().await;
        card.set_uid_input("   ").await;
        card.launch().await;

        let request = h.api.last_launch().await.unwrap();
        let uid = Uuid::parse_str(&request.model_uid).unwrap();
        assert_eq!(uid.get_version_num(), 1);
    }

    #[tokio::test]
    async fn test_launch_success_navigates_exactly_once() {
        let h = harness();
        let card = embedding_card(&h.context);
        let mut rx = h.context.events.subscribe();

        card.click().await;
        let outcome = card.launch().await;

        assert!(matches!(outcome, LaunchOutcome::Launched { .. }));
        assert_eq!(
            h.navigator.opened_urls(),
            vec!["http://127.0.0.1:9997/ui/#/running_models"]
        );
        assert!(matches!(
            rx.recv().await.unwrap(),
            ConsoleEvent::LaunchCompleted { .. }
        ));

        // Gate reopened once the call settled
        assert!(!h.context.gate.is_busy());
    }

    #[tokio::test]
    async fn test_launch_failure_surfaces_server_error() {
        let h = harness();
        h.api.fail_launches_with(500, Some("oom")).await;

        let card = embedding_card(&h.context);
        let mut rx = h.context.events.subscribe();

        card.click().await;
        let outcome = card.launch().await;

        assert_eq!(
            outcome,
            LaunchOutcome::Failed {
                message: "Server error: 500 - oom".to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ConsoleEvent::Error {
                message: "Server error: 500 - oom".to_string()
            }
        );

        // No navigation, gate reopened, selection untouched
        assert!(h.navigator.opened_urls().is_empty());
        assert!(!h.context.gate.is_busy());
        assert!(card.is_selected().await);
    }

    #[tokio::test]
    async fn test_launch_failure_without_detail_reads_unknown() {
        let h = harness();
        h.api.fail_launches_with(502, None).await;

        let card = embedding_card(&h.context);
        let outcome = card.launch().await;

        assert_eq!(
            outcome,
            LaunchOutcome::Failed {
                message: "Server error: 502 - Unknown error".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_launch_refused_while_gate_held() {
        let h = harness();
        let card = embedding_card(&h.context);

        let permit = h.context.gate.try_acquire().unwrap();
        assert_eq!(card.launch_control(), LaunchControl::Busy);
        assert_eq!(card.launch().await, LaunchOutcome::Busy);
        assert_eq!(h.api.launch_count().await, 0);

        drop(permit);
        assert_eq!(card.launch_control(), LaunchControl::Ready);
        assert!(matches!(card.launch().await, LaunchOutcome::Launched { .. }));
    }

    #[tokio::test]
    async fn test_launch_refused_while_catalog_updating() {
        let h = harness();
        let card = embedding_card(&h.context);

        h.context.gate.set_updating(true);
        assert_eq!(card.launch().await, LaunchOutcome::Busy);
        assert_eq!(h.api.launch_count().await, 0);

        h.context.gate.set_updating(false);
        assert!(matches!(card.launch().await, LaunchOutcome::Launched { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_launches_send_single_request() {
        let h = harness();
        h.api.delay_launches(Duration::from_millis(50)).await;

        let first = Arc::new(embedding_card(&h.context));
        let second = LaunchCard::new(
            descriptor("gte-base"),
            CardProfile::embedding(),
            h.context.clone(),
            CardOptions::default(),
        );

        let in_flight = tokio::spawn({
            let first = first.clone();
            async move { first.launch().await }
        });

        // Give the first launch time to claim the gate
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(second.launch().await, LaunchOutcome::Busy);

        let outcome = in_flight.await.unwrap();
        assert!(matches!(outcome, LaunchOutcome::Launched { .. }));
        assert_eq!(h.api.launch_count().await, 1);
        assert!(!h.context.gate.is_busy());
    }

    #[tokio::test]
    async fn test_delete_success_sets_tombstone() {
        let h = harness();
        let card = custom_embedding_card(&h.context);
        let mut rx = h.context.events.subscribe();

        assert_eq!(card.delete_custom_registration().await, DeleteOutcome::Deleted);
        assert!(card.is_deleted().await);
        assert_eq!(
            h.api.last_unregister().await,
            Some((ModelKind::Embedding, "custom-embed".to_string()))
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ConsoleEvent::RegistrationDeleted {
                model_name: "custom-embed".to_string()
            }
        );

        // Chips pick up the deleted marker; repeat deletes are refused
        assert!(card.chips().await.contains(&"Deleted".to_string()));
        assert_eq!(
            card.delete_custom_registration().await,
            DeleteOutcome::AlreadyDeleted
        );
        assert_eq!(h.api.unregister_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_card_usable() {
        let h = harness();
        h.api.fail_unregisters_with(404, Some("not found")).await;

        let card = custom_embedding_card(&h.context);
        let mut rx = h.context.events.subscribe();

        let outcome = card.delete_custom_registration().await;
        assert_eq!(
            outcome,
            DeleteOutcome::Failed {
                message: "Server error: 404 - not found".to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ConsoleEvent::Error {
                message: "Server error: 404 - not found".to_string()
            }
        );

        // No tombstone; the card still clicks and launches
        assert!(!card.is_deleted().await);
        assert!(card.click().await);
        assert!(matches!(card.launch().await, LaunchOutcome::Launched { .. }));
    }

    #[tokio::test]
    async fn test_delete_never_flips_panel() {
        let h = harness();
        let card = custom_embedding_card(&h.context);

        card.delete_custom_registration().await;
        assert_eq!(card.panel().await, Panel::Description);
        assert!(!card.is_selected().await);
    }

    #[tokio::test]
    async fn test_deleted_card_ignores_clicks_and_launch() {
        let h = harness();
        let card = custom_embedding_card(&h.context);

        card.delete_custom_registration().await;

        assert!(!card.click().await);
        assert_eq!(card.panel().await, Panel::Description);
        assert_eq!(card.launch().await, LaunchOutcome::Unavailable);
        assert_eq!(h.api.launch_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_unsupported_for_rerank_and_builtin() {
        let h = harness();

        let rerank = LaunchCard::new(
            descriptor("bge-reranker-base"),
            CardProfile::rerank(),
            h.context.clone(),
            CardOptions {
                is_custom: true,
                ..Default::default()
            },
        );
        assert_eq!(
            rerank.delete_custom_registration().await,
            DeleteOutcome::Unsupported
        );

        let builtin = embedding_card(&h.context);
        assert_eq!(
            builtin.delete_custom_registration().await,
            DeleteOutcome::Unsupported
        );
        assert_eq!(h.api.unregister_count().await, 0);
    }

    #[tokio::test]
    async fn test_rerank_launch_failures_are_surfaced() {
        // Both variants share the error path
        let h = harness();
        h.api.fail_launches_with(500, Some("oom")).await;

        let card = LaunchCard::new(
            descriptor("bge-reranker-base"),
            CardProfile::rerank(),
            h.context.clone(),
            CardOptions::default(),
        );
        let mut rx = h.context.events.subscribe();

        card.click().await;
        assert!(matches!(card.launch().await, LaunchOutcome::Failed { .. }));
        assert_eq!(
            rx.recv().await.unwrap(),
            ConsoleEvent::Error {
                message: "Server error: 500 - oom".to_string()
            }
        );
        assert!(!h.context.gate.is_busy());
    }

    #[tokio::test]
    async fn test_selection_survives_launch_outcome() {
        let h = harness();
        let card = embedding_card(&h.context);

        card.click().await;
        card.launch().await;

        // Only undo flips back
        assert!(card.is_selected().await);
        card.undo().await;
        assert!(!card.is_selected().await);
    }

    #[tokio::test]
    async fn test_stats_track_attempts() {
        let h = harness();
        let card = embedding_card(&h.context);

        assert_eq!(card.stats().await.launch_attempts, 0);
        assert!(card.stats().await.last_launch_at.is_none());

        card.launch().await;
        card.launch().await;

        let stats = card.stats().await;
        assert_eq!(stats.launch_attempts, 2);
        assert!(stats.last_launch_at.is_some());
    }
}
