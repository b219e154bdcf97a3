//! # Integration Test Flows
//!
//! Project journeys through all five components wired by the engine container.
//!
//! ## Flows Tested:
//!
//! 1. **Lifecycle (3) → Escrow (1)**: hold on selection, release on approval, refund on cancel
//! 2. **Lifecycle (3) → Ratings (4) → Reputation (5)**: prompts, ratings, visibility flag
//! 3. **Reputation (5) → Registry (2)**: candidate profiles carry the current snapshot
//! 4. **Payment processor faults**: outage, lost acknowledgement, decline

#[cfg(test)]
mod tests {
    use crate::integration::{drain, Harness};
    use engine_runtime::handlers::EventRecorder;
    use shared_bus::{MarketplaceEvent, NotificationKind};
    use shared_types::{ProjectStatus, UserId};
    use std::sync::Arc;
    use td_01_escrow_ledger::{EscrowError, EscrowLedgerApi, EscrowState, OperationKind};
    use td_02_application_registry::{ApplicationRegistryApi, ApplicationStatus, RegistryError};
    use td_03_project_lifecycle::{DisputeSettlement, LifecycleError, ProjectLifecycleApi};
    use td_04_rating_collector::{RatingCollectorApi, RatingError};
    use td_05_reputation_guard::ReputationApi;
    use tudu_telemetry::EngineMetrics;

    fn notified(events: &[MarketplaceEvent], user: UserId, kind: NotificationKind) -> bool {
        events.iter().any(|e| {
            matches!(e, MarketplaceEvent::Notification { recipient, kind: k, .. }
                if *recipient == user && *k == kind)
        })
    }

    // =========================================================================
    // HAPPY PATH
    // =========================================================================

    #[tokio::test]
    async fn test_full_journey_with_revision() {
        let h = Harness::new();
        let mut sub = h.subscribe();
        let (creator, provider, other) = (UserId::new(), UserId::new(), UserId::new());
        let lifecycle = &h.engine.lifecycle;

        let project = h.open_project(creator, 2_000).await;
        let chosen = lifecycle.apply(project, provider, None).await.unwrap();
        let passed = lifecycle.apply(project, other, None).await.unwrap();
        assert_eq!(lifecycle.list_candidates(project).await.unwrap().len(), 2);

        lifecycle.select_applicant(project, chosen.id).await.unwrap();
        assert_eq!(h.engine.ledger.total_in_custody(), 2_000);
        assert_eq!(
            h.engine.registry.application(passed.id).unwrap().status,
            ApplicationStatus::Closed
        );

        lifecycle.submit_delivery(project).await.unwrap();
        lifecycle.request_revision(project).await.unwrap();
        lifecycle.submit_delivery(project).await.unwrap();
        let done = lifecycle.approve(project).await.unwrap();

        assert_eq!(done.status, ProjectStatus::Completed);
        assert_eq!(done.revision_count, 1);
        assert!(done.completed_at.is_some());
        assert_eq!(h.engine.ledger.total_in_custody(), 0);
        assert_eq!(h.processor.net_charged(creator), 2_000);
        assert_eq!(h.processor.net_charged(provider), -2_000);

        let events = drain(&mut sub);
        assert!(events.contains(&MarketplaceEvent::ChatActivated {
            project,
            party_a: creator,
            party_b: provider,
        }));
        assert!(events.contains(&MarketplaceEvent::ChatDeactivated { project }));
        assert!(notified(&events, creator, NotificationKind::ApplicationReceived));
        assert!(notified(&events, provider, NotificationKind::Selected));
        assert!(notified(&events, other, NotificationKind::ApplicationClosed));
        assert!(notified(&events, creator, NotificationKind::DeliverySubmitted));
        assert!(notified(&events, provider, NotificationKind::RevisionRequested));
        assert!(notified(&events, provider, NotificationKind::PaymentReleased));
        assert!(notified(&events, creator, NotificationKind::RatingPrompt));
        assert!(notified(&events, provider, NotificationKind::RatingPrompt));

        // Mutual ratings clear both prompts.
        let ratings = &h.engine.ratings;
        assert_eq!(ratings.pending_prompts(creator).len(), 1);
        ratings
            .record_rating(project, creator, provider, 5, None)
            .await
            .unwrap();
        ratings
            .record_rating(project, provider, creator, 4, None)
            .await
            .unwrap();
        assert!(ratings.pending_prompts(creator).is_empty());
        assert!(ratings.pending_prompts(provider).is_empty());
        assert_eq!(ratings.ratings_for_project(project).len(), 2);
        assert_eq!(h.engine.reputation.snapshot(provider).average, Some(5.0));
        assert_eq!(h.engine.reputation.snapshot(creator).average, Some(4.0));
    }

    #[tokio::test]
    async fn test_status_changes_follow_lifecycle_order() {
        let h = Harness::new();
        let mut sub = h.subscribe();
        let project = h.completed_project(UserId::new(), UserId::new(), 300).await;

        let transitions: Vec<(ProjectStatus, ProjectStatus)> = drain(&mut sub)
            .into_iter()
            .filter_map(|e| match e {
                MarketplaceEvent::ProjectStatusChanged { project: p, from, to } if p == project => {
                    Some((from, to))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            transitions,
            vec![
                (ProjectStatus::Draft, ProjectStatus::Open),
                (ProjectStatus::Open, ProjectStatus::InProgress),
                (ProjectStatus::InProgress, ProjectStatus::InReview),
                (ProjectStatus::InReview, ProjectStatus::Completed),
            ]
        );
    }

    // =========================================================================
    // CANCELLATION AND DISPUTES
    // =========================================================================

    #[tokio::test]
    async fn test_cancel_in_progress_refunds_and_blocks_ratings() {
        let h = Harness::new();
        let mut sub = h.subscribe();
        let (creator, provider) = (UserId::new(), UserId::new());
        let project = h.project_in_progress(creator, provider, 800).await;
        drain(&mut sub);

        let cancelled = h
            .engine
            .lifecycle
            .cancel(project, "Requirements changed".into())
            .await
            .unwrap();

        assert_eq!(cancelled.status, ProjectStatus::Cancelled);
        assert_eq!(
            h.engine.ledger.transaction(project).unwrap().state,
            EscrowState::Refunded
        );
        assert_eq!(h.processor.net_charged(creator), 0);
        assert_eq!(h.engine.ledger.total_in_custody(), 0);

        let events = drain(&mut sub);
        assert!(notified(&events, provider, NotificationKind::Cancelled));
        assert!(notified(&events, creator, NotificationKind::PaymentRefunded));

        let err = h
            .engine
            .ratings
            .record_rating(project, creator, provider, 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RatingError::ProjectNotCompleted { .. }));
    }

    #[tokio::test]
    async fn test_cancel_open_project_closes_applications() {
        let h = Harness::new();
        let creator = UserId::new();
        let project = h.open_project(creator, 400).await;
        let app = h
            .engine
            .lifecycle
            .apply(project, UserId::new(), None)
            .await
            .unwrap();

        h.engine
            .lifecycle
            .cancel(project, "No longer needed".into())
            .await
            .unwrap();

        assert_eq!(
            h.engine.registry.application(app.id).unwrap().status,
            ApplicationStatus::Closed
        );
        assert!(h.engine.ledger.transaction(project).is_none());
        assert_eq!(h.processor.call_count(), 0);
        assert!(h.engine.lifecycle.open_projects().is_empty());
    }

    #[tokio::test]
    async fn test_dispute_settlement_during_review() {
        let h = Harness::new();
        let (creator, provider) = (UserId::new(), UserId::new());
        let project = h.project_in_progress(creator, provider, 1_000).await;
        h.engine.lifecycle.submit_delivery(project).await.unwrap();

        let settled = h
            .engine
            .lifecycle
            .settle_dispute(
                project,
                DisputeSettlement {
                    provider_share: 250,
                    creator_share: 750,
                    reason: "Partial delivery".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(settled.status, ProjectStatus::Cancelled);
        let escrow = h.engine.ledger.transaction(project).unwrap();
        assert_eq!(escrow.state, EscrowState::PartiallyReleased);
        assert_eq!(escrow.released_amount + escrow.refunded_amount, escrow.held_amount);
        assert_eq!(h.processor.net_charged(provider), -250);
        assert_eq!(h.processor.net_charged(creator), 250);
    }

    #[tokio::test]
    async fn test_settlement_without_escrow_rejected() {
        let h = Harness::new();
        let project = h.open_project(UserId::new(), 500).await;

        let err = h
            .engine
            .lifecycle
            .settle_dispute(
                project,
                DisputeSettlement {
                    provider_share: 0,
                    creator_share: 500,
                    reason: "nothing to split".into(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::Escrow(EscrowError::NoEscrow(_))));
        assert_eq!(
            h.engine.lifecycle.project(project).unwrap().status,
            ProjectStatus::Open
        );
    }

    // =========================================================================
    // RATINGS AND REPUTATION
    // =========================================================================

    #[tokio::test]
    async fn test_low_window_average_flags_and_recovers() {
        let h = Harness::new();
        let mut sub = h.subscribe();
        let provider = UserId::new();

        for stars in [2, 2, 2, 1, 5] {
            h.rated_delivery(provider, stars).await;
        }
        let snapshot = h.engine.reputation.snapshot(provider);
        assert_eq!(snapshot.window_count, 5);
        assert!((snapshot.average.unwrap() - 2.4).abs() < 1e-9);
        assert!(snapshot.visibility_flag);

        let events = drain(&mut sub);
        assert!(events.contains(&MarketplaceEvent::VisibilityChanged {
            user: provider,
            flagged: true,
        }));

        // The flag shows up on the provider's next application.
        let project = h.open_project(UserId::new(), 200).await;
        h.engine
            .lifecycle
            .apply(project, provider, None)
            .await
            .unwrap();
        let candidates = h.engine.lifecycle.list_candidates(project).await.unwrap();
        assert!(candidates[0].profile.reputation.visibility_flag);
        assert_eq!(candidates[0].profile.completed_projects, 5);

        // Two fives push the oldest low ratings out of the window: [2, 1, 5, 5, 5].
        h.rated_delivery(provider, 5).await;
        h.rated_delivery(provider, 5).await;
        let snapshot = h.engine.reputation.snapshot(provider);
        assert!((snapshot.average.unwrap() - 3.6).abs() < 1e-9);
        assert!(!snapshot.visibility_flag);
        assert!(drain(&mut sub).contains(&MarketplaceEvent::VisibilityChanged {
            user: provider,
            flagged: false,
        }));
    }

    #[tokio::test]
    async fn test_average_at_threshold_is_not_flagged() {
        let h = Harness::new();
        let provider = UserId::new();
        for stars in [3, 3, 3] {
            h.rated_delivery(provider, stars).await;
        }
        let snapshot = h.engine.reputation.snapshot(provider);
        assert_eq!(snapshot.average, Some(3.0));
        assert!(!snapshot.visibility_flag);
    }

    #[tokio::test]
    async fn test_duplicate_and_outsider_ratings_rejected() {
        let h = Harness::new();
        let (creator, provider) = (UserId::new(), UserId::new());
        let project = h.completed_project(creator, provider, 100).await;
        let ratings = &h.engine.ratings;

        ratings
            .record_rating(project, creator, provider, 4, None)
            .await
            .unwrap();
        let dup = ratings
            .record_rating(project, creator, provider, 1, None)
            .await
            .unwrap_err();
        assert!(matches!(dup, RatingError::DuplicateRating { .. }));

        let outsider = ratings
            .record_rating(project, UserId::new(), provider, 1, None)
            .await
            .unwrap_err();
        assert!(matches!(outsider, RatingError::InvalidRater { .. }));

        let bad_stars = ratings
            .record_rating(project, provider, creator, 6, None)
            .await
            .unwrap_err();
        assert!(matches!(bad_stars, RatingError::InvalidStars(6)));

        // Only the first rating counted.
        assert_eq!(h.engine.reputation.snapshot(provider).average, Some(4.0));
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let h = Harness::new();
        let provider = UserId::new();
        for stars in [1, 2] {
            h.rated_delivery(provider, stars).await;
        }
        let mut sub = h.subscribe();

        let first = h.engine.reputation.recompute(provider).await.unwrap();
        let second = h.engine.reputation.recompute(provider).await.unwrap();

        assert_eq!(first, second);
        assert!(first.visibility_flag);
        assert!(drain(&mut sub).is_empty());
    }

    #[tokio::test]
    async fn test_unrated_user_has_empty_snapshot() {
        let h = Harness::new();
        let snapshot = h.engine.reputation.snapshot(UserId::new());
        assert_eq!(snapshot.average, None);
        assert_eq!(snapshot.window_count, 0);
        assert!(!snapshot.visibility_flag);
    }

    // =========================================================================
    // APPLICATIONS
    // =========================================================================

    #[tokio::test]
    async fn test_withdrawn_applicant_cannot_be_selected() {
        let h = Harness::new();
        let creator = UserId::new();
        let project = h.open_project(creator, 300).await;
        let lifecycle = &h.engine.lifecycle;
        let app = lifecycle.apply(project, UserId::new(), None).await.unwrap();
        lifecycle.withdraw_application(app.id).await.unwrap();

        let err = lifecycle.select_applicant(project, app.id).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Registry(RegistryError::ApplicantUnavailable { .. })
        ));
        assert!(err.is_conflict());
        assert!(h.engine.ledger.transaction(project).is_none());
    }

    #[tokio::test]
    async fn test_creator_cannot_apply_to_own_project() {
        let h = Harness::new();
        let creator = UserId::new();
        let project = h.open_project(creator, 300).await;

        let err = h
            .engine
            .lifecycle
            .apply(project, creator, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Registry(RegistryError::SelfApplication(_))
        ));
    }

    #[tokio::test]
    async fn test_apply_to_draft_rejected() {
        let h = Harness::new();
        let draft = h
            .engine
            .lifecycle
            .create_project(td_03_project_lifecycle::ProjectDraft::new(
                UserId::new(),
                "Not yet public",
                50,
            ))
            .await
            .unwrap();

        let err = h
            .engine
            .lifecycle
            .apply(draft.id, UserId::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Registry(RegistryError::ProjectNotOpen { .. })
        ));
    }

    // =========================================================================
    // PAYMENT PROCESSOR FAULTS
    // =========================================================================

    #[tokio::test]
    async fn test_transient_outage_absorbed_by_retry() {
        let h = Harness::new();
        let project = h.open_project(UserId::new(), 700).await;
        let app = h
            .engine
            .lifecycle
            .apply(project, UserId::new(), None)
            .await
            .unwrap();
        h.processor.fail_next(2);

        let selected = h
            .engine
            .lifecycle
            .select_applicant(project, app.id)
            .await
            .unwrap();

        assert_eq!(selected.status, ProjectStatus::InProgress);
        assert_eq!(h.processor.call_count(), 3);
        assert_eq!(h.processor.total(OperationKind::Capture), 700);
    }

    #[tokio::test]
    async fn test_exhausted_retries_leave_project_open() {
        let h = Harness::new();
        let mut sub = h.subscribe();
        let creator = UserId::new();
        let project = h.open_project(creator, 700).await;
        let app = h
            .engine
            .lifecycle
            .apply(project, UserId::new(), None)
            .await
            .unwrap();
        h.processor.fail_next(3);

        let err = h
            .engine
            .lifecycle
            .select_applicant(project, app.id)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::Escrow(EscrowError::ProcessorUnavailable { attempts: 3, .. })
        ));
        assert_eq!(
            h.engine.lifecycle.project(project).unwrap().status,
            ProjectStatus::Open
        );
        assert_eq!(
            h.engine.registry.application(app.id).unwrap().status,
            ApplicationStatus::Pending
        );
        assert!(notified(&drain(&mut sub), creator, NotificationKind::PaymentFailed));

        // Processor is back: same selection goes through.
        h.engine
            .lifecycle
            .select_applicant(project, app.id)
            .await
            .unwrap();
        assert_eq!(h.processor.total(OperationKind::Capture), 700);
    }

    #[tokio::test]
    async fn test_lost_acknowledgement_captures_once() {
        let h = Harness::new();
        let project = h.open_project(UserId::new(), 900).await;
        let app = h
            .engine
            .lifecycle
            .apply(project, UserId::new(), None)
            .await
            .unwrap();
        h.processor.lose_next_acks(1);

        h.engine
            .lifecycle
            .select_applicant(project, app.id)
            .await
            .unwrap();

        assert_eq!(h.processor.call_count(), 2);
        assert_eq!(h.processor.executed_count(), 1);
        assert_eq!(h.processor.total(OperationKind::Capture), 900);
    }

    #[tokio::test]
    async fn test_unacknowledged_capture_refunded_on_cancel() {
        let h = Harness::new();
        let mut sub = h.subscribe();
        let creator = UserId::new();
        let project = h.open_project(creator, 400).await;
        let app = h
            .engine
            .lifecycle
            .apply(project, UserId::new(), None)
            .await
            .unwrap();
        h.processor.lose_next_acks(3);

        let err = h
            .engine
            .lifecycle
            .select_applicant(project, app.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Escrow(EscrowError::ProcessorUnavailable { attempts: 3, .. })
        ));
        assert_eq!(h.processor.net_charged(creator), 400);

        let cancelled = h
            .engine
            .lifecycle
            .cancel(project, "Gave up".into())
            .await
            .unwrap();

        assert_eq!(cancelled.status, ProjectStatus::Cancelled);
        assert_eq!(h.processor.net_charged(creator), 0);
        assert_eq!(h.engine.ledger.total_in_custody(), 0);
        assert!(h.engine.ledger.in_doubt(project).is_none());
        assert!(notified(&drain(&mut sub), creator, NotificationKind::PaymentRefunded));
    }

    #[tokio::test]
    async fn test_unacknowledged_capture_replayed_by_next_selection() {
        let h = Harness::new();
        let creator = UserId::new();
        let project = h.open_project(creator, 400).await;
        let app = h
            .engine
            .lifecycle
            .apply(project, UserId::new(), None)
            .await
            .unwrap();
        h.processor.lose_next_acks(3);
        h.engine
            .lifecycle
            .select_applicant(project, app.id)
            .await
            .unwrap_err();

        let selected = h
            .engine
            .lifecycle
            .select_applicant(project, app.id)
            .await
            .unwrap();

        assert_eq!(selected.status, ProjectStatus::InProgress);
        assert_eq!(h.processor.executed_count(), 1);
        assert_eq!(h.processor.net_charged(creator), 400);
        assert_eq!(h.engine.ledger.history(project).len(), 1);
    }

    #[tokio::test]
    async fn test_declined_hold_not_retried() {
        let h = Harness::new();
        let project = h.open_project(UserId::new(), 900).await;
        let app = h
            .engine
            .lifecycle
            .apply(project, UserId::new(), None)
            .await
            .unwrap();
        h.processor.decline_next(1);

        let err = h
            .engine
            .lifecycle
            .select_applicant(project, app.id)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::Escrow(EscrowError::ProcessorDeclined(_))
        ));
        assert_eq!(h.processor.call_count(), 1);
        assert_eq!(h.engine.ledger.total_in_custody(), 0);
    }

    #[tokio::test]
    async fn test_release_outage_keeps_project_in_review() {
        let h = Harness::new();
        let (creator, provider) = (UserId::new(), UserId::new());
        let project = h.project_in_progress(creator, provider, 450).await;
        h.engine.lifecycle.submit_delivery(project).await.unwrap();
        h.processor.fail_next(3);

        let err = h.engine.lifecycle.approve(project).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Escrow(EscrowError::ProcessorUnavailable { .. })
        ));
        assert_eq!(
            h.engine.lifecycle.project(project).unwrap().status,
            ProjectStatus::InReview
        );
        assert_eq!(h.engine.ledger.total_in_custody(), 450);

        let done = h.engine.lifecycle.approve(project).await.unwrap();
        assert_eq!(done.status, ProjectStatus::Completed);
        assert_eq!(h.processor.net_charged(provider), -450);
    }

    // =========================================================================
    // TELEMETRY
    // =========================================================================

    #[tokio::test]
    async fn test_recorder_metrics_track_journey() {
        let h = Harness::new();
        let metrics = Arc::new(EngineMetrics::new().unwrap());
        let recorder = EventRecorder::new(h.subscribe(), Some(metrics.clone()));
        let task = tokio::spawn(recorder.run());

        let (creator, provider) = (UserId::new(), UserId::new());
        h.completed_project(creator, provider, 300).await;
        let cancelled = h.project_in_progress(creator, UserId::new(), 300).await;
        h.engine
            .lifecycle
            .cancel(cancelled, "Out of scope".into())
            .await
            .unwrap();

        // Dropping the container closes the bus and ends the recorder.
        drop(h);
        let handled = task.await.unwrap();

        assert!(handled > 0);
        assert_eq!(metrics.transitions("in_review", "completed"), 1);
        assert_eq!(metrics.transitions("in_progress", "cancelled"), 1);
        assert_eq!(metrics.notifications("paymentHeld"), 2);
        assert_eq!(metrics.notifications("ratingPrompt"), 2);
        assert_eq!(metrics.active_chats(), 0);
        assert!(metrics.render().unwrap().contains("td_lifecycle_transitions_total"));
    }

    // =========================================================================
    // DEMONSTRATION
    // =========================================================================

    #[tokio::test]
    async fn test_demo_flow_on_harness() {
        let h = Harness::new();
        let report = engine_runtime::demo::run_demo(&h.engine).await.unwrap();

        assert_eq!(report.custody, 0);
        assert_eq!(report.creator_net, 1_500);
        assert_eq!(
            h.engine.lifecycle.project(report.cancelled).unwrap().status,
            ProjectStatus::Cancelled
        );
        assert_eq!(report.provider_reputation.window_count, 1);
    }
}
