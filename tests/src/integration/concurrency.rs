//! # Concurrency Tests
//!
//! Races that must resolve to exactly one outcome per project: two selections,
//! approve against cancel, duplicate ratings. Projects that do not share an id
//! must proceed independently.

#[cfg(test)]
mod tests {
    use crate::integration::Harness;
    use futures::future::join_all;
    use shared_types::{ProjectStatus, UserId};
    use std::sync::Arc;
    use td_01_escrow_ledger::{EscrowLedgerApi, EscrowState, OperationKind};
    use td_02_application_registry::{ApplicationRegistryApi, ApplicationStatus};
    use td_03_project_lifecycle::ProjectLifecycleApi;
    use td_04_rating_collector::RatingCollectorApi;
    use td_05_reputation_guard::ReputationApi;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_selections_hold_once() {
        let h = Harness::new();
        let project = h.open_project(UserId::new(), 1_200).await;
        let lifecycle = h.engine.lifecycle.clone();

        let mut apps = Vec::new();
        for _ in 0..8 {
            apps.push(lifecycle.apply(project, UserId::new(), None).await.unwrap());
        }

        let handles: Vec<_> = apps
            .iter()
            .map(|app| {
                let lifecycle = Arc::clone(&lifecycle);
                let id = app.id;
                tokio::spawn(async move { lifecycle.select_applicant(project, id).await })
            })
            .collect();
        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.is_conflict()));

        assert_eq!(h.processor.total(OperationKind::Capture), 1_200);
        assert_eq!(h.engine.ledger.history(project).len(), 1);

        let statuses: Vec<_> = h
            .engine
            .registry
            .applications_for(project)
            .into_iter()
            .map(|a| a.status)
            .collect();
        assert_eq!(
            statuses
                .iter()
                .filter(|s| **s == ApplicationStatus::Selected)
                .count(),
            1
        );
        assert_eq!(
            statuses
                .iter()
                .filter(|s| **s == ApplicationStatus::Closed)
                .count(),
            7
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_approve_races_cancel() {
        let h = Harness::new();
        let (creator, provider) = (UserId::new(), UserId::new());
        let project = h.project_in_progress(creator, provider, 500).await;
        h.engine.lifecycle.submit_delivery(project).await.unwrap();

        let approve = {
            let lifecycle = h.engine.lifecycle.clone();
            tokio::spawn(async move { lifecycle.approve(project).await })
        };
        let cancel = {
            let lifecycle = h.engine.lifecycle.clone();
            tokio::spawn(async move { lifecycle.cancel(project, "changed my mind".into()).await })
        };
        let approved = approve.await.unwrap();
        let cancelled = cancel.await.unwrap();

        assert_eq!(approved.is_ok() as u8 + cancelled.is_ok() as u8, 1);

        let status = h.engine.lifecycle.project(project).unwrap().status;
        let escrow = h.engine.ledger.transaction(project).unwrap();
        match status {
            ProjectStatus::Completed => assert_eq!(escrow.state, EscrowState::Released),
            ProjectStatus::Cancelled => assert_eq!(escrow.state, EscrowState::Refunded),
            other => panic!("unexpected final status {other}"),
        }
        assert_eq!(
            escrow.released_amount + escrow.refunded_amount,
            escrow.held_amount
        );
        assert_eq!(h.engine.ledger.total_in_custody(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_independent_projects_complete_in_parallel() {
        let h = Arc::new(Harness::new());
        let creator = UserId::new();

        let handles: Vec<_> = (0..16u64)
            .map(|i| {
                let h = Arc::clone(&h);
                tokio::spawn(async move {
                    h.completed_project(creator, UserId::new(), 100 + i).await
                })
            })
            .collect();
        let projects: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        let expected: u64 = (0..16u64).map(|i| 100 + i).sum();
        assert_eq!(projects.len(), 16);
        assert_eq!(h.processor.total(OperationKind::Capture), expected);
        assert_eq!(h.processor.total(OperationKind::Release), expected);
        assert_eq!(h.processor.net_charged(creator), expected as i128);
        assert_eq!(h.engine.ledger.total_in_custody(), 0);
        assert!(projects.iter().all(|p| {
            h.engine.lifecycle.project(*p).map(|p| p.status) == Some(ProjectStatus::Completed)
        }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_duplicate_ratings_race_single_winner() {
        let h = Harness::new();
        let (creator, provider) = (UserId::new(), UserId::new());
        let project = h.completed_project(creator, provider, 100).await;

        let handles: Vec<_> = [1u8, 5, 3, 4]
            .into_iter()
            .map(|stars| {
                let ratings = h.engine.ratings.clone();
                tokio::spawn(async move {
                    ratings
                        .record_rating(project, creator, provider, stars, None)
                        .await
                })
            })
            .collect();
        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        let stored: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(stored.len(), 1);
        assert_eq!(h.engine.ratings.ratings_for_project(project).len(), 1);

        let snapshot = h.engine.reputation.snapshot(provider);
        assert_eq!(snapshot.window_count, 1);
        assert_eq!(
            snapshot.average,
            Some(f64::from(stored[0].stars.value()))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ratings_for_one_provider() {
        let h = Arc::new(Harness::new());
        let provider = UserId::new();

        let mut rated = Vec::new();
        for _ in 0..6 {
            let creator = UserId::new();
            let project = h.completed_project(creator, provider, 100).await;
            rated.push((project, creator));
        }

        let handles: Vec<_> = rated
            .into_iter()
            .map(|(project, creator)| {
                let ratings = h.engine.ratings.clone();
                tokio::spawn(async move {
                    ratings
                        .record_rating(project, creator, provider, 4, None)
                        .await
                })
            })
            .collect();
        for result in join_all(handles).await {
            result.unwrap().unwrap();
        }

        // Whatever order recomputes ran in, the stored snapshot covers the
        // newest five ratings.
        let snapshot = h.engine.reputation.recompute(provider).await.unwrap();
        assert_eq!(snapshot.window_count, 5);
        assert_eq!(snapshot.average, Some(4.0));
        assert_eq!(h.engine.reputation.snapshot(provider), snapshot);
    }
}
