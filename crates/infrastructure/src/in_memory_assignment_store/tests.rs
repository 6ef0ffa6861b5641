use std::collections::BTreeSet;

use permitra_application::{AssignmentRepository, ReferenceRepository};
use permitra_core::{AppError, TenantId};
use permitra_domain::{App, AssignmentFilter, AssignmentId, PageRequest, Permission, Role};

use super::InMemoryAssignmentStore;

async fn seeded_store(tenant_id: TenantId) -> InMemoryAssignmentStore {
    let store = InMemoryAssignmentStore::new();
    store
        .put_role(
            tenant_id,
            Role {
                role_id: "r1".to_owned(),
                name: Some("Reader".to_owned()),
            },
        )
        .await;
    store
        .put_app(
            tenant_id,
            App {
                app_id: "app1".to_owned(),
                product_name: Some("test1".to_owned()),
            },
        )
        .await;
    for (permission_id, app_id, product) in [
        ("p11", "app1", "test1"),
        ("p12", "app1", "test1"),
        ("p21", "app2", "test2"),
    ] {
        store
            .put_permission(
                tenant_id,
                Permission {
                    permission_id: permission_id.to_owned(),
                    app_id: app_id.to_owned(),
                    product_name: Some(product.to_owned()),
                },
            )
            .await;
    }
    store
}

#[tokio::test]
async fn duplicate_triple_insert_is_a_conflict() {
    let tenant_id = TenantId::new();
    let store = seeded_store(tenant_id).await;

    let first = store.insert(tenant_id, "r1", "p11").await;
    let second = store.insert(tenant_id, "r1", "p11").await;

    assert!(first.is_ok());
    let Err(AppError::Conflict(detail)) = second else {
        panic!("expected a conflict on the duplicate triple");
    };
    assert!(detail.contains("uc_assignment_key"));
}

#[tokio::test]
async fn same_pair_in_another_tenant_is_not_a_conflict() {
    let tenant_id = TenantId::new();
    let other_tenant_id = TenantId::new();
    let store = seeded_store(tenant_id).await;

    let first = store.insert(tenant_id, "r1", "p11").await;
    let second = store.insert(other_tenant_id, "r1", "p11").await;

    assert!(first.is_ok());
    assert!(second.is_ok());
}

#[tokio::test]
async fn insert_missing_skips_existing_pairs() {
    let tenant_id = TenantId::new();
    let store = seeded_store(tenant_id).await;

    let existing = store.insert(tenant_id, "r1", "p11").await;
    assert!(existing.is_ok());

    let candidates: BTreeSet<String> = ["p11", "p12", "p21"]
        .into_iter()
        .map(str::to_owned)
        .collect();
    let created = store.insert_missing(tenant_id, "r1", &candidates).await;

    let Ok(created) = created else {
        panic!("expected insert_missing to succeed");
    };
    let created_ids: Vec<&str> = created
        .iter()
        .map(|assignment| assignment.permission_id.as_str())
        .collect();
    assert_eq!(created_ids, vec!["p12", "p21"]);

    let replay = store.insert_missing(tenant_id, "r1", &candidates).await;
    assert!(matches!(replay, Ok(created) if created.is_empty()));
}

#[tokio::test]
async fn delete_for_role_honors_the_permission_scope() {
    let tenant_id = TenantId::new();
    let store = seeded_store(tenant_id).await;

    for permission_id in ["p11", "p12", "p21"] {
        let inserted = store.insert(tenant_id, "r1", permission_id).await;
        assert!(inserted.is_ok());
    }

    let scope: BTreeSet<String> = ["p11", "p12"].into_iter().map(str::to_owned).collect();
    let scoped = store.delete_for_role(tenant_id, "r1", Some(&scope)).await;
    let remainder = store.delete_for_role(tenant_id, "r1", None).await;

    assert!(matches!(scoped, Ok(2)));
    assert!(matches!(remainder, Ok(1)));
}

#[tokio::test]
async fn delete_by_id_reports_whether_a_row_was_removed() {
    let tenant_id = TenantId::new();
    let store = seeded_store(tenant_id).await;

    let Ok(assignment) = store.insert(tenant_id, "r1", "p11").await else {
        panic!("expected inserted assignment");
    };

    assert!(matches!(
        store.delete_by_id(tenant_id, assignment.id).await,
        Ok(true)
    ));
    assert!(matches!(
        store.delete_by_id(tenant_id, assignment.id).await,
        Ok(false)
    ));
    assert!(matches!(
        store.delete_by_id(tenant_id, AssignmentId::new()).await,
        Ok(false)
    ));
}

#[tokio::test]
async fn search_is_tenant_isolated_and_ordered_by_id() {
    let tenant_id = TenantId::new();
    let other_tenant_id = TenantId::new();
    let store = seeded_store(tenant_id).await;

    for permission_id in ["p11", "p12"] {
        let inserted = store.insert(tenant_id, "r1", permission_id).await;
        assert!(inserted.is_ok());
    }
    let foreign = store.insert(other_tenant_id, "r1", "p11").await;
    assert!(foreign.is_ok());

    let page = store
        .search(
            tenant_id,
            &AssignmentFilter::default(),
            PageRequest::default(),
        )
        .await;

    let Ok(page) = page else {
        panic!("expected search to succeed");
    };
    assert_eq!(page.total_count, 2);
    let mut sorted = page.items.clone();
    sorted.sort_by_key(|assignment| assignment.id);
    assert_eq!(page.items, sorted);
    assert!(
        page.items
            .iter()
            .all(|assignment| assignment.tenant_id == tenant_id)
    );
}

#[tokio::test]
async fn search_matches_apps_and_products_through_permissions() {
    let tenant_id = TenantId::new();
    let store = seeded_store(tenant_id).await;

    for permission_id in ["p11", "p12", "p21"] {
        let inserted = store.insert(tenant_id, "r1", permission_id).await;
        assert!(inserted.is_ok());
    }

    let by_app = store
        .search(
            tenant_id,
            &AssignmentFilter {
                app_ids: Some(["app1".to_owned()].into_iter().collect()),
                ..AssignmentFilter::default()
            },
            PageRequest::default(),
        )
        .await;
    let by_product = store
        .search(
            tenant_id,
            &AssignmentFilter {
                product_names: Some(["test2".to_owned()].into_iter().collect()),
                ..AssignmentFilter::default()
            },
            PageRequest::default(),
        )
        .await;

    assert!(matches!(by_app, Ok(page) if page.total_count == 2));
    assert!(matches!(by_product, Ok(page) if page.total_count == 1));
}

#[tokio::test]
async fn reference_lookups_stay_within_the_tenant() {
    let tenant_id = TenantId::new();
    let other_tenant_id = TenantId::new();
    let store = seeded_store(tenant_id).await;

    let role = store.find_role(other_tenant_id, "r1").await;
    let permission = store.find_permission(other_tenant_id, "p11").await;
    let app = store.find_app(other_tenant_id, "app1").await;

    assert!(matches!(role, Ok(None)));
    assert!(matches!(permission, Ok(None)));
    assert!(matches!(app, Ok(None)));
}
