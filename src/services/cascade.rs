use futures::future::BoxFuture;
use futures::FutureExt;

use crate::collections::Collection;
use crate::database::document::Document;
use crate::observer::ObserverError;
use crate::state::AppState;

/// What a cascading delete removed
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CascadeReport {
    pub deleted: Vec<(Collection, String)>,
    pub failed: Vec<(Collection, String)>,
}

/// Delete a document together with every document that points at it.
///
/// Children go first, one at a time. A child that fails to delete is
/// logged and skipped; the parent is still removed.
pub async fn delete_with_children(
    state: &AppState,
    collection: Collection,
    id: &str,
) -> Result<(Document, CascadeReport), ObserverError> {
    // Unknown parents are a 404 before anything is touched
    state.repository(collection).select_404(id).await?;

    let mut report = CascadeReport::default();
    delete_children(state.clone(), collection, id.to_string(), &mut report).await;

    let deleted = state.repository(collection).delete(id).await?;
    Ok((deleted, report))
}

fn delete_children<'a>(
    state: AppState,
    parent: Collection,
    parent_id: String,
    report: &'a mut CascadeReport,
) -> BoxFuture<'a, ()> {
    async move {
        for &child in parent.children() {
            let documents = match state.repository(child).select_children(&parent_id).await {
                Ok(documents) => documents,
                Err(err) => {
                    tracing::warn!("Cascade: could not list {} of {} {}: {}", child, parent, parent_id, err);
                    continue;
                }
            };

            for document in documents {
                if !child.children().is_empty() {
                    delete_children(state.clone(), child, document.id.clone(), report).await;
                }

                match state.repository(child).delete(&document.id).await {
                    Ok(_) => report.deleted.push((child, document.id)),
                    Err(err) => {
                        tracing::warn!("Cascade: failed to delete {} {}: {}", child, document.id, err);
                        report.failed.push((child, document.id));
                    }
                }
            }
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::filter::FilterData;
    use serde_json::json;
    use std::sync::Arc;

    async fn create(state: &AppState, collection: Collection, data: serde_json::Value) -> Document {
        state
            .repository(collection)
            .create(data.as_object().cloned().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn company_delete_removes_projects_and_their_children() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let company = create(&state, Collection::CompanyProfiles, json!({ "userId": "u1", "company_name": "H2" })).await;
        create(&state, Collection::CompanyFinancials, json!({ "companyId": company.id })).await;
        let project = create(&state, Collection::Projects, json!({ "companyId": company.id, "project_name": "A" })).await;
        create(&state, Collection::ProjectProduction, json!({ "projectId": project.id })).await;

        let other = create(&state, Collection::Projects, json!({ "companyId": "someone-else", "project_name": "B" })).await;

        let (deleted, report) = delete_with_children(&state, Collection::CompanyProfiles, &company.id).await.unwrap();
        assert_eq!(deleted.id, company.id);
        assert_eq!(report.deleted.len(), 3);
        assert!(report.failed.is_empty());

        let production = state.repository(Collection::ProjectProduction).select_any(FilterData::new()).await.unwrap();
        assert!(production.is_empty());
        assert!(state.repository(Collection::Projects).select_id(&other.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_parent_is_not_found() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let err = delete_with_children(&state, Collection::Projects, "nope").await.unwrap_err();
        assert!(matches!(err, ObserverError::NotFound(_)));
    }
}
