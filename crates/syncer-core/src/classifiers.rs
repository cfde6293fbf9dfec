//! Content Classifiers (C2): sampled, driver-assisted tests that enrich a
//! single field. Runs as a fixed pipeline invoked from the field reconciler
//! (C4) once a field has been inserted or updated for this sync pass.
//!
//! Each stage reads the field view produced by the previous stage and either
//! leaves it unchanged or writes through the `CatalogStore` and returns the
//! updated view — an explicit fold, not a threaded mutable reference.

use serde_json::Value;
use syncer_store::{CatalogStore, Field, FieldUpdate, SpecialType};

use crate::config::SyncConfig;
use crate::domain::Result;
use crate::driver::{Capability, Driver};

/// Run the C2 pipeline against one field, writing through `store` as each
/// stage qualifies. Returns the field's final view.
///
/// `full_sync = false` skips steps 3-5 (no-preview marker, category/refresh,
/// JSON marker) — sampling-based analysis — but still runs steps 1, 2, and 6
/// (driver hook, URL marker, nested-field reconciliation), since nested
/// fields are structural metadata rather than sampled analysis.
pub async fn classify_field<D, S>(
    driver: &D,
    store: &S,
    cfg: &SyncConfig,
    field: Field,
    full_sync: bool,
) -> Result<Field>
where
    D: Driver,
    S: CatalogStore,
{
    let field = driver_specific_hook(driver, field).await?;
    let field = url_marker(driver, store, cfg, field).await?;
    let field = if full_sync {
        let field = no_preview_marker(driver, store, cfg, field).await?;
        let field = category_or_refresh(store, cfg, field).await?;
        json_marker(driver, store, cfg, field).await?
    } else {
        field
    };
    let field = nested_fields(driver, store, cfg, field, full_sync).await?;
    Ok(field)
}

async fn driver_specific_hook<D: Driver>(driver: &D, field: Field) -> Result<Field> {
    Ok(driver.driver_specific_sync_field(&field).await?.unwrap_or(field))
}

async fn url_marker<D: Driver, S: CatalogStore>(
    driver: &D,
    store: &S,
    cfg: &SyncConfig,
    field: Field,
) -> Result<Field> {
    if field.special_type.is_some() || !field.base_type.is_textual() {
        return Ok(field);
    }
    let percent = driver.field_percent_urls(&field).await?;
    if percent > cfg.url_threshold {
        let updated = store
            .update_field(
                field.id,
                FieldUpdate {
                    special_type: Some(SpecialType::Url),
                    ..Default::default()
                },
            )
            .await?;
        return Ok(updated);
    }
    Ok(field)
}

async fn no_preview_marker<D: Driver, S: CatalogStore>(
    driver: &D,
    store: &S,
    cfg: &SyncConfig,
    field: Field,
) -> Result<Field> {
    if !field.preview_display || !field.base_type.is_textual() {
        return Ok(field);
    }
    let avg_length = driver.field_avg_length(&field).await?;
    if avg_length > cfg.avg_length_threshold {
        let updated = store
            .update_field(
                field.id,
                FieldUpdate {
                    preview_display: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        return Ok(updated);
    }
    Ok(field)
}

async fn category_or_refresh<S: CatalogStore>(
    store: &S,
    cfg: &SyncConfig,
    field: Field,
) -> Result<Field> {
    if field.special_type.is_none() && field.preview_display {
        let cardinality = store
            .field_distinct_count(field.id, cfg.cardinality_threshold)
            .await?;
        if cardinality > 0 && cardinality < cfg.cardinality_threshold {
            let updated = store
                .update_field(
                    field.id,
                    FieldUpdate {
                        special_type: Some(SpecialType::Category),
                        ..Default::default()
                    },
                )
                .await?;
            return Ok(updated);
        }
        return Ok(field);
    }
    if store.field_should_have_field_values(field.id).await? {
        store.update_field_values(field.id).await?;
    }
    Ok(field)
}

async fn json_marker<D: Driver, S: CatalogStore>(
    driver: &D,
    store: &S,
    cfg: &SyncConfig,
    field: Field,
) -> Result<Field> {
    if field.special_type.is_some() || !field.base_type.is_textual() {
        return Ok(field);
    }
    let samples = driver
        .field_values_sample(&field, cfg.json_sample_cap)
        .await?;
    if qualifies_as_json(&samples) {
        let updated = store
            .update_field(
                field.id,
                FieldUpdate {
                    special_type: Some(SpecialType::Json),
                    preview_display: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        return Ok(updated);
    }
    Ok(field)
}

/// `true` if every non-blank sample parses as a JSON object or array
/// (scalars disqualify) and at least one non-blank sample exists.
fn qualifies_as_json(samples: &[Option<String>]) -> bool {
    let mut saw_non_blank = false;
    for sample in samples {
        let Some(text) = sample else { continue };
        if text.is_empty() {
            continue;
        }
        saw_non_blank = true;
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(_)) | Ok(Value::Array(_)) => {}
            _ => return false,
        }
    }
    saw_non_blank
}

async fn nested_fields<D: Driver, S: CatalogStore>(
    driver: &D,
    store: &S,
    cfg: &SyncConfig,
    field: Field,
    full_sync: bool,
) -> Result<Field> {
    use syncer_store::BaseType;

    if field.base_type != BaseType::DictionaryField
        || !driver.features().contains(&Capability::NestedFields)
    {
        return Ok(field);
    }

    let current = driver.active_nested_field_name_to_type(&field).await?;
    let existing = store
        .list_active_fields(field.table_id, Some(field.id))
        .await?;

    let stale: Vec<_> = existing
        .iter()
        .filter(|f| !current.contains_key(&f.name))
        .map(|f| f.id)
        .collect();
    if !stale.is_empty() {
        store.deactivate_fields(&stale).await?;
    }

    for (name, base_type) in &current {
        if existing.iter().any(|f| &f.name == name) {
            continue;
        }
        let child = store
            .insert_field(syncer_store::NewField {
                table_id: field.table_id,
                parent_id: Some(field.id),
                name: name.clone(),
                base_type: *base_type,
                special_type: crate::inference::infer_special_type(crate::inference::FieldDescriptor {
                    name,
                    base_type: *base_type,
                    is_pk: false,
                    prior_special_type: None,
                }),
                display_name: Some(store.name_to_human_readable(name)),
            })
            .await?;
        if child.base_type.is_textual() || child.base_type == BaseType::DictionaryField {
            Box::pin(classify_field(driver, store, cfg, child, full_sync)).await?;
        }
    }

    Ok(field)
}
