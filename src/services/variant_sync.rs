// src/services/variant_sync.rs

use std::collections::{BTreeSet, HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::VariantRepository,
    models::product::{OptionInput, ProductVariantsResponse, SyncedVariant, VariantInput},
};

/// Resultado de uma sincronização bem-sucedida.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Na mesma ordem das variantes enviadas
    pub variants: Vec<SyncedVariant>,
    pub links: usize,
    /// Nomes de valores citados por variantes que não existem em nenhuma opção
    pub dropped_option_values: Vec<String>,
}

/// Pares (variante, valor de opção) a gravar.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LinkPlan {
    pub links: Vec<(Uuid, Uuid)>,
    pub dropped: Vec<String>,
}

/// Monta os vínculos variante -> valor. Valores desconhecidos não geram
/// vínculo e são reportados em `dropped` (sem repetição, em ordem alfabética).
pub fn plan_links(
    variants: &[VariantInput],
    sku_ids: &HashMap<String, Uuid>,
    value_ids: &HashMap<String, Uuid>,
) -> LinkPlan {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut dropped = BTreeSet::new();

    for variant in variants {
        let Some(&variant_id) = sku_ids.get(&variant.sku) else {
            continue;
        };
        for value in &variant.option_values {
            match value_ids.get(value) {
                Some(&value_id) => {
                    if seen.insert((variant_id, value_id)) {
                        links.push((variant_id, value_id));
                    }
                }
                None => {
                    dropped.insert(value.clone());
                }
            }
        }
    }

    LinkPlan { links, dropped: dropped.into_iter().collect() }
}

// SKU repetido no mesmo pedido tornaria o upsert ambíguo
fn ensure_unique_skus(variants: &[VariantInput]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for variant in variants {
        if !seen.insert(variant.sku.as_str()) {
            return Err(AppError::BadRequest(format!("SKU '{}' repetido na requisição", variant.sku)));
        }
    }
    Ok(())
}

/// Reconcilia opções, valores e variantes de um produto com o estado enviado,
/// tudo numa transação só. Qualquer falha desfaz a sincronização inteira.
#[derive(Clone)]
pub struct VariantSyncEngine {
    repo: VariantRepository,
    pool: PgPool,
}

impl VariantSyncEngine {
    pub fn new(repo: VariantRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn sync(
        &self,
        product_id: Uuid,
        options: &[OptionInput],
        variants: &[VariantInput],
    ) -> Result<SyncOutcome, AppError> {
        ensure_unique_skus(variants)?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 0. Serializa sincronizações concorrentes do mesmo produto
        self.repo
            .lock_product(&mut *tx, product_id)
            .await?
            .ok_or(AppError::NotFound("product"))?;

        // 1. Limpa opções (valores vão junto em cascata) e vínculos antigos.
        //    As variantes ficam: SKUs ausentes do pedido continuam existindo.
        self.repo.delete_options(&mut *tx, product_id).await?;
        self.repo.delete_variant_links(&mut *tx, product_id).await?;

        // 2. Opções e valores; nome repetido entre opções: vale o último
        let mut value_ids: HashMap<String, Uuid> = HashMap::new();
        for option in options {
            let option_id = self.repo.insert_option(&mut *tx, product_id, &option.name).await?;
            let inserted = self.repo.insert_option_values(&mut *tx, option_id, &option.values).await?;
            value_ids.extend(inserted.into_iter().map(|(id, value)| (value, id)));
        }

        // 3. Upsert das variantes por SKU
        let mut sku_ids: HashMap<String, Uuid> = HashMap::new();
        if !variants.is_empty() {
            let rows = self.repo.upsert_variants(&mut *tx, product_id, variants).await?;
            sku_ids.extend(rows.into_iter().map(|(id, sku)| (sku, id)));

            // SKU que não voltou pertence a outro produto
            if let Some(taken) = variants.iter().find(|v| !sku_ids.contains_key(&v.sku)) {
                tracing::warn!(product_id = %product_id, sku = %taken.sku, "SKU pertence a outro produto; sincronização desfeita");
                return Err(AppError::SkuConflict(taken.sku.clone()));
            }
        }

        // 4. Vínculos variante <-> valor
        let plan = plan_links(variants, &sku_ids, &value_ids);
        if !plan.dropped.is_empty() {
            tracing::warn!(
                product_id = %product_id,
                dropped = ?plan.dropped,
                "Valores de opção desconhecidos ignorados"
            );
        }
        if !plan.links.is_empty() {
            self.repo.insert_links(&mut *tx, &plan.links).await?;
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        let synced: Vec<SyncedVariant> = variants
            .iter()
            .filter_map(|v| sku_ids.get(&v.sku).map(|&id| SyncedVariant { id, sku: v.sku.clone() }))
            .collect();

        tracing::info!(
            product_id = %product_id,
            options = options.len(),
            variants = synced.len(),
            links = plan.links.len(),
            "🔄 Variantes sincronizadas"
        );

        Ok(SyncOutcome {
            variants: synced,
            links: plan.links.len(),
            dropped_option_values: plan.dropped,
        })
    }

    pub async fn current_state(&self, product_id: Uuid) -> Result<ProductVariantsResponse, AppError> {
        let options = self.repo.list_options(product_id).await?;
        let variants = self.repo.list_variants(product_id).await?;
        Ok(ProductVariantsResponse { product_id, options, variants })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn variant(sku: &str, values: &[&str]) -> VariantInput {
        VariantInput {
            sku: sku.into(),
            price: Decimal::new(1000, 2),
            weight: Decimal::ZERO,
            is_active: true,
            option_values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn ids(names: &[&str]) -> HashMap<String, Uuid> {
        names.iter().map(|n| (n.to_string(), Uuid::new_v4())).collect()
    }

    #[test]
    fn links_each_variant_to_its_values() {
        let variants = vec![variant("P-RED", &["Red"]), variant("P-BLUE", &["Blue"])];
        let sku_ids = ids(&["P-RED", "P-BLUE"]);
        let value_ids = ids(&["Red", "Blue"]);

        let plan = plan_links(&variants, &sku_ids, &value_ids);
        assert_eq!(
            plan.links,
            vec![(sku_ids["P-RED"], value_ids["Red"]), (sku_ids["P-BLUE"], value_ids["Blue"])]
        );
        assert!(plan.dropped.is_empty());
    }

    #[test]
    fn unknown_values_are_dropped_and_reported_once() {
        let variants = vec![variant("P-1", &["Red", "XL"]), variant("P-2", &["XL", "Green"])];
        let sku_ids = ids(&["P-1", "P-2"]);
        let value_ids = ids(&["Red"]);

        let plan = plan_links(&variants, &sku_ids, &value_ids);
        assert_eq!(plan.links.len(), 1);
        assert_eq!(plan.dropped, vec!["Green".to_string(), "XL".to_string()]);
    }

    #[test]
    fn repeated_value_on_same_variant_links_once() {
        let variants = vec![variant("P-1", &["Red", "Red"])];
        let plan = plan_links(&variants, &ids(&["P-1"]), &ids(&["Red"]));
        assert_eq!(plan.links.len(), 1);
    }

    #[test]
    fn variant_without_values_or_id_yields_no_links() {
        let variants = vec![variant("P-1", &[]), variant("P-GHOST", &["Red"])];
        let plan = plan_links(&variants, &ids(&["P-1"]), &ids(&["Red"]));
        assert_eq!(plan, LinkPlan::default());
    }

    #[test]
    fn duplicate_skus_in_request_are_rejected() {
        let variants = vec![variant("P-1", &[]), variant("P-2", &[]), variant("P-1", &[])];
        assert!(matches!(ensure_unique_skus(&variants), Err(AppError::BadRequest(_))));
        assert!(ensure_unique_skus(&variants[..2]).is_ok());
    }
}
