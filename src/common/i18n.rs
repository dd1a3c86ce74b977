// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

pub const DEFAULT_LANG: &str = "en";

// Os catálogos vão embutidos no binário; não há leitura de disco em runtime.
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Idiomas com catálogo embutido.
pub fn is_supported(lang: &str) -> bool {
    CATALOGS.iter().any(|(code, _)| *code == lang)
}

/// Mensagens traduzidas, indexadas por idioma e depois por chave
/// (`errors.invalid_token`, `validation.email`, ...).
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de traduções '{lang}' inválido"))?;
            catalogs.insert(lang.to_string(), messages);
        }
        tracing::debug!("Catálogos de tradução carregados: {:?}", catalogs.keys().collect::<Vec<_>>());
        Ok(Self { catalogs })
    }

    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.translate_with(lang, key, &[])
    }

    /// Busca a chave no idioma pedido, cai para o inglês e, em último caso,
    /// devolve a própria chave. Placeholders `{nome}` são substituídos por `args`.
    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let template = self
            .lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key);

        args.iter().fold(template.to_string(), |message, (name, value)| {
            message.replace(&format!("{{{name}}}"), value)
        })
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn translates_into_requested_language() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("pt", "errors.invalid_credentials"), "E-mail ou senha inválidos.");
        assert_eq!(store.translate("en", "errors.invalid_credentials"), "Invalid e-mail or password.");
    }

    #[test]
    fn falls_back_to_english_then_to_key() {
        let store = I18nStore::load().unwrap();
        assert!(!is_supported("de"));
        assert!(is_supported("pt"));
        assert_eq!(store.translate("de", "errors.missing_token"), "Missing authentication token.");
        assert_eq!(store.translate("pt", "errors.nao_existe"), "errors.nao_existe");
    }

    #[test]
    fn substitutes_placeholders() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate_with("en", "errors.sku_conflict", &[("sku", "P-RED".to_string())]);
        assert_eq!(msg, "SKU 'P-RED' already belongs to another product.");
    }

    #[test]
    fn catalogs_share_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let keys = |lang: &str| store.catalogs[lang].keys().cloned().collect::<BTreeSet<_>>();
        assert_eq!(keys("en"), keys("pt"));
    }
}
